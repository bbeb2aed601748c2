//! User-facing hardware: the HWB button and two status LEDs.
//!
//! ## Components
//!
//! - **Button**: one active-low tactile switch behind a one-shot latch
//! - **Status**: blue and red active-low LEDs with non-blocking heartbeats

pub mod button;
pub mod status;

pub use button::{Button, ButtonLatch, LatchState};
pub use status::{Heartbeat, Indicator, StatusEvent, StatusLeds};
