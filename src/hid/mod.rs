//! HID keyboard report type and usage codes.

pub mod keyboard;
pub mod keycodes;


pub use keyboard::{KeyboardReport, KEYBOARD_REPORT_SIZE};
