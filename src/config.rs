//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

use crate::ring_buffer::OverflowPolicy;
use crate::ui::status::Heartbeat;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "securekey";
pub const USB_PRODUCT: &str = "SecureKey HID + Serial";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// Bus power drawn from the host (mA).
pub const USB_MAX_POWER_MA: u16 = 100;

/// HID reporting cycle (ms). One secret keystroke is consumed per cycle.
pub const USB_HID_POLL_MS: u8 = 10;

/// Max packet size of the CDC-ACM data endpoints.
pub const CDC_PACKET_SIZE: u16 = 64;

// Buffers

/// Capacity of the secret-to-host buffer.
pub const SECRET_BUFFER_CAPACITY: usize = 128;

/// Capacity of each serial buffer (host-to-device and device-to-host).
pub const SERIAL_BUFFER_CAPACITY: usize = 128;

/// What the secret buffer does when it is already full.
pub const SECRET_OVERFLOW_POLICY: OverflowPolicy = OverflowPolicy::DropNewest;

/// What the serial buffers do when they are already full.
pub const SERIAL_OVERFLOW_POLICY: OverflowPolicy = OverflowPolicy::DropNewest;

// Keyboard playback

/// Send an all-keys-released report after every key report so that
/// repeated characters ("LL") are seen as two presses by the host.
pub const RELEASE_BETWEEN_KEYS: bool = true;

// Serial passthrough

/// Hold back device-to-host bytes until the host raises DTR.
///
/// The line state is always tracked; this only decides whether it gates
/// transmission.
pub const SERIAL_GATE_ON_DTR: bool = false;

/// Text sent over the serial channel once per button press.
pub const BUTTON_NOTIFICATION: &[u8] = b"HWB Pressed\r\n";

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button (HWB)   → P0.11  (active-low, internal pull-up)
//   LED blue       → P0.13  (active-low)
//   LED red        → P0.14  (active-low)

/// Consecutive identical button samples (one per HID cycle) required
/// before a level change is accepted. 1 disables debouncing.
pub const BUTTON_DEBOUNCE_POLLS: u8 = 3;

// Status indicators

/// Period of the indicator task (ms).
pub const STATUS_TICK_MS: u64 = 5;

/// Calm heartbeat: long gap, short blip. Used for "secret exhausted".
pub const HEARTBEAT_SLOW: Heartbeat = Heartbeat::new(2500, 50);

/// Attention heartbeat: short gap, very short blip. Used for button presses.
pub const HEARTBEAT_FAST: Heartbeat = Heartbeat::new(500, 10);
