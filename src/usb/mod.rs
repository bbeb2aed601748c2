//! USB Device subsystem - presents a composite device to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  We create a **composite device** with:
//!
//! - Interface 0: Keyboard (HID, boot-protocol report layout)
//! - Interface 1+2: Virtual serial port (CDC-ACM)
//!
//! The keyboard side types the stored secret one key per poll interval;
//! the serial side echoes whatever the host sends and carries the button
//! notification.

pub mod device;
pub mod keyboard;
pub mod serial;

use embassy_nrf::peripherals;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;

/// Concrete USB driver type for this board.
pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
