//! USB composite device - HID keyboard + CDC-ACM serial.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes the keyboard IN endpoint and the serial class.

use defmt::info;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State as CdcState};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State as HidState};
use embassy_usb::{Builder, Config, UsbDevice};
use securekey::config;
use securekey::hid::KEYBOARD_REPORT_SIZE;
use securekey::ui::StatusEvent;
use static_cell::StaticCell;
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

use super::UsbDriver;
use crate::shared::notify_status;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

static KB_STATE: StaticCell<HidState> = StaticCell::new();
static CDC_STATE: StaticCell<CdcState> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_EVENT_HANDLER: StaticCell<UsbEventHandler> = StaticCell::new();

/// Forwards bus configuration changes to the status LEDs.
struct UsbEventHandler;

impl embassy_usb::Handler for UsbEventHandler {
    fn enabled(&mut self, enabled: bool) {
        info!("USB: enabled={}", enabled);
    }

    fn reset(&mut self) {
        info!("USB: bus reset");
    }

    fn configured(&mut self, configured: bool) {
        info!("USB: configured={}", configured);
        notify_status(if configured {
            StatusEvent::Configured
        } else {
            StatusEvent::Unconfigured
        });
    }

    fn suspended(&mut self, suspended: bool) {
        info!("USB: suspended={}", suspended);
    }
}

/// Keyboard IN endpoint writer.
pub type KeyboardWriter = HidWriter<'static, UsbDriver, KEYBOARD_REPORT_SIZE>;

/// Build result containing the USB device runner and both classes.
pub struct UsbParts {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard: KeyboardWriter,
    pub serial: CdcAcmClass<'static, UsbDriver>,
}

/// Initialise the USB stack and create the composite device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbParts {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = config::USB_MAX_POWER_MA;
    usb_config.max_packet_size_0 = 64;

    // CDC needs an Interface Association Descriptor next to the HID
    // interface, which requires the Misc/IAD device class triple.
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let handler = USB_EVENT_HANDLER.init(UsbEventHandler);
    builder.handler(handler);

    let kb_state = KB_STATE.init(HidState::new());
    let kb_config = HidConfig {
        report_descriptor: KeyboardReport::desc(),
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: KEYBOARD_REPORT_SIZE as u16,
    };
    let keyboard = HidWriter::new(&mut builder, kb_state, kb_config);

    let cdc_state = CDC_STATE.init(CdcState::new());
    let serial = CdcAcmClass::new(&mut builder, cdc_state, config::CDC_PACKET_SIZE);

    let device = builder.build();

    info!("USB composite device initialised (keyboard + serial)");

    UsbParts {
        device,
        keyboard,
        serial,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}
