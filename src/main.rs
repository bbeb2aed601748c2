//! securekey firmware entry point (nRF52840).
//!
//! Task layout:
//!
//! - `usb_task`      - runs the USB device stack (enumeration, control)
//! - `keyboard_task` - one playback + button cycle per HID poll interval
//! - `serial_rx_task`/`serial_tx_task` - CDC passthrough echo
//! - `status_task`   - advances the LED heartbeats
//!
//! The secret is loaded into its buffer before any task is spawned, so no
//! other context can observe a half-filled buffer.

#![no_std]
#![no_main]

mod shared;
mod usb;

use defmt::info;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_time::{Duration, Instant, Ticker};
use embassy_usb::class::cdc_acm::{Receiver, Sender};
use embassy_usb::UsbDevice;
use securekey::config::{
    BUTTON_DEBOUNCE_POLLS, HEARTBEAT_FAST, HEARTBEAT_SLOW, SECRET_BUFFER_CAPACITY,
    SECRET_OVERFLOW_POLICY, STATUS_TICK_MS,
};
use securekey::secret::SECRET;
use securekey::ui::{Button, StatusLeds};
use securekey::SecretKey;
use {defmt_rtt as _, panic_probe as _};

use crate::shared::STATUS_EVENTS;
use crate::usb::device::KeyboardWriter;
use crate::usb::UsbDriver;

type Leds = StatusLeds<Output<'static>, Output<'static>>;

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    usb::device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn keyboard_task(
    writer: KeyboardWriter,
    button: Button<Input<'static>>,
    key: SecretKey<SECRET_BUFFER_CAPACITY>,
) -> ! {
    usb::keyboard::keyboard_loop(writer, button, key).await
}

#[embassy_executor::task]
async fn serial_rx_task(rx: Receiver<'static, UsbDriver>) -> ! {
    usb::serial::reader_loop(rx).await
}

#[embassy_executor::task]
async fn serial_tx_task(tx: Sender<'static, UsbDriver>) -> ! {
    usb::serial::writer_loop(tx).await
}

#[embassy_executor::task]
async fn status_task(mut leds: Leds) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(STATUS_TICK_MS));

    loop {
        if let Either::First(event) = select(STATUS_EVENTS.receive(), ticker.next()).await {
            leds.handle(event, Instant::now().as_millis());
        }
        leds.tick(Instant::now().as_millis());
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("securekey starting");

    // Active-low LEDs start dark; the button idles high on its pull-up.
    let blue = Output::new(p.P0_13, Level::High, OutputDrive::Standard);
    let red = Output::new(p.P0_14, Level::High, OutputDrive::Standard);
    let leds = StatusLeds::new(blue, red, HEARTBEAT_SLOW, HEARTBEAT_FAST);
    let button = Button::new(Input::new(p.P0_11, Pull::Up));

    let mut key = SecretKey::new(SECRET_OVERFLOW_POLICY, BUTTON_DEBOUNCE_POLLS);
    let summary = key.load(SECRET);
    if summary.truncated > 0 {
        defmt::warn!("Secret does not fit: {} bytes dropped", summary.truncated);
    }

    let parts = usb::device::init(p.USBD);
    let (tx, rx) = parts.serial.split();

    spawner.must_spawn(status_task(leds));
    spawner.must_spawn(usb_task(parts.device));
    spawner.must_spawn(keyboard_task(parts.keyboard, button, key));
    spawner.must_spawn(serial_rx_task(rx));
    spawner.must_spawn(serial_tx_task(tx));

    info!("All tasks spawned");
}
