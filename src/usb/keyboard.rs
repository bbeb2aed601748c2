//! Keyboard report loop.
//!
//! Runs one playback cycle every `USB_HID_POLL_MS`. A key is committed
//! only after its report was accepted by the endpoint, so a bus reset or
//! a host that stops polling never loses or repeats a keystroke.

use defmt::{debug, info, warn};
use embassy_nrf::gpio::Input;
use embassy_time::{Duration, Ticker};
use securekey::config::{RELEASE_BETWEEN_KEYS, SECRET_BUFFER_CAPACITY, USB_HID_POLL_MS};
use securekey::hid::{KeyboardReport, KEYBOARD_REPORT_SIZE};
use securekey::ui::Button;
use securekey::{Delivery, Error, ReportScheduler, ReportWriter, SecretKey};

use super::device::KeyboardWriter;
use crate::shared::{notify_status, DEVICE_TO_HOST};

/// The HID class writer seen through the library's endpoint trait.
struct Endpoint(KeyboardWriter);

impl ReportWriter for Endpoint {
    async fn write_report(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
        let n = report.serialize(&mut buf);
        self.0.write(&buf[..n]).await.map_err(|e| {
            warn!("HID: keyboard write failed: {:?}", e);
            Error::Usb
        })
    }
}

/// Drive playback and the button latch forever.
pub async fn keyboard_loop(
    mut writer: KeyboardWriter,
    mut button: Button<Input<'static>>,
    mut key: SecretKey<SECRET_BUFFER_CAPACITY>,
) -> ! {
    writer.ready().await;
    info!("HID: endpoint ready, {} keystrokes queued", key.remaining());

    let mut endpoint = Endpoint(writer);
    let mut scheduler = ReportScheduler::new(RELEASE_BETWEEN_KEYS);
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(USB_HID_POLL_MS)));

    loop {
        ticker.next().await;

        let pressed = button.is_pressed();
        let cycle = DEVICE_TO_HOST.with(|tx| key.hid_cycle(pressed, tx));
        for event in cycle.status_events() {
            notify_status(event);
        }

        match scheduler.deliver(&mut key, &cycle.frame, &mut endpoint).await {
            Delivery::Typed(code) => {
                debug!("HID: typed {=u8:#x}, {} left", code, key.remaining());
            }
            Delivery::Failed => debug!("HID: report refused, retrying next cycle"),
            Delivery::Idle | Delivery::Sent => {}
        }
    }
}
