//! CDC-ACM serial passthrough.
//!
//! The reader moves OUT packets into `HOST_TO_DEVICE`. The writer task
//! ticks every millisecond: it first flushes `DEVICE_TO_HOST` to the IN
//! endpoint, then lets the echo policy move one byte across.

use defmt::{debug, info, warn};
use embassy_time::{Duration, Ticker};
use embassy_usb::class::cdc_acm::{Receiver, Sender};
use heapless::Vec;
use securekey::config::{CDC_PACKET_SIZE, SERIAL_GATE_ON_DTR};
use securekey::{Echo, Passthrough};

use super::UsbDriver;
use crate::shared::{DEVICE_TO_HOST, HOST_TO_DEVICE};

/// Longest IN packet we send. One short of the endpoint size so a batch
/// never needs a trailing zero-length packet.
const MAX_BATCH: usize = CDC_PACKET_SIZE as usize - 1;

/// Copy everything the host sends into `HOST_TO_DEVICE`.
pub async fn reader_loop(mut rx: Receiver<'static, UsbDriver>) -> ! {
    let mut packet = [0u8; CDC_PACKET_SIZE as usize];

    loop {
        rx.wait_connection().await;
        info!("Serial: host connected");

        loop {
            let n = match rx.read_packet(&mut packet).await {
                Ok(n) => n,
                Err(e) => {
                    warn!("Serial: read failed: {:?}", e);
                    break;
                }
            };

            let lost = HOST_TO_DEVICE.with(|buf| {
                packet[..n].iter().filter(|&&b| buf.insert(b).is_err()).count()
            });
            if lost > 0 {
                warn!("Serial: {} inbound bytes dropped", lost);
            }
        }
    }
}

/// Flush outbound bytes and run the echo policy.
pub async fn writer_loop(mut tx: Sender<'static, UsbDriver>) -> ! {
    let mut echo = Passthrough::new();
    let mut ticker = Ticker::every(Duration::from_millis(1));
    let mut host_ready = false;

    loop {
        ticker.next().await;

        let dtr = tx.dtr();
        if dtr != host_ready {
            host_ready = dtr;
            info!("Serial: DTR={}", dtr);
        }

        if !SERIAL_GATE_ON_DTR || host_ready {
            let batch: Vec<u8, MAX_BATCH> = DEVICE_TO_HOST.with(|buf| {
                let mut batch = Vec::new();
                while !batch.is_full() {
                    match buf.remove() {
                        Some(b) => {
                            let _ = batch.push(b);
                        }
                        None => break,
                    }
                }
                batch
            });

            if !batch.is_empty() {
                if let Err(e) = tx.write_packet(&batch).await {
                    // Not connected or bus reset: the batch is gone.
                    debug!("Serial: dropped {} outbound bytes: {:?}", batch.len(), e);
                }
            }
        }

        let echoed = HOST_TO_DEVICE.with(|rx| DEVICE_TO_HOST.with(|out| echo.cycle(rx, out)));
        if let Echo::Dropped(b) = echoed {
            debug!("Serial: echo dropped {=u8:#x} ({} total)", b, echo.dropped());
        }
    }
}
