//! Per-cycle composition of playback and the button latch.
//!
//! The HID task owns one [`SecretKey`] and calls [`SecretKey::hid_cycle`]
//! once per reporting interval. The returned [`Cycle`] says what to put on
//! the wire and which status indications to raise. [`ReportScheduler`]
//! then writes it through a [`ReportWriter`] and settles the staged key.

use crate::config::BUTTON_NOTIFICATION;
use crate::error::Error;
use crate::hid::KeyboardReport;
use crate::playback::{Frame, Playback, PlaybackState};
use crate::ring_buffer::{OverflowPolicy, RingBuffer};
use crate::secret::{self, LoadSummary};
use crate::serial::ByteSink;
use crate::ui::{ButtonLatch, StatusEvent};

/// Output of one HID cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cycle {
    pub frame: Frame,
    /// The button latch fired on this cycle.
    pub button_fired: bool,
}

impl Cycle {
    /// Status indications implied by this cycle, in the order to apply them.
    pub fn status_events(&self) -> impl Iterator<Item = StatusEvent> {
        let exhausted = self.frame.is_exhausted().then_some(StatusEvent::Exhausted);
        let button = self.button_fired.then_some(StatusEvent::ButtonPressed);
        exhausted.into_iter().chain(button)
    }
}

/// Secret buffer, playback machine and button latch.
pub struct SecretKey<const N: usize> {
    secret: RingBuffer<N>,
    playback: Playback,
    latch: ButtonLatch,
}

impl<const N: usize> SecretKey<N> {
    pub const fn new(policy: OverflowPolicy, debounce_polls: u8) -> Self {
        Self {
            secret: RingBuffer::with_policy(policy),
            playback: Playback::new(),
            latch: ButtonLatch::new(debounce_polls),
        }
    }

    /// Queue `sequence` for playback. Call once, before the first cycle.
    pub fn load(&mut self, sequence: &[u8]) -> LoadSummary {
        secret::load(&mut self.secret, sequence)
    }

    pub fn remaining(&self) -> usize {
        self.secret.len()
    }

    pub fn state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Build this cycle's report and sample the button.
    ///
    /// The key in the report stays queued until [`commit`](Self::commit).
    /// When the latch fires, `BUTTON_NOTIFICATION` is written to `notify`;
    /// whatever the sink refuses is lost.
    pub fn hid_cycle(&mut self, button_pressed: bool, notify: &mut impl ByteSink) -> Cycle {
        let frame = self.playback.prepare(&self.secret);

        let button_fired = self.latch.poll(button_pressed);
        if button_fired {
            let sent = notify.send_bytes(BUTTON_NOTIFICATION);
            if sent < BUTTON_NOTIFICATION.len() {
                warn!(
                    "Button: notification truncated ({}/{})",
                    sent,
                    BUTTON_NOTIFICATION.len()
                );
            }
        }

        Cycle {
            frame,
            button_fired,
        }
    }

    /// The report from the last cycle reached the host.
    pub fn commit(&mut self) -> Option<u8> {
        self.playback.acknowledge(&mut self.secret)
    }

    /// The report from the last cycle could not be sent; offer it again.
    pub fn retry(&mut self) {
        self.playback.abandon();
    }

    /// `hid_cycle` followed by an immediate `commit`.
    pub fn hid_cycle_committed(
        &mut self,
        button_pressed: bool,
        notify: &mut impl ByteSink,
    ) -> Cycle {
        let cycle = self.hid_cycle(button_pressed, notify);
        self.commit();
        cycle
    }
}

/// Keyboard interrupt endpoint.
#[allow(async_fn_in_trait)]
pub trait ReportWriter {
    async fn write_report(&mut self, report: &KeyboardReport) -> Result<(), Error>;
}

/// What [`ReportScheduler::deliver`] did with a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    /// Nothing written: the host already holds this idle report.
    Idle,
    /// A report without a key went out.
    Sent,
    /// The key was written and committed.
    Typed(u8),
    /// The write failed; the key stays queued for the next cycle.
    Failed,
}

/// Per-cycle transmit policy for the keyboard endpoint.
///
/// Idle reports are only written when they differ from the last one the
/// host accepted. A key is committed after its report is accepted and,
/// with `release_between_keys`, followed by an empty report so the host
/// sees repeated letters as separate presses.
#[derive(Debug)]
pub struct ReportScheduler {
    last_sent: KeyboardReport,
    release_between_keys: bool,
}

impl ReportScheduler {
    pub const fn new(release_between_keys: bool) -> Self {
        Self {
            last_sent: KeyboardReport::empty(),
            release_between_keys,
        }
    }

    pub fn last_sent(&self) -> KeyboardReport {
        self.last_sent
    }

    /// The report to write for `frame`, or `None` if it can be skipped.
    pub fn pending(&self, frame: &Frame) -> Option<KeyboardReport> {
        let unchanged = frame.report == self.last_sent;
        if frame.is_exhausted() && unchanged && !frame.force_send {
            None
        } else {
            Some(frame.report)
        }
    }

    /// Write `frame` and settle the key that `key` staged for it.
    pub async fn deliver<const N: usize>(
        &mut self,
        key: &mut SecretKey<N>,
        frame: &Frame,
        writer: &mut impl ReportWriter,
    ) -> Delivery {
        let Some(report) = self.pending(frame) else {
            return Delivery::Idle;
        };

        if writer.write_report(&report).await.is_err() {
            key.retry();
            return Delivery::Failed;
        }
        self.last_sent = report;
        let typed = key.commit();

        if self.release_between_keys && !report.is_empty() {
            let release = KeyboardReport::empty();
            if writer.write_report(&release).await.is_ok() {
                self.last_sent = release;
            }
        }

        match typed {
            Some(code) => Delivery::Typed(code),
            None => Delivery::Sent,
        }
    }
}
