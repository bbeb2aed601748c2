//! Keystroke playback: one buffered key code per HID reporting cycle.
//!
//! Building a report and consuming the key are separate steps. `prepare`
//! only peeks at the buffer, so a cycle that is retried (endpoint busy,
//! host NAK) produces the same report again. `acknowledge` commits the
//! staged key once the report is actually on the wire. `poll` does both
//! for callers that have no transmit feedback.

use crate::hid::KeyboardReport;
use crate::ring_buffer::RingBuffer;

/// Where playback currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    /// At least one key code is waiting in the buffer.
    #[default]
    HasPendingKey,
    /// The buffer is drained. Nothing refills it at runtime, so this
    /// state is permanent once reached.
    Exhausted,
}

/// Result of one reporting cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub report: KeyboardReport,
    pub state: PlaybackState,
    /// Whether the report must be sent even if unchanged. Always `false`:
    /// the transmit decision stays with the USB layer.
    pub force_send: bool,
}

impl Frame {
    pub fn is_exhausted(&self) -> bool {
        self.state == PlaybackState::Exhausted
    }

    /// The key code carried by this frame, if any.
    ///
    /// Decided by the playback state rather than the report bytes: a
    /// stored `0x00` still occupies a cycle and must be committed.
    pub fn key(&self) -> Option<u8> {
        match self.state {
            PlaybackState::HasPendingKey => Some(self.report.keycodes[0]),
            PlaybackState::Exhausted => None,
        }
    }
}

/// Playback state machine.
#[derive(Debug, Default)]
pub struct Playback {
    state: PlaybackState,
    /// Key code handed out by the last `prepare`, not yet committed.
    staged: Option<u8>,
    emitted: u32,
}

impl Playback {
    pub const fn new() -> Self {
        Self {
            state: PlaybackState::HasPendingKey,
            staged: None,
            emitted: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Key codes committed so far.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }

    /// Build the report for this cycle from the head of `secret`.
    ///
    /// Does not consume anything; calling it twice in a row yields the
    /// same frame.
    pub fn prepare<const N: usize>(&mut self, secret: &RingBuffer<N>) -> Frame {
        self.staged = secret.peek();

        let (report, state) = match self.staged {
            Some(code) => (KeyboardReport::single(code), PlaybackState::HasPendingKey),
            None => (KeyboardReport::empty(), PlaybackState::Exhausted),
        };

        if state != self.state {
            debug!("Playback: {:?} -> {:?}", self.state, state);
            self.state = state;
        }

        Frame {
            report,
            state,
            force_send: false,
        }
    }

    /// Commit the key staged by the last [`prepare`](Self::prepare).
    ///
    /// Returns the committed key code. A second call without a fresh
    /// `prepare` does nothing and returns `None`.
    pub fn acknowledge<const N: usize>(&mut self, secret: &mut RingBuffer<N>) -> Option<u8> {
        let staged = self.staged.take()?;
        let removed = secret.remove();
        debug_assert_eq!(removed, Some(staged));
        self.emitted = self.emitted.saturating_add(1);
        removed
    }

    /// Drop a staged key without committing it (transmit failed).
    pub fn abandon(&mut self) {
        self.staged = None;
    }

    /// One complete cycle: build the report and consume its key.
    pub fn poll<const N: usize>(&mut self, secret: &mut RingBuffer<N>) -> Frame {
        let frame = self.prepare(secret);
        self.acknowledge(secret);
        frame
    }
}
