//! The stored secret and its one-time loader.

use crate::hid::keycodes::{CAPS_LOCK, E, ENTER, ESCAPE, H, L, MODIFIER_LEFT_SHIFT, O};
use crate::ring_buffer::RingBuffer;

/// Keystrokes typed into the host after enumeration.
///
/// Each byte is placed as-is into the first key slot of one report, so the
/// modifier entries (`MODIFIER_LEFT_SHIFT`) travel as key codes and are left
/// for the host to interpret. `ESCAPE` separates the two words.
pub const SECRET: &[u8] = &[
    CAPS_LOCK,
    H, E, L, L,
    O,
    CAPS_LOCK,
    ENTER,
    ESCAPE,
    H, E, L, MODIFIER_LEFT_SHIFT,
    L, MODIFIER_LEFT_SHIFT,
    O,
    ENTER,
];

/// Outcome of [`load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadSummary {
    /// Bytes now queued in the buffer.
    pub loaded: usize,
    /// Trailing bytes that did not fit.
    pub truncated: usize,
}

/// Copy `sequence` into `buffer`, front to back.
///
/// Runs once at start-up before any task polls the buffer. Bytes that do
/// not fit are dropped by the buffer's overflow policy; the count is
/// reported rather than treated as an error.
pub fn load<const N: usize>(buffer: &mut RingBuffer<N>, sequence: &[u8]) -> LoadSummary {
    let mut summary = LoadSummary {
        loaded: 0,
        truncated: 0,
    };

    for &byte in sequence {
        match buffer.insert(byte) {
            Ok(()) => summary.loaded += 1,
            Err(_) => summary.truncated += 1,
        }
    }

    if summary.truncated > 0 {
        warn!(
            "Secret: {} of {} bytes did not fit",
            summary.truncated,
            sequence.len()
        );
    }
    info!("Secret: {} keystrokes queued", summary.loaded);

    summary
}
