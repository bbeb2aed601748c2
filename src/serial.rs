//! Byte transports and the passthrough echo policy.
//!
//! Each cycle at most one byte moves from an inbound [`ByteSource`] to an
//! outbound [`ByteSink`]. There is no retry queue: a byte the sink refuses
//! is gone, and the transport's own flow control is all the backpressure
//! there is.

use crate::error::Error;

/// Something bytes can be read from, one at a time, without blocking.
pub trait ByteSource {
    /// Next available byte, or `None` if nothing is pending.
    fn receive_byte(&mut self) -> Option<u8>;
}

/// Something bytes can be written to, one at a time, without blocking.
pub trait ByteSink {
    /// Hand over one byte. `Err` means the byte was not accepted.
    fn send_byte(&mut self, byte: u8) -> Result<(), Error>;

    /// Write a whole string, stopping at the first refused byte.
    /// Returns how many bytes were accepted.
    fn send_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut sent = 0;
        for &b in bytes {
            if self.send_byte(b).is_err() {
                break;
            }
            sent += 1;
        }
        sent
    }
}

/// What one echo cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Echo {
    /// Nothing was waiting on the inbound side.
    Idle,
    /// The byte reached the outbound side.
    Forwarded(u8),
    /// The outbound side refused the byte; it is lost.
    Dropped(u8),
}

/// Per-cycle echo policy with running counters.
#[derive(Debug, Default)]
pub struct Passthrough {
    forwarded: u32,
    dropped: u32,
}

impl Passthrough {
    pub const fn new() -> Self {
        Self {
            forwarded: 0,
            dropped: 0,
        }
    }

    /// Move at most one byte from `inbound` to `outbound`, unchanged.
    pub fn cycle(&mut self, inbound: &mut impl ByteSource, outbound: &mut impl ByteSink) -> Echo {
        let Some(byte) = inbound.receive_byte() else {
            return Echo::Idle;
        };

        match outbound.send_byte(byte) {
            Ok(()) => {
                self.forwarded = self.forwarded.saturating_add(1);
                Echo::Forwarded(byte)
            }
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                Echo::Dropped(byte)
            }
        }
    }

    pub fn forwarded(&self) -> u32 {
        self.forwarded
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
