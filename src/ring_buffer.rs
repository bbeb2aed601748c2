//! Fixed-capacity byte FIFO.
//!
//! One instance exists per logical channel (secret-to-host,
//! host-to-device, device-to-host). Storage is inline, so a buffer placed
//! in a `static` costs no allocation. There is no internal
//! synchronisation: a buffer shared between tasks must sit behind a
//! critical-section mutex.

use crate::error::Error;
use crate::serial::{ByteSink, ByteSource};

/// Behaviour of [`RingBuffer::insert`] on a full buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Discard the incoming byte; the write cursor does not move.
    #[default]
    DropNewest,
    /// Evict the oldest stored byte to make room.
    OverwriteOldest,
}

/// Circular byte buffer with capacity `N`.
pub struct RingBuffer<const N: usize> {
    data: [u8; N],
    /// Index of the oldest stored byte.
    head: usize,
    /// Number of stored bytes, `0..=N`.
    len: usize,
    policy: OverflowPolicy,
    /// Bytes lost to overflow since creation (saturating).
    dropped: u32,
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty buffer with the [`OverflowPolicy::DropNewest`] policy.
    pub const fn new() -> Self {
        Self::with_policy(OverflowPolicy::DropNewest)
    }

    /// Create an empty buffer with an explicit overflow policy.
    pub const fn with_policy(policy: OverflowPolicy) -> Self {
        const { assert!(N > 0, "RingBuffer capacity must be non-zero") };

        Self {
            data: [0; N],
            head: 0,
            len: 0,
            policy,
            dropped: 0,
        }
    }

    /// Append one byte.
    ///
    /// On a full buffer the outcome depends on the policy: `DropNewest`
    /// returns `Err(Error::BufferFull)` and leaves the contents untouched,
    /// `OverwriteOldest` evicts the head and succeeds. Either way the lost
    /// byte is counted in [`dropped`](Self::dropped).
    pub fn insert(&mut self, byte: u8) -> Result<(), Error> {
        if self.is_full() {
            self.dropped = self.dropped.saturating_add(1);
            match self.policy {
                OverflowPolicy::DropNewest => return Err(Error::BufferFull),
                OverflowPolicy::OverwriteOldest => {
                    self.head = (self.head + 1) % N;
                    self.len -= 1;
                }
            }
        }

        let tail = (self.head + self.len) % N;
        self.data[tail] = byte;
        self.len += 1;
        Ok(())
    }

    /// Take the oldest byte, or `None` if the buffer is empty.
    pub fn remove(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.data[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(byte)
    }

    /// Look at the oldest byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.data[self.head])
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes lost to overflow so far.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Discard all stored bytes. The drop counter is kept.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteSource for RingBuffer<N> {
    fn receive_byte(&mut self) -> Option<u8> {
        self.remove()
    }
}

impl<const N: usize> ByteSink for RingBuffer<N> {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.insert(byte)
    }
}
