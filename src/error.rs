//! Unified error type for securekey.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Buffers
    /// Insert rejected because the ring buffer is full.
    BufferFull,

    // Transports
    /// Outbound transport cannot take a byte this cycle.
    NotReady,

    // USB
    /// USB endpoint write failed (disabled endpoint or bus reset).
    Usb,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::BufferFull => "ring buffer full",
            Error::NotReady => "transport not ready",
            Error::Usb => "usb endpoint error",
        };
        f.write_str(msg)
    }
}
