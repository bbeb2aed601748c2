//! State shared between Embassy tasks.
//!
//! The serial buffers are touched by the HID task (button notification),
//! the CDC reader and the CDC writer, so every access goes through a
//! short critical section. Status requests travel over a small channel to
//! the LED task.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use securekey::config::{SERIAL_BUFFER_CAPACITY, SERIAL_OVERFLOW_POLICY};
use securekey::ui::StatusEvent;
use securekey::RingBuffer;

/// Ring buffer behind a critical-section mutex.
pub struct SharedBuffer<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<RingBuffer<N>>>,
}

impl<const N: usize> SharedBuffer<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer::with_policy(SERIAL_OVERFLOW_POLICY))),
        }
    }

    /// Run `f` with exclusive access to the buffer.
    ///
    /// `f` runs inside a critical section: keep it short and never await
    /// or call back into the same buffer from it.
    pub fn with<R>(&self, f: impl FnOnce(&mut RingBuffer<N>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

pub type SerialBuffer = SharedBuffer<SERIAL_BUFFER_CAPACITY>;

/// Bytes received from the host on the CDC OUT endpoint.
pub static HOST_TO_DEVICE: SerialBuffer = SharedBuffer::new();

/// Bytes waiting to go to the host on the CDC IN endpoint.
pub static DEVICE_TO_HOST: SerialBuffer = SharedBuffer::new();

/// Requests for the status LED task.
pub static STATUS_EVENTS: Channel<CriticalSectionRawMutex, StatusEvent, 4> = Channel::new();

/// Queue a status request; dropped if the LED task is behind.
pub fn notify_status(event: StatusEvent) {
    if STATUS_EVENTS.try_send(event).is_err() {
        defmt::debug!("Status: queue full, dropped {:?}", event);
    }
}
