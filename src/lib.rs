//! Hardware-independent core of securekey.
//!
//! Everything that decides *what* the device does lives here: the ring
//! buffers, the stored secret, keystroke playback, the button latch, the
//! serial echo policy and the status LED phase machines. None of it
//! touches a peripheral directly, so it builds for the host and is tested
//! with `cargo test --lib --tests`.
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and pulls this crate in for the logic; the USB and GPIO plumbing stay
//! in the binary.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod engine;
pub mod error;
pub mod hid;
pub mod playback;
pub mod ring_buffer;
pub mod secret;
pub mod serial;
pub mod ui;

pub use engine::{Cycle, Delivery, ReportScheduler, ReportWriter, SecretKey};
pub use error::Error;
pub use playback::{Frame, Playback, PlaybackState};
pub use ring_buffer::{OverflowPolicy, RingBuffer};
pub use serial::{ByteSink, ByteSource, Echo, Passthrough};

// ═══════════════════════════════════════════════════════════════════════════
// Behavioural tests across modules
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::hid::keycodes::*;
    use super::*;

    fn drain<const CAP: usize>(buf: &mut RingBuffer<CAP>, cycles: usize) -> std::vec::Vec<Frame> {
        let mut playback = Playback::new();
        (0..cycles).map(|_| playback.poll(buf)).collect()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Playback ordering
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn sequences_within_capacity_play_back_exactly_once_in_order() {
        let sequences: [&[u8]; 5] = [
            &[],
            &[A],
            &[A, B, C],
            &[A, 0x00, B],
            &[H, E, L, L, O, ENTER, ESCAPE, Z],
        ];

        for seq in sequences {
            let mut buf: RingBuffer<8> = RingBuffer::new();
            let summary = secret::load(&mut buf, seq);
            assert_eq!(summary.truncated, 0);

            let frames = drain(&mut buf, seq.len() + 3);
            let keys: std::vec::Vec<u8> = frames.iter().filter_map(|f| f.key()).collect();
            assert_eq!(keys.as_slice(), seq);

            // Everything after the last key is the idle report.
            for frame in &frames[seq.len()..] {
                assert!(frame.is_exhausted());
                assert!(frame.report.is_empty());
            }
        }
    }

    #[test]
    fn overlong_sequence_keeps_only_first_capacity_bytes() {
        let seq = [A, B, C, D, E, F, G, H, I, J];
        let mut buf: RingBuffer<8> = RingBuffer::new();
        let summary = secret::load(&mut buf, &seq);
        assert_eq!(summary.loaded, 8);
        assert_eq!(summary.truncated, 2);

        let keys: std::vec::Vec<u8> = drain(&mut buf, 12).iter().filter_map(|f| f.key()).collect();
        assert_eq!(keys.as_slice(), &seq[..8]);
    }

    #[test]
    fn exhausted_playback_stays_idle() {
        let mut buf: RingBuffer<4> = RingBuffer::new();
        secret::load(&mut buf, &[A]);
        let mut playback = Playback::new();
        playback.poll(&mut buf);

        for _ in 0..100 {
            let frame = playback.poll(&mut buf);
            assert_eq!(frame.key(), None);
            assert!(frame.is_exhausted());
            assert!(!frame.force_send);
        }
        assert_eq!(playback.emitted(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════
    // End-to-end: "HELLO" + Enter
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn hello_scenario() {
        let seq = [CAPS_LOCK, H, E, L, L, O, CAPS_LOCK, ENTER];
        let mut buf: RingBuffer<8> = RingBuffer::new();
        secret::load(&mut buf, &seq);
        assert!(buf.is_full());

        let mut playback = Playback::new();
        for &expected in &seq {
            let frame = playback.poll(&mut buf);
            assert_eq!(frame.report.keycodes, [expected, 0, 0, 0, 0, 0]);
            assert_eq!(frame.state, PlaybackState::HasPendingKey);
        }

        let ninth = playback.poll(&mut buf);
        assert_eq!(ninth.key(), None);
        assert_eq!(ninth.state, PlaybackState::Exhausted);
    }

    #[test]
    fn exhausted_cycles_always_request_red_heartbeat() {
        let mut key: SecretKey<8> = SecretKey::new(OverflowPolicy::DropNewest, 1);
        key.load(&[A]);
        let mut sink: RingBuffer<32> = RingBuffer::new();

        let first = key.hid_cycle_committed(false, &mut sink);
        assert_eq!(first.status_events().count(), 0);

        for _ in 0..10 {
            let cycle = key.hid_cycle_committed(false, &mut sink);
            assert!(cycle
                .status_events()
                .any(|e| e == ui::StatusEvent::Exhausted));
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Serial passthrough through the channel buffers
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn echo_between_ring_buffers_never_duplicates() {
        let mut host_to_device: RingBuffer<8> = RingBuffer::new();
        let mut device_to_host: RingBuffer<2> = RingBuffer::new();
        let mut echo = Passthrough::new();

        for b in b"abc" {
            host_to_device.insert(*b).unwrap();
        }

        assert_eq!(echo.cycle(&mut host_to_device, &mut device_to_host), Echo::Forwarded(b'a'));
        assert_eq!(echo.cycle(&mut host_to_device, &mut device_to_host), Echo::Forwarded(b'b'));
        assert_eq!(echo.cycle(&mut host_to_device, &mut device_to_host), Echo::Dropped(b'c'));
        assert_eq!(echo.cycle(&mut host_to_device, &mut device_to_host), Echo::Idle);

        assert_eq!(device_to_host.remove(), Some(b'a'));
        assert_eq!(device_to_host.remove(), Some(b'b'));
        assert_eq!(device_to_host.remove(), None);
        assert_eq!(device_to_host.dropped(), 1);
    }

    #[test]
    fn stored_secret_plays_back_verbatim() {
        let mut key: SecretKey<{ config::SECRET_BUFFER_CAPACITY }> =
            SecretKey::new(config::SECRET_OVERFLOW_POLICY, config::BUTTON_DEBOUNCE_POLLS);
        key.load(secret::SECRET);
        let mut sink: RingBuffer<32> = RingBuffer::new();

        let mut typed = std::vec::Vec::new();
        while key.state() == PlaybackState::HasPendingKey {
            let cycle = key.hid_cycle(false, &mut sink);
            if let Some(code) = cycle.frame.key() {
                key.commit();
                typed.push(code);
            }
        }
        assert_eq!(typed.as_slice(), secret::SECRET);
    }
}
