//! Status LEDs driven by a non-blocking heartbeat.
//!
//! A heartbeat is a wait followed by a short pulse that inverts the LED's
//! steady level:
//!
//! ```text
//!   steady ──────────── lead ────────────┐pulse┌─── steady
//!                                        └─────┘
//! ```
//!
//! Nothing here sleeps. The owner calls [`Indicator::tick`] with the
//! current time and the phase machine advances when a deadline passes, so
//! the HID and serial paths are never stalled by a blink.

use embedded_hal::digital::OutputPin;

/// Timing of one heartbeat, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    /// Time from trigger to the start of the pulse.
    pub lead_ms: u32,
    /// How long the level stays inverted.
    pub pulse_ms: u32,
}

impl Heartbeat {
    pub const fn new(lead_ms: u32, pulse_ms: u32) -> Self {
        Self { lead_ms, pulse_ms }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Lead { until: u64, pulse_ms: u32 },
    Pulse { until: u64 },
}

/// One active-low LED.
pub struct Indicator<P> {
    pin: P,
    /// Logical level outside of a pulse.
    steady: bool,
    phase: Phase,
}

impl<P: OutputPin> Indicator<P> {
    /// Wrap `pin` and switch the LED off.
    pub fn new(pin: P) -> Self {
        let mut led = Self {
            pin,
            steady: false,
            phase: Phase::Idle,
        };
        led.drive();
        led
    }

    /// Logical on/off as currently shown (pulse included).
    pub fn is_lit(&self) -> bool {
        self.steady ^ matches!(self.phase, Phase::Pulse { .. })
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn set(&mut self, on: bool) {
        self.steady = on;
        self.drive();
    }

    pub fn toggle(&mut self) {
        self.set(!self.steady);
    }

    /// Start a heartbeat at `now_ms`. Ignored while one is still running;
    /// returns whether it started.
    pub fn heartbeat(&mut self, pattern: Heartbeat, now_ms: u64) -> bool {
        if self.is_busy() {
            return false;
        }
        self.phase = Phase::Lead {
            until: now_ms + u64::from(pattern.lead_ms),
            pulse_ms: pattern.pulse_ms,
        };
        true
    }

    /// Advance the phase machine. Safe to call at any rate; late ticks
    /// simply shorten the following phase.
    pub fn tick(&mut self, now_ms: u64) {
        match self.phase {
            Phase::Idle => return,
            Phase::Lead { until, pulse_ms } if now_ms >= until => {
                self.phase = Phase::Pulse {
                    until: until + u64::from(pulse_ms),
                };
            }
            Phase::Pulse { until } if now_ms >= until => {
                self.phase = Phase::Idle;
            }
            _ => return,
        }
        self.drive();
        // A tick long past the deadline may have skipped the whole pulse.
        if let Phase::Pulse { until } = self.phase {
            if now_ms >= until {
                self.phase = Phase::Idle;
                self.drive();
            }
        }
    }

    fn drive(&mut self) {
        // Active-low: lit means pin low.
        let lit = self.is_lit();
        let written = if lit {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
        if written.is_err() {
            warn!("Status: LED write failed (lit={})", lit);
        }
    }
}

/// Requests from the rest of the firmware for the status task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusEvent {
    /// The host selected a configuration; all endpoints are up.
    Configured,
    /// Configuration was dropped (bus reset or `SET_CONFIGURATION 0`);
    /// the device waits for the host again.
    Unconfigured,
    /// The secret buffer is drained.
    Exhausted,
    /// The hardware button fired.
    ButtonPressed,
}

/// The two status LEDs.
///
/// - blue: connection / attention (fast heartbeat on button press)
/// - red: configuration in progress, slow heartbeat once the secret is spent
pub struct StatusLeds<B, R> {
    pub blue: Indicator<B>,
    pub red: Indicator<R>,
    slow: Heartbeat,
    fast: Heartbeat,
}

impl<B: OutputPin, R: OutputPin> StatusLeds<B, R> {
    pub fn new(blue: B, red: R, slow: Heartbeat, fast: Heartbeat) -> Self {
        Self {
            blue: Indicator::new(blue),
            red: Indicator::new(red),
            slow,
            fast,
        }
    }

    pub fn all_off(&mut self) {
        self.blue.set(false);
        self.red.set(false);
    }

    /// Bus configuration started: red on, blue off.
    pub fn configuring(&mut self) {
        self.all_off();
        self.red.set(true);
    }

    pub fn handle(&mut self, event: StatusEvent, now_ms: u64) {
        match event {
            StatusEvent::Configured => {
                self.configuring();
                self.red.toggle();
                self.blue.set(true);
            }
            StatusEvent::Unconfigured => {
                info!("Status: waiting for host");
                self.configuring();
            }
            StatusEvent::Exhausted => {
                self.red.heartbeat(self.slow, now_ms);
            }
            StatusEvent::ButtonPressed => {
                self.blue.heartbeat(self.fast, now_ms);
            }
        }
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.blue.tick(now_ms);
        self.red.tick(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Records the electrical level; `true` = high = LED dark.
    #[derive(Default)]
    struct MockPin {
        high: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    /// Output pin whose writes always fail.
    struct BrokenPin;

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl ErrorType for BrokenPin {
        type Error = PinFault;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(PinFault)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(PinFault)
        }
    }

    const SLOW: Heartbeat = Heartbeat::new(2500, 50);
    const FAST: Heartbeat = Heartbeat::new(500, 10);

    #[test]
    fn new_indicator_is_dark() {
        let led = Indicator::new(MockPin::default());
        assert!(!led.is_lit());
        assert!(led.pin.high);
    }

    #[test]
    fn set_and_toggle_are_active_low() {
        let mut led = Indicator::new(MockPin::default());
        led.set(true);
        assert!(!led.pin.high);
        led.toggle();
        assert!(led.pin.high);
        led.toggle();
        assert!(led.is_lit());
    }

    #[test]
    fn failing_pin_keeps_logical_state() {
        let mut led = Indicator::new(BrokenPin);
        led.set(true);
        assert!(led.is_lit());
        assert!(led.heartbeat(FAST, 0));
        led.tick(500);
        assert!(!led.is_lit());
        led.tick(510);
        assert!(led.is_lit());
        assert!(!led.is_busy());
    }

    #[test]
    fn heartbeat_pulses_after_lead() {
        let mut led = Indicator::new(MockPin::default());
        assert!(led.heartbeat(SLOW, 1000));

        led.tick(1000);
        led.tick(3499);
        assert!(!led.is_lit());

        led.tick(3500);
        assert!(led.is_lit());
        assert!(!led.pin.high);

        led.tick(3549);
        assert!(led.is_lit());

        led.tick(3550);
        assert!(!led.is_lit());
        assert!(!led.is_busy());
    }

    #[test]
    fn pulse_inverts_a_lit_led() {
        let mut led = Indicator::new(MockPin::default());
        led.set(true);
        led.heartbeat(FAST, 0);
        led.tick(500);
        assert!(!led.is_lit());
        led.tick(510);
        assert!(led.is_lit());
    }

    #[test]
    fn retrigger_while_running_is_ignored() {
        let mut led = Indicator::new(MockPin::default());
        assert!(led.heartbeat(SLOW, 0));
        assert!(!led.heartbeat(SLOW, 1000));
        led.tick(2500);
        assert!(led.is_lit()); // deadline from the first trigger
        led.tick(2550);
        assert!(led.heartbeat(SLOW, 2550));
    }

    #[test]
    fn late_tick_does_not_leave_led_inverted() {
        let mut led = Indicator::new(MockPin::default());
        led.heartbeat(FAST, 0);
        led.tick(10_000);
        assert!(!led.is_lit());
        assert!(!led.is_busy());
    }

    #[test]
    fn configured_hands_over_from_red_to_blue() {
        let mut leds = StatusLeds::new(MockPin::default(), MockPin::default(), SLOW, FAST);
        leds.handle(StatusEvent::Configured, 0);
        assert!(leds.blue.is_lit());
        assert!(!leds.red.is_lit());
    }

    #[test]
    fn unconfigured_returns_to_waiting_for_host() {
        let mut leds = StatusLeds::new(MockPin::default(), MockPin::default(), SLOW, FAST);
        leds.handle(StatusEvent::Configured, 0);
        leds.handle(StatusEvent::Unconfigured, 10);
        assert!(!leds.blue.is_lit());
        assert!(leds.red.is_lit());

        // Re-enumeration hands over to blue again.
        leds.handle(StatusEvent::Configured, 20);
        assert!(leds.blue.is_lit());
        assert!(!leds.red.is_lit());
    }

    #[test]
    fn events_start_the_matching_heartbeat() {
        let mut leds = StatusLeds::new(MockPin::default(), MockPin::default(), SLOW, FAST);
        leds.handle(StatusEvent::ButtonPressed, 0);
        leds.handle(StatusEvent::Exhausted, 0);
        assert!(leds.blue.is_busy());
        assert!(leds.red.is_busy());

        leds.tick(500);
        assert!(leds.blue.is_lit());
        assert!(!leds.red.is_lit());

        leds.tick(2500);
        assert!(!leds.blue.is_busy());
        assert!(leds.red.is_lit());
    }
}
