//! Hardware button (HWB) with a one-shot latch.
//!
//! The button is sampled once per HID cycle. A sample-count debouncer
//! decides the accepted level, then a two-state latch turns the accepted
//! level into at most one action per press:
//!
//! ```text
//!   ARMED --pressed--> FIRED  (emit action)
//!   FIRED --pressed--> FIRED  (held, nothing)
//!   any   --released-> ARMED
//! ```

use embedded_hal::digital::InputPin;

/// Latch state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LatchState {
    /// No action sent since the last release.
    #[default]
    Armed,
    /// Action already sent for the current press.
    Fired,
}

/// Accepts a level change only after `required` identical raw samples.
#[derive(Debug)]
struct Debouncer {
    required: u8,
    stable: bool,
    candidate: bool,
    count: u8,
}

impl Debouncer {
    const fn new(required: u8) -> Self {
        Self {
            required: if required == 0 { 1 } else { required },
            stable: false,
            candidate: false,
            count: 0,
        }
    }

    fn update(&mut self, raw: bool) -> bool {
        if raw == self.stable {
            self.count = 0;
            return self.stable;
        }

        if raw != self.candidate {
            self.candidate = raw;
            self.count = 0;
        }
        self.count += 1;

        if self.count >= self.required {
            self.stable = raw;
            self.count = 0;
        }
        self.stable
    }
}

/// Debounced one-shot latch.
#[derive(Debug)]
pub struct ButtonLatch {
    debounce: Debouncer,
    state: LatchState,
    fired: u32,
}

impl ButtonLatch {
    /// `debounce_polls` consecutive samples must agree before a level is
    /// accepted. `1` (or `0`) takes every sample at face value.
    pub const fn new(debounce_polls: u8) -> Self {
        Self {
            debounce: Debouncer::new(debounce_polls),
            state: LatchState::Armed,
            fired: 0,
        }
    }

    pub fn state(&self) -> LatchState {
        self.state
    }

    /// Total actions fired.
    pub fn fired(&self) -> u32 {
        self.fired
    }

    /// Feed one raw sample. Returns `true` exactly when the action should
    /// run.
    pub fn poll(&mut self, raw_pressed: bool) -> bool {
        let pressed = self.debounce.update(raw_pressed);

        match (pressed, self.state) {
            (true, LatchState::Armed) => {
                self.state = LatchState::Fired;
                self.fired = self.fired.saturating_add(1);
                debug!("Button: fired");
                true
            }
            (true, LatchState::Fired) => false,
            (false, _) => {
                self.state = LatchState::Armed;
                false
            }
        }
    }
}

/// Active-low push button on any `embedded-hal` input pin.
pub struct Button<P> {
    pin: P,
}

impl<P: InputPin> Button<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// `true` while held. A pin read error counts as released.
    pub fn is_pressed(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(_) => {
                warn!("Button: pin read failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct MockPin {
        low: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low)
        }
    }

    #[test]
    fn button_is_active_low() {
        let mut button = Button::new(MockPin { low: true });
        assert!(button.is_pressed());
        button.pin.low = false;
        assert!(!button.is_pressed());
    }

    #[test]
    fn long_press_fires_once() {
        for held in 1..=50 {
            let mut latch = ButtonLatch::new(1);
            let fires = (0..held).filter(|_| latch.poll(true)).count();
            assert_eq!(fires, 1, "held for {held} polls");
            assert_eq!(latch.state(), LatchState::Fired);
        }
    }

    #[test]
    fn release_rearms() {
        let mut latch = ButtonLatch::new(1);
        assert!(latch.poll(true));
        assert!(!latch.poll(true));
        assert!(!latch.poll(false));
        assert_eq!(latch.state(), LatchState::Armed);
        assert!(latch.poll(true));
        assert_eq!(latch.fired(), 2);
    }

    #[test]
    fn idle_never_fires() {
        let mut latch = ButtonLatch::new(1);
        for _ in 0..10 {
            assert!(!latch.poll(false));
        }
        assert_eq!(latch.fired(), 0);
    }

    #[test]
    fn debounce_ignores_short_glitch() {
        let mut latch = ButtonLatch::new(3);
        assert!(!latch.poll(true));
        assert!(!latch.poll(true));
        assert!(!latch.poll(false)); // bounce before the third sample
        assert!(!latch.poll(true));
        assert!(!latch.poll(true));
        assert!(latch.poll(true));
        assert_eq!(latch.fired(), 1);
    }

    #[test]
    fn debounce_filters_release_bounce() {
        let mut latch = ButtonLatch::new(3);
        for _ in 0..3 {
            latch.poll(true);
        }
        assert_eq!(latch.fired(), 1);

        // Contact chatter while held must not re-arm.
        for raw in [false, true, false, true, true] {
            assert!(!latch.poll(raw));
        }
        assert_eq!(latch.state(), LatchState::Fired);

        // A clean release followed by a clean press fires again.
        for _ in 0..3 {
            latch.poll(false);
        }
        assert_eq!(latch.state(), LatchState::Armed);
        let fires = (0..3).filter(|_| latch.poll(true)).count();
        assert_eq!(fires, 1);
    }
}
