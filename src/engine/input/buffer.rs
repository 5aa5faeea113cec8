// Input buffering system for reliable input detection
//
// A press is not delivered the instant it happens. It sits in a short window
// and is offered to the game every tick until something claims it, so a jump
// pressed a few frames before landing still comes out as a jump. Each button
// then walks a press -> hold -> release lifecycle as long as it stays claimed.

use super::action::Button;

/// How long a press stays claimable, in seconds.
pub const BUFFER_TIME: f32 = 0.25;

/// Receiver for buffered input. `on_press` is offered an unclaimed press every
/// tick of the buffer window; returning true claims it and starts the
/// hold/release phases.
pub trait InputSink {
    fn on_press(&mut self, button: Button) -> bool;

    fn on_hold(&mut self, _button: Button) {}

    fn on_release(&mut self, _button: Button) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Unclaimed press with remaining window time.
    Press { timer: f32 },
    Hold,
    Release,
}

#[derive(Debug)]
struct ButtonBuffer {
    phase: Phase,
    pressed: bool,
}

impl ButtonBuffer {
    const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pressed: false,
        }
    }

    fn on_input(&mut self, pressed: bool) {
        // A fresh press edge restarts the window even mid-lifecycle.
        if pressed && !self.pressed {
            self.phase = Phase::Press { timer: BUFFER_TIME };
        }
        self.pressed = pressed;
    }

    fn update(&mut self, button: Button, dt: f32, sink: &mut dyn InputSink) {
        match self.phase {
            Phase::Idle => {}
            Phase::Press { timer } => {
                if sink.on_press(button) {
                    // Claimed. If the button was let go during the window the
                    // hold phase is skipped entirely.
                    self.phase = if self.pressed { Phase::Hold } else { Phase::Release };
                } else {
                    let timer = timer - dt;
                    self.phase = if timer <= 0.0 {
                        Phase::Idle
                    } else {
                        Phase::Press { timer }
                    };
                }
            }
            Phase::Hold => {
                sink.on_hold(button);
                if !self.pressed {
                    self.phase = Phase::Release;
                }
            }
            Phase::Release => {
                sink.on_release(button);
                self.phase = Phase::Idle;
            }
        }
    }
}

/// One buffer per button, ticked together.
#[derive(Debug)]
pub struct InputBufferSystem {
    buffers: [ButtonBuffer; Button::COUNT],
}

impl InputBufferSystem {
    pub fn new() -> Self {
        Self {
            buffers: [const { ButtonBuffer::new() }; Button::COUNT],
        }
    }

    /// Feed a raw button edge from the platform layer.
    pub fn on_input(&mut self, button: Button, pressed: bool) {
        self.buffers[button.index()].on_input(pressed);
    }

    /// Raw held state of the button, independent of buffering.
    pub fn pressed(&self, button: Button) -> bool {
        self.buffers[button.index()].pressed
    }

    /// Whether an unclaimed press is sitting in the window.
    pub fn buffered(&self, button: Button) -> bool {
        matches!(self.buffers[button.index()].phase, Phase::Press { .. })
    }

    /// Tick every button once per frame, offering phases to the sink.
    pub fn update(&mut self, dt: f32, sink: &mut dyn InputSink) {
        for button in Button::ALL {
            self.buffers[button.index()].update(button, dt, sink);
        }
    }
}

impl Default for InputBufferSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that claims presses after refusing a set number of offers.
    struct CountingSink {
        refuse: u32,
        presses_offered: u32,
        holds: u32,
        releases: u32,
    }

    impl CountingSink {
        fn new(refuse: u32) -> Self {
            Self {
                refuse,
                presses_offered: 0,
                holds: 0,
                releases: 0,
            }
        }
    }

    impl InputSink for CountingSink {
        fn on_press(&mut self, _button: Button) -> bool {
            self.presses_offered += 1;
            if self.refuse > 0 {
                self.refuse -= 1;
                false
            } else {
                true
            }
        }

        fn on_hold(&mut self, _button: Button) {
            self.holds += 1;
        }

        fn on_release(&mut self, _button: Button) {
            self.releases += 1;
        }
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_press_offered_until_claimed() {
        let mut system = InputBufferSystem::new();
        let mut sink = CountingSink::new(3);

        system.on_input(Button::Jump, true);
        for _ in 0..5 {
            system.update(DT, &mut sink);
        }

        // Offered on ticks 1-4, claimed on the 4th, held on the 5th.
        assert_eq!(sink.presses_offered, 4);
        assert_eq!(sink.holds, 1);
    }

    #[test]
    fn test_press_expires_after_window() {
        let mut system = InputBufferSystem::new();
        let mut sink = CountingSink::new(u32::MAX);

        system.on_input(Button::Dash, true);
        let ticks = (BUFFER_TIME / DT).ceil() as u32 + 2;
        for _ in 0..ticks {
            system.update(DT, &mut sink);
        }

        assert!(!system.buffered(Button::Dash));
        assert!(sink.presses_offered <= ticks);
        assert_eq!(sink.holds, 0);
        assert_eq!(sink.releases, 0);
    }

    #[test]
    fn test_claimed_press_runs_hold_then_release() {
        let mut system = InputBufferSystem::new();
        let mut sink = CountingSink::new(0);

        system.on_input(Button::Jump, true);
        system.update(DT, &mut sink); // claimed
        system.update(DT, &mut sink); // hold
        system.update(DT, &mut sink); // hold
        system.on_input(Button::Jump, false);
        system.update(DT, &mut sink); // hold, release edge seen
        system.update(DT, &mut sink); // release
        system.update(DT, &mut sink); // idle

        assert_eq!(sink.presses_offered, 1);
        assert_eq!(sink.holds, 3);
        assert_eq!(sink.releases, 1);
        assert!(!system.buffered(Button::Jump));
    }

    #[test]
    fn test_release_during_window_skips_hold() {
        let mut system = InputBufferSystem::new();
        let mut sink = CountingSink::new(1);

        system.on_input(Button::Jump, true);
        system.update(DT, &mut sink); // refused
        system.on_input(Button::Jump, false);
        system.update(DT, &mut sink); // claimed while released
        system.update(DT, &mut sink); // release fires

        assert_eq!(sink.holds, 0);
        assert_eq!(sink.releases, 1);
    }

    #[test]
    fn test_repress_restarts_window() {
        let mut system = InputBufferSystem::new();
        let mut sink = CountingSink::new(u32::MAX);

        system.on_input(Button::Jump, true);
        let almost = (BUFFER_TIME / DT) as u32 - 1;
        for _ in 0..almost {
            system.update(DT, &mut sink);
        }
        system.on_input(Button::Jump, false);
        system.on_input(Button::Jump, true);
        for _ in 0..almost {
            system.update(DT, &mut sink);
        }

        assert!(system.buffered(Button::Jump));
    }

    #[test]
    fn test_buttons_buffer_independently() {
        let mut system = InputBufferSystem::new();
        let mut sink = CountingSink::new(u32::MAX);

        system.on_input(Button::Jump, true);
        system.update(DT, &mut sink);

        assert!(system.buffered(Button::Jump));
        assert!(!system.buffered(Button::Dash));
        assert!(system.pressed(Button::Jump));
        assert!(!system.pressed(Button::Dash));
    }
}
