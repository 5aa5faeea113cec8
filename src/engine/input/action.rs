// Button and stick definitions for a gamepad-driven character

use glam::Vec2;

/// Digital buttons that go through the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Jump,
    Dash,
    Attack,
    Special,
    LeftTrigger,
    RightTrigger,
}

impl Button {
    pub const COUNT: usize = 6;

    pub const ALL: [Button; Button::COUNT] = [
        Button::Jump,
        Button::Dash,
        Button::Attack,
        Button::Special,
        Button::LeftTrigger,
        Button::RightTrigger,
    ];

    pub fn index(self) -> usize {
        match self {
            Button::Jump => 0,
            Button::Dash => 1,
            Button::Attack => 2,
            Button::Special => 3,
            Button::LeftTrigger => 4,
            Button::RightTrigger => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Left,
    Right,
}

/// Latest analog stick values, clamped to unit magnitude on the way in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickState {
    pub left: Vec2,
    pub right: Vec2,
}

impl StickState {
    pub fn set(&mut self, stick: Stick, value: Vec2) {
        let value = value.clamp_length_max(1.0);
        match stick {
            Stick::Left => self.left = value,
            Stick::Right => self.right = value,
        }
    }
}

/// A set of buttons packed into a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: ButtonSet = ButtonSet(0);

    pub fn contains(self, button: Button) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= 1 << button.index();
    }

    pub fn remove(&mut self, button: Button) {
        self.0 &= !(1 << button.index());
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_indices_are_unique() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }

    #[test]
    fn test_button_set() {
        let mut set = ButtonSet::EMPTY;
        assert!(!set.contains(Button::Jump));
        set.insert(Button::Jump);
        set.insert(Button::RightTrigger);
        assert!(set.contains(Button::Jump));
        assert!(set.contains(Button::RightTrigger));
        set.remove(Button::Jump);
        assert!(!set.contains(Button::Jump));
        assert!(set.contains(Button::RightTrigger));
    }

    #[test]
    fn test_stick_state_clamps_magnitude() {
        let mut sticks = StickState::default();
        sticks.set(Stick::Left, Vec2::new(3.0, 4.0));
        assert!((sticks.left.length() - 1.0).abs() < 1e-6);
        sticks.set(Stick::Right, Vec2::new(0.3, 0.0));
        assert_eq!(sticks.right, Vec2::new(0.3, 0.0));
    }
}
