//! Input handling for the four panel buttons.
//!
//! Converts debounced button edges into UI actions:
//!
//! - **A**: Previous page
//! - **B**: Next page
//! - **X**: Press (runs the page press handler or closes a popup)
//! - **Y**: Display off, or back on when hibernating

use oledui_common::{Action, PowerState};

use crate::button::ButtonState;

/// Raw button levels sampled in one loop iteration (`true` = low = pressed).
#[derive(Clone, Copy, Default)]
pub struct ButtonLevels {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
}

/// Debounce state of every button.
#[derive(Default)]
pub struct ButtonPad {
    a: ButtonState,
    b: ButtonState,
    x: ButtonState,
    y: ButtonState,
}

impl ButtonPad {
    pub const fn new() -> Self {
        Self {
            a: ButtonState::new(),
            b: ButtonState::new(),
            x: ButtonState::new(),
            y: ButtonState::new(),
        }
    }

    /// Process the sampled levels and return the actions to run, in button
    /// order. Every button is sampled each time so no edge is lost.
    pub fn process(
        &mut self,
        levels: ButtonLevels,
        now_ms: u64,
        power: PowerState,
    ) -> heapless::Vec<Action, 4> {
        let mut actions = heapless::Vec::new();

        if self.a.just_pressed(levels.a, now_ms) {
            actions.push(Action::Prev).ok();
        }
        if self.b.just_pressed(levels.b, now_ms) {
            actions.push(Action::Next).ok();
        }
        if self.x.just_pressed(levels.x, now_ms) {
            actions.push(Action::Press).ok();
        }
        if self.y.just_pressed(levels.y, now_ms) {
            let toggle = match power {
                PowerState::Active => Action::Off,
                PowerState::Hibernating => Action::On,
            };
            actions.push(toggle).ok();
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: ButtonLevels = ButtonLevels {
        a: false,
        b: false,
        x: false,
        y: false,
    };

    #[test]
    fn test_page_buttons() {
        let mut pad = ButtonPad::new();
        let out = pad.process(ButtonLevels { b: true, ..NONE }, 0, PowerState::Active);
        assert_eq!(out.as_slice(), &[Action::Next]);
        // Held: no repeat
        let out = pad.process(ButtonLevels { b: true, ..NONE }, 100, PowerState::Active);
        assert!(out.is_empty());
        let out = pad.process(ButtonLevels { a: true, ..NONE }, 200, PowerState::Active);
        assert_eq!(out.as_slice(), &[Action::Prev]);
    }

    #[test]
    fn test_power_toggle_follows_state() {
        let mut pad = ButtonPad::new();
        let y = ButtonLevels { y: true, ..NONE };
        assert_eq!(pad.process(y, 0, PowerState::Active).as_slice(), &[Action::Off]);
        pad.process(NONE, 100, PowerState::Hibernating);
        assert_eq!(pad.process(y, 200, PowerState::Hibernating).as_slice(), &[Action::On]);
    }

    #[test]
    fn test_simultaneous_presses_keep_order() {
        let mut pad = ButtonPad::new();
        let all = ButtonLevels {
            a: true,
            b: true,
            x: true,
            y: true,
        };
        let out = pad.process(all, 0, PowerState::Active);
        assert_eq!(out.as_slice(), &[Action::Prev, Action::Next, Action::Press, Action::Off]);
    }
}
