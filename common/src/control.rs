//! Control actions and pointer events.

use core::str::FromStr;

use crate::error::ConfigError;

/// Explicit control commands.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Next carousel page.
    Next,
    /// Previous carousel page.
    Prev,
    /// Leave hibernation, display on.
    On,
    /// Hibernate and start the screensaver.
    Off,
    /// Dismiss the popup or run the page's press action.
    Press,
}

impl Action {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
            Self::On => "on",
            Self::Off => "off",
            Self::Press => "press",
        }
    }
}

impl FromStr for Action {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "press" => Ok(Self::Press),
            _ => Err(ConfigError::UnknownAction),
        }
    }
}

/// Direction or click reported by the pointer device.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerAction {
    Left,
    Right,
    Up,
    Down,
    Press,
}

impl PointerAction {
    /// Control action triggered by this pointer action. Vertical moves only
    /// move the cursor.
    pub const fn action(self) -> Option<Action> {
        match self {
            Self::Left => Some(Action::Prev),
            Self::Right => Some(Action::Next),
            Self::Press => Some(Action::Press),
            Self::Up | Self::Down => None,
        }
    }
}

/// Event from the pointer peripheral. `y` grows upward, the UI inverts it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    pub toggle: bool,
    pub action: Option<PointerAction>,
}

/// Session power state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Active,
    Hibernating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!("next".parse::<Action>(), Ok(Action::Next));
        assert_eq!(" press".parse::<Action>(), Ok(Action::Press));
        assert_eq!("jump".parse::<Action>(), Err(ConfigError::UnknownAction));
        for action in [Action::Next, Action::Prev, Action::On, Action::Off, Action::Press] {
            assert_eq!(action.name().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn test_pointer_mapping() {
        assert_eq!(PointerAction::Right.action(), Some(Action::Next));
        assert_eq!(PointerAction::Left.action(), Some(Action::Prev));
        assert_eq!(PointerAction::Up.action(), None);
    }
}
