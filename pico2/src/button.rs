//! Button debounce handling for the panel keys.
//!
//! Provides time-based edge detection with debouncing to prevent
//! multiple triggers from contact bounce on physical buttons.

/// Debounce duration in milliseconds.
pub const DEBOUNCE_MS: u64 = 50;

/// Button debounce state with time-based edge detection.
pub struct ButtonState {
    was_pressed: bool,
    last_change: Option<u64>,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    pub const fn new() -> Self {
        Self {
            was_pressed: false,
            last_change: None,
        }
    }

    /// Returns true only on the falling edge (button just pressed).
    ///
    /// Buttons are active-low, so `is_low` means pressed. A level change
    /// within `DEBOUNCE_MS` of the previous accepted change is ignored.
    pub fn just_pressed(
        &mut self,
        is_low: bool,
        now_ms: u64,
    ) -> bool {
        if is_low == self.was_pressed {
            return false;
        }

        if let Some(last) = self.last_change
            && now_ms.saturating_sub(last) < DEBOUNCE_MS
        {
            return false;
        }

        self.was_pressed = is_low;
        self.last_change = Some(now_ms);
        is_low
    }

    pub const fn is_pressed(&self) -> bool { self.was_pressed }
}

impl Default for ButtonState {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_fires_once() {
        let mut btn = ButtonState::new();
        assert!(btn.just_pressed(true, 0));
        assert!(!btn.just_pressed(true, 10));
        assert!(!btn.just_pressed(true, 500));
        assert!(btn.is_pressed());
    }

    #[test]
    fn test_bounce_ignored() {
        let mut btn = ButtonState::new();
        assert!(btn.just_pressed(true, 100));
        // Release and re-press inside the debounce window
        assert!(!btn.just_pressed(false, 110));
        assert!(!btn.just_pressed(true, 120));
        assert!(btn.is_pressed());
    }

    #[test]
    fn test_release_then_press_again() {
        let mut btn = ButtonState::new();
        assert!(btn.just_pressed(true, 0));
        assert!(!btn.just_pressed(false, 60));
        assert!(!btn.is_pressed());
        assert!(btn.just_pressed(true, 120));
    }
}
