//! Timing constants, layout constants and the runtime [`UiConfig`].
//!
//! All periods are in milliseconds. The scheduler never sleeps longer than
//! one [`GRANULE_MS`] between polls, so fast-refresh requests are observed
//! within one granule.

use core::str::FromStr;

use crate::error::ConfigError;

// =============================================================================
// Scheduler Timing
// =============================================================================

/// Scheduler tick. Minimum effective task period.
pub const GRANULE_MS: u32 = 50;

/// Minimum time between two carousel page switches.
pub const PAGE_SWITCH_DEBOUNCE_MS: u64 = 200;

/// Carousel (page) redraw period.
pub const APP_PERIOD_MS: u32 = 900;

/// Header clock redraw period.
pub const CLOCK_PERIOD_MS: u32 = 1000;

/// Header CPU/memory gauge redraw period.
pub const CPU_MEM_PERIOD_MS: u32 = 2100;

/// Header signal gauge redraw period.
pub const SIGNAL_PERIOD_MS: u32 = 4200;

/// The inactivity countdown bar advances in this many steps over the timeout.
pub const COUNTDOWN_STEPS: u32 = 24;

/// Screensaver frame rate.
pub const SCREENSAVER_FPS: u32 = 10;

/// Screensaver task period derived from [`SCREENSAVER_FPS`].
pub const SCREENSAVER_PERIOD_MS: u32 = 1000 / SCREENSAVER_FPS;

// =============================================================================
// Text Layout
// =============================================================================

/// Characters per wrapped text line.
pub const WRAP_WIDTH: usize = 15;

/// Vertical distance between text lines.
pub const LINE_HEIGHT: i32 = 10;

/// Horizontal indent applied by `write_lines`.
pub const TEXT_X_OFFSET: i32 = 3;

/// Lines shown by a popup text box.
pub const POPUP_LINE_LIMIT: usize = 3;

/// Popup inner area inset on every side.
pub const POPUP_INSET: i32 = 6;

/// Maximum stored length of a popup message or command output.
pub const MESSAGE_LEN: usize = 128;

// =============================================================================
// Panel Defaults
// =============================================================================

/// Default panel width (SH1106 / SSD1306 128x64).
pub const DEFAULT_WIDTH: u32 = 128;

/// Default panel height.
pub const DEFAULT_HEIGHT: u32 = 64;

/// Smallest panel side the fixed layout fits on.
pub const MIN_PANEL_SIZE: u32 = 32;

/// Position of the boot message.
pub const BOOT_TEXT_POS: (i32, i32) = (24, 28);

/// Boot message.
pub const BOOT_TEXT: &str = "Loading...";

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Supported OLED controllers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayKind {
    Ssd1306,
    #[default]
    Sh1106,
}

impl DisplayKind {
    /// Controller name as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ssd1306 => "ssd1306",
            Self::Sh1106 => "sh1106",
        }
    }
}

impl FromStr for DisplayKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ssd1306" => Ok(Self::Ssd1306),
            "sh1106" => Ok(Self::Sh1106),
            _ => Err(ConfigError::UnknownDisplay),
        }
    }
}

/// Pointer peripherals the UI can be driven by.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlKind {
    /// Trackball or any device reporting `{x, y, toggle, action}` events.
    Trackball,
    /// Discrete buttons mapped straight onto control actions.
    Buttons,
}

impl ControlKind {
    /// Parse an optional control name. `None`, empty and `"none"` mean no pointer.
    pub fn parse(name: Option<&str>) -> Result<Option<Self>, ConfigError> {
        match name.map(str::trim) {
            None | Some("" | "none") => Ok(None),
            Some("trackball") => Ok(Some(Self::Trackball)),
            Some("buttons") => Ok(Some(Self::Buttons)),
            Some(_) => Err(ConfigError::UnknownControl),
        }
    }
}

/// Runtime configuration consumed by `PageUi::load`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UiConfig {
    pub width: u32,
    pub height: u32,
    pub display: DisplayKind,
    pub control: Option<ControlKind>,
    /// Inactivity timeout in seconds. `None` disables the countdown widget.
    pub poweroff_s: Option<u32>,
    /// Tap the haptic motor on every page bar redraw.
    pub haptic: bool,
    /// Carousel index shown after boot.
    pub start_page: usize,
}

impl UiConfig {
    /// Build a configuration from the loosely-typed load parameters.
    ///
    /// An unknown display or control name is fatal. A zero timeout disables
    /// the countdown.
    pub fn new(
        width: u32,
        height: u32,
        display: &str,
        control: Option<&str>,
        poweroff_s: Option<u32>,
        haptic: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            width,
            height,
            display: display.parse()?,
            control: ControlKind::parse(control)?,
            poweroff_s: poweroff_s.filter(|s| *s > 0),
            haptic,
            start_page: 0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the panel size. Fields are public, so `PageUi::load` checks
    /// again before deriving the layout.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_PANEL_SIZE || self.height < MIN_PANEL_SIZE {
            return Err(ConfigError::PanelTooSmall);
        }
        Ok(())
    }

    /// Countdown task period: `timeout * 1000 / 24`, clamped to the granule.
    pub fn countdown_period_ms(&self) -> Option<u32> {
        self.poweroff_s
            .map(|s| (s.saturating_mul(1000) / COUNTDOWN_STEPS).max(GRANULE_MS))
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            display: DisplayKind::default(),
            control: None,
            poweroff_s: None,
            haptic: false,
            start_page: 0,
        }
    }
}
