//! Simulator configuration and command line (clap).

use std::time::Duration;

use clap::Parser;
use oledui_common::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, GRANULE_MS, MIN_PANEL_SIZE};
use oledui_common::{ConfigError, UiConfig};

// =============================================================================
// Timing Configuration
// =============================================================================

/// Sleep target of one loop iteration.
pub const LOOP_TIME: Duration = Duration::from_millis(GRANULE_MS as u64);

/// Default length of a headless run.
pub const DEFAULT_SECONDS: u32 = 20;

/// Default inactivity timeout.
pub const DEFAULT_POWEROFF_S: u32 = 30;

// =============================================================================
// Window Configuration
// =============================================================================

/// Pixel scale of the SDL window.
#[cfg(feature = "window")]
pub const WINDOW_SCALE: u32 = 4;

/// Game of Life board: one cell per 4x4 pixel block on a 128x64 panel.
pub const LIFE_WIDTH: usize = 32;
pub const LIFE_HEIGHT: usize = 16;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "oledui-simulator")]
#[command(version)]
#[command(about = "Desktop simulator for the oledui page UI")]
pub struct Cli {
    /// Panel width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_parser = panel_side)]
    pub width: u32,

    /// Panel height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_parser = panel_side)]
    pub height: u32,

    /// OLED controller
    #[arg(long, default_value = "sh1106", value_parser = ["sh1106", "ssd1306"])]
    pub display: String,

    /// Pointer device driving the cursor
    #[arg(long, default_value = "trackball", value_parser = ["trackball", "buttons", "none"])]
    pub control: String,

    /// Inactivity timeout in seconds (0 disables it)
    #[arg(long, default_value_t = DEFAULT_POWEROFF_S)]
    pub poweroff: u32,

    /// Virtual run length of the headless demo in seconds
    #[arg(long, default_value_t = DEFAULT_SECONDS)]
    pub seconds: u32,

    /// Tap the haptic motor on page bar redraws
    #[arg(long)]
    pub haptic: bool,
}

fn panel_side(value: &str) -> Result<u32, String> {
    let side: u32 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;
    if side < MIN_PANEL_SIZE {
        return Err(format!("panel side must be at least {MIN_PANEL_SIZE} px"));
    }
    Ok(side)
}

/// Parsed simulator options.
#[derive(Debug)]
pub struct SimConfig {
    pub ui: UiConfig,
    pub seconds: u32,
}

impl TryFrom<Cli> for SimConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let ui = UiConfig::new(
            cli.width,
            cli.height,
            &cli.display,
            Some(cli.control.as_str()),
            Some(cli.poweroff),
            cli.haptic,
        )?;
        Ok(Self {
            ui,
            seconds: cli.seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use oledui_common::{ControlKind, DisplayKind};

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("oledui-simulator").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cfg = SimConfig::try_from(parse(&[]).unwrap()).unwrap();
        assert_eq!(cfg.ui.width, 128);
        assert_eq!(cfg.ui.display, DisplayKind::Sh1106);
        assert_eq!(cfg.ui.control, Some(ControlKind::Trackball));
        assert_eq!(cfg.ui.poweroff_s, Some(DEFAULT_POWEROFF_S));
        assert_eq!(cfg.seconds, DEFAULT_SECONDS);
    }

    #[test]
    fn test_flags() {
        let cli = parse(&["--display", "ssd1306", "--control", "none", "--poweroff", "0", "--haptic"]).unwrap();
        let cfg = SimConfig::try_from(cli).unwrap();
        assert_eq!(cfg.ui.display, DisplayKind::Ssd1306);
        assert_eq!(cfg.ui.control, None);
        assert_eq!(cfg.ui.poweroff_s, None);
        assert!(cfg.ui.haptic);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&["--bogus"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert_eq!(parse(&["--width", "x"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["--display", "st7789"]).unwrap_err().kind(), ErrorKind::InvalidValue);
        assert_eq!(parse(&["--height", "16"]).unwrap_err().kind(), ErrorKind::ValueValidation);
    }
}
