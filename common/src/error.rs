//! Error types.
//!
//! Configuration and registration errors are fatal to the caller. Callback
//! and peripheral errors are caught inside the UI, logged and rendered, and
//! never abort a scheduler tick.

use core::fmt;

use heapless::String;

/// Maximum length of a callback error message.
pub const ERROR_MSG_LEN: usize = 48;

/// Invalid load parameters. No UI is constructed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Display controller name is not `ssd1306` or `sh1106`.
    UnknownDisplay,
    /// Control peripheral name is not recognised.
    UnknownControl,
    /// Control action string is not one of next/prev/on/off/press.
    UnknownAction,
    /// Panel smaller than the fixed header layout.
    PanelTooSmall,
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::UnknownDisplay => f.write_str("unsupported display type"),
            Self::UnknownControl => f.write_str("unsupported control type"),
            Self::UnknownAction => f.write_str("unknown action"),
            Self::PanelTooSmall => f.write_str("panel too small"),
        }
    }
}

/// Errors from building or extending the UI.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiError {
    Config(ConfigError),
    /// A frame with this tag is already registered.
    DuplicateTag,
    /// The frame's rectangle overlaps a registered frame.
    Overlap,
    /// Empty command passed to `genpage`.
    EmptyCommand,
    /// Tag too long for the task table.
    TagTooLong,
    /// No frame registered under this id.
    UnknownFrame,
}

impl From<ConfigError> for UiError {
    fn from(err: ConfigError) -> Self { Self::Config(err) }
}

impl fmt::Display for UiError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::DuplicateTag => f.write_str("duplicate frame tag"),
            Self::Overlap => f.write_str("frame overlaps a registered frame"),
            Self::EmptyCommand => f.write_str("empty command"),
            Self::TagTooLong => f.write_str("tag too long"),
            Self::UnknownFrame => f.write_str("unknown frame"),
        }
    }
}

/// Failure reported by a page, hover, press or draw callback.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct CallbackError {
    message: String<ERROR_MSG_LEN>,
}

impl CallbackError {
    /// Create an error, truncating the message to [`ERROR_MSG_LEN`] bytes.
    pub fn new(message: &str) -> Self {
        let mut msg: String<ERROR_MSG_LEN> = String::new();
        for c in message.chars() {
            if msg.push(c).is_err() {
                break;
            }
        }
        Self { message: msg }
    }

    pub fn message(&self) -> &str { self.message.as_str() }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self { Self::new(message) }
}

impl fmt::Display for CallbackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.message.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CallbackError {
    fn format(
        &self,
        fmt: defmt::Formatter<'_>,
    ) {
        defmt::write!(fmt, "{=str}", self.message.as_str());
    }
}

/// Optional peripheral failed to initialise. The feature is disabled.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralError {
    /// Pointer device did not respond.
    Pointer,
    /// Haptic driver did not respond.
    Haptic,
}

impl fmt::Display for PeripheralError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Pointer => f.write_str("pointer unavailable"),
            Self::Haptic => f.write_str("haptic unavailable"),
        }
    }
}
