//! Frame-based page UI for small monochrome OLED panels.
//!
//! This crate contains the platform-agnostic UI shared between the simulator
//! and the Pico 2 firmware:
//!
//! - [`session`]: the [`PageUi`] coordinator and its run loop
//! - [`scheduler`]: cooperative periodic tasks
//! - [`frame`]: frames and the frame registry
//! - [`cursor`]: pointer position and frame selection
//! - [`carousel`]: page list with wraparound navigation
//! - [`popup`]: modal text and hover popups
//! - [`header`]: clock, CPU/memory, signal and countdown widgets
//! - [`pagebar`]: page indicator
//! - [`pages`]: built-in pages (system, intercon, shell command)
//! - [`screensaver`]: idle animation during hibernation
//! - [`display`]: drawing capability and the embedded-graphics adapter
//! - [`capabilities`]: clock, haptic, animation, monitor and shell seams
//! - [`log`]: bounded in-memory log buffer
//!
//! # no_std Compatibility
//!
//! The crate is `no_std` and needs only `alloc`. Time comes from the
//! injected [`Clock`], so the same code runs on the host and on the target.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

pub mod log;

pub mod capabilities;
pub mod carousel;
pub mod config;
pub mod control;
pub mod cursor;
pub mod display;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod header;
pub mod pagebar;
pub mod pages;
pub mod popup;
pub mod scheduler;
pub mod screensaver;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use capabilities::{Animation, Capabilities, Clock, Grid, Haptic, Shell, SystemMonitor};
pub use carousel::{Page, PageOutput};
pub use config::{ControlKind, DisplayKind, UiConfig};
pub use control::{Action, PointerAction, PointerEvent, PowerState};
pub use display::{Canvas, Display, Panel};
pub use error::{CallbackError, ConfigError, PeripheralError, UiError};
pub use frame::{Content, Frame, FrameId, Hover};
pub use geometry::{Area, Rect};
pub use scheduler::{QueryReply, TaskQuery};
pub use session::PageUi;
