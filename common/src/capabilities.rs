//! Injected capabilities: clock, haptic motor, idle animation, system metrics
//! and the command shell used by generated pages.
//!
//! Everything except the clock is optional. Call sites test for presence;
//! a missing capability is never an error. Peripherals that can fail to
//! initialise are handed over as a `Result` and degraded by the session.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{CallbackError, PeripheralError};

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Vibration motor or buzzer.
pub trait Haptic {
    fn tap(&mut self);
}

// =============================================================================
// Idle Animation
// =============================================================================

/// Row-major matrix of pixel values produced by an [`Animation`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            width,
            height,
            cells: alloc::vec![false; width * height],
        }
    }

    #[inline]
    pub const fn width(&self) -> usize { self.width }

    #[inline]
    pub const fn height(&self) -> usize { self.height }

    pub fn get(
        &self,
        x: usize,
        y: usize,
    ) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    pub fn set(
        &mut self,
        x: usize,
        y: usize,
        alive: bool,
    ) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = alive;
        }
    }

    /// Number of lit cells.
    pub fn population(&self) -> usize { self.cells.iter().filter(|c| **c).count() }
}

/// Screensaver frame generator.
pub trait Animation {
    /// Next frame, or `None` when the animation is finished.
    fn next_frame(&mut self) -> Option<&Grid>;

    /// Restart from the initial state.
    fn reset(&mut self);

    /// Generation counter reported by the screensaver task.
    fn generation(&self) -> u32 { 0 }
}

// =============================================================================
// System Metrics
// =============================================================================

/// Wall-clock time of day.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Network interface mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkMode {
    /// Station, connected to an access point.
    Sta,
    /// Access point.
    Ap,
    Offline,
}

impl NetworkMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sta => "STA",
            Self::Ap => "AP",
            Self::Offline => "OFF",
        }
    }
}

/// Network status snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkStatus {
    pub mode: NetworkMode,
    /// Signal strength in dBm (STA mode).
    pub rssi_dbm: Option<i32>,
}

/// A known peer device.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Host {
    pub name: String,
    pub address: String,
}

/// Read-only system metrics. Every reader is optional.
pub trait SystemMonitor {
    fn uptime_secs(&self) -> Option<u64> { None }

    fn local_time(&self) -> Option<TimeOfDay> { None }

    /// CPU load in percent.
    fn cpu_load(&self) -> Option<u8> { None }

    /// Memory usage in percent.
    fn memory_load(&self) -> Option<u8> { None }

    /// Used memory in kilobytes.
    fn memory_used_kb(&self) -> Option<u32> { None }

    /// CPU temperature in degrees Celsius.
    fn cpu_temperature(&self) -> Option<i16> { None }

    fn network(&self) -> Option<NetworkStatus> { None }

    /// MAC addresses of stations connected in AP mode.
    fn stations(&self) -> Vec<String> { Vec::new() }

    fn device_name(&self) -> Option<String> { None }

    fn address(&self) -> Option<String> { None }

    fn version(&self) -> Option<String> { None }

    /// Cached peer hosts shown on the intercon page.
    fn hosts(&self) -> Vec<Host> { Vec::new() }
}

// =============================================================================
// Command Shell
// =============================================================================

/// Executes command strings for pages created by `genpage`.
pub trait Shell {
    /// Run a command to completion and return its output.
    fn exec(
        &mut self,
        cmd: &str,
    ) -> Result<String, CallbackError>;

    /// Start a background command and return its task tag.
    fn spawn(
        &mut self,
        cmd: &str,
    ) -> Result<String, CallbackError>;

    /// Latest output of a background task.
    fn output(
        &mut self,
        tag: &str,
    ) -> Option<String>;

    fn is_busy(
        &mut self,
        tag: &str,
    ) -> bool;
}

// =============================================================================
// Bundle
// =============================================================================

/// Capabilities handed to `PageUi::load`.
pub struct Capabilities {
    pub clock: Box<dyn Clock>,
    pub haptic: Result<Option<Box<dyn Haptic>>, PeripheralError>,
    pub pointer: Result<(), PeripheralError>,
    pub animation: Option<Box<dyn Animation>>,
    pub monitor: Option<Box<dyn SystemMonitor>>,
    pub shell: Option<Box<dyn Shell>>,
}

impl Capabilities {
    /// Only a clock; every optional capability absent.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            haptic: Ok(None),
            pointer: Ok(()),
            animation: None,
            monitor: None,
            shell: None,
        }
    }

    /// Haptic driver setup result.
    pub fn with_haptic(
        mut self,
        haptic: Result<Box<dyn Haptic>, PeripheralError>,
    ) -> Self {
        self.haptic = haptic.map(Some);
        self
    }

    /// Pointer peripheral setup result.
    pub fn with_pointer(
        mut self,
        pointer: Result<(), PeripheralError>,
    ) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_animation(
        mut self,
        animation: Box<dyn Animation>,
    ) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_monitor(
        mut self,
        monitor: Box<dyn SystemMonitor>,
    ) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_shell(
        mut self,
        shell: Box<dyn Shell>,
    ) -> Self {
        self.shell = Some(shell);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_bounds() {
        let mut grid = Grid::new(4, 3);
        grid.set(3, 2, true);
        grid.set(9, 9, true);
        assert!(grid.get(3, 2));
        assert!(!grid.get(9, 9));
        assert_eq!(grid.population(), 1);
    }

    #[test]
    fn test_monitor_defaults_absent() {
        struct Empty;
        impl SystemMonitor for Empty {}
        let m = Empty;
        assert_eq!(m.cpu_load(), None);
        assert!(m.stations().is_empty());
    }
}
