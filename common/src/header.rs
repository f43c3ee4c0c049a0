//! Header widgets: signal gauge, inactivity countdown, clock and CPU/memory
//! bars, plus their hover popups.
//!
//! Layout (128 px wide panel, 10 px tall header):
//!
//! | tag       | x   | w  | period                 |
//! |-----------|-----|----|------------------------|
//! | `rssi`    | 0   | 10 | 4200 ms                |
//! | `timer`   | 14  | 8  | `timeout * 1000 / 24`  |
//! | `time`    | 32  | 66 | 1000 ms                |
//! | `cpu_mem` | 116 | 12 | 2100 ms                |
//!
//! Every widget draws what data is available; a missing reading leaves the
//! widget (or that part of it) blank.

use core::fmt::Write;

use heapless::String;

use crate::capabilities::{NetworkMode, SystemMonitor};
use crate::config::COUNTDOWN_STEPS;
use crate::display::Display;
use crate::geometry::{Area, Rect};

/// Header height.
pub const HEADER_HEIGHT: u32 = 10;

pub const SIGNAL_RECT: Rect = Rect::new(0, 0, 10, HEADER_HEIGHT);
pub const COUNTDOWN_RECT: Rect = Rect::new(14, 0, 8, HEADER_HEIGHT);
pub const CLOCK_RECT: Rect = Rect::new(32, 0, 66, HEADER_HEIGHT);
pub const CPU_MEM_RECT: Rect = Rect::new(116, 0, 12, HEADER_HEIGHT);

/// CPU load above this fills its bar.
const CPU_ALERT_PCT: u8 = 90;

/// Memory usage above this fills its bar.
const MEM_ALERT_PCT: u8 = 70;

/// Signal strength mapped to an empty gauge.
const RSSI_MIN_DBM: i32 = -90;

/// Signal strength mapped to a full gauge.
const RSSI_MAX_DBM: i32 = -40;

/// Station MACs listed in the AP hover, index 0..=3.
const MAX_STATIONS: usize = 4;

// =============================================================================
// Countdown
// =============================================================================

/// Inactivity countdown. Expires after [`COUNTDOWN_STEPS`] ticks without a reset.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown {
    timeout_s: u32,
    steps_left: u32,
}

impl Countdown {
    pub const fn new(timeout_s: u32) -> Self {
        Self {
            timeout_s,
            steps_left: COUNTDOWN_STEPS,
        }
    }

    #[inline]
    pub const fn timeout_secs(&self) -> u32 { self.timeout_s }

    /// Seconds left before hibernation.
    pub const fn remaining_secs(&self) -> u32 {
        (self.timeout_s as u64 * self.steps_left as u64 / COUNTDOWN_STEPS as u64) as u32
    }

    #[inline]
    pub const fn steps_left(&self) -> u32 { self.steps_left }

    /// Restore the full timeout.
    pub fn reset(&mut self) { self.steps_left = COUNTDOWN_STEPS; }

    /// Advance one step. Returns true on expiry, after which the countdown
    /// is already reset.
    pub fn tick(&mut self) -> bool {
        self.steps_left = self.steps_left.saturating_sub(1);
        if self.steps_left == 0 {
            self.reset();
            return true;
        }
        false
    }
}

/// Draw the remaining time as a bar filling the area line by line.
pub fn draw_countdown(
    display: &mut dyn Display,
    area: Area,
    countdown: &Countdown,
) {
    let Area { x, y, w, h } = area;
    if w == 0 {
        return;
    }
    let view = w * h * countdown.steps_left() / COUNTDOWN_STEPS;
    let complete = view / w;
    let partial = (view - complete * w) as i32;
    for line in 0..h {
        let ly = y + line as i32;
        if line < complete {
            display.line(x, ly, x + w as i32, ly, true);
        } else {
            display.line(x, ly, x + partial, ly, true);
            break;
        }
    }
}

pub fn hover_countdown(
    display: &mut dyn Display,
    area: Area,
    countdown: &Countdown,
) {
    display.text("Power off in", area.x, area.y);
    let mut line: String<16> = String::new();
    write!(line, "{} sec", countdown.remaining_secs()).ok();
    display.text(&line, area.x + 10, area.y + 10);
}

// =============================================================================
// Clock
// =============================================================================

/// `HH:MM:SS`, or `00:00:00` without a time source.
pub fn draw_clock(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    let t = monitor.and_then(|m| m.local_time()).unwrap_or_default();
    let mut line: String<8> = String::new();
    write!(line, "{:02}:{:02}:{:02}", t.hour, t.minute, t.second).ok();
    display.text(&line, area.x, area.y);
}

/// Format an uptime as `Dd HH:MM:SS`.
pub fn format_uptime(secs: u64) -> String<24> {
    let mut out = String::new();
    let days = secs / 86_400;
    let rem = secs % 86_400;
    write!(out, "{}d {:02}:{:02}:{:02}", days, rem / 3600, rem % 3600 / 60, rem % 60).ok();
    out
}

pub fn hover_uptime(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    display.text("Uptime:", area.x, area.y);
    if let Some(secs) = monitor.and_then(|m| m.uptime_secs()) {
        display.text(&format_uptime(secs), area.x + 10, area.y + 10);
    }
}

// =============================================================================
// CPU / Memory
// =============================================================================

/// Bar height for a percentage: `h * pct / 100 + 1`.
#[inline]
const fn bar_height(
    h: u32,
    pct: u8,
) -> u32 {
    let pct = if pct > 100 { 100 } else { pct as u32 };
    h * pct / 100 + 1
}

/// Two vertical bars growing from the bottom: CPU left, memory right.
pub fn draw_cpu_mem(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    let Some(monitor) = monitor else {
        return;
    };
    let Area { x, y, w, h } = area;
    let width = w.saturating_sub(2) / 2;
    let y_base = y + h as i32;
    let spacer = 3;
    if let Some(cpu) = monitor.cpu_load() {
        let bar = bar_height(h, cpu);
        display.rect(x, y_base - bar as i32, width, bar, true, cpu > CPU_ALERT_PCT);
    }
    if let Some(mem) = monitor.memory_load() {
        let bar = bar_height(h, mem);
        display.rect(x + width as i32 + spacer, y_base - bar as i32, width, bar, true, mem > MEM_ALERT_PCT);
    }
}

pub fn hover_cpu_mem(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    let Some(monitor) = monitor else {
        display.text("no metrics", area.x, area.y);
        return;
    };
    let mut line: String<24> = String::new();
    match monitor.cpu_load() {
        Some(cpu) => write!(line, "CPU {cpu}%").ok(),
        None => write!(line, "CPU -").ok(),
    };
    if let Some(t) = monitor.cpu_temperature().filter(|t| *t > 0) {
        write!(line, "  {t}C").ok();
    }
    display.text(&line, area.x, area.y);

    line.clear();
    match monitor.memory_load() {
        Some(mem) => write!(line, "MEM {mem}%").ok(),
        None => write!(line, "MEM -").ok(),
    };
    display.text(&line, area.x, area.y + 10);

    if let Some(kb) = monitor.memory_used_kb() {
        line.clear();
        write!(line, "{kb}kb").ok();
        display.text(&line, area.x + 32, area.y + 20);
    }
}

// =============================================================================
// Signal Strength
// =============================================================================

/// RSSI mapped onto `[0, 10]` tenths of a full gauge, rounded.
pub const fn rssi_tenths(dbm: i32) -> u32 {
    let clamped = if dbm < RSSI_MIN_DBM {
        RSSI_MIN_DBM
    } else if dbm > RSSI_MAX_DBM {
        RSSI_MAX_DBM
    } else {
        dbm
    };
    let span = RSSI_MAX_DBM - RSSI_MIN_DBM;
    (((clamped - RSSI_MIN_DBM) * 10 + span / 2) / span) as u32
}

/// Staircase gauge: longer lines toward the top, filled up to the signal level.
pub fn draw_signal(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    let Some(dbm) = monitor.and_then(|m| m.network()).and_then(|n| n.rssi_dbm) else {
        return;
    };
    let tenths = rssi_tenths(dbm);
    let Area { y, w, h, .. } = area;
    let x = area.x - 1;
    let w = w as i32;
    let h = h as i32;

    display.line(x, y, x + w, y, true);
    let start = y + h - 1;
    let end = y + h * (10 - tenths as i32) / 10;
    if start > 0 {
        let mut row = start;
        while row > end {
            let end_x = x + w.min(w - w * row / start + 1);
            display.line(x, row, end_x, row, true);
            row -= 1;
        }
    }
    display.line(x, y + h - 1, x + 1, y + h - 1, true);
}

pub fn hover_network(
    display: &mut dyn Display,
    area: Area,
    monitor: Option<&dyn SystemMonitor>,
) {
    let Area { x, y, .. } = area;
    let status = monitor.and_then(|m| m.network());
    let mode = status.map_or(NetworkMode::Offline, |s| s.mode);
    let mut line: String<24> = String::new();
    write!(line, "{} mode", mode.label()).ok();
    display.text(&line, x, y);

    match (mode, status.and_then(|s| s.rssi_dbm)) {
        (NetworkMode::Sta, Some(dbm)) => {
            line.clear();
            write!(line, "rssi: {}%", rssi_tenths(dbm) * 10).ok();
            display.text(&line, x + 10, y + 10);
            line.clear();
            write!(line, "{dbm}dBm").ok();
            display.text(&line, x + 50, y + 20);
        }
        (NetworkMode::Ap, _) => {
            let stations = monitor.map(|m| m.stations()).unwrap_or_default();
            for (i, mac) in stations.iter().take(MAX_STATIONS).enumerate() {
                display.text(mac, x, y + 9 + i as i32 * 9);
            }
        }
        _ => {}
    }
}
