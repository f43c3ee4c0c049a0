//! Log buffer with levels and timestamps.
//!
//! The UI session owns one [`LogBuffer`]. Entries are kept in a bounded ring
//! (oldest dropped first) so the simulator can print them and firmware can
//! show them on a page. With the `defmt` feature every entry is also
//! forwarded to `defmt`.
//!
//! # Usage
//!
//! ```ignore
//! log_info!(self.log, now, "page {}", index);
//! log_error!(self.log, now, "[ERR] Frame clb: {}", err);
//! ```

use core::fmt::{self, Write};

use heapless::{Deque, String};

/// Maximum number of log entries to keep.
pub const LOG_ENTRIES: usize = 16;

/// Maximum characters per log message.
pub const LOG_MSG_LEN: usize = 48;

/// Log severity level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Single-character prefix for this level.
    pub const fn prefix(self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// A single log entry with level, message, and timestamp.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Truncated to `LOG_MSG_LEN`.
    pub message: String<LOG_MSG_LEN>,
    /// Milliseconds since boot.
    pub timestamp_ms: u64,
}

impl fmt::Display for LogEntry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{:>8}] {} {}", self.timestamp_ms, self.level.prefix(), self.message)
    }
}

/// Writer that silently truncates instead of failing on overflow.
struct Truncating<'a>(&'a mut String<LOG_MSG_LEN>);

impl Write for Truncating<'_> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Bounded ring of log entries.
pub struct LogBuffer {
    entries: Deque<LogEntry, LOG_ENTRIES>,
    min_level: LogLevel,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            min_level: LogLevel::Debug,
        }
    }

    /// Drop entries below `level`.
    pub fn set_min_level(
        &mut self,
        level: LogLevel,
    ) {
        self.min_level = level;
    }

    /// Format and push an entry. Oldest entry is dropped if the buffer is full.
    pub fn push_fmt(
        &mut self,
        level: LogLevel,
        timestamp_ms: u64,
        args: fmt::Arguments<'_>,
    ) {
        if level < self.min_level {
            return;
        }
        let mut message: String<LOG_MSG_LEN> = String::new();
        Truncating(&mut message).write_fmt(args).ok();

        #[cfg(feature = "defmt")]
        match level {
            LogLevel::Trace => defmt::trace!("{=str}", message.as_str()),
            LogLevel::Debug => defmt::debug!("{=str}", message.as_str()),
            LogLevel::Info => defmt::info!("{=str}", message.as_str()),
            LogLevel::Warn => defmt::warn!("{=str}", message.as_str()),
            LogLevel::Error => defmt::error!("{=str}", message.as_str()),
        }

        if self.entries.is_full() {
            self.entries.pop_front();
        }
        self.entries
            .push_back(LogEntry {
                level,
                message,
                timestamp_ms,
            })
            .ok();
    }

    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Iterate over entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> { self.entries.iter() }

    /// Remove and return the oldest entry.
    pub fn pop(&mut self) -> Option<LogEntry> { self.entries.pop_front() }

    /// True if any stored message contains `needle`.
    pub fn contains(
        &self,
        needle: &str,
    ) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }
}

impl Default for LogBuffer {
    fn default() -> Self { Self::new() }
}

macro_rules! log_debug {
    ($log:expr, $ts:expr, $($arg:tt)*) => {
        $log.push_fmt($crate::log::LogLevel::Debug, $ts, format_args!($($arg)*))
    };
}

macro_rules! log_info {
    ($log:expr, $ts:expr, $($arg:tt)*) => {
        $log.push_fmt($crate::log::LogLevel::Info, $ts, format_args!($($arg)*))
    };
}

macro_rules! log_warn {
    ($log:expr, $ts:expr, $($arg:tt)*) => {
        $log.push_fmt($crate::log::LogLevel::Warn, $ts, format_args!($($arg)*))
    };
}

macro_rules! log_error {
    ($log:expr, $ts:expr, $($arg:tt)*) => {
        $log.push_fmt($crate::log::LogLevel::Error, $ts, format_args!($($arg)*))
    };
}

pub(crate) use {log_debug, log_error, log_info, log_warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_drops_oldest() {
        let mut log = LogBuffer::new();
        for i in 0..(LOG_ENTRIES + 3) {
            log_info!(log, i as u64, "entry {}", i);
        }
        assert_eq!(log.len(), LOG_ENTRIES);
        assert_eq!(log.iter().next().map(|e| e.message.as_str()), Some("entry 3"));
    }

    #[test]
    fn test_long_message_truncated() {
        let mut log = LogBuffer::new();
        log_warn!(log, 0, "{}", "y".repeat(200));
        let entry = log.pop().unwrap();
        assert_eq!(entry.message.len(), LOG_MSG_LEN);
        assert_eq!(entry.level, LogLevel::Warn);
    }

    #[test]
    fn test_min_level_filters() {
        let mut log = LogBuffer::new();
        log.set_min_level(LogLevel::Warn);
        log_debug!(log, 0, "hidden");
        log_info!(log, 0, "hidden");
        log_error!(log, 0, "shown");
        assert_eq!(log.len(), 1);
        assert!(log.contains("shown"));
    }

    #[test]
    fn test_entry_display() {
        let mut log = LogBuffer::new();
        log_info!(log, 1500, "boot");
        let line = log.pop().unwrap().to_string();
        assert_eq!(line, "[    1500] I boot");
    }
}
