//! Board statistics shown by the header frames.
//!
//! The poll loop records CPU busy time, heap usage and uptime into a static
//! [`BoardStats`]; [`BoardMonitor`] exposes the latest values to the UI.

use alloc::string::{String, ToString};
use core::sync::atomic::{AtomicU32, Ordering};

use oledui_common::SystemMonitor;

use crate::cpu_cycles;

/// Board name reported by the monitor.
pub const DEVICE_NAME: &str = "pico2";

/// Latest loop measurements, shared between the poll loop and the UI.
pub struct BoardStats {
    cpu_percent: AtomicU32,
    heap_used: AtomicU32,
    heap_total: AtomicU32,
    uptime_s: AtomicU32,
}

impl BoardStats {
    pub const fn new() -> Self {
        Self {
            cpu_percent: AtomicU32::new(0),
            heap_used: AtomicU32::new(0),
            heap_total: AtomicU32::new(0),
            uptime_s: AtomicU32::new(0),
        }
    }

    /// Record one loop iteration: busy cycles over the whole loop time.
    pub fn record_loop(
        &self,
        cycles_used: u32,
        loop_time_us: u32,
    ) {
        let util = cpu_cycles::calc_util_percent(cycles_used, loop_time_us);
        self.cpu_percent.store(util, Ordering::Relaxed);
    }

    pub fn record_heap(
        &self,
        used: usize,
        total: usize,
    ) {
        self.heap_used.store(used as u32, Ordering::Relaxed);
        self.heap_total.store(total as u32, Ordering::Relaxed);
    }

    pub fn record_uptime(
        &self,
        uptime_ms: u64,
    ) {
        self.uptime_s.store((uptime_ms / 1000) as u32, Ordering::Relaxed);
    }

    /// Heap usage in percent, `None` before the heap is measured.
    pub fn heap_percent(&self) -> Option<u8> {
        let total = self.heap_total.load(Ordering::Relaxed);
        if total == 0 {
            return None;
        }
        let used = self.heap_used.load(Ordering::Relaxed);
        Some((u64::from(used) * 100 / u64::from(total)).min(100) as u8)
    }
}

impl Default for BoardStats {
    fn default() -> Self { Self::new() }
}

pub struct BoardMonitor {
    stats: &'static BoardStats,
}

impl BoardMonitor {
    pub const fn new(stats: &'static BoardStats) -> Self { Self { stats } }
}

impl SystemMonitor for BoardMonitor {
    fn uptime_secs(&self) -> Option<u64> { Some(u64::from(self.stats.uptime_s.load(Ordering::Relaxed))) }

    fn cpu_load(&self) -> Option<u8> { Some(self.stats.cpu_percent.load(Ordering::Relaxed) as u8) }

    fn memory_load(&self) -> Option<u8> { self.stats.heap_percent() }

    fn memory_used_kb(&self) -> Option<u32> {
        self.stats
            .heap_percent()
            .map(|_| self.stats.heap_used.load(Ordering::Relaxed) / 1024)
    }

    fn device_name(&self) -> Option<String> { Some(DEVICE_NAME.to_string()) }

    fn version(&self) -> Option<String> { Some(env!("CARGO_PKG_VERSION").to_string()) }
}
