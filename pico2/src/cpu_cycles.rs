//! CPU cycle counter utilities using Cortex-M33 DWT.
//!
//! Busy time of the poll loop is measured with the Data Watchpoint and
//! Trace (DWT) cycle counter (CYCCNT). At the stock 150 MHz the 32-bit
//! counter wraps every ~28.6 seconds, so `elapsed` is only valid within
//! one loop iteration.

use core::sync::atomic::{AtomicU32, Ordering};

/// Stock RP2350 system clock.
pub const DEFAULT_FREQ_HZ: u32 = 150_000_000;

static CPU_FREQ_HZ: AtomicU32 = AtomicU32::new(DEFAULT_FREQ_HZ);

/// Elapsed counts above this are treated as a wrap or measurement error.
const MAX_SANE_CYCLES: u32 = 200_000_000;

/// Enable the DWT cycle counter. Idempotent.
///
/// Must be called after `embassy_rp::init()`.
pub fn init(freq_hz: u32) {
    CPU_FREQ_HZ.store(freq_hz.clamp(100_000_000, 500_000_000), Ordering::Relaxed);

    // DEMCR.TRCENA (bit 24) first, then DWT.CTRL.CYCCNTENA (bit 0)
    #[cfg(target_arch = "arm")]
    unsafe {
        use core::ptr::{read_volatile, write_volatile};

        const DEMCR: *mut u32 = 0xE000_EDFC as *mut u32;
        write_volatile(DEMCR, read_volatile(DEMCR) | (1 << 24));

        const DWT_CTRL: *mut u32 = 0xE000_1000 as *mut u32;
        write_volatile(DWT_CTRL, read_volatile(DWT_CTRL) | 1);
    }
}

/// Read current cycle count (32-bit, wraps).
#[inline]
pub fn read() -> u32 {
    #[cfg(target_arch = "arm")]
    unsafe {
        const DWT_CYCCNT: *const u32 = 0xE000_1004 as *const u32;
        core::ptr::read_volatile(DWT_CYCCNT)
    }
    #[cfg(not(target_arch = "arm"))]
    {
        0
    }
}

/// Elapsed cycles with wrap handling. Returns 0 for implausible spans.
#[inline]
pub fn elapsed(
    start: u32,
    end: u32,
) -> u32 {
    let elapsed = end.wrapping_sub(start);
    if elapsed > MAX_SANE_CYCLES { 0 } else { elapsed }
}

/// CPU utilization (0-100) of `cycles_used` busy cycles over a loop of
/// `loop_time_us` microseconds.
pub fn calc_util_percent(
    cycles_used: u32,
    loop_time_us: u32,
) -> u32 {
    if loop_time_us == 0 || cycles_used == 0 {
        return 0;
    }

    let freq = u64::from(CPU_FREQ_HZ.load(Ordering::Relaxed));
    let cycles_expected = freq * u64::from(loop_time_us) / 1_000_000;
    if cycles_expected == 0 {
        return 0;
    }

    // Can exceed 100 when interrupt time lands inside the measurement
    (u64::from(cycles_used) * 100 / cycles_expected).min(100) as u32
}
