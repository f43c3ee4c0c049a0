//! Poll loop timing for the simulator.
//!
//! Tracks how long each `PageUi::poll` call takes versus the time spent
//! sleeping until the next granule.
//!
//! # Usage
//!
//! ```ignore
//! let mut metrics = PollMetrics::new();
//!
//! // In main loop:
//! let start = Instant::now();
//! ui.poll();
//! let work = start.elapsed();
//! // ... sleep ...
//! metrics.record_poll(start.elapsed(), work, sleep);
//! ```

use std::time::{Duration, Instant};

/// Timing statistics of the poll loop.
pub struct PollMetrics {
    /// Total time of the last loop iteration
    pub loop_time_us: u32,
    /// Time spent inside `poll` and input handling
    pub work_time_us: u32,
    /// Time spent sleeping
    pub sleep_time_us: u32,

    /// Longest work time observed
    pub work_time_max_us: u32,
    /// Exponential moving average of the work time
    work_time_avg_us: f32,

    /// Loop iterations since startup
    pub total_polls: u64,

    start_time: Instant,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self {
            loop_time_us: 0,
            work_time_us: 0,
            sleep_time_us: 0,
            work_time_max_us: 0,
            work_time_avg_us: 0.0,
            total_polls: 0,
            start_time: Instant::now(),
        }
    }

    /// Exponential moving average alpha.
    const EMA_ALPHA: f32 = 0.1;

    pub fn record_poll(
        &mut self,
        total_time: Duration,
        work_time: Duration,
        sleep_time: Duration,
    ) {
        let work_us = work_time.as_micros() as u32;
        self.loop_time_us = total_time.as_micros() as u32;
        self.work_time_us = work_us;
        self.sleep_time_us = sleep_time.as_micros() as u32;
        self.work_time_max_us = self.work_time_max_us.max(work_us);

        if self.total_polls == 0 {
            self.work_time_avg_us = work_us as f32;
        } else {
            self.work_time_avg_us =
                Self::EMA_ALPHA.mul_add(work_us as f32, (1.0 - Self::EMA_ALPHA) * self.work_time_avg_us);
        }
        self.total_polls += 1;
    }

    #[inline]
    pub const fn work_time_avg_us(&self) -> u32 { self.work_time_avg_us as u32 }

    /// Share of the loop spent working, in percent.
    pub fn utilization_percent(&self) -> u32 {
        if self.loop_time_us == 0 {
            return 0;
        }
        (u64::from(self.work_time_us) * 100 / u64::from(self.loop_time_us)).min(100) as u32
    }

    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }
}

impl Default for PollMetrics {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_seeds_average() {
        let mut m = PollMetrics::new();
        m.record_poll(Duration::from_millis(50), Duration::from_micros(400), Duration::from_micros(49_600));
        assert_eq!(m.work_time_avg_us(), 400);
        assert_eq!(m.total_polls, 1);
    }

    #[test]
    fn test_max_and_average() {
        let mut m = PollMetrics::new();
        m.record_poll(Duration::from_millis(50), Duration::from_micros(100), Duration::ZERO);
        m.record_poll(Duration::from_millis(50), Duration::from_micros(1100), Duration::ZERO);
        assert_eq!(m.work_time_max_us, 1100);
        // 0.1 * 1100 + 0.9 * 100, minus float rounding
        assert!((199..=200).contains(&m.work_time_avg_us()));
    }

    #[test]
    fn test_utilization() {
        let mut m = PollMetrics::new();
        assert_eq!(m.utilization_percent(), 0);
        m.record_poll(Duration::from_millis(50), Duration::from_millis(5), Duration::from_millis(45));
        assert_eq!(m.utilization_percent(), 10);
    }
}
