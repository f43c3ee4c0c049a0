//! Host system metrics for the simulator.
//!
//! Reads Linux procfs where available and falls back to a simulated signal
//! so every header widget has something to draw.

use std::fs;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use oledui_common::capabilities::{Host, NetworkMode, NetworkStatus, TimeOfDay};
use oledui_common::SystemMonitor;

/// Metrics of the machine running the simulator.
pub struct HostMonitor {
    started: Instant,
    name: String,
}

impl HostMonitor {
    pub fn new() -> Self {
        let name = fs::read_to_string("/etc/hostname")
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "oledui-sim".to_string());
        Self {
            started: Instant::now(),
            name,
        }
    }

    fn elapsed_secs(&self) -> u64 { self.started.elapsed().as_secs() }
}

impl Default for HostMonitor {
    fn default() -> Self { Self::new() }
}

/// Parse `MemTotal` and `MemAvailable` (kB) out of `/proc/meminfo`.
fn parse_meminfo(text: &str) -> Option<(u64, u64)> {
    let field = |name: &str| {
        text.lines()
            .find(|l| l.starts_with(name))
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|v| v.parse::<u64>().ok())
    };
    Some((field("MemTotal:")?, field("MemAvailable:")?))
}

/// One-minute load average scaled by the core count, in percent.
fn parse_loadavg(
    text: &str,
    cores: usize,
) -> Option<u8> {
    let load: f32 = text.split_whitespace().next()?.parse().ok()?;
    Some((load / cores.max(1) as f32 * 100.0).clamp(0.0, 100.0) as u8)
}

/// Triangle wave between `lo` and `hi` with the given period.
fn triangle(
    t: u64,
    period: u64,
    lo: i32,
    hi: i32,
) -> i32 {
    let phase = (t % period) as i32;
    let half = (period / 2) as i32;
    let span = hi - lo;
    if phase < half {
        lo + span * phase / half
    } else {
        hi - span * (phase - half) / half
    }
}

impl SystemMonitor for HostMonitor {
    fn uptime_secs(&self) -> Option<u64> {
        fs::read_to_string("/proc/uptime")
            .ok()
            .and_then(|s| s.split_whitespace().next().and_then(|v| v.parse::<f64>().ok()))
            .map(|s| s as u64)
            .or(Some(self.elapsed_secs()))
    }

    fn local_time(&self) -> Option<TimeOfDay> {
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs() % 86_400;
        Some(TimeOfDay {
            hour: (secs / 3600) as u8,
            minute: (secs % 3600 / 60) as u8,
            second: (secs % 60) as u8,
        })
    }

    fn cpu_load(&self) -> Option<u8> {
        let cores = std::thread::available_parallelism().map_or(1, usize::from);
        fs::read_to_string("/proc/loadavg")
            .ok()
            .and_then(|s| parse_loadavg(&s, cores))
            .or_else(|| Some(triangle(self.elapsed_secs(), 40, 5, 95) as u8))
    }

    fn memory_load(&self) -> Option<u8> {
        let (total, available) = parse_meminfo(&fs::read_to_string("/proc/meminfo").ok()?)?;
        (total > 0).then(|| ((total - available) * 100 / total) as u8)
    }

    fn memory_used_kb(&self) -> Option<u32> {
        let (total, available) = parse_meminfo(&fs::read_to_string("/proc/meminfo").ok()?)?;
        u32::try_from(total - available).ok()
    }

    fn cpu_temperature(&self) -> Option<i16> {
        fs::read_to_string("/sys/class/thermal/thermal_zone0/temp")
            .ok()
            .and_then(|s| s.trim().parse::<i32>().ok())
            .map(|milli| (milli / 1000) as i16)
    }

    fn network(&self) -> Option<NetworkStatus> {
        Some(NetworkStatus {
            mode: NetworkMode::Sta,
            rssi_dbm: Some(triangle(self.elapsed_secs(), 30, -88, -42)),
        })
    }

    fn device_name(&self) -> Option<String> { Some(self.name.clone()) }

    fn address(&self) -> Option<String> { Some("127.0.0.1".to_string()) }

    fn version(&self) -> Option<String> { Some(env!("CARGO_PKG_VERSION").to_string()) }

    fn hosts(&self) -> Vec<Host> {
        [("node01.lan", "10.0.1.11"), ("node02.lan", "10.0.1.12")]
            .into_iter()
            .map(|(name, address)| Host {
                name: name.to_string(),
                address: address.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meminfo() {
        let text = "MemTotal:       16000 kB\nMemFree:         1000 kB\nMemAvailable:    4000 kB\n";
        assert_eq!(parse_meminfo(text), Some((16_000, 4_000)));
        assert_eq!(parse_meminfo("MemTotal: 1 kB\n"), None);
    }

    #[test]
    fn test_parse_loadavg() {
        assert_eq!(parse_loadavg("0.50 0.40 0.30 1/200 999", 2), Some(25));
        assert_eq!(parse_loadavg("9.00 1 1", 4), Some(100));
        assert_eq!(parse_loadavg("", 4), None);
    }

    #[test]
    fn test_triangle_wave() {
        assert_eq!(triangle(0, 30, -88, -42), -88);
        assert_eq!(triangle(15, 30, -88, -42), -42);
        assert_eq!(triangle(30, 30, -88, -42), -88);
    }

    #[test]
    fn test_monitor_always_reports_network_and_time() {
        let monitor = HostMonitor::new();
        assert!(monitor.network().is_some_and(|n| n.rssi_dbm.is_some()));
        assert!(monitor.local_time().is_some_and(|t| t.hour < 24));
        assert_eq!(monitor.hosts().len(), 2);
    }
}
