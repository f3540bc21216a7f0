// Host identity, CPU, memory, load, temperature and the snapshot root

use serde::{Deserialize, Serialize};

use super::{DiskInfo, IoStats, NetworkInfo, ProcessInfo, ServiceInfo, UserInfo};
use crate::error::Source;

/// `part / total * 100`, or 0 when `total` is 0.
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    /// OS name and version, e.g. "Ubuntu 24.04".
    pub os: String,
    pub hostname: String,
    pub architecture: String,
    pub kernel_version: String,
    pub uptime_secs: u64,
    /// Unix seconds; never later than the snapshot timestamp.
    pub boot_time: u64,
    pub process_count: u64,
}

impl HostInfo {
    pub fn uptime_hours(&self) -> f64 {
        self.uptime_secs as f64 / 3600.0
    }

    /// Boot time in local time as `YYYY-MM-DD HH:MM:SS`, empty if out of range.
    pub fn last_boot_local(&self) -> String {
        i64::try_from(self.boot_time)
            .ok()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    pub model_name: String,
    /// Physical cores; never above `logical_cores`.
    pub cores: u32,
    pub logical_cores: u32,
    /// Per logical core, 0-100. Empty when usage could not be sampled.
    pub usage: Vec<f64>,
    /// Nominal frequency in MHz.
    pub frequency: f64,
    /// Per-core cache size in KiB, 0 if not reported.
    pub cache_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub used_percent: f64,
    pub free: u64,
    pub cached: u64,
    pub buffers: u64,
    pub shared: u64,
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

impl SwapInfo {
    pub fn new(total: u64, used: u64, free: u64) -> Self {
        Self {
            total,
            used,
            free,
            used_percent: percent_of(used, total),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    pub name: String,
    pub temperature: f64,
    pub high: f64,
    pub critical: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureInfo {
    /// Celsius; 0 when no CPU sensor was found.
    pub cpu_temp: f64,
    pub sensors: Vec<SensorInfo>,
}

/// One point-in-time view of the host. Built per request, never mutated afterwards.
///
/// A collector that failed but is not required shows up as a zero/empty value *and*
/// in `unavailable`; without that list a zero here is indistinguishable from a real
/// zero measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Collection time, unix milliseconds.
    pub timestamp: u64,
    pub host: HostInfo,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub swap: SwapInfo,
    pub disk: Vec<DiskInfo>,
    pub network: NetworkInfo,
    pub load_average: LoadAverage,
    pub top_processes: Vec<ProcessInfo>,
    pub temperature: TemperatureInfo,
    pub io_stats: IoStats,
    pub users: Vec<UserInfo>,
    pub system_services: Vec<ServiceInfo>,
    pub unavailable: Vec<Source>,
}
