// OS data sources behind two traits, plus the sysinfo/procfs implementation

mod linux;
mod sockets;
mod sysinfo_source;

pub use sysinfo_source::SysinfoSource;

use std::time::Duration;

use crate::error::CollectError;
use crate::models::*;

/// One blocking query per OS facility. Each method is independently failable; the
/// snapshot builder decides which failures are fatal.
///
/// Implementations must not share mutable state between calls: the builder runs
/// several of these concurrently on the blocking pool.
pub trait MetricSource: Send + Sync + 'static {
    fn host(&self) -> Result<HostInfo, CollectError>;

    /// Model, core counts and frequency. `usage` is left empty; see [`Self::cpu_usage`].
    fn cpu_info(&self) -> Result<CpuInfo, CollectError>;

    /// Per-core usage measured over `window`. Blocks for the whole window.
    fn cpu_usage(&self, window: Duration) -> Result<Vec<f64>, CollectError>;

    fn memory(&self) -> Result<MemoryInfo, CollectError>;

    fn swap(&self) -> Result<SwapInfo, CollectError>;

    fn partitions(&self) -> Result<Vec<Partition>, CollectError>;

    fn disk_usage(&self, partition: &Partition) -> Result<DiskUsage, CollectError>;

    fn interfaces(&self) -> Result<Vec<NetworkInterface>, CollectError>;

    fn network_counters(&self) -> Result<NetworkCounters, CollectError>;

    fn load_average(&self) -> Result<LoadAverage, CollectError>;

    fn io_stats(&self) -> Result<IoStats, CollectError>;

    fn users(&self) -> Result<Vec<UserInfo>, CollectError>;

    fn temperatures(&self) -> Result<TemperatureInfo, CollectError>;

    /// Every visible process in enumeration order (PID ascending), with CPU% sampled
    /// over `window`. Blocks for the whole window.
    fn processes(&self, window: Duration) -> Result<Vec<ProcessInfo>, CollectError>;
}

/// The OS socket tables and a PID-to-name lookup.
pub trait SocketTable: Send + Sync + 'static {
    fn tcp_sockets(&self) -> Result<Vec<SocketEntry>, CollectError>;

    fn udp_sockets(&self) -> Result<Vec<SocketEntry>, CollectError>;

    /// Name of a live process, looked up fresh for this PID.
    fn process_name(&self, pid: u32) -> Option<String>;
}
