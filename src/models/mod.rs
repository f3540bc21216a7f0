// Snapshot value types (snake_case JSON)

mod network;
mod port;
mod process;
mod storage;
mod system;

pub use network::{NetworkCounters, NetworkInfo, NetworkInterface};
pub use port::{PortInfo, Protocol, SocketEntry, TcpState};
pub use process::{ProcessInfo, ServiceInfo, UserInfo};
pub use storage::{DiskInfo, DiskUsage, IoStats, Partition};
pub use system::{
    CpuInfo, HostInfo, LoadAverage, MemoryInfo, SensorInfo, Snapshot, SwapInfo, TemperatureInfo,
    percent_of,
};
