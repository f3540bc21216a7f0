// Process, service and login session records

use serde::{Deserialize, Serialize};

/// One live process. Fields the OS would not report for this PID are `None` (JSON `null`)
/// where the type allows it, zero/empty otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub status: String,
    /// Percent of one core over the sampling window; can exceed 100 on multi-core hosts.
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub memory_rss: u64,
    pub memory_vms: u64,
    /// Unix seconds.
    pub create_time: u64,
    pub num_threads: Option<u32>,
    pub username: Option<String>,
    pub command_line: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub status: String,
    pub pid: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user: String,
    pub terminal: String,
    pub host: String,
    /// Login time, unix seconds.
    pub started: i64,
}
