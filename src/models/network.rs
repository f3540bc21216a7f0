// Network interface and counter models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    /// CIDR strings, e.g. "192.168.1.10/24".
    pub addresses: Vec<String>,
    pub mtu: u64,
    pub flags: Vec<String>,
    pub hardware_addr: String,
}

/// Aggregate counters across every interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub interfaces: Vec<NetworkInterface>,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
}

impl NetworkInfo {
    pub fn new(interfaces: Vec<NetworkInterface>, counters: NetworkCounters) -> Self {
        Self {
            interfaces,
            bytes_sent: counters.bytes_sent,
            bytes_recv: counters.bytes_recv,
            packets_sent: counters.packets_sent,
            packets_recv: counters.packets_recv,
            errors_in: counters.errors_in,
            errors_out: counters.errors_out,
            drops_in: counters.drops_in,
            drops_out: counters.drops_out,
        }
    }
}
