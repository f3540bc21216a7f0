// Partitions, per-partition usage and disk I/O totals

use serde::{Deserialize, Serialize};

use super::percent_of;

/// A mounted partition as listed by the OS, before its usage is queried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

/// Space and inode counters for one mountpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub inodes_free: u64,
}

impl DiskUsage {
    /// Usage from statvfs-style block counts.
    ///
    /// `free` is what an unprivileged user can still allocate, so `used + free` falls
    /// short of `total` by the root-reserved blocks.
    pub fn from_blocks(
        fragment_size: u64,
        blocks: u64,
        blocks_free: u64,
        blocks_avail: u64,
        files: u64,
        files_free: u64,
    ) -> Self {
        Self {
            total: blocks.saturating_mul(fragment_size),
            used: blocks.saturating_sub(blocks_free).saturating_mul(fragment_size),
            free: blocks_avail.saturating_mul(fragment_size),
            inodes_total: files,
            inodes_used: files.saturating_sub(files_free),
            inodes_free: files_free,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub inodes_free: u64,
}

impl DiskInfo {
    pub fn new(partition: Partition, usage: DiskUsage) -> Self {
        // Percent of the space visible to users, like df(1).
        let used_percent = percent_of(usage.used, usage.used.saturating_add(usage.free));
        Self {
            device: partition.device,
            mountpoint: partition.mountpoint,
            fstype: partition.fstype,
            total: usage.total,
            used: usage.used,
            free: usage.free,
            used_percent,
            inodes_total: usage.inodes_total,
            inodes_used: usage.inodes_used,
            inodes_free: usage.inodes_free,
        }
    }
}

/// Disk I/O totals summed over all block devices. Times are milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoStats {
    pub disk_read_bytes: u64,
    pub disk_write_bytes: u64,
    pub disk_read_count: u64,
    pub disk_write_count: u64,
    pub disk_read_time: u64,
    pub disk_write_time: u64,
}
