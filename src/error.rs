// Collection errors and the data-source tags they refer to

use serde::{Deserialize, Serialize};
use std::fmt;

/// One OS-level data source. Used to tag errors and to list degraded collectors in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Host,
    Cpu,
    CpuUsage,
    Memory,
    Swap,
    Partitions,
    DiskUsage,
    Interfaces,
    NetworkCounters,
    LoadAverage,
    IoStats,
    Users,
    Temperatures,
    Processes,
    TcpSockets,
    UdpSockets,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Host => "host",
            Source::Cpu => "cpu",
            Source::CpuUsage => "cpu_usage",
            Source::Memory => "memory",
            Source::Swap => "swap",
            Source::Partitions => "partitions",
            Source::DiskUsage => "disk_usage",
            Source::Interfaces => "interfaces",
            Source::NetworkCounters => "network_counters",
            Source::LoadAverage => "load_average",
            Source::IoStats => "io_stats",
            Source::Users => "users",
            Source::Temperatures => "temperatures",
            Source::Processes => "processes",
            Source::TcpSockets => "tcp_sockets",
            Source::UdpSockets => "udp_sockets",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a collector could not produce a value.
///
/// Required collectors hand this back to the caller of `build_snapshot` unchanged;
/// optional ones are logged and replaced by a zero value.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("{source_tag} unavailable: {reason}")]
    Unavailable { source_tag: Source, reason: String },

    #[error("{source_tag}: {path}: {error}")]
    Io {
        source_tag: Source,
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("{0} is not supported on this platform")]
    Unsupported(Source),

    #[error("{source_tag} collector task failed: {reason}")]
    Task { source_tag: Source, reason: String },
}

impl CollectError {
    pub fn unavailable(source_tag: Source, reason: impl Into<String>) -> Self {
        CollectError::Unavailable {
            source_tag,
            reason: reason.into(),
        }
    }

    pub fn io(source_tag: Source, path: impl Into<String>, error: std::io::Error) -> Self {
        CollectError::Io {
            source_tag,
            path: path.into(),
            error,
        }
    }

    /// The data source this error came from.
    pub fn source_tag(&self) -> Source {
        match self {
            CollectError::Unavailable { source_tag, .. }
            | CollectError::Io { source_tag, .. }
            | CollectError::Task { source_tag, .. } => *source_tag,
            CollectError::Unsupported(source_tag) => *source_tag,
        }
    }
}
