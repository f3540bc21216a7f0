// Snapshot assembly: fan out collectors, apply the required/optional policy, merge.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, instrument, warn};

use crate::collector::{MetricSource, SocketTable, SysinfoSource};
use crate::error::{CollectError, Source};
use crate::models::*;
use crate::ports;
use crate::processes::{ServiceCatalog, rank_top};

pub const DEFAULT_TOP_PROCESSES: usize = 10;
pub const DEFAULT_CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Length of `Snapshot::top_processes`.
    pub top_processes: usize,
    /// How long CPU usage (host and per process) is measured for.
    pub cpu_sample_window: Duration,
    pub services: ServiceCatalog,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            top_processes: DEFAULT_TOP_PROCESSES,
            cpu_sample_window: DEFAULT_CPU_SAMPLE_WINDOW,
            services: ServiceCatalog::default(),
        }
    }
}

/// Builds snapshots and open-port lists from a pair of OS sources.
///
/// Holds no snapshot state: concurrent calls are independent and each returns a value
/// owned by its caller. Every OS query runs on the blocking pool. If a caller drops the
/// future mid-build, queries already started finish in the background and their
/// results are discarded. There is no internal timeout; callers should wrap
/// [`SnapshotBuilder::build_snapshot`] in one (a hung network mount can stall statvfs).
#[derive(Clone)]
pub struct SnapshotBuilder {
    source: Arc<dyn MetricSource>,
    sockets: Arc<dyn SocketTable>,
    options: SnapshotOptions,
}

impl SnapshotBuilder {
    pub fn new(
        source: Arc<dyn MetricSource>,
        sockets: Arc<dyn SocketTable>,
        options: SnapshotOptions,
    ) -> Self {
        Self {
            source,
            sockets,
            options,
        }
    }

    /// Builder over the local host (sysinfo + procfs).
    pub fn system(options: SnapshotOptions) -> Self {
        let source = Arc::new(SysinfoSource::new());
        Self::new(source.clone(), source, options)
    }

    pub fn options(&self) -> &SnapshotOptions {
        &self.options
    }

    async fn blocking<T, F>(&self, tag: Source, f: F) -> Result<T, CollectError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MetricSource) -> Result<T, CollectError> + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || f(source.as_ref()))
            .await
            .map_err(|e| CollectError::Task {
                source_tag: tag,
                reason: e.to_string(),
            })?
    }

    /// Collect one snapshot.
    ///
    /// Host, CPU info, memory, the partition list and the interface list are required:
    /// the first of them to fail aborts the build with its error. Every other collector
    /// falls back to a zero value and is listed in `Snapshot::unavailable`.
    ///
    /// Takes about one `cpu_sample_window`: host and per-process CPU sampling run
    /// concurrently with each other and with all other collectors.
    #[instrument(skip(self), fields(operation = "build_snapshot"))]
    pub async fn build_snapshot(&self) -> Result<Snapshot, CollectError> {
        let started = Instant::now();
        let timestamp_ms = unix_now().as_millis() as u64;
        let window = self.options.cpu_sample_window;

        let (
            host,
            cpu,
            usage,
            memory,
            swap,
            disk,
            interfaces,
            counters,
            load_average,
            io_stats,
            users,
            temperature,
            processes,
        ) = tokio::join!(
            self.blocking(Source::Host, |s| s.host()),
            self.blocking(Source::Cpu, |s| s.cpu_info()),
            self.blocking(Source::CpuUsage, move |s| s.cpu_usage(window)),
            self.blocking(Source::Memory, |s| s.memory()),
            self.blocking(Source::Swap, |s| s.swap()),
            self.blocking(Source::Partitions, collect_disks),
            self.blocking(Source::Interfaces, |s| s.interfaces()),
            self.blocking(Source::NetworkCounters, |s| s.network_counters()),
            self.blocking(Source::LoadAverage, |s| s.load_average()),
            self.blocking(Source::IoStats, |s| s.io_stats()),
            self.blocking(Source::Users, |s| s.users()),
            self.blocking(Source::Temperatures, |s| s.temperatures()),
            self.blocking(Source::Processes, move |s| s.processes(window)),
        );

        let mut host = host?;
        let mut cpu = cpu?;
        let memory = memory?;
        let disk = disk?;
        let interfaces = interfaces?;

        let mut unavailable = Vec::new();
        cpu.usage = optional(Source::CpuUsage, usage, &mut unavailable);
        let swap = optional(Source::Swap, swap, &mut unavailable);
        let counters = optional(Source::NetworkCounters, counters, &mut unavailable);
        let load_average = optional(Source::LoadAverage, load_average, &mut unavailable);
        let io_stats = optional(Source::IoStats, io_stats, &mut unavailable);
        let users = optional(Source::Users, users, &mut unavailable);
        let temperature = optional(Source::Temperatures, temperature, &mut unavailable);
        let processes = optional(Source::Processes, processes, &mut unavailable);

        cpu.cores = cpu.cores.min(cpu.logical_cores);
        host.boot_time = host.boot_time.min(timestamp_ms / 1000);

        let system_services = self.options.services.classify(&processes);
        let top_processes = rank_top(processes, self.options.top_processes);

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            partitions = disk.len(),
            degraded = unavailable.len(),
            "snapshot built"
        );

        Ok(Snapshot {
            timestamp: timestamp_ms,
            host,
            cpu,
            memory,
            swap,
            disk,
            network: NetworkInfo::new(interfaces, counters),
            load_average,
            top_processes,
            temperature,
            io_stats,
            users,
            system_services,
            unavailable,
        })
    }

    /// The `n` busiest processes by CPU%, measured over `cpu_sample_window`.
    /// Empty if processes cannot be enumerated.
    #[instrument(skip(self), fields(operation = "top_processes"))]
    pub async fn top_processes(&self, n: usize) -> Vec<ProcessInfo> {
        rank_top(self.all_processes().await, n)
    }

    /// Processes whose names match the service catalog, in enumeration order.
    #[instrument(skip(self), fields(operation = "system_services"))]
    pub async fn system_services(&self) -> Vec<ServiceInfo> {
        self.options.services.classify(&self.all_processes().await)
    }

    async fn all_processes(&self) -> Vec<ProcessInfo> {
        let window = self.options.cpu_sample_window;
        match self
            .blocking(Source::Processes, move |s| s.processes(window))
            .await
        {
            Ok(processes) => processes,
            Err(e) => {
                warn!(error = %e, "process enumeration failed");
                Vec::new()
            }
        }
    }

    /// Listening TCP and bound UDP sockets with their owning process, port ascending.
    #[instrument(skip(self), fields(operation = "open_ports"))]
    pub async fn open_ports(&self) -> Result<Vec<PortInfo>, CollectError> {
        let sockets = Arc::clone(&self.sockets);
        tokio::task::spawn_blocking(move || ports::open_ports(sockets.as_ref()))
            .await
            .map_err(|e| CollectError::Task {
                source_tag: Source::TcpSockets,
                reason: e.to_string(),
            })
    }
}

fn unix_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Partition list (required) joined with per-partition usage (best effort).
fn collect_disks(source: &dyn MetricSource) -> Result<Vec<DiskInfo>, CollectError> {
    let partitions = source.partitions()?;
    Ok(partitions
        .into_iter()
        .filter_map(|partition| match source.disk_usage(&partition) {
            Ok(usage) => Some(DiskInfo::new(partition, usage)),
            Err(e) => {
                debug!(mountpoint = %partition.mountpoint, error = %e, "partition skipped");
                None
            }
        })
        .collect())
}

fn optional<T: Default>(
    tag: Source,
    result: Result<T, CollectError>,
    unavailable: &mut Vec<Source>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(source = %tag, error = %e, "optional collector failed, using zero value");
            unavailable.push(tag);
            T::default()
        }
    }
}
