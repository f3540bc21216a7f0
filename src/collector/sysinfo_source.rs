// Collectors backed by sysinfo, with procfs/sysfs fill-ins on Linux.
// Every call builds fresh sysinfo handles: nothing is cached between snapshots.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sysinfo::{
    Components, Disks, Networks, Pid, ProcessRefreshKind, ProcessesToUpdate, System, Users,
};
use tracing::instrument;

use super::{MetricSource, SocketTable, linux, sockets};
use crate::error::{CollectError, Source};
use crate::models::*;

const UNSPECIFIED_MAC: &str = "00:00:00:00:00:00";
const CPU_SENSOR_HINTS: &[&str] = &["cpu", "package", "tctl", "core"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoSource;

impl SysinfoSource {
    pub fn new() -> Self {
        Self
    }
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// sysinfo needs two refreshes at least this far apart to compute a CPU delta.
fn sampling_window(window: Duration) -> Duration {
    window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)
}

/// On Linux sysinfo lists every thread of a refreshed process as its own entry (pid = tid).
fn is_process(p: &sysinfo::Process) -> bool {
    p.thread_kind().is_none()
}

fn finite(v: f32) -> f64 {
    let v = v as f64;
    if v.is_finite() { v } else { 0.0 }
}

impl MetricSource for SysinfoSource {
    #[instrument(skip(self), fields(source = "sysinfo", operation = "host"))]
    fn host(&self) -> Result<HostInfo, CollectError> {
        let hostname = System::host_name()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CollectError::unavailable(Source::Host, "hostname not reported"))?;
        let os = match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => format!("{} {}", name, version),
            (Some(name), None) => name,
            (None, _) => linux::read_os_pretty_name().unwrap_or_else(|| std::env::consts::OS.into()),
        };

        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        Ok(HostInfo {
            os,
            hostname,
            architecture: std::env::consts::ARCH.to_string(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            uptime_secs: System::uptime(),
            boot_time: System::boot_time().min(unix_now_secs()),
            process_count: sys.processes().values().filter(|p| is_process(p)).count() as u64,
        })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "cpu_info"))]
    fn cpu_info(&self) -> Result<CpuInfo, CollectError> {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let cpus = sys.cpus();
        let first = cpus
            .first()
            .ok_or_else(|| CollectError::unavailable(Source::Cpu, "no CPUs reported"))?;

        let logical_cores = cpus.len() as u32;
        let cores = (System::physical_core_count().unwrap_or(0) as u32).min(logical_cores);
        let cpuinfo = linux::read_cpuinfo();
        let model_name = linux::parse_cpu_model(&cpuinfo)
            .or_else(|| {
                Some(first.brand().trim().to_string())
                    .filter(|s| !s.is_empty() && s != "cpu0")
            })
            .unwrap_or_else(|| "Unknown".into());

        Ok(CpuInfo {
            model_name,
            cores,
            logical_cores,
            usage: Vec::new(),
            frequency: linux::read_cpu_max_mhz().unwrap_or(first.frequency() as f64),
            cache_size: linux::parse_cpu_cache_kb(&cpuinfo).unwrap_or(0),
        })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "cpu_usage"))]
    fn cpu_usage(&self, window: Duration) -> Result<Vec<f64>, CollectError> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        std::thread::sleep(sampling_window(window));
        sys.refresh_cpu_usage();

        let usage: Vec<f64> = sys
            .cpus()
            .iter()
            .map(|c| finite(c.cpu_usage()).clamp(0.0, 100.0))
            .collect();
        if usage.is_empty() {
            return Err(CollectError::unavailable(
                Source::CpuUsage,
                "no CPUs reported",
            ));
        }
        Ok(usage)
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "memory"))]
    fn memory(&self) -> Result<MemoryInfo, CollectError> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(CollectError::unavailable(
                Source::Memory,
                "total memory reported as 0",
            ));
        }
        let available = sys.available_memory();
        let used = total.saturating_sub(available);
        let extra = linux::read_meminfo().unwrap_or_default();

        Ok(MemoryInfo {
            total,
            available,
            used,
            used_percent: percent_of(used, total),
            free: sys.free_memory(),
            cached: extra.cached,
            buffers: extra.buffers,
            shared: extra.shared,
            active: extra.active,
            inactive: extra.inactive,
        })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "swap"))]
    fn swap(&self) -> Result<SwapInfo, CollectError> {
        let mut sys = System::new();
        sys.refresh_memory();
        Ok(SwapInfo::new(
            sys.total_swap(),
            sys.used_swap(),
            sys.free_swap(),
        ))
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "partitions"))]
    fn partitions(&self) -> Result<Vec<Partition>, CollectError> {
        let disks = Disks::new_with_refreshed_list();
        Ok(disks
            .list()
            .iter()
            .map(|d| Partition {
                device: d.name().to_string_lossy().into_owned(),
                mountpoint: d.mount_point().to_string_lossy().into_owned(),
                fstype: d.file_system().to_string_lossy().into_owned(),
            })
            .collect())
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "disk_usage"))]
    fn disk_usage(&self, partition: &Partition) -> Result<DiskUsage, CollectError> {
        #[cfg(unix)]
        {
            statvfs_usage(&partition.mountpoint)
        }
        #[cfg(not(unix))]
        {
            let disks = Disks::new_with_refreshed_list();
            let disk = disks
                .list()
                .iter()
                .find(|d| d.mount_point().to_string_lossy() == partition.mountpoint)
                .ok_or_else(|| {
                    CollectError::unavailable(
                        Source::DiskUsage,
                        format!("{} is not mounted", partition.mountpoint),
                    )
                })?;
            let total = disk.total_space();
            let free = disk.available_space();
            Ok(DiskUsage {
                total,
                used: total.saturating_sub(free),
                free,
                ..DiskUsage::default()
            })
        }
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "interfaces"))]
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, CollectError> {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<NetworkInterface> = networks
            .list()
            .iter()
            .map(|(name, data)| {
                let mac = data.mac_address().to_string();
                NetworkInterface {
                    name: name.clone(),
                    addresses: data
                        .ip_networks()
                        .iter()
                        .map(|n| format!("{}/{}", n.addr, n.prefix))
                        .collect(),
                    mtu: data.mtu(),
                    flags: linux::interface_flags(name),
                    hardware_addr: if mac == UNSPECIFIED_MAC {
                        String::new()
                    } else {
                        mac
                    },
                }
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(interfaces)
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "network_counters"))]
    fn network_counters(&self) -> Result<NetworkCounters, CollectError> {
        let networks = Networks::new_with_refreshed_list();
        if networks.list().is_empty() {
            return Err(CollectError::unavailable(
                Source::NetworkCounters,
                "no interfaces reported",
            ));
        }
        let mut c = NetworkCounters::default();
        for (name, data) in networks.list() {
            let (drops_in, drops_out) = linux::interface_drops(name);
            c.bytes_sent += data.total_transmitted();
            c.bytes_recv += data.total_received();
            c.packets_sent += data.total_packets_transmitted();
            c.packets_recv += data.total_packets_received();
            c.errors_in += data.total_errors_on_received();
            c.errors_out += data.total_errors_on_transmitted();
            c.drops_in += drops_in;
            c.drops_out += drops_out;
        }
        Ok(c)
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "load_average"))]
    fn load_average(&self) -> Result<LoadAverage, CollectError> {
        if cfg!(windows) {
            return Err(CollectError::Unsupported(Source::LoadAverage));
        }
        let load = System::load_average();
        Ok(LoadAverage {
            load1: load.one,
            load5: load.five,
            load15: load.fifteen,
        })
    }

    #[instrument(skip(self), fields(source = "procfs", operation = "io_stats"))]
    fn io_stats(&self) -> Result<IoStats, CollectError> {
        linux::read_diskstats()
    }

    #[instrument(skip(self), fields(source = "utmp", operation = "users"))]
    fn users(&self) -> Result<Vec<UserInfo>, CollectError> {
        linux::read_logged_in_users()
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "temperatures"))]
    fn temperatures(&self) -> Result<TemperatureInfo, CollectError> {
        let components = Components::new_with_refreshed_list();
        let sensors: Vec<SensorInfo> = components
            .iter()
            .map(|c| SensorInfo {
                name: c.label().to_string(),
                temperature: c.temperature().map(finite).unwrap_or(0.0),
                high: c.max().map(finite).unwrap_or(0.0),
                critical: c.critical().map(finite).unwrap_or(0.0),
            })
            .collect();
        if sensors.is_empty() {
            return Err(CollectError::unavailable(
                Source::Temperatures,
                "no temperature sensors",
            ));
        }
        let cpu_temp = sensors
            .iter()
            .find(|s| {
                let label = s.name.to_lowercase();
                CPU_SENSOR_HINTS.iter().any(|hint| label.contains(hint))
            })
            .map(|s| s.temperature)
            .unwrap_or(0.0);
        Ok(TemperatureInfo { cpu_temp, sensors })
    }

    #[instrument(skip(self), fields(source = "sysinfo", operation = "processes"))]
    fn processes(&self, window: Duration) -> Result<Vec<ProcessInfo>, CollectError> {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        );
        std::thread::sleep(sampling_window(window));
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );

        let total_memory = sys.total_memory();
        let users = Users::new_with_refreshed_list();
        let mut processes: Vec<ProcessInfo> = sys
            .processes()
            .values()
            .filter(|p| is_process(p))
            .map(|p| {
                let memory_rss = p.memory();
                ProcessInfo {
                    pid: p.pid().as_u32(),
                    name: p.name().to_string_lossy().into_owned(),
                    status: p.status().to_string(),
                    cpu_percent: finite(p.cpu_usage()),
                    mem_percent: percent_of(memory_rss, total_memory),
                    memory_rss,
                    memory_vms: p.virtual_memory(),
                    create_time: p.start_time(),
                    num_threads: p.tasks().map(|t| 1 + t.len() as u32),
                    username: p
                        .user_id()
                        .and_then(|uid| users.get_user_by_id(uid))
                        .map(|u| u.name().to_string()),
                    command_line: p
                        .cmd()
                        .iter()
                        .map(|s| s.to_string_lossy())
                        .collect::<Vec<_>>()
                        .join(" "),
                }
            })
            .collect();
        if processes.is_empty() {
            return Err(CollectError::unavailable(
                Source::Processes,
                "no processes visible",
            ));
        }
        processes.sort_by_key(|p| p.pid);
        Ok(processes)
    }
}

impl SocketTable for SysinfoSource {
    #[instrument(skip(self), fields(source = "procfs", operation = "tcp_sockets"))]
    fn tcp_sockets(&self) -> Result<Vec<SocketEntry>, CollectError> {
        let raw = sockets::read_tables(sockets::TCP_TABLES, Source::TcpSockets)?;
        let owners = sockets::socket_owners();
        Ok(raw
            .into_iter()
            .map(|s| SocketEntry {
                local_addr: s.local_addr,
                port: s.port,
                state: TcpState::from_kernel(s.state),
                pid: owners.get(&s.inode).copied().unwrap_or(0),
            })
            .collect())
    }

    #[instrument(skip(self), fields(source = "procfs", operation = "udp_sockets"))]
    fn udp_sockets(&self) -> Result<Vec<SocketEntry>, CollectError> {
        let raw = sockets::read_tables(sockets::UDP_TABLES, Source::UdpSockets)?;
        let owners = sockets::socket_owners();
        Ok(raw
            .into_iter()
            .map(|s| SocketEntry {
                local_addr: s.local_addr,
                port: s.port,
                state: None,
                pid: owners.get(&s.inode).copied().unwrap_or(0),
            })
            .collect())
    }

    fn process_name(&self, pid: u32) -> Option<String> {
        let pid = Pid::from_u32(pid);
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        sys.process(pid)
            .map(|p| p.name().to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(unix)]
#[allow(clippy::unnecessary_cast)]
fn statvfs_usage(mountpoint: &str) -> Result<DiskUsage, CollectError> {
    use std::ffi::CString;

    let path = CString::new(mountpoint).map_err(|_| {
        CollectError::unavailable(
            Source::DiskUsage,
            format!("{:?} contains a NUL byte", mountpoint),
        )
    })?;
    // SAFETY: statvfs is plain old data; an all-zero value is valid.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: `path` is NUL-terminated and `stat` outlives the call.
    let rc = unsafe { libc::statvfs(path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(CollectError::io(
            Source::DiskUsage,
            mountpoint,
            std::io::Error::last_os_error(),
        ));
    }
    let fragment_size = if stat.f_frsize > 0 {
        stat.f_frsize as u64
    } else {
        stat.f_bsize as u64
    };
    Ok(DiskUsage::from_blocks(
        fragment_size,
        stat.f_blocks as u64,
        stat.f_bfree as u64,
        stat.f_bavail as u64,
        stat.f_files as u64,
        stat.f_ffree as u64,
    ))
}
