// Shared test helpers: an in-memory source with injectable failures

#![allow(dead_code)]

use hostsnap::collector::{MetricSource, SocketTable};
use hostsnap::models::*;
use hostsnap::processes::ServiceCatalog;
use hostsnap::{CollectError, SnapshotBuilder, SnapshotOptions, Source};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct FakeSource {
    pub failing: HashSet<Source>,
    pub host: HostInfo,
    pub cpu: CpuInfo,
    pub partitions: Vec<Partition>,
    /// Mountpoints whose usage query fails.
    pub unstatable: HashSet<String>,
    pub processes: Vec<ProcessInfo>,
    pub tcp: Vec<SocketEntry>,
    pub udp: Vec<SocketEntry>,
    pub names: HashMap<u32, String>,
    /// Every PID passed to `process_name`.
    pub name_lookups: Mutex<Vec<u32>>,
    /// Sleep inside `host()`, to exercise caller timeouts.
    pub host_delay: Duration,
}

pub fn process(pid: u32, name: &str, cpu_percent: f64) -> ProcessInfo {
    ProcessInfo {
        pid,
        name: name.into(),
        status: "Sleeping".into(),
        cpu_percent,
        mem_percent: 0.5,
        memory_rss: 4096,
        memory_vms: 8192,
        create_time: 1_700_000_000,
        num_threads: Some(1),
        username: Some("root".into()),
        command_line: format!("/usr/bin/{}", name),
    }
}

pub fn socket(addr: &str, port: u16, state: Option<TcpState>, pid: u32) -> SocketEntry {
    SocketEntry {
        local_addr: addr.parse().unwrap(),
        port,
        state,
        pid,
    }
}

pub fn partition(device: &str, mountpoint: &str) -> Partition {
    Partition {
        device: device.into(),
        mountpoint: mountpoint.into(),
        fstype: "ext4".into(),
    }
}

impl FakeSource {
    pub fn healthy() -> Self {
        Self {
            failing: HashSet::new(),
            host: HostInfo {
                os: "Ubuntu 24.04".into(),
                hostname: "test-host".into(),
                architecture: "x86_64".into(),
                kernel_version: "6.8.0".into(),
                uptime_secs: 7200,
                boot_time: 1_700_000_000,
                process_count: 5,
            },
            cpu: CpuInfo {
                model_name: "Test CPU".into(),
                cores: 4,
                logical_cores: 8,
                usage: Vec::new(),
                frequency: 3200.0,
                cache_size: 512,
            },
            partitions: vec![partition("/dev/sda1", "/"), partition("/dev/sdb1", "/data")],
            unstatable: HashSet::new(),
            processes: vec![
                process(1, "systemd", 0.1),
                process(220, "sshd", 0.0),
                process(901, "postgres", 12.5),
                process(1500, "bash", 0.0),
                process(2001, "cargo", 85.0),
            ],
            tcp: Vec::new(),
            udp: Vec::new(),
            names: HashMap::new(),
            name_lookups: Mutex::new(Vec::new()),
            host_delay: Duration::ZERO,
        }
    }

    pub fn failing(mut self, source: Source) -> Self {
        self.failing.insert(source);
        self
    }

    pub fn lookups(&self) -> Vec<u32> {
        self.name_lookups.lock().unwrap().clone()
    }

    fn check(&self, source: Source) -> Result<(), CollectError> {
        if self.failing.contains(&source) {
            Err(CollectError::unavailable(source, "injected failure"))
        } else {
            Ok(())
        }
    }
}

impl MetricSource for FakeSource {
    fn host(&self) -> Result<HostInfo, CollectError> {
        if !self.host_delay.is_zero() {
            std::thread::sleep(self.host_delay);
        }
        self.check(Source::Host)?;
        Ok(self.host.clone())
    }

    fn cpu_info(&self) -> Result<CpuInfo, CollectError> {
        self.check(Source::Cpu)?;
        Ok(self.cpu.clone())
    }

    fn cpu_usage(&self, _window: Duration) -> Result<Vec<f64>, CollectError> {
        self.check(Source::CpuUsage)?;
        Ok((0..self.cpu.logical_cores).map(|i| i as f64 * 10.0).collect())
    }

    fn memory(&self) -> Result<MemoryInfo, CollectError> {
        self.check(Source::Memory)?;
        Ok(MemoryInfo {
            total: 16 << 30,
            available: 8 << 30,
            used: 8 << 30,
            used_percent: 50.0,
            free: 4 << 30,
            ..MemoryInfo::default()
        })
    }

    fn swap(&self) -> Result<SwapInfo, CollectError> {
        self.check(Source::Swap)?;
        Ok(SwapInfo::new(2 << 30, 1 << 30, 1 << 30))
    }

    fn partitions(&self) -> Result<Vec<Partition>, CollectError> {
        self.check(Source::Partitions)?;
        Ok(self.partitions.clone())
    }

    fn disk_usage(&self, partition: &Partition) -> Result<DiskUsage, CollectError> {
        if self.unstatable.contains(&partition.mountpoint) {
            return Err(CollectError::io(
                Source::DiskUsage,
                partition.mountpoint.clone(),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        // 1000 blocks of 4 KiB, 100 reserved for root, 400 in use.
        Ok(DiskUsage::from_blocks(4096, 1000, 600, 500, 1000, 900))
    }

    fn interfaces(&self) -> Result<Vec<NetworkInterface>, CollectError> {
        self.check(Source::Interfaces)?;
        Ok(vec![NetworkInterface {
            name: "eth0".into(),
            addresses: vec!["10.0.0.2/24".into()],
            mtu: 1500,
            flags: vec!["up".into(), "broadcast".into()],
            hardware_addr: "02:42:ac:11:00:02".into(),
        }])
    }

    fn network_counters(&self) -> Result<NetworkCounters, CollectError> {
        self.check(Source::NetworkCounters)?;
        Ok(NetworkCounters {
            bytes_sent: 1000,
            bytes_recv: 2000,
            ..NetworkCounters::default()
        })
    }

    fn load_average(&self) -> Result<LoadAverage, CollectError> {
        self.check(Source::LoadAverage)?;
        Ok(LoadAverage {
            load1: 0.5,
            load5: 0.4,
            load15: 0.3,
        })
    }

    fn io_stats(&self) -> Result<IoStats, CollectError> {
        self.check(Source::IoStats)?;
        Ok(IoStats {
            disk_read_bytes: 512,
            ..IoStats::default()
        })
    }

    fn users(&self) -> Result<Vec<UserInfo>, CollectError> {
        self.check(Source::Users)?;
        Ok(vec![UserInfo {
            user: "alice".into(),
            terminal: "pts/0".into(),
            host: "10.0.0.5".into(),
            started: 1_700_000_100,
        }])
    }

    fn temperatures(&self) -> Result<TemperatureInfo, CollectError> {
        self.check(Source::Temperatures)?;
        Ok(TemperatureInfo {
            cpu_temp: 48.0,
            sensors: vec![SensorInfo {
                name: "Package id 0".into(),
                temperature: 48.0,
                high: 80.0,
                critical: 100.0,
            }],
        })
    }

    fn processes(&self, _window: Duration) -> Result<Vec<ProcessInfo>, CollectError> {
        self.check(Source::Processes)?;
        Ok(self.processes.clone())
    }
}

impl SocketTable for FakeSource {
    fn tcp_sockets(&self) -> Result<Vec<SocketEntry>, CollectError> {
        self.check(Source::TcpSockets)?;
        Ok(self.tcp.clone())
    }

    fn udp_sockets(&self) -> Result<Vec<SocketEntry>, CollectError> {
        self.check(Source::UdpSockets)?;
        Ok(self.udp.clone())
    }

    fn process_name(&self, pid: u32) -> Option<String> {
        self.name_lookups.lock().unwrap().push(pid);
        self.names.get(&pid).cloned()
    }
}

pub fn fast_options() -> SnapshotOptions {
    SnapshotOptions {
        top_processes: 3,
        cpu_sample_window: Duration::from_millis(10),
        services: ServiceCatalog::default(),
    }
}

pub fn builder(fake: FakeSource) -> (SnapshotBuilder, Arc<FakeSource>) {
    let fake = Arc::new(fake);
    let builder = SnapshotBuilder::new(fake.clone(), fake.clone(), fast_options());
    (builder, fake)
}
