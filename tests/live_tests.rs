// Smoke tests against the local host

use hostsnap::{SnapshotBuilder, SnapshotOptions};
use std::time::Duration;

fn local_builder() -> SnapshotBuilder {
    SnapshotBuilder::system(SnapshotOptions {
        cpu_sample_window: Duration::from_millis(200),
        ..SnapshotOptions::default()
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_snapshot_invariants() {
    let snapshot = local_builder()
        .build_snapshot()
        .await
        .expect("snapshot of the local host");

    assert!(!snapshot.host.hostname.is_empty());
    assert!(snapshot.host.boot_time <= snapshot.timestamp / 1000);
    assert!(snapshot.cpu.logical_cores >= 1);
    assert!(snapshot.cpu.logical_cores >= snapshot.cpu.cores);
    assert!(snapshot.memory.total > 0);
    assert!(snapshot.memory.used_percent >= 0.0 && snapshot.memory.used_percent <= 100.0);
    for disk in &snapshot.disk {
        assert!(disk.used + disk.free <= disk.total, "{}", disk.mountpoint);
    }
    assert!(snapshot.top_processes.len() <= 10);
    assert!(
        snapshot
            .top_processes
            .windows(2)
            .all(|w| w[0].cpu_percent >= w[1].cpu_percent)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_open_ports_invariants() {
    let ports = local_builder().open_ports().await.expect("ports");
    assert!(ports.windows(2).all(|w| w[0].port <= w[1].port));
    for port in &ports {
        match port.protocol {
            hostsnap::models::Protocol::Tcp => assert_eq!(port.status, "LISTEN"),
            hostsnap::models::Protocol::Udp => assert_eq!(port.status, "ACTIVE"),
        }
        if port.pid == 0 {
            assert_eq!(port.process, "unknown");
        }
    }
}

/// `Tgid` from /proc/<pid>/status; `None` once the process has exited.
#[cfg(target_os = "linux")]
fn thread_group_id(pid: u32) -> Option<u32> {
    std::fs::read_to_string(format!("/proc/{}/status", pid))
        .ok()?
        .lines()
        .find_map(|line| line.strip_prefix("Tgid:"))
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread")]
async fn test_local_processes_exclude_threads() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let stop = Arc::new(AtomicBool::new(false));
    let spinner = {
        let stop = Arc::clone(&stop);
        std::thread::Builder::new()
            .name("busy-spinner".into())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    std::hint::spin_loop();
                }
            })
            .unwrap()
    };

    let builder = local_builder();
    let processes = builder.top_processes(usize::MAX).await;
    let snapshot = builder.build_snapshot().await.expect("snapshot");
    stop.store(true, Ordering::Relaxed);
    spinner.join().unwrap();

    let own_pid = std::process::id();
    assert_eq!(processes.iter().filter(|p| p.pid == own_pid).count(), 1);
    assert!(!processes.iter().any(|p| p.name == "busy-spinner"));
    let threads: Vec<(u32, u32, &str)> = processes
        .iter()
        .filter_map(|p| {
            let tgid = thread_group_id(p.pid)?;
            (tgid != p.pid).then_some((p.pid, tgid, p.name.as_str()))
        })
        .collect();
    assert!(threads.is_empty(), "threads listed as processes: {:?}", threads);

    let mut pids: Vec<u32> = processes.iter().map(|p| p.pid).collect();
    pids.sort_unstable();
    pids.dedup();
    assert_eq!(pids.len(), processes.len());
    assert!(snapshot.host.process_count > 0);
}
