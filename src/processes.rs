// Process ranking and the name-prefix service heuristic

use std::collections::BTreeSet;

use crate::models::{ProcessInfo, ServiceInfo};

/// Default recognised service-name prefixes.
pub const DEFAULT_SERVICE_PREFIXES: &[&str] = &[
    "systemd",
    "kernel",
    "kthreadd",
    "ksoftirqd",
    "rcu_",
    "watchdog",
    "sshd",
    "NetworkManager",
    "dbus",
    "cron",
    "rsyslog",
    "apache2",
    "nginx",
    "mysql",
    "postgres",
    "docker",
    "containerd",
];

/// Keep the `n` busiest processes, CPU% descending. Equal CPU% keeps enumeration order.
pub fn rank_top(mut processes: Vec<ProcessInfo>, n: usize) -> Vec<ProcessInfo> {
    // sort_by is stable.
    processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    processes.truncate(n);
    processes
}

/// Names treated as system services.
///
/// This is a heuristic: a process counts as a service when its name equals or starts
/// with one of the prefixes. The init system is never consulted, so a user process
/// called `nginx-dev` is a "service" and a service with an unlisted name is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCatalog {
    prefixes: BTreeSet<String>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_PREFIXES.iter().copied())
    }
}

impl ServiceCatalog {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// This catalog plus `extra`.
    pub fn with_extra_prefixes<I, S>(self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(self.prefixes.into_iter().chain(extra.into_iter().map(Into::into)))
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    pub fn matches(&self, process_name: &str) -> bool {
        self.prefixes.iter().any(|p| process_name.starts_with(p.as_str()))
    }

    /// Matching processes, in the order given.
    pub fn classify(&self, processes: &[ProcessInfo]) -> Vec<ServiceInfo> {
        processes
            .iter()
            .filter(|p| self.matches(&p.name))
            .map(|p| ServiceInfo {
                name: p.name.clone(),
                status: p.status.clone(),
                pid: p.pid,
            })
            .collect()
    }
}
