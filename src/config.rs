use serde::Deserialize;
use std::time::Duration;

use crate::processes::ServiceCatalog;
use crate::snapshot::{DEFAULT_TOP_PROCESSES, SnapshotOptions};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Upper bound on one snapshot build; the collectors themselves have none.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_top_processes")]
    pub top_processes: usize,
    /// CPU usage measurement window, host and per process.
    #[serde(default = "default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
}

fn default_top_processes() -> usize {
    DEFAULT_TOP_PROCESSES
}

fn default_cpu_sample_ms() -> u64 {
    1000
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            top_processes: default_top_processes(),
            cpu_sample_ms: default_cpu_sample_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesConfig {
    /// Added to the built-in service-name prefixes.
    #[serde(default)]
    pub extra_prefixes: Vec<String>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.server.request_timeout_secs > 0,
            "server.request_timeout_secs must be > 0, got {}",
            self.server.request_timeout_secs
        );
        anyhow::ensure!(
            self.snapshot.top_processes > 0,
            "snapshot.top_processes must be > 0, got {}",
            self.snapshot.top_processes
        );
        anyhow::ensure!(
            (100..=10_000).contains(&self.snapshot.cpu_sample_ms),
            "snapshot.cpu_sample_ms must be between 100 and 10000, got {}",
            self.snapshot.cpu_sample_ms
        );
        anyhow::ensure!(
            self.services.extra_prefixes.iter().all(|p| !p.is_empty()),
            "services.extra_prefixes must not contain empty strings"
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            top_processes: self.snapshot.top_processes,
            cpu_sample_window: Duration::from_millis(self.snapshot.cpu_sample_ms),
            services: ServiceCatalog::default()
                .with_extra_prefixes(self.services.extra_prefixes.iter().cloned()),
        }
    }
}
