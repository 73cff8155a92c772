use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub sink: SinkConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Root directory for sink output; created (with intermediates) if absent.
    pub file_directory: String,
    /// How long snapshot files are kept, in milliseconds.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: u64,
}

// default fairly low so an unconfigured sink doesn't fill up a disk
fn default_retention_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (flushes, failures, pruned totals) at INFO level.
    pub stats_log_interval_secs: u64,
    /// Bound on queued sink events; producers block once it is full.
    pub event_queue_capacity: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: 60,
            event_queue_capacity: 64,
        }
    }
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
            !self.sink.file_directory.is_empty(),
            "sink.file_directory must be non-empty"
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.event_queue_capacity > 0,
            "monitoring.event_queue_capacity must be > 0, got {}",
            self.monitoring.event_queue_capacity
        );
        Ok(())
    }
}
