use calc_config::Validate;
use serde::{Deserialize, Serialize};

/// Worker-side configuration (`SPEC_FULL.md` §A1, A4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Base URL of the coordinator's HTTP admission surface.
    pub coordinator_url: String,
    /// T_ping: heartbeat interval in seconds (`spec.md` §4.4 default 15).
    pub ping_interval_secs: u64,
    pub log_level: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "http://127.0.0.1:8080".to_string(),
            ping_interval_secs: 15,
            log_level: "info".to_string(),
        }
    }
}

impl Validate for WorkerConfig {
    fn validate(&self) -> Result<(), calc_config::ConfigError> {
        if self.ping_interval_secs == 0 {
            return Err(calc_config::ConfigError::Invalid(
                "ping_interval_secs must be greater than zero".into(),
            ));
        }
        if self.coordinator_url.is_empty() {
            return Err(calc_config::ConfigError::Invalid(
                "coordinator_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}
