use calc_config::Validate;
use calc_types::OperatorTimeouts;
use serde::{Deserialize, Serialize};

/// Coordinator-side configuration (`SPEC_FULL.md` §A1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Address the HTTP admission surface binds to.
    pub bind: String,
    /// T_heartbeat: heartbeat sweep interval in seconds (`spec.md` §4.6 default 30).
    pub heartbeat_sweep_secs: u64,
    /// T_taskcheck: task-status sweep interval in seconds (`spec.md` §4.6 default 3).
    pub task_check_sweep_secs: u64,
    /// Operator-timeout table new tasks are published with until
    /// overridden via `POST /timeouts`.
    pub initial_timeouts: OperatorTimeouts,
    pub log_level: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            heartbeat_sweep_secs: 30,
            task_check_sweep_secs: 3,
            initial_timeouts: OperatorTimeouts::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Validate for CoordinatorConfig {
    fn validate(&self) -> Result<(), calc_config::ConfigError> {
        if self.heartbeat_sweep_secs == 0 {
            return Err(calc_config::ConfigError::Invalid(
                "heartbeat_sweep_secs must be greater than zero".into(),
            ));
        }
        if self.task_check_sweep_secs == 0 {
            return Err(calc_config::ConfigError::Invalid(
                "task_check_sweep_secs must be greater than zero".into(),
            ));
        }
        if self.bind.is_empty() {
            return Err(calc_config::ConfigError::Invalid(
                "bind must not be empty".into(),
            ));
        }
        Ok(())
    }
}
