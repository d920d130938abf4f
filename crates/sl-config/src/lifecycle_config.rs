use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_EXIT_TIMEOUT_SECS, DEFAULT_START_TIMEOUT_SECS,
    DEFAULT_STOP_TIMEOUT_SECS,
};

use std::time::Duration;

use serde::Deserialize;

/// Bounds on the blocking process-manager calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub start_timeout_secs: u64,
    pub stop_timeout_secs: u64,
    pub exit_timeout_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            start_timeout_secs: DEFAULT_START_TIMEOUT_SECS,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
            exit_timeout_secs: DEFAULT_EXIT_TIMEOUT_SECS,
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for (name, secs) in [
            ("lifecycle.start_timeout_secs", self.start_timeout_secs),
            ("lifecycle.stop_timeout_secs", self.stop_timeout_secs),
            ("lifecycle.exit_timeout_secs", self.exit_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::lifecycle(format!("{name} must be > 0")));
            }
        }

        Ok(())
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn exit_timeout(&self) -> Duration {
        Duration::from_secs(self.exit_timeout_secs)
    }
}
