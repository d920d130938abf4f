use crate::{ConfigError, ConfigErrorResult, DEFAULT_DATA_PORT, DEFAULT_MAX_PORT, DEFAULT_WEB_PORT};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortsConfig {
    /// Preferred port for the web container
    pub web: u16,
    /// Preferred port for the database engine
    pub data: u16,
    /// Highest port the allocator may hand out
    pub max: u16,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            web: DEFAULT_WEB_PORT,
            data: DEFAULT_DATA_PORT,
            max: DEFAULT_MAX_PORT,
        }
    }
}

impl PortsConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max == 0 {
            return Err(ConfigError::ports("ports.max must be >= 1"));
        }

        for (name, port) in [("ports.web", self.web), ("ports.data", self.data)] {
            if port == 0 || port > self.max {
                return Err(ConfigError::ports(format!(
                    "{name} must be 1-{}, got {port}",
                    self.max
                )));
            }
        }

        if self.web == self.data {
            return Err(ConfigError::ports(format!(
                "ports.web and ports.data must differ, both are {}",
                self.web
            )));
        }

        Ok(())
    }
}
