use crate::{ConfigError, ConfigErrorResult, DEFAULT_READY_PATH, DEFAULT_READY_POLL_INTERVAL_MS};

use serde::Deserialize;

/// How to launch the embedded server process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Program that boots the web container and database. None = not configured.
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Working directory for the server process, relative to the config directory
    pub working_dir: Option<String>,
    /// HTTP path polled on the web port to detect readiness
    pub ready_path: String,
    pub ready_poll_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            working_dir: None,
            ready_path: String::from(DEFAULT_READY_PATH),
            ready_poll_interval_ms: DEFAULT_READY_POLL_INTERVAL_MS,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(ref command) = self.command
            && command.trim().is_empty()
        {
            return Err(ConfigError::server("server.command cannot be empty"));
        }

        if !self.ready_path.starts_with('/') {
            return Err(ConfigError::server(format!(
                "server.ready_path must start with '/', got '{}'",
                self.ready_path
            )));
        }

        if self.ready_poll_interval_ms == 0 {
            return Err(ConfigError::server(
                "server.ready_poll_interval_ms must be > 0",
            ));
        }

        Ok(())
    }
}
