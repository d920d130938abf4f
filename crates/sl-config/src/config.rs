use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIRECTORY,
    LauncherConfig, LifecycleConfig, LoggingConfig, PortsConfig, ServerConfig,
};

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub launcher: LauncherConfig,
    pub ports: PortsConfig,
    pub server: ServerConfig,
    pub lifecycle: LifecycleConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. Check for SL_CONFIG_DIR env var, else use ./.standalone/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply SL_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Same as [`Config::load`], but with an explicit config directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: SL_CONFIG_DIR env var > ./.standalone/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIRECTORY))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.launcher.validate()?;
        self.ports.validate()?;
        self.server.validate()?;
        self.lifecycle.validate()?;
        self.logging.validate()?;

        if let Some(ref dir) = self.server.working_dir
            && dir.contains("..")
        {
            return Err(ConfigError::server(
                "server.working_dir cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Absolute log directory for a given config directory.
    pub fn log_dir(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.logging.dir)
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  launcher: \"{}\"", self.launcher.title);
        info!(
            "  ports: web={}, data={}, max={}",
            self.ports.web, self.ports.data, self.ports.max
        );
        info!(
            "  server: {} (ready: {} every {}ms)",
            self.server.command.as_deref().unwrap_or("<not configured>"),
            self.server.ready_path,
            self.server.ready_poll_interval_ms
        );
        info!(
            "  lifecycle: start={}s, stop={}s, exit={}s",
            self.lifecycle.start_timeout_secs,
            self.lifecycle.stop_timeout_secs,
            self.lifecycle.exit_timeout_secs
        );
        info!(
            "  logging: {} in {} (colored: {})",
            self.logging.level, self.logging.dir, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        let Config {
            launcher,
            ports,
            server,
            lifecycle,
            logging,
        } = self;

        override_string("SL_LAUNCHER_TITLE", &mut launcher.title);
        override_string("SL_BROWSER_PATH", &mut launcher.browser_path);

        override_parsed("SL_WEB_PORT", &mut ports.web);
        override_parsed("SL_DATA_PORT", &mut ports.data);
        override_parsed("SL_MAX_PORT", &mut ports.max);

        override_optional("SL_SERVER_COMMAND", &mut server.command);
        override_optional("SL_SERVER_WORKING_DIR", &mut server.working_dir);
        override_string("SL_SERVER_READY_PATH", &mut server.ready_path);

        override_parsed("SL_START_TIMEOUT_SECS", &mut lifecycle.start_timeout_secs);
        override_parsed("SL_STOP_TIMEOUT_SECS", &mut lifecycle.stop_timeout_secs);
        override_parsed("SL_EXIT_TIMEOUT_SECS", &mut lifecycle.exit_timeout_secs);

        override_parsed("SL_LOG_LEVEL", &mut logging.level);
        override_string("SL_LOG_DIR", &mut logging.dir);
        override_optional("SL_LOG_FILE", &mut logging.file);
        override_flag("SL_LOG_COLORED", &mut logging.colored);
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn override_string(name: &str, target: &mut String) {
    if let Some(value) = env_value(name) {
        *target = value;
    }
}

/// An empty value clears the setting.
fn override_optional(name: &str, target: &mut Option<String>) {
    if let Some(value) = env_value(name) {
        *target = (!value.trim().is_empty()).then_some(value);
    }
}

/// "true" or "1" enable, anything else disables.
fn override_flag(name: &str, target: &mut bool) {
    if let Some(value) = env_value(name) {
        *target = matches!(value.as_str(), "true" | "1");
    }
}

fn override_parsed<T: std::str::FromStr>(name: &str, target: &mut T) {
    let Some(value) = env_value(name) else {
        return;
    };

    match value.parse() {
        Ok(parsed) => *target = parsed,
        Err(_) => warn!("Ignoring {name}={value:?}: not a valid value"),
    }
}
