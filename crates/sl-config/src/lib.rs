mod config;
mod error;
mod launcher_config;
mod lifecycle_config;
mod log_level;
mod logging_config;
mod ports_config;
mod server_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use launcher_config::LauncherConfig;
pub use lifecycle_config::LifecycleConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use ports_config::PortsConfig;
pub use server_config::ServerConfig;

pub const CONFIG_DIR_ENV: &str = "SL_CONFIG_DIR";
pub const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_CONFIG_DIRECTORY: &str = ".standalone";

const DEFAULT_TITLE: &str = "OpenMRS Standalone";
const DEFAULT_BROWSER_PATH: &str = "/openmrs";

const DEFAULT_WEB_PORT: u16 = 8081;
const DEFAULT_DATA_PORT: u16 = 3316;
const DEFAULT_MAX_PORT: u16 = u16::MAX;

const DEFAULT_READY_PATH: &str = "/";
const DEFAULT_READY_POLL_INTERVAL_MS: u64 = 500;

const DEFAULT_START_TIMEOUT_SECS: u64 = 600;
const DEFAULT_STOP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_EXIT_TIMEOUT_SECS: u64 = 60;

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "logs";
