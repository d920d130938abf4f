use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use sl_config::ConfigError;
use sl_core::{LifecycleError, ProcessError};
use thiserror::Error;

/// Failures that stop the launcher before or outside the control loop.
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error: {source} {location}")]
    Config {
        #[source]
        source: ConfigError,
        location: ErrorLocation,
    },

    #[error("Failed to set up logging: {message} {location}")]
    Logging {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to write install marker at {path}: {source} {location}")]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to prepare server process manager: {source} {location}")]
    Process {
        #[source]
        source: ProcessError,
        location: ErrorLocation,
    },

    #[error("{source} {location}")]
    Lifecycle {
        #[source]
        source: LifecycleError,
        location: ErrorLocation,
    },

    #[error("Lifecycle controller task failed: {message} {location}")]
    Controller {
        message: String,
        location: ErrorLocation,
    },
}

impl LauncherError {
    #[track_caller]
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn controller(message: impl Into<String>) -> Self {
        Self::Controller {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Config { .. } => {
                "Configuration file has invalid settings. \
                   Fix config.toml or delete it to use defaults."
            }
            Self::Logging { .. } | Self::Marker { .. } => {
                "Unable to write to the configuration directory. \
                   Check file permissions or available disk space."
            }
            Self::Process { .. } => "Check the [server] section of config.toml.",
            Self::Lifecycle { source, .. } => source.recovery_hint(),
            Self::Controller { .. } => {
                "An unexpected error occurred. Please check the logs for details."
            }
        }
    }
}

impl From<ConfigError> for LauncherError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ProcessError> for LauncherError {
    #[track_caller]
    fn from(source: ProcessError) -> Self {
        Self::Process {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<LifecycleError> for LauncherError {
    #[track_caller]
    fn from(source: LifecycleError) -> Self {
        Self::Lifecycle {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type LauncherResult<T> = std::result::Result<T, LauncherError>;
