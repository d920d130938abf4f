use crate::{DatabaseMode, PortField, ServerState};

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Failure reported across the process manager boundary.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No server command is configured")]
    NotConfigured,

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server process exited before it became ready ({status})")]
    ExitedEarly { status: String },

    #[error("Failed to signal server process {pid}: {message}")]
    Signal { pid: u32, message: String },

    #[error("Failed to open browser at {url}: {message}")]
    Browser { url: String, message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("{message}")]
    Other { message: String },
}

impl ProcessError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("The {field} port {port} is not available {location}")]
    PortUnavailable {
        field: PortField,
        port: u16,
        location: ErrorLocation,
    },

    #[error("No available port in range {start}-{max} {location}")]
    NoPortAvailable {
        start: u16,
        max: u16,
        location: ErrorLocation,
    },

    #[error("Server failed to start: {source} {location}")]
    ProcessStartFailure {
        #[source]
        source: ProcessError,
        location: ErrorLocation,
    },

    #[error("Server failed to stop cleanly: {source} {location}")]
    ProcessStopFailure {
        #[source]
        source: ProcessError,
        location: ErrorLocation,
    },

    #[error("Failed to launch browser: {source} {location}")]
    BrowserLaunchFailure {
        #[source]
        source: ProcessError,
        location: ErrorLocation,
    },

    #[error("Server failed to become ready within {timeout_secs}s {location}")]
    StartTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Server failed to stop within {timeout_secs}s {location}")]
    StopTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Cancelled by user")]
    UserCancelled,

    #[error("Database mode already selected ({current}) {location}")]
    ModeAlreadySelected {
        current: DatabaseMode,
        location: ErrorLocation,
    },

    #[error("Database mode cannot change after the server has started {location}")]
    ModeLocked { location: ErrorLocation },

    #[error("Ports cannot change while the server is {state} {location}")]
    PortsLocked {
        state: ServerState,
        location: ErrorLocation,
    },

    #[error("Lifecycle controller is no longer running")]
    ControllerClosed,
}

impl LifecycleError {
    /// Errors the user caused on purpose; nothing should be shown for these.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::PortUnavailable { .. } => {
                "Another application is using this port. \
                   Please enter another one."
            }
            Self::NoPortAvailable { .. } => {
                "No free port could be found. \
                   Close other applications or restart your computer."
            }
            Self::ProcessStartFailure { .. } | Self::StartTimeout { .. } => {
                "The server could not be started. \
                   Check the output for details and try again."
            }
            Self::ProcessStopFailure { .. } | Self::StopTimeout { .. } => {
                "The server may not have shut down completely. \
                   Restart your computer if ports stay in use."
            }
            Self::BrowserLaunchFailure { .. } => {
                "Open a web browser and enter the server address manually."
            }
            Self::ModeAlreadySelected { .. } | Self::ModeLocked { .. } => {
                "The database configuration was already chosen for this session."
            }
            Self::PortsLocked { .. } => "Stop the server before changing ports.",
            Self::UserCancelled => "",
            Self::ControllerClosed => "The launcher is shutting down.",
        }
    }

    #[track_caller]
    pub fn port_unavailable(field: PortField, port: u16) -> Self {
        Self::PortUnavailable {
            field,
            port,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_port_available(start: u16, max: u16) -> Self {
        Self::NoPortAvailable {
            start,
            max,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn process_start(source: ProcessError) -> Self {
        Self::ProcessStartFailure {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn process_stop(source: ProcessError) -> Self {
        Self::ProcessStopFailure {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn browser_launch(source: ProcessError) -> Self {
        Self::BrowserLaunchFailure {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn start_timeout(timeout_secs: u64) -> Self {
        Self::StartTimeout {
            timeout_secs,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn stop_timeout(timeout_secs: u64) -> Self {
        Self::StopTimeout {
            timeout_secs,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn mode_already_selected(current: DatabaseMode) -> Self {
        Self::ModeAlreadySelected {
            current,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn mode_locked() -> Self {
        Self::ModeLocked {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn ports_locked(state: ServerState) -> Self {
        Self::PortsLocked {
            state,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;
