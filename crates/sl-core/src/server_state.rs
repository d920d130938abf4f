use std::fmt;

/// Current state of the embedded server, as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerState {
    /// Server is not running
    Stopped,
    /// Start requested, waiting for the process manager to report ready
    Starting,
    /// Server is up and serving requests
    Running,
    /// Stop requested, waiting for the process manager to report stopped
    Stopping,
    /// Launcher is tearing everything down
    Exiting,
}

const STATUS_MESSAGE_STOPPED: &str = "Stopped";
const STATUS_MESSAGE_STARTING: &str = "Starting...";
const STATUS_MESSAGE_RUNNING: &str = "Running";
const STATUS_MESSAGE_STOPPING: &str = "Stopping...";
const STATUS_MESSAGE_SHUTTING_DOWN: &str = "Shutting down...";

impl ServerState {
    /// A transition is in flight; no new transition may begin.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Starting | Self::Stopping | Self::Exiting)
    }

    /// Fixed status text shown in the window title.
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Stopped => STATUS_MESSAGE_STOPPED,
            Self::Starting => STATUS_MESSAGE_STARTING,
            Self::Running => STATUS_MESSAGE_RUNNING,
            Self::Stopping => STATUS_MESSAGE_STOPPING,
            Self::Exiting => STATUS_MESSAGE_SHUTTING_DOWN,
        }
    }

    /// Window title, `"<product> - [<status>]"`.
    pub fn status_title(&self, product: &str) -> String {
        format!("{product} - [{}]", self.status_message())
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Exiting => "exiting",
        };
        f.write_str(name)
    }
}
