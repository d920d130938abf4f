use crate::{DatabaseMode, PortAssignment, ServerState};

/// Read-only copy of controller state published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub state: ServerState,
    pub status: String,
    pub ports: PortAssignment,
    pub mode: DatabaseMode,
    pub start_enabled: bool,
    pub stop_enabled: bool,
}
