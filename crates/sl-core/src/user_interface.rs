use crate::{DatabaseMode, PortAssignment, PortField};

use async_trait::async_trait;

/// Yes/no questions the controller asks before disruptive transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    StopServer,
    Exit,
}

impl Prompt {
    pub fn message(&self) -> &'static str {
        match self {
            Self::StopServer => "Are you sure you want to stop the server?",
            Self::Exit => "The server is still running. Are you sure you want to exit?",
        }
    }
}

/// Presentation layer as seen by the lifecycle controller.
///
/// Implementations may be a GUI, a terminal front end, or a test double.
#[async_trait]
pub trait UserInterface: Send + Sync {
    /// Window title, already formatted as `"<product> - [<status>]"`.
    fn set_status(&self, title: &str);

    fn enable_start(&self, enable: bool);

    /// Also governs post-start affordances such as launching the browser.
    fn enable_stop(&self, enable: bool);

    /// A port failed validation; the UI should move focus to `field`.
    fn show_port_error(&self, field: PortField, message: &str);

    fn show_error(&self, message: &str);

    /// The allocator adjusted the ports; refresh any editable fields.
    fn ports_changed(&self, _ports: PortAssignment) {}

    async fn confirm(&self, prompt: Prompt) -> bool;

    /// Blocks until the user picks how to set up the database.
    async fn show_initial_config(&self) -> DatabaseMode;
}
