use crate::{DatabaseMode, PortAssignment, ProcessResult};

use async_trait::async_trait;

/// The embedded server bootstrap, treated as a black box.
///
/// Calls may block for seconds; the controller always runs them on a
/// background task and bounds them with its own timeouts.
#[async_trait]
pub trait ProcessManager: Send + Sync {
    /// Boot the web container and database; return once the server is ready.
    async fn start(&self, ports: PortAssignment, mode: DatabaseMode) -> ProcessResult<()>;

    async fn stop(&self) -> ProcessResult<()>;

    /// Final teardown before the launcher terminates.
    async fn exit(&self) -> ProcessResult<()>;

    async fn launch_browser(&self, web_port: u16) -> ProcessResult<()>;
}
