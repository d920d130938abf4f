//! Server lifecycle control for the standalone launcher.
//!
//! Contains the port allocator, the output sink, the one-shot database mode
//! selector and the lifecycle controller that ties them to an external
//! process manager and presentation layer.

mod controller_command;
mod controller_snapshot;
mod database_mode;
mod error;
mod handle;
mod lifecycle;
mod mode_selector;
mod output_sink;
mod port;
mod port_assignment;
mod process_manager;
mod server_state;
mod user_interface;
mod worker_event;

#[cfg(test)]
mod tests;

pub use controller_command::ControllerCommand;
pub use controller_snapshot::ControllerSnapshot;
pub use database_mode::DatabaseMode;
pub use error::{LifecycleError, LifecycleResult, ProcessError, ProcessResult};
pub use handle::{LifecycleHandle, StateSubscription};
pub use lifecycle::LifecycleController;
pub use mode_selector::ModeSelector;
pub use output_sink::{OutputEvent, OutputSink, OutputSubscription, OutputWriter};
pub use port::{PortAllocator, PortProbe, TcpPortProbe};
pub use port_assignment::{PortAssignment, PortField};
pub use process_manager::ProcessManager;
pub use server_state::ServerState;
pub use user_interface::{Prompt, UserInterface};
pub use worker_event::WorkerEvent;
