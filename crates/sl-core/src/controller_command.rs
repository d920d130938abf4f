use crate::{DatabaseMode, LifecycleResult, PortAssignment};

use tokio::sync::oneshot;

pub type Reply = oneshot::Sender<LifecycleResult<()>>;

/// User intents sent from the presentation layer to the controller task.
///
/// A channel keeps the controller the single consumer of every request, so
/// transitions never run concurrently.
#[derive(Debug)]
pub enum ControllerCommand {
    Start { reply: Reply },
    Stop { reply: Reply },
    /// `confirmed` skips the exit prompt (signals, window manager close)
    Exit { confirmed: bool, reply: Reply },
    LaunchBrowser { reply: Reply },
    SetPreferredPorts { ports: PortAssignment, reply: Reply },
    AutoSelectPorts { reply: Reply },
    SelectMode { mode: DatabaseMode, reply: Reply },
}
