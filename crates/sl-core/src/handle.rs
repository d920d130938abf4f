use crate::{
    ControllerCommand, ControllerSnapshot, DatabaseMode, LifecycleError, LifecycleResult,
    OutputSink, PortAssignment, ServerState, controller_command::Reply,
};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Presentation-side view of a running [`crate::LifecycleController`].
///
/// Requests are queued to the controller task and answered once handled;
/// state is read from the latest published snapshot.
#[derive(Clone)]
pub struct LifecycleHandle {
    command_tx: mpsc::Sender<ControllerCommand>,
    snapshot_rx: watch::Receiver<ControllerSnapshot>,
    output: OutputSink,
}

impl LifecycleHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<ControllerCommand>,
        snapshot_rx: watch::Receiver<ControllerSnapshot>,
        output: OutputSink,
    ) -> Self {
        Self {
            command_tx,
            snapshot_rx,
            output,
        }
    }

    async fn request(
        &self,
        build: impl FnOnce(Reply) -> ControllerCommand,
    ) -> LifecycleResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| LifecycleError::ControllerClosed)?;

        reply_rx.await.map_err(|_| LifecycleError::ControllerClosed)?
    }

    pub async fn request_start(&self) -> LifecycleResult<()> {
        self.request(|reply| ControllerCommand::Start { reply }).await
    }

    pub async fn request_stop(&self) -> LifecycleResult<()> {
        self.request(|reply| ControllerCommand::Stop { reply }).await
    }

    pub async fn request_exit(&self, confirmed: bool) -> LifecycleResult<()> {
        self.request(|reply| ControllerCommand::Exit { confirmed, reply })
            .await
    }

    /// Queue a confirmed exit from a thread outside the runtime (signal
    /// handlers). Does not wait for the controller to act on it.
    pub fn blocking_request_exit(&self) -> LifecycleResult<()> {
        let (reply, _) = oneshot::channel();

        self.command_tx
            .blocking_send(ControllerCommand::Exit {
                confirmed: true,
                reply,
            })
            .map_err(|_| LifecycleError::ControllerClosed)
    }

    pub async fn request_launch_browser(&self) -> LifecycleResult<()> {
        self.request(|reply| ControllerCommand::LaunchBrowser { reply })
            .await
    }

    pub async fn set_preferred_ports(&self, ports: PortAssignment) -> LifecycleResult<()> {
        self.request(|reply| ControllerCommand::SetPreferredPorts { ports, reply })
            .await
    }

    pub async fn auto_select_ports(&self) -> LifecycleResult<()> {
        self.request(|reply| ControllerCommand::AutoSelectPorts { reply })
            .await
    }

    pub async fn select_database_mode(&self, mode: DatabaseMode) -> LifecycleResult<()> {
        self.request(|reply| ControllerCommand::SelectMode { mode, reply })
            .await
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn state(&self) -> ServerState {
        self.snapshot_rx.borrow().state
    }

    /// Window title for the current state.
    pub fn status(&self) -> String {
        self.snapshot_rx.borrow().status.clone()
    }

    pub fn port_assignment(&self) -> PortAssignment {
        self.snapshot_rx.borrow().ports
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Call `callback` with every new snapshot until the returned handle is
    /// dropped. Must be called from within a Tokio runtime.
    pub fn on_state_changed<F>(&self, callback: F) -> StateSubscription
    where
        F: Fn(&ControllerSnapshot) + Send + 'static,
    {
        let mut rx = self.snapshot_rx.clone();
        rx.mark_unchanged();

        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                callback(&snapshot);
            }
        });

        StateSubscription { task }
    }

    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    pub fn clear_output(&self) {
        self.output.clear();
    }
}

/// Active `on_state_changed` registration; dropping it stops notifications.
#[must_use = "dropping the subscription stops notifications"]
pub struct StateSubscription {
    task: JoinHandle<()>,
}

impl StateSubscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for StateSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
