//! Server lifecycle state machine.

use crate::{
    ControllerCommand, ControllerSnapshot, DatabaseMode, LifecycleError, LifecycleHandle,
    LifecycleResult, ModeSelector, OutputSink, PortAllocator, PortAssignment, PortField, PortProbe,
    ProcessManager, Prompt, ServerState, UserInterface, WorkerEvent,
};

use std::sync::Arc;
use std::time::Duration;

use sl_config::Config;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Owns the server state and performs every transition.
///
/// Responsibilities:
/// - Validate ports before a start and report the offending field
/// - Run process manager calls on background tasks, bounded by timeouts
/// - Ask for confirmation before stopping or exiting a live server
/// - Publish a snapshot after every change
///
/// The controller is driven by a single task (`run`); the presentation layer
/// talks to it through a [`LifecycleHandle`].
pub struct LifecycleController {
    title: String,
    allocator: PortAllocator,
    process: Arc<dyn ProcessManager>,
    ui: Arc<dyn UserInterface>,
    output: OutputSink,
    modes: ModeSelector,
    state: ServerState,
    ports: PortAssignment,
    start_enabled: bool,
    stop_enabled: bool,
    exited: bool,
    start_timeout: Duration,
    stop_timeout: Duration,
    exit_timeout: Duration,
    snapshot_tx: watch::Sender<ControllerSnapshot>,
    command_tx: mpsc::Sender<ControllerCommand>,
    command_rx: mpsc::Receiver<ControllerCommand>,
    worker_tx: mpsc::UnboundedSender<WorkerEvent>,
    worker_rx: mpsc::UnboundedReceiver<WorkerEvent>,
}

impl LifecycleController {
    /// Create a controller in the launch state: `Starting`, all controls off.
    pub fn new(
        config: &Config,
        process: Arc<dyn ProcessManager>,
        ui: Arc<dyn UserInterface>,
        output: OutputSink,
        probe: Arc<dyn PortProbe>,
    ) -> Self {
        let title = config.launcher.title.clone();
        let ports = PortAssignment::from(&config.ports);
        let state = ServerState::Starting;

        let (snapshot_tx, _) = watch::channel(ControllerSnapshot {
            state,
            status: state.status_title(&title),
            ports,
            mode: DatabaseMode::default(),
            start_enabled: false,
            stop_enabled: false,
        });
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();

        Self {
            title,
            allocator: PortAllocator::new(probe, config.ports.max),
            process,
            ui,
            output,
            modes: ModeSelector::new(),
            state,
            ports,
            start_enabled: false,
            stop_enabled: false,
            exited: false,
            start_timeout: config.lifecycle.start_timeout(),
            stop_timeout: config.lifecycle.stop_timeout(),
            exit_timeout: config.lifecycle.exit_timeout(),
            snapshot_tx,
            command_tx,
            command_rx,
            worker_tx,
            worker_rx,
        }
    }

    pub fn handle(&self) -> LifecycleHandle {
        LifecycleHandle::new(
            self.command_tx.clone(),
            self.snapshot_tx.subscribe(),
            self.output.clone(),
        )
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn port_assignment(&self) -> PortAssignment {
        self.ports
    }

    pub fn database_mode(&self) -> DatabaseMode {
        self.modes.effective()
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled
    }

    /// True once the exit teardown has finished.
    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn status(&self) -> String {
        self.state.status_title(&self.title)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            status: self.status(),
            ports: self.ports,
            mode: self.modes.effective(),
            start_enabled: self.start_enabled,
            stop_enabled: self.stop_enabled,
        }
    }

    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    /// Launch sequence: choose the database mode on a fresh install, advance
    /// the preferred ports to free ones, then start the server.
    ///
    /// If no port can be found the controller settles in `Stopped` with start
    /// enabled so the user can enter ports by hand.
    pub async fn boot(&mut self, fresh_install: bool) -> LifecycleResult<()> {
        self.transition(ServerState::Starting, false, false);

        if fresh_install {
            let mode = self.modes.present(self.ui.as_ref()).await?;
            info!("Fresh install, database mode: {mode}");
        }

        match self.allocator.allocate(self.ports) {
            Ok(ports) => self.apply_ports(ports),
            Err(e) => {
                error!("Automatic port selection failed: {e}");
                self.output.write_line(&format!("ERROR: {e}"));
                self.ui.show_error(e.recovery_hint());
                self.transition(ServerState::Stopped, true, false);
                return Err(e);
            }
        }

        self.begin_start();
        Ok(())
    }

    /// Start the server if it is stopped and both ports pass validation.
    ///
    /// Any other state makes this a no-op.
    pub fn request_start(&mut self) -> LifecycleResult<()> {
        if self.state != ServerState::Stopped {
            debug!("Ignoring start request while {}", self.state);
            return Ok(());
        }

        if let Err(e) = self.allocator.validate(self.ports) {
            warn!("Start rejected: {e}");
            if let LifecycleError::PortUnavailable { field, .. } = &e {
                self.ui.show_port_error(*field, &field.unavailable_message());
            }
            return Err(e);
        }

        self.transition(ServerState::Starting, false, false);
        self.begin_start();
        Ok(())
    }

    /// Stop a running server after the user confirms.
    pub async fn request_stop(&mut self) -> LifecycleResult<()> {
        if self.state != ServerState::Running {
            debug!("Ignoring stop request while {}", self.state);
            return Ok(());
        }

        if !self.ui.confirm(Prompt::StopServer).await {
            info!("Stop cancelled by user");
            return Err(LifecycleError::UserCancelled);
        }

        self.transition(ServerState::Stopping, false, false);

        let process = Arc::clone(&self.process);
        let worker_tx = self.worker_tx.clone();
        let stop_timeout = self.stop_timeout;

        tokio::spawn(async move {
            let result = stop_within(process.as_ref(), stop_timeout).await;
            let _ = worker_tx.send(WorkerEvent::StopFinished(result));
        });

        Ok(())
    }

    /// Tear everything down. A live server needs confirmation unless the
    /// caller already has it (signals, window close).
    pub async fn request_exit(&mut self, confirmed: bool) -> LifecycleResult<()> {
        if self.state == ServerState::Exiting {
            debug!("Exit already in progress");
            return Ok(());
        }

        let live = matches!(self.state, ServerState::Running | ServerState::Stopping);
        if live && !confirmed && !self.ui.confirm(Prompt::Exit).await {
            info!("Exit cancelled by user");
            return Err(LifecycleError::UserCancelled);
        }

        self.transition(ServerState::Exiting, false, false);

        let process = Arc::clone(&self.process);
        let worker_tx = self.worker_tx.clone();
        let exit_timeout = self.exit_timeout;

        tokio::spawn(async move {
            let result = match tokio::time::timeout(exit_timeout, process.exit()).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(LifecycleError::process_stop(e)),
                Err(_) => Err(LifecycleError::stop_timeout(exit_timeout.as_secs())),
            };
            let _ = worker_tx.send(WorkerEvent::ExitFinished(result));
        });

        Ok(())
    }

    /// Open the web UI in a browser. Only available while running.
    pub fn request_launch_browser(&mut self) -> LifecycleResult<()> {
        if self.state != ServerState::Running {
            debug!("Ignoring browser launch while {}", self.state);
            return Ok(());
        }

        let process = Arc::clone(&self.process);
        let worker_tx = self.worker_tx.clone();
        let web_port = self.ports.web_port;

        tokio::spawn(async move {
            let result = process
                .launch_browser(web_port)
                .await
                .map_err(LifecycleError::browser_launch);
            let _ = worker_tx.send(WorkerEvent::BrowserFinished(result));
        });

        Ok(())
    }

    /// Replace the preferred ports. Only allowed while stopped; availability
    /// is checked again at the next start.
    pub fn set_preferred_ports(&mut self, ports: PortAssignment) -> LifecycleResult<()> {
        if self.state != ServerState::Stopped {
            return Err(LifecycleError::ports_locked(self.state));
        }

        let rejected = if !self.allocator.in_range(ports.web_port) {
            Some(LifecycleError::port_unavailable(PortField::Web, ports.web_port))
        } else if !self.allocator.in_range(ports.data_port) || ports.data_port == ports.web_port {
            Some(LifecycleError::port_unavailable(PortField::Data, ports.data_port))
        } else {
            None
        };

        if let Some(e) = rejected {
            if let LifecycleError::PortUnavailable { field, .. } = &e {
                self.ui.show_port_error(*field, &field.unavailable_message());
            }
            return Err(e);
        }

        info!("Preferred ports set to {ports}");
        self.ports = ports;
        self.publish();
        Ok(())
    }

    /// Advance the current ports to the first free values.
    pub fn auto_select_ports(&mut self) -> LifecycleResult<()> {
        if self.state != ServerState::Stopped {
            return Err(LifecycleError::ports_locked(self.state));
        }

        match self.allocator.allocate(self.ports) {
            Ok(ports) => {
                self.apply_ports(ports);
                Ok(())
            }
            Err(e) => {
                error!("Automatic port selection failed: {e}");
                self.output.write_line(&format!("ERROR: {e}"));
                Err(e)
            }
        }
    }

    /// Pre-select the database mode, e.g. from the command line.
    pub fn select_database_mode(&mut self, mode: DatabaseMode) -> LifecycleResult<()> {
        self.modes.select(mode)?;
        self.publish();
        Ok(())
    }

    /// Apply a background task's result.
    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::StartFinished(result) => {
                if self.state != ServerState::Starting {
                    debug!("Start finished while {}, ignoring", self.state);
                    return;
                }

                match result {
                    Ok(()) => {
                        info!("Server running on {}", self.ports);
                        self.transition(ServerState::Running, false, true);
                    }
                    Err(e) => {
                        error!("Server start failed: {e}");
                        self.output.write_line(&format!("ERROR: {e}"));
                        self.ui.show_error(e.recovery_hint());
                        self.transition(ServerState::Stopped, true, false);
                    }
                }
            }
            WorkerEvent::StopFinished(result) => {
                if self.state != ServerState::Stopping {
                    debug!("Stop finished while {}, ignoring", self.state);
                    return;
                }

                if let Err(e) = result {
                    warn!("Server stop failed, treating as stopped: {e}");
                    self.output.write_line(&format!("ERROR: {e}"));
                }
                self.transition(ServerState::Stopped, true, false);
            }
            WorkerEvent::ExitFinished(result) => {
                if let Err(e) = result {
                    warn!("Exit teardown failed: {e}");
                    self.output.write_line(&format!("ERROR: {e}"));
                }
                info!("Exit complete");
                self.exited = true;
            }
            WorkerEvent::BrowserFinished(result) => {
                if let Err(e) = result {
                    warn!("Browser launch failed: {e}");
                    self.output.write_line(&format!("ERROR: {e}"));
                    self.ui.show_error(e.recovery_hint());
                }
            }
        }
    }

    /// Wait for the next background result and apply it.
    ///
    /// Returns `false` if the worker channel is closed.
    pub async fn process_next_event(&mut self) -> bool {
        match self.worker_rx.recv().await {
            Some(event) => {
                self.handle_worker_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply background results until no transition is in flight.
    pub async fn settle(&mut self) {
        while self.transition_pending() {
            if !self.process_next_event().await {
                break;
            }
        }
    }

    fn transition_pending(&self) -> bool {
        self.state.is_in_flight() && !self.exited
    }

    /// Execute one presentation-layer command and reply with its outcome.
    pub async fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Start { reply } => {
                let _ = reply.send(self.request_start());
            }
            ControllerCommand::Stop { reply } => {
                let _ = reply.send(self.request_stop().await);
            }
            ControllerCommand::Exit { confirmed, reply } => {
                let _ = reply.send(self.request_exit(confirmed).await);
            }
            ControllerCommand::LaunchBrowser { reply } => {
                let _ = reply.send(self.request_launch_browser());
            }
            ControllerCommand::SetPreferredPorts { ports, reply } => {
                let _ = reply.send(self.set_preferred_ports(ports));
            }
            ControllerCommand::AutoSelectPorts { reply } => {
                let _ = reply.send(self.auto_select_ports());
            }
            ControllerCommand::SelectMode { mode, reply } => {
                let _ = reply.send(self.select_database_mode(mode));
            }
        }
    }

    /// Control loop. Worker results are applied before new commands.
    ///
    /// The loop ends once the exit teardown has finished, or once every
    /// [`LifecycleHandle`] is gone and no transition is in flight.
    pub async fn run(mut self) {
        info!("Lifecycle controller started");

        // Only the handles keep the command queue open from here on.
        let (closed_tx, _) = mpsc::channel(1);
        drop(std::mem::replace(&mut self.command_tx, closed_tx));

        let mut commands_open = true;

        while !self.exited {
            tokio::select! {
                biased;

                event = self.worker_rx.recv() => match event {
                    Some(event) => self.handle_worker_event(event),
                    None => break,
                },
                command = self.command_rx.recv(), if commands_open => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        info!("All lifecycle handles dropped");
                        commands_open = false;
                    }
                },
            }

            if !commands_open && !self.transition_pending() {
                break;
            }
        }

        info!("Lifecycle controller stopped");
    }

    /// Spawn the start worker. The caller has already moved to `Starting`.
    fn begin_start(&mut self) {
        let mode = self.modes.lock();
        let ports = self.ports;
        info!("Starting server on {ports} (database mode: {mode})");

        let process = Arc::clone(&self.process);
        let worker_tx = self.worker_tx.clone();
        let start_timeout = self.start_timeout;
        let stop_timeout = self.stop_timeout;

        tokio::spawn(async move {
            let result = match tokio::time::timeout(start_timeout, process.start(ports, mode)).await
            {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(LifecycleError::process_start(e)),
                Err(_) => {
                    warn!(
                        "Server not ready after {}s, stopping it",
                        start_timeout.as_secs()
                    );
                    if let Err(e) = stop_within(process.as_ref(), stop_timeout).await {
                        warn!("Cleanup after start timeout failed: {e}");
                    }
                    Err(LifecycleError::start_timeout(start_timeout.as_secs()))
                }
            };
            let _ = worker_tx.send(WorkerEvent::StartFinished(result));
        });
    }

    fn apply_ports(&mut self, ports: PortAssignment) {
        if ports != self.ports {
            info!("Ports adjusted from {} to {ports}", self.ports);
            self.ports = ports;
            self.ui.ports_changed(ports);
        }
        self.publish();
    }

    fn transition(&mut self, to: ServerState, start_enabled: bool, stop_enabled: bool) {
        if self.state != to {
            info!("Server state: {} -> {to}", self.state);
        }

        self.state = to;
        self.start_enabled = start_enabled;
        self.stop_enabled = stop_enabled;

        self.ui.set_status(&self.status());
        self.ui.enable_start(start_enabled);
        self.ui.enable_stop(stop_enabled);
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

async fn stop_within(process: &dyn ProcessManager, timeout: Duration) -> LifecycleResult<()> {
    match tokio::time::timeout(timeout, process.stop()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(LifecycleError::process_stop(e)),
        Err(_) => Err(LifecycleError::stop_timeout(timeout.as_secs())),
    }
}
