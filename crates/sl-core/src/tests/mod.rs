mod port_properties;

use crate::{
    DatabaseMode, LifecycleController, OutputSink, PortAssignment, PortField, PortProbe,
    ProcessError, ProcessManager, ProcessResult, Prompt, UserInterface,
};

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sl_config::Config;

pub(crate) const WEB_PORT: u16 = 8080;
pub(crate) const DATA_PORT: u16 = 3306;
pub(crate) const TITLE: &str = "OpenMRS Standalone";

/// Upper bound for any await in a test.
pub(crate) const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Ordered record of calls across the process manager and the UI.
pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

// =========================================================================
// Port probe
// =========================================================================

/// Probe answering from a fixed set of busy ports.
#[derive(Default)]
pub(crate) struct FakeProbe {
    busy: Mutex<HashSet<u16>>,
}

impl FakeProbe {
    pub(crate) fn with_busy(ports: &[u16]) -> Self {
        Self {
            busy: Mutex::new(ports.iter().copied().collect()),
        }
    }

    pub(crate) fn occupy(&self, port: u16) {
        self.busy.lock().unwrap().insert(port);
    }

    pub(crate) fn release(&self, port: u16) {
        self.busy.lock().unwrap().remove(&port);
    }
}

impl PortProbe for FakeProbe {
    fn is_free(&self, port: u16) -> bool {
        !self.busy.lock().unwrap().contains(&port)
    }
}

// =========================================================================
// Process manager
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Succeed,
    Fail,
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Start(PortAssignment, DatabaseMode),
    Stop,
    Exit,
    LaunchBrowser(u16),
}

pub(crate) struct RecordingProcessManager {
    start: Mutex<Outcome>,
    stop: Mutex<Outcome>,
    exit: Mutex<Outcome>,
    browser: Mutex<Outcome>,
    calls: Mutex<Vec<Call>>,
    journal: Journal,
}

impl RecordingProcessManager {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            start: Mutex::new(Outcome::Succeed),
            stop: Mutex::new(Outcome::Succeed),
            exit: Mutex::new(Outcome::Succeed),
            browser: Mutex::new(Outcome::Succeed),
            calls: Mutex::new(Vec::new()),
            journal,
        }
    }

    pub(crate) fn set_start(&self, outcome: Outcome) {
        *self.start.lock().unwrap() = outcome;
    }

    pub(crate) fn set_stop(&self, outcome: Outcome) {
        *self.stop.lock().unwrap() = outcome;
    }

    pub(crate) fn set_exit(&self, outcome: Outcome) {
        *self.exit.lock().unwrap() = outcome;
    }

    pub(crate) fn set_browser(&self, outcome: Outcome) {
        *self.browser.lock().unwrap() = outcome;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn start_calls(&self) -> Vec<(PortAssignment, DatabaseMode)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Start(ports, mode) => Some((ports, mode)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    fn record(&self, call: Call, name: &str) {
        self.calls.lock().unwrap().push(call);
        self.journal.lock().unwrap().push(name.to_string());
    }

    async fn resolve(outcome: Outcome, name: &str) -> ProcessResult<()> {
        match outcome {
            Outcome::Succeed => Ok(()),
            Outcome::Fail => Err(ProcessError::other(format!("{name} blew up"))),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ProcessManager for RecordingProcessManager {
    async fn start(&self, ports: PortAssignment, mode: DatabaseMode) -> ProcessResult<()> {
        self.record(Call::Start(ports, mode), "start");
        let outcome = *self.start.lock().unwrap();
        Self::resolve(outcome, "start").await
    }

    async fn stop(&self) -> ProcessResult<()> {
        self.record(Call::Stop, "stop");
        let outcome = *self.stop.lock().unwrap();
        Self::resolve(outcome, "stop").await
    }

    async fn exit(&self) -> ProcessResult<()> {
        self.record(Call::Exit, "exit");
        let outcome = *self.exit.lock().unwrap();
        Self::resolve(outcome, "exit").await
    }

    async fn launch_browser(&self, web_port: u16) -> ProcessResult<()> {
        self.record(Call::LaunchBrowser(web_port), "launch_browser");
        let outcome = *self.browser.lock().unwrap();
        Self::resolve(outcome, "launch_browser").await
    }
}

// =========================================================================
// User interface
// =========================================================================

pub(crate) struct ScriptedUi {
    answers: Mutex<VecDeque<bool>>,
    initial_mode: Mutex<DatabaseMode>,
    pub(crate) prompts: Mutex<Vec<Prompt>>,
    pub(crate) statuses: Mutex<Vec<String>>,
    pub(crate) start_enabled: Mutex<Option<bool>>,
    pub(crate) stop_enabled: Mutex<Option<bool>>,
    pub(crate) port_errors: Mutex<Vec<(PortField, String)>>,
    pub(crate) errors: Mutex<Vec<String>>,
    pub(crate) ports_changed: Mutex<Vec<PortAssignment>>,
    journal: Journal,
}

impl ScriptedUi {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            initial_mode: Mutex::new(DatabaseMode::NoChanges),
            prompts: Mutex::new(Vec::new()),
            statuses: Mutex::new(Vec::new()),
            start_enabled: Mutex::new(None),
            stop_enabled: Mutex::new(None),
            port_errors: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            ports_changed: Mutex::new(Vec::new()),
            journal,
        }
    }

    /// Queue the answer to the next confirmation prompt. Unscripted prompts
    /// are answered "yes".
    pub(crate) fn answer(&self, yes: bool) {
        self.answers.lock().unwrap().push_back(yes);
    }

    pub(crate) fn choose_mode(&self, mode: DatabaseMode) {
        *self.initial_mode.lock().unwrap() = mode;
    }

    pub(crate) fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub(crate) fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserInterface for ScriptedUi {
    fn set_status(&self, title: &str) {
        self.statuses.lock().unwrap().push(title.to_string());
    }

    fn enable_start(&self, enable: bool) {
        *self.start_enabled.lock().unwrap() = Some(enable);
    }

    fn enable_stop(&self, enable: bool) {
        *self.stop_enabled.lock().unwrap() = Some(enable);
    }

    fn show_port_error(&self, field: PortField, message: &str) {
        self.port_errors
            .lock()
            .unwrap()
            .push((field, message.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn ports_changed(&self, ports: PortAssignment) {
        self.ports_changed.lock().unwrap().push(ports);
    }

    async fn confirm(&self, prompt: Prompt) -> bool {
        self.prompts.lock().unwrap().push(prompt);
        self.answers.lock().unwrap().pop_front().unwrap_or(true)
    }

    async fn show_initial_config(&self) -> DatabaseMode {
        self.journal
            .lock()
            .unwrap()
            .push("show_initial_config".to_string());
        *self.initial_mode.lock().unwrap()
    }
}

// =========================================================================
// Harness
// =========================================================================

pub(crate) struct Harness {
    pub(crate) controller: LifecycleController,
    pub(crate) process: Arc<RecordingProcessManager>,
    pub(crate) ui: Arc<ScriptedUi>,
    pub(crate) probe: Arc<FakeProbe>,
    pub(crate) output: OutputSink,
    pub(crate) journal: Journal,
}

pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.launcher.title = TITLE.to_string();
    config.ports.web = WEB_PORT;
    config.ports.data = DATA_PORT;
    config.lifecycle.start_timeout_secs = 30;
    config.lifecycle.stop_timeout_secs = 10;
    config.lifecycle.exit_timeout_secs = 10;
    config
}

pub(crate) fn harness() -> Harness {
    harness_with(test_config(), FakeProbe::default())
}

pub(crate) fn harness_with(config: Config, probe: FakeProbe) -> Harness {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let process = Arc::new(RecordingProcessManager::new(Arc::clone(&journal)));
    let ui = Arc::new(ScriptedUi::new(Arc::clone(&journal)));
    let probe = Arc::new(probe);
    let output = OutputSink::new();

    let controller = LifecycleController::new(
        &config,
        Arc::clone(&process) as Arc<dyn ProcessManager>,
        Arc::clone(&ui) as Arc<dyn UserInterface>,
        output.clone(),
        Arc::clone(&probe) as Arc<dyn PortProbe>,
    );

    Harness {
        controller,
        process,
        ui,
        probe,
        output,
        journal,
    }
}

impl Harness {
    /// Boot (not a fresh install) and wait until the server is running.
    pub(crate) async fn running(mut self) -> Self {
        self.controller.boot(false).await.unwrap();
        self.settle().await;
        assert_eq!(self.controller.state(), crate::ServerState::Running);
        self
    }

    /// Boot, then stop cleanly so the controller rests in `Stopped`.
    pub(crate) async fn stopped(self) -> Self {
        let mut harness = self.running().await;
        harness.controller.request_stop().await.unwrap();
        harness.settle().await;
        assert_eq!(harness.controller.state(), crate::ServerState::Stopped);
        harness
    }

    pub(crate) async fn settle(&mut self) {
        tokio::time::timeout(TEST_TIMEOUT, self.controller.settle())
            .await
            .expect("controller did not settle");
    }

    pub(crate) fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}
