
use crate::console_ui::{ConsoleUi, InputLines};

use sl_config::Config;
use sl_core::{
    DatabaseMode, LifecycleController, OutputSink, PortAssignment, PortProbe, ProcessError,
    ProcessManager, ProcessResult, UserInterface,
};

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Upper bound for any await in a test.
pub(crate) const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminal stand-in capturing everything written to it.
#[derive(Clone, Default)]
pub(crate) struct Screen(Arc<Mutex<Vec<u8>>>);

impl Screen {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Console UI reading the given lines, then end of input.
pub(crate) fn scripted_console(answers: &[&str]) -> (ConsoleUi, Screen) {
    let (tx, rx) = mpsc::channel(answers.len().max(1));
    for answer in answers {
        tx.try_send(answer.to_string()).unwrap();
    }
    drop(tx);

    let lines: InputLines = Arc::new(tokio::sync::Mutex::new(rx));
    let screen = Screen::default();
    let ui = ConsoleUi::new(Box::new(screen.clone()), lines);
    (ui, screen)
}

/// Every port is free.
pub(crate) struct FreePorts;

impl PortProbe for FreePorts {
    fn is_free(&self, _port: u16) -> bool {
        true
    }
}

/// In-memory server: starts instantly unless told to fail.
#[derive(Default)]
pub(crate) struct FakeServer {
    fail_start: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    browsers: AtomicUsize,
}

impl FakeServer {
    pub(crate) fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub(crate) fn browsers(&self) -> usize {
        self.browsers.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessManager for FakeServer {
    async fn start(&self, _ports: PortAssignment, _mode: DatabaseMode) -> ProcessResult<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(ProcessError::other("server crashed on boot"));
        }
        Ok(())
    }

    async fn stop(&self) -> ProcessResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exit(&self) -> ProcessResult<()> {
        self.stop().await
    }

    async fn launch_browser(&self, _web_port: u16) -> ProcessResult<()> {
        self.browsers.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) fn controller(
    server: &Arc<FakeServer>,
    ui: Arc<dyn UserInterface>,
    output: &OutputSink,
) -> LifecycleController {
    LifecycleController::new(
        &Config::default(),
        Arc::clone(server) as Arc<dyn ProcessManager>,
        ui,
        output.clone(),
        Arc::new(FreePorts),
    )
}

/// Poll `condition` until it holds or `TEST_TIMEOUT` passes.
pub(crate) async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(TEST_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
