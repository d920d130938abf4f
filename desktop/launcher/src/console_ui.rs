//! Terminal presentation layer.

use sl_core::{
    DatabaseMode, OutputEvent, OutputSink, OutputSubscription, PortAssignment, PortField, Prompt,
    UserInterface,
};

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

const INPUT_CHANNEL_CAPACITY: usize = 32;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Lines typed by the user, shared between the command loop and prompts.
///
/// Whoever holds the lock owns the next line; the command loop releases it
/// before dispatching, so a confirmation prompt can read the answer.
pub type InputLines = Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>;

/// Read stdin on a dedicated thread and forward each line.
pub fn stdin_lines() -> InputLines {
    let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);

    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    Arc::new(tokio::sync::Mutex::new(rx))
}

pub async fn next_line(lines: &InputLines) -> Option<String> {
    lines.lock().await.recv().await
}

type Out = Arc<Mutex<Box<dyn Write + Send>>>;

/// [`UserInterface`] on a terminal.
///
/// Never logs while holding the output lock: log lines travel through the
/// output sink, whose subscriber writes to the same terminal.
pub struct ConsoleUi {
    out: Out,
    lines: InputLines,
    start_enabled: AtomicBool,
    stop_enabled: AtomicBool,
}

impl ConsoleUi {
    pub fn new(out: Box<dyn Write + Send>, lines: InputLines) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            lines,
            start_enabled: AtomicBool::new(false),
            stop_enabled: AtomicBool::new(false),
        }
    }

    pub fn stdout(lines: InputLines) -> Self {
        Self::new(Box::new(io::stdout()), lines)
    }

    pub fn say(&self, text: &str) {
        write_out(&self.out, &format!("{text}\n"));
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled.load(Ordering::SeqCst)
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled.load(Ordering::SeqCst)
    }

    /// Mirror the output sink onto the terminal until the returned
    /// subscription is dropped.
    pub fn render(&self, output: &OutputSink) -> OutputSubscription {
        let out = Arc::clone(&self.out);
        output.subscribe(move |event| match event {
            OutputEvent::Written(text) => write_out(&out, text),
            OutputEvent::Cleared => write_out(&out, CLEAR_SCREEN),
        })
    }

    /// Ask until the answer is a number from the menu. End of input keeps
    /// the database unchanged.
    async fn choose_mode(&self) -> DatabaseMode {
        self.say("");
        self.say("How should the database be set up?");
        for (index, mode) in DatabaseMode::ALL.iter().enumerate() {
            self.say(&format!(
                "  {}) {} - {}",
                index + 1,
                mode.label(),
                mode.description()
            ));
        }

        loop {
            self.say(&format!("Choose 1-{}:", DatabaseMode::ALL.len()));
            let Some(answer) = next_line(&self.lines).await else {
                return DatabaseMode::default();
            };

            let choice = answer
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| DatabaseMode::ALL.get(i).copied());

            if let Some(mode) = choice {
                return mode;
            }
        }
    }
}

fn write_out(out: &Out, text: &str) {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

/// `y` or `yes`, any case.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl UserInterface for ConsoleUi {
    fn set_status(&self, title: &str) {
        self.say(&format!("== {title} =="));
    }

    fn enable_start(&self, enable: bool) {
        self.start_enabled.store(enable, Ordering::SeqCst);
    }

    fn enable_stop(&self, enable: bool) {
        self.stop_enabled.store(enable, Ordering::SeqCst);
    }

    fn show_port_error(&self, field: PortField, message: &str) {
        self.say(&format!("{message} (use: ports <web> <data>, {field} port)"));
    }

    fn show_error(&self, message: &str) {
        self.say(&format!("Error: {message}"));
    }

    fn ports_changed(&self, ports: PortAssignment) {
        self.say(&format!(
            "Using web server port {} and database port {}",
            ports.web_port, ports.data_port
        ));
    }

    async fn confirm(&self, prompt: Prompt) -> bool {
        self.say(&format!("{} [y/N]", prompt.message()));
        match next_line(&self.lines).await {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }

    async fn show_initial_config(&self) -> DatabaseMode {
        self.choose_mode().await
    }
}
