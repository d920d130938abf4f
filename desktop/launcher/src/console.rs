//! Command loop connecting typed commands to the lifecycle handle.

use crate::console_command::{ConsoleCommand, HELP};
use crate::console_ui::{ConsoleUi, InputLines, next_line};

use sl_core::{LifecycleError, LifecycleHandle, LifecycleResult, UserInterface};

use std::path::Path;

use tracing::info;

/// Read and dispatch commands until stdin closes or an exit is accepted.
///
/// Returns `true` if the user asked to exit.
pub async fn run_commands(
    handle: &LifecycleHandle,
    lines: &InputLines,
    ui: &ConsoleUi,
    log_file: &Path,
) -> bool {
    ui.say(HELP);

    while let Some(line) = next_line(lines).await {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(message) => {
                ui.say(&message);
                continue;
            }
        };

        if dispatch(handle, command, ui, log_file).await {
            return true;
        }
    }

    info!("Console input closed");
    false
}

/// Execute one command. Returns `true` once an exit has been accepted.
pub async fn dispatch(
    handle: &LifecycleHandle,
    command: ConsoleCommand,
    ui: &ConsoleUi,
    log_file: &Path,
) -> bool {
    match command {
        ConsoleCommand::Start => {
            report(ui, handle.request_start().await);
        }
        ConsoleCommand::Stop => {
            report(ui, handle.request_stop().await);
        }
        ConsoleCommand::Browser => {
            report(ui, handle.request_launch_browser().await);
        }
        ConsoleCommand::Ports(ports) => {
            if report(ui, handle.set_preferred_ports(ports).await) {
                ui.say(&format!("Ports for the next start: {ports}"));
            }
        }
        ConsoleCommand::Clear => handle.clear_output(),
        ConsoleCommand::Status => {
            let snapshot = handle.snapshot();
            ui.say(&snapshot.status);
            ui.say(&format!("  ports: {}", snapshot.ports));
            ui.say(&format!("  database mode: {}", snapshot.mode.label()));
            ui.say(&format!("  log file: {}", log_file.display()));
        }
        ConsoleCommand::Help => ui.say(HELP),
        ConsoleCommand::Exit => return report(ui, handle.request_exit(false).await),
    }

    false
}

/// Show a failed request to the user. Returns `true` on success.
fn report(ui: &ConsoleUi, result: LifecycleResult<()>) -> bool {
    match result {
        Ok(()) => true,
        // Already shown with the offending field.
        Err(LifecycleError::PortUnavailable { .. }) => false,
        Err(e) if e.is_silent() => false,
        Err(e) => {
            ui.show_error(e.recovery_hint());
            false
        }
    }
}
