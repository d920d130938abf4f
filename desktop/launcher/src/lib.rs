//! Standalone launcher: console front end for the server lifecycle
//! controller.

mod browser;
mod cli;
mod console;
mod console_command;
mod console_ui;
mod error;
mod install_marker;
mod logging;
mod process;
#[cfg(unix)]
mod signals;

#[cfg(test)]
mod tests;

pub use cli::Cli;
pub use console_command::ConsoleCommand;
pub use console_ui::ConsoleUi;
pub use error::{LauncherError, LauncherResult};
pub use install_marker::InstallMarker;
pub use process::CommandProcessManager;

use console_ui::stdin_lines;
use logging::{current_log_path, setup_logging};

use sl_config::Config;
use sl_core::{
    LifecycleController, OutputSink, PortProbe, ProcessManager, TcpPortProbe, UserInterface,
};

use std::sync::Arc;

use tracing::{info, warn};

/// Load configuration, boot the server and serve console commands until
/// the controller has finished its exit teardown.
pub async fn launch(cli: Cli) -> LauncherResult<()> {
    let config_dir = cli.resolve_config_dir()?;
    let mut config = Config::load_from(&config_dir)?;
    cli.apply(&mut config);
    config.validate()?;

    let output = OutputSink::new();
    let lines = stdin_lines();
    let ui = Arc::new(ConsoleUi::stdout(Arc::clone(&lines)));
    let _rendering = ui.render(&output);

    setup_logging(&config, &config_dir, &output)?;

    info!("Starting standalone launcher v{}", env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", config_dir.display());
    config.log_summary();

    let marker = InstallMarker::new(&config_dir);
    let fresh_install = cli.fresh_install || marker.is_fresh_install();

    let process = Arc::new(CommandProcessManager::new(
        &config,
        &config_dir,
        output.clone(),
    )?);

    let mut controller = LifecycleController::new(
        &config,
        process as Arc<dyn ProcessManager>,
        Arc::clone(&ui) as Arc<dyn UserInterface>,
        output.clone(),
        Arc::new(TcpPortProbe) as Arc<dyn PortProbe>,
    );

    let handle = controller.handle();
    let _first_run = fresh_install.then(|| marker.mark_on_first_run(&handle));

    if let Some(mode) = cli.mode {
        controller.select_database_mode(mode)?;
    }

    if let Err(e) = controller.boot(fresh_install).await {
        warn!("Server not started automatically: {e}");
    }

    #[cfg(unix)]
    signals::spawn_signal_handler(handle.clone());

    let mut control = tokio::spawn(controller.run());
    let log_file = current_log_path(&config, &config_dir);

    tokio::select! {
        result = &mut control => {
            return result.map_err(|e| LauncherError::controller(e.to_string()));
        }
        exit_requested = console::run_commands(&handle, &lines, &ui, &log_file) => {
            if !exit_requested {
                info!("No more console input; waiting for a signal to exit");
            }
        }
    }

    control
        .await
        .map_err(|e| LauncherError::controller(e.to_string()))?;

    info!("Standalone launcher stopped");
    Ok(())
}
