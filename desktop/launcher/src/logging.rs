//! Logging setup with file rotation and output capture.

use crate::error::{LauncherError, LauncherResult};

use sl_config::Config;
use sl_core::OutputSink;

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt};

const DEFAULT_LOG_FILE_PREFIX: &str = "standalone-launcher";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Setup logging with rotating file output and a copy into the output sink.
///
/// # Log Layers
/// - File: plain text, daily rotation, 7-day retention
/// - Output sink: human-readable lines shown next to the server's own output
///
/// `RUST_LOG` overrides the configured level. `log` records from the
/// configuration crate are bridged into `tracing`.
pub fn setup_logging(
    config: &Config,
    config_dir: &Path,
    output: &OutputSink,
) -> LauncherResult<()> {
    let logs_dir = config.log_dir(config_dir);
    std::fs::create_dir_all(&logs_dir)
        .map_err(|e| LauncherError::logging(format!("{}: {e}", logs_dir.display())))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(log_file_prefix(config))
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&logs_dir)
        .map_err(|e| LauncherError::logging(e.to_string()))?;

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(file_appender);

    let sink = output.clone();
    let output_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(config.logging.colored)
        .with_writer(move || sink.writer());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(output_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LauncherError::logging(e.to_string()))?;

    tracing_log::LogTracer::init_with_filter(*config.logging.level)
        .map_err(|e| LauncherError::logging(e.to_string()))?;

    Ok(())
}

fn log_file_prefix(config: &Config) -> &str {
    config
        .logging
        .file
        .as_deref()
        .unwrap_or(DEFAULT_LOG_FILE_PREFIX)
}

/// Path of today's log file.
pub fn current_log_path(config: &Config, config_dir: &Path) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d");
    config.log_dir(config_dir).join(format!(
        "{}.{today}.{LOG_FILE_SUFFIX}",
        log_file_prefix(config)
    ))
}
