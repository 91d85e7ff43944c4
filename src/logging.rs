//! Logging configuration using the tracing ecosystem.
//!
//! Logs go to a daily-rotated file so they never corrupt the TUI.
//! `RUST_LOG` overrides the default filter.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "helpqueue=info,warn";

/// Prefix of the daily log files.
const LOG_FILE_PREFIX: &str = "helpqueue.log";

/// Initialize the logging system.
///
/// # Log Directory
///
/// - Linux: `~/.local/share/helpqueue/logs/`
/// - macOS: `~/Library/Application Support/helpqueue/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\helpqueue\logs\`
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// or if a global subscriber is already set.
pub fn init() -> anyhow::Result<()> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "helpqueue starting up");
    tracing::debug!(log_dir = %dir.display(), "Log directory");

    Ok(())
}

fn log_dir() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("helpqueue").join("logs"))
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("helpqueue shutting down");
}
