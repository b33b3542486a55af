//! Diagnostic logging for the MCP server.
//!
//! stdout carries MCP protocol traffic, so logs go to a daily rolling file
//! (or stderr when no data directory is usable). `RUST_LOG` overrides the
//! default filter.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jira_mcp=info,warn";

/// Application directory name under the platform data directory.
const APP_DIR: &str = "jira-mcp";

/// Log to `<data dir>/jira-mcp/logs/jira-mcp.log`, rotated daily.
///
/// Fails when the directory cannot be created or a global subscriber is
/// already installed; the caller then falls back to [`init_stderr`].
pub fn init() -> anyhow::Result<()> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "jira-mcp.log");

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

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %log_dir.display(),
        "jira-mcp starting up"
    );

    Ok(())
}

/// Fall back to stderr logging when the log directory is unusable.
pub fn init_stderr() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init();
}

fn log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join(APP_DIR).join("logs"))
}

pub fn shutdown() {
    tracing::info!("jira-mcp shutting down");
}
