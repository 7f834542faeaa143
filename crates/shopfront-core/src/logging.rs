//! Tracing subscriber setup.
//!
//! The TUI owns stdout/stderr, so logs always go to a file: either the
//! configured `log.file` or a daily-rolling file under `$SHOPFRONT_HOME/logs`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LogConfig, paths};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SHOPFRONT_LOG";

const LOG_FILE_PREFIX: &str = "shopfront.log";

/// Installs the global tracing subscriber.
///
/// Keep the returned guard alive for the lifetime of the process; dropping it
/// flushes and stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
    let filter = build_filter(config);

    let (writer, guard) = match config.file.as_deref().map(str::trim) {
        Some(file) if !file.is_empty() => {
            let path = Path::new(file);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_appender::non_blocking(file)
        }
        _ => {
            let dir = paths::logs_dir();
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(BoxMakeWriter::new(writer))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

/// `SHOPFRONT_LOG` wins over the configured level; invalid directives fall back to `info`.
fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
