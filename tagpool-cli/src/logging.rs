//! Tracing subscriber setup.
//!
//! Logs go to stderr so command output on stdout stays clean. When a log file
//! is configured, events are also written there through a non-blocking
//! appender; the returned guard must be held until exit to flush it.

use std::path::Path;

use tagpool::config::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::CliError;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level; `--verbose` forces debug.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<Option<WorkerGuard>, CliError> {
    let level = if verbose { "debug" } else { settings.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339());

    let Some(path) = settings.file.as_deref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|e| CliError::Logging(e.to_string()))?;
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::Logging(format!("'{}' is not a file path", path.display())))?;
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory).map_err(|e| CliError::Logging(e.to_string()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        directory, file_name,
    ));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_timer(LocalTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(Some(guard))
}
