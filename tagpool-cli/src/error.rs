//! CLI error type.

use tagpool::config::ConfigError;
use tagpool::{BackendError, PoolError};
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line or configuration input.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Failed to open cache backend: {0}")]
    Backend(#[from] BackendError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// The key has no live entry.
    #[error("No cached value for '{0}'")]
    NotFound(String),

    /// The backend reported failure for an operation.
    #[error("Backend reported failure: {0}")]
    Declined(&'static str),
}
