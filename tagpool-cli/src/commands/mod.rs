//! CLI command implementations.

pub mod cache;
pub mod config;
pub mod item;
pub mod tag;

use tagpool::cache::{open_backend, BackendAdapter};
use tagpool::config::ConfigFile;
use tagpool::{Backend, BackendConfig, TaggedPool};
use tracing::warn;

use crate::error::CliError;

/// Pool of string values over whichever backend the config selects.
pub type CliPool = TaggedPool<BackendAdapter<Box<dyn Backend>>, String>;

/// Open the pool described by `config`.
pub fn open_pool(config: &ConfigFile) -> Result<CliPool, CliError> {
    let backend_config = config.backend_config();
    if matches!(backend_config, BackendConfig::Memory { .. }) {
        warn!("Memory backend selected; nothing will outlive this command");
    }
    let backend = open_backend(&backend_config)?;
    Ok(TaggedPool::with_backend(backend))
}
