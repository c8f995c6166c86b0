//! Whole-cache CLI commands.

use clap::Subcommand;
use tagpool::config::{format_size, ConfigFile};
use tagpool::Backend;

use crate::commands::CliPool;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove every entry from the backend
    Clear,
    /// Show backend statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(pool: &CliPool, config: &ConfigFile, action: CacheAction) -> Result<(), CliError> {
    match action {
        CacheAction::Clear => {
            if !pool.clear()? {
                return Err(CliError::Declined("clear (backend cannot flush)"));
            }
            println!("Cache cleared");
            Ok(())
        }
        CacheAction::Stats => {
            println!("Backend: {}", config.backend_config().name());

            match pool.backend().stats() {
                Some(stats) => {
                    println!("  Entries:  {}", stats.entry_count);
                    println!("  Size:     {}", format_size(stats.size_bytes));
                    println!("  Hits:     {}", stats.hits);
                    println!("  Misses:   {}", stats.misses);
                    println!("  Hit rate: {:.1}%", stats.hit_rate() * 100.0);
                }
                None => println!("  (no statistics available)"),
            }
            Ok(())
        }
    }
}
