//! tagpool - command-line access to a tagged cache pool
//!
//! Every command opens the backend selected in the configuration file, runs
//! one pool operation and exits. Only the disk backend keeps data between
//! invocations.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tagpool::config::ConfigFile;
use tracing::debug;

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::tag::TagAction;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tagpool")]
#[command(version, about = "Tagged cache pool over memory or disk storage", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.config/tagpool/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a cached value
    Get {
        key: String,

        /// Also print tags and expiration
        #[arg(long)]
        details: bool,
    },

    /// Store a value
    Set {
        key: String,
        value: String,

        /// Tag to attach (repeatable); replaces the stored tags
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Lifetime in seconds; 0 means never expire (default: cache.default_ttl)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Delete one or more keys
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print whether a key holds a live value
    Has { key: String },

    /// Inspect or invalidate tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Clear the cache or show statistics
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands edit the file, so they must work even when it is broken.
    let command = match cli.command {
        Commands::Config { command } => {
            return commands::config::run(command, cli.config.as_deref())
        }
        command => command,
    };

    let config = match &cli.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    let _guard = logging::init(&config.logging, cli.verbose)?;
    debug!(backend = config.backend_config().name(), "Configuration loaded");

    let pool = commands::open_pool(&config)?;

    match command {
        Commands::Get { key, details } => commands::item::get(&pool, &key, details),
        Commands::Set {
            key,
            value,
            tags,
            ttl,
        } => commands::item::set(&pool, &key, value, &tags, ttl, config.cache.default_ttl),
        Commands::Delete { keys } => commands::item::delete(&pool, &keys),
        Commands::Has { key } => commands::item::has(&pool, &key),
        Commands::Tag { action } => commands::tag::run(&pool, action),
        Commands::Cache { action } => commands::cache::run(&pool, &config, action),
        Commands::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set_with_tags() {
        let cli = Cli::try_parse_from([
            "tagpool", "set", "user-1", "alice", "--tag", "users", "-t", "admins", "--ttl", "60",
        ])
        .unwrap();

        match cli.command {
            Commands::Set {
                key,
                value,
                tags,
                ttl,
            } => {
                assert_eq!(key, "user-1");
                assert_eq!(value, "alice");
                assert_eq!(tags, vec!["users", "admins"]);
                assert_eq!(ttl, Some(60));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tagpool", "has", "k", "--config", "/tmp/x.ini", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.ini")));
    }

    #[test]
    fn test_delete_requires_key() {
        assert!(Cli::try_parse_from(["tagpool", "delete"]).is_err());
    }

    #[test]
    fn test_tag_invalidate_parses() {
        let cli = Cli::try_parse_from(["tagpool", "tag", "invalidate", "a", "b"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tag {
                action: TagAction::Invalidate { .. }
            }
        ));
    }
}
