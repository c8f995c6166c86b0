//! Tag commands.

use clap::Subcommand;
use tracing::info;

use crate::commands::CliPool;
use crate::error::CliError;

/// Tag subcommands.
#[derive(Debug, Subcommand)]
pub enum TagAction {
    /// List the keys recorded under a tag
    Members {
        /// Tag name
        tag: String,
    },
    /// Delete every item saved with any of the given tags
    Invalidate {
        /// Tag names
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

/// Run a tag subcommand.
pub fn run(pool: &CliPool, action: TagAction) -> Result<(), CliError> {
    match action {
        TagAction::Members { tag } => {
            for key in pool.tagged_keys(&tag)? {
                println!("{}", key);
            }
            Ok(())
        }
        TagAction::Invalidate { tags } => {
            if !pool.invalidate_tags(&tags)? {
                return Err(CliError::Declined("invalidate tags"));
            }
            info!(tags = ?tags, "Invalidated tags");
            Ok(())
        }
    }
}
