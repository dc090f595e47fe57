//! CLI command implementations.

pub mod demo;
pub mod edit;
pub mod inspect;
pub mod verify;

use ezdb_core::{Config, Database};
use std::path::Path;

/// Result type shared by all commands.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Opens an existing database, failing if the folder has no manifest.
pub fn open_existing(path: &Path) -> CommandResult<Database> {
    let config = Config::default().create_if_missing(false);
    Ok(Database::open_with_config(path, config)?)
}
