//! Demo command implementation.

use super::CommandResult;
use ezdb_core::Database;
use std::path::Path;
use tracing::info;

/// Opens or creates the database, adds keys named `1..=count` and saves.
///
/// Names already present are skipped, so running the demo twice adds nothing.
pub fn run(path: &Path, count: usize) -> CommandResult {
    let mut db = Database::open(path)?;

    let added = (1..=count)
        .filter(|n| db.add_key(n.to_string()).is_some())
        .count();
    info!(added, skipped = count - added, "added demo keys");

    db.save()?;
    print!("{db}");
    Ok(())
}
