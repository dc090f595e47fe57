//! Commands that modify a database.
//!
//! Every command opens the database, applies one change and saves.

use super::{open_existing, CommandResult};
use ezdb_core::{Database, KeyMut};
use std::path::Path;

fn key_mut<'db>(db: &'db mut Database, name: &str) -> CommandResult<KeyMut<'db>> {
    db.get_key_mut(name)
        .ok_or_else(|| format!("No key named '{name}'").into())
}

fn save(db: &mut Database) -> CommandResult {
    let report = db.save()?;
    println!(
        "Saved: {} written, {} deleted, {} unchanged",
        report.written, report.deleted, report.unchanged
    );
    Ok(())
}

/// Runs the init command.
pub fn init(path: &Path) -> CommandResult {
    let mut db = Database::open(path)?;
    save(&mut db)?;
    println!("Database ready at {:?} with {} key(s)", path, db.len());
    Ok(())
}

/// Runs the add command.
pub fn add(path: &Path, name: &str) -> CommandResult {
    let mut db = open_existing(path)?;
    if db.add_key(name).is_none() {
        return Err(format!("A key named '{name}' already exists").into());
    }
    save(&mut db)?;

    let id = db.get_key(name).and_then(|key| key.id().cloned());
    println!("Added '{}' as {}", name, id.map_or("None".into(), String::from));
    Ok(())
}

/// Runs the rename command.
pub fn rename(path: &Path, old: &str, new: &str) -> CommandResult {
    let mut db = open_existing(path)?;
    key_mut(&mut db, old)?.rename(new)?;
    save(&mut db)
}

/// Runs the set command.
pub fn set(path: &Path, key: &str, property: &str, value: &str) -> CommandResult {
    let mut db = open_existing(path)?;
    key_mut(&mut db, key)?.set_property(property, value)?;
    save(&mut db)
}

/// Runs the unset command.
pub fn unset(path: &Path, key: &str, property: &str) -> CommandResult {
    let mut db = open_existing(path)?;
    let previous = key_mut(&mut db, key)?.remove_property(property)?;
    println!("Removed {property} = {previous}");
    save(&mut db)
}

/// Runs the describe command.
pub fn describe(path: &Path, key: &str, text: Option<String>) -> CommandResult {
    let mut db = open_existing(path)?;
    key_mut(&mut db, key)?.set_description(text)?;
    save(&mut db)
}

/// Runs the remove command.
pub fn remove(path: &Path, key: &str) -> CommandResult {
    let mut db = open_existing(path)?;
    key_mut(&mut db, key)?.set_removed(true);
    save(&mut db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn edit_session() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("db");

        init(&path).unwrap();
        add(&path, "hero").unwrap();
        assert!(add(&path, "hero").is_err());

        set(&path, "hero", "hp", "100").unwrap();
        set(&path, "hero", "mp", "5").unwrap();
        unset(&path, "hero", "mp").unwrap();
        describe(&path, "hero", Some("Main".into())).unwrap();
        rename(&path, "hero", "player").unwrap();

        let mut db = open_existing(&path).unwrap();
        assert!(db.get_key("hero").is_none());
        let mut key = db.get_key_mut("player").unwrap();
        key.load().unwrap();
        assert_eq!(key.property("hp"), Some("100"));
        assert_eq!(key.property("mp"), None);
        assert_eq!(key.description(), Some("Main"));

        remove(&path, "player").unwrap();
        assert!(open_existing(&path).unwrap().is_empty());
    }

    #[test]
    fn editing_missing_key_fails() {
        let temp = tempdir().unwrap();
        init(temp.path()).unwrap();
        assert!(set(temp.path(), "ghost", "x", "1").is_err());
        assert!(unset(temp.path(), "ghost", "x").is_err());
    }

    #[test]
    fn editing_requires_database() {
        let temp = tempdir().unwrap();
        assert!(add(temp.path(), "a").is_err());
        assert!(!temp.path().join("database.xml").exists());
    }
}
