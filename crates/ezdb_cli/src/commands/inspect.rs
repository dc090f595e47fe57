//! List and show command implementations.

use super::{open_existing, CommandResult};
use ezdb_core::{Database, PropertyMap};
use serde::Serialize;
use std::path::Path;

/// One row of the key listing.
#[derive(Debug, Serialize)]
pub struct KeySummary {
    /// Key name.
    pub name: String,
    /// Identifier (record file stem).
    pub id: Option<String>,
}

/// Database listing.
#[derive(Debug, Serialize)]
pub struct ListResult {
    /// Database path.
    pub path: String,
    /// Keys in manifest order.
    pub keys: Vec<KeySummary>,
}

/// Content of a single key.
#[derive(Debug, Serialize)]
pub struct KeyDetails {
    /// Key name.
    pub name: String,
    /// Identifier (record file stem).
    pub id: Option<String>,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties in name order.
    pub properties: PropertyMap,
}

fn summarize(db: &Database) -> ListResult {
    ListResult {
        path: db.folder().display().to_string(),
        keys: db
            .iter()
            .map(|key| KeySummary {
                name: key.name().to_string(),
                id: key.id().map(ToString::to_string),
            })
            .collect(),
    }
}

/// Loads the key named `name` and collects its content.
pub fn details(db: &mut Database, name: &str) -> CommandResult<KeyDetails> {
    let mut key = db
        .get_key_mut(name)
        .ok_or_else(|| format!("No key named '{name}'"))?;
    key.load()?;

    Ok(KeyDetails {
        name: key.name().to_string(),
        id: key.id().map(ToString::to_string),
        description: key.description().map(str::to_string),
        properties: key.properties().cloned().unwrap_or_default(),
    })
}

/// Runs the list command.
pub fn list(path: &Path, format: &str) -> CommandResult {
    let db = open_existing(path)?;
    let result = summarize(&db);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print!("{db}");
            println!("{} key(s)", result.keys.len());
        }
    }

    Ok(())
}

/// Runs the show command.
pub fn show(path: &Path, name: &str, format: &str) -> CommandResult {
    let mut db = open_existing(path)?;
    let result = details(&mut db, name)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &KeyDetails) {
    println!("Key: {}", result.name);
    println!("Id: {}", result.id.as_deref().unwrap_or("None"));
    if let Some(description) = &result.description {
        println!("Description: {description}");
    }
    if result.properties.is_empty() {
        println!("No properties");
    } else {
        println!("Properties:");
        for (name, value) in &result.properties {
            println!("  {name} = {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn details_load_saved_content() {
        let temp = tempdir().unwrap();
        let mut db = Database::new(temp.path());
        let mut key = db.add_key("hero").unwrap();
        key.set_property("hp", "100").unwrap();
        key.set_description(Some("Main".into())).unwrap();
        db.save().unwrap();

        let mut reopened = open_existing(temp.path()).unwrap();
        let shown = details(&mut reopened, "hero").unwrap();
        assert_eq!(shown.description.as_deref(), Some("Main"));
        assert_eq!(shown.properties.get("hp").map(String::as_str), Some("100"));
        assert!(shown.id.is_some());

        assert!(details(&mut reopened, "villain").is_err());
    }

    #[test]
    fn listing_serializes_in_order() {
        let temp = tempdir().unwrap();
        let mut db = Database::new(temp.path());
        db.add_key("b").unwrap();
        db.add_key("a").unwrap();

        let json = serde_json::to_value(summarize(&db)).unwrap();
        assert_eq!(json["keys"][0]["name"], "b");
        assert_eq!(json["keys"][1]["name"], "a");
        assert!(json["keys"][0]["id"].is_null());
    }

    #[test]
    fn list_requires_database() {
        let temp = tempdir().unwrap();
        assert!(list(temp.path(), "text").is_err());
    }
}
