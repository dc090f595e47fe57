//! # EzDB Core
//!
//! Embedded record store for EzDB.
//!
//! A database is a folder holding:
//! - a manifest (`database.xml`) mapping key names to identifiers
//! - one XML record file per key under `keys/`
//!
//! Each key carries a flat mapping of string properties and an optional
//! free-text description. Keys are loaded lazily and written back only when
//! they changed.
//!
//! ```rust,ignore
//! use ezdb_core::Database;
//!
//! let mut db = Database::open("saves/world")?;
//! let mut hero = db.add_key("hero").expect("name is free");
//! hero.set_property("hp", "100")?;
//! hero.set_description(Some("The player character".into()))?;
//! db.save()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod dir;
mod error;
mod key;
mod pending;
mod verify;

pub use config::{Config, DEFAULT_ID_LENGTH};
pub use database::Database;
pub use dir::DatabaseDir;
pub use error::{CoreError, CoreResult};
pub use ezdb_codec::{KeyDocument, Manifest, ManifestEntry, PropertyMap};
pub use key::{IdAllocator, Key, KeyId, KeyMut};
pub use pending::{ChangeKind, PendingChange, SaveOutcome, SaveReport};
pub use verify::VerifyReport;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
