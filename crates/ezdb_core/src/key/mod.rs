//! Keys: named, property-bearing records.

mod handle;
mod id;

pub use handle::KeyMut;
pub use id::{IdAllocator, KeyId};

use crate::pending::{ChangeKind, PendingChange};
use ezdb_codec::{KeyDocument, PropertyMap};
use std::fmt;

/// A named record owned by a [`Database`](crate::Database).
///
/// A key is read through `&Key` (from `Database::get_key` or
/// `Database::keys`) and mutated through a [`KeyMut`] handle, which borrows
/// the database for sibling checks and file access.
///
/// # States
///
/// - *new*: no identifier yet, nothing on disk
/// - *persisted*: identifier assigned on first save, clean or dirty
/// - *removed*: flagged for deletion, excised on the next save
///
/// Properties are loaded lazily: a key read from the manifest starts
/// unloaded, and [`Key::properties`] returns `None` until it is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    name: String,
    id: Option<KeyId>,
    /// `None` while not yet fetched from disk.
    properties: Option<PropertyMap>,
    description: Option<String>,
    changed: bool,
    removed: bool,
}

impl Key {
    /// Creates a fresh key that has never been saved.
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            id: None,
            properties: Some(PropertyMap::new()),
            description: None,
            changed: true,
            removed: false,
        }
    }

    /// Creates a key listed in the manifest, with its properties unloaded.
    pub(crate) fn persisted(name: String, id: KeyId) -> Self {
        Self {
            name,
            id: Some(id),
            properties: None,
            description: None,
            changed: false,
            removed: false,
        }
    }

    /// Returns the key name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier, or `None` if the key was never saved.
    #[must_use]
    pub fn id(&self) -> Option<&KeyId> {
        self.id.as_ref()
    }

    /// Returns true if the key has no identifier yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Returns true if the key has changes not yet written to disk.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Returns true if the key is flagged for removal on the next save.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Returns true if the properties are in memory.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.properties.is_some()
    }

    /// Returns the properties, or `None` if they have not been loaded.
    #[must_use]
    pub fn properties(&self) -> Option<&PropertyMap> {
        self.properties.as_ref()
    }

    /// Returns a single property value if loaded and present.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.as_ref()?.get(name).map(String::as_str)
    }

    /// Returns the description if loaded and present.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns what the next save would do for this key, if anything.
    #[must_use]
    pub fn pending_change(&self) -> Option<PendingChange> {
        let kind = if self.removed {
            ChangeKind::Delete
        } else if self.id.is_none() {
            ChangeKind::Create
        } else if self.changed {
            ChangeKind::Update
        } else {
            return None;
        };
        Some(PendingChange {
            name: self.name.clone(),
            id: self.id.clone(),
            kind,
        })
    }

    pub(crate) fn assign_id(&mut self, id: KeyId) {
        self.id = Some(id);
        self.changed = true;
    }

    /// Builds the record document from the in-memory state.
    pub(crate) fn document(&self) -> KeyDocument {
        KeyDocument {
            description: self.description.clone(),
            properties: self.properties.clone().unwrap_or_default(),
        }
    }

    /// Replaces properties and description with a record read from disk.
    /// A missing record counts as an empty one.
    pub(crate) fn replace_content(&mut self, document: Option<KeyDocument>) {
        let document = document.unwrap_or_default();
        self.properties = Some(document.properties);
        self.description = document.description;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.changed = false;
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "<key '{}':'{}'>", self.name, id),
            None => write!(f, "<key '{}':None>", self.name),
        }
    }
}
