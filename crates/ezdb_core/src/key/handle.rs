//! Mutable access to a key inside its database.

use crate::database::Database;
use crate::error::{CoreError, CoreResult};
use crate::key::Key;
use crate::pending::SaveOutcome;
use ezdb_codec::PropertyMap;
use std::ops::Deref;
use tracing::debug;

/// A mutable handle to one key of a [`Database`].
///
/// The handle borrows the database, so it can check sibling names and
/// resolve the key's record file, but it can never outlive the database.
/// Read access goes through `Deref<Target = Key>`.
///
/// Every mutation marks the key as changed. Nothing is written until the
/// key or the database is saved.
///
/// # Example
///
/// ```rust,ignore
/// let mut db = Database::new("saves/world");
/// let mut hero = db.add_key("hero").unwrap();
/// hero.set_property("hp", "100")?;
/// hero.rename("player")?;
/// db.save()?;
/// ```
#[derive(Debug)]
pub struct KeyMut<'db> {
    db: &'db mut Database,
    index: usize,
}

impl<'db> KeyMut<'db> {
    pub(crate) fn new(db: &'db mut Database, index: usize) -> Self {
        Self { db, index }
    }

    fn key_mut(&mut self) -> &mut Key {
        &mut self.db.keys[self.index]
    }

    /// Renames the key.
    ///
    /// # Errors
    ///
    /// Returns `NameConflict` if another key of the database already has
    /// `name`. The key is left unchanged in that case.
    pub fn rename(&mut self, name: impl Into<String>) -> CoreResult<()> {
        let name = name.into();
        let taken = self
            .db
            .keys
            .iter()
            .enumerate()
            .any(|(index, other)| index != self.index && other.name == name);
        if taken {
            return Err(CoreError::name_conflict(name));
        }

        let key = self.key_mut();
        key.name = name;
        key.changed = true;
        Ok(())
    }

    /// Reloads properties and description from the record file.
    ///
    /// The in-memory content is replaced, not merged. A key without an
    /// identifier or without a record file ends up with no properties and no
    /// description. The changed flag is left as it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the record file cannot be read or decoded.
    pub fn load(&mut self) -> CoreResult<()> {
        let document = match &self.db.keys[self.index].id {
            Some(id) => self.db.dir.load_key(id)?,
            None => None,
        };
        debug!(key = %self.name(), found = document.is_some(), "loaded key");
        self.key_mut().replace_content(document);
        Ok(())
    }

    fn ensure_loaded(&mut self) -> CoreResult<()> {
        if !self.is_loaded() {
            self.load()?;
        }
        Ok(())
    }

    /// Adds or replaces a property, loading the key first if needed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPropertyName` if `name` cannot be stored, or an error
    /// from the implicit load.
    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> CoreResult<()> {
        let name = name.into();
        if !ezdb_codec::is_valid_name(&name) {
            return Err(CoreError::invalid_property_name(name));
        }
        self.ensure_loaded()?;

        let key = self.key_mut();
        key.properties
            .get_or_insert_with(PropertyMap::new)
            .insert(name, value.into());
        key.changed = true;
        Ok(())
    }

    /// Removes a property, loading the key first if needed, and returns its
    /// previous value.
    ///
    /// # Errors
    ///
    /// Returns `PropertyNotFound` if the key has no such property, or an
    /// error from the implicit load.
    pub fn remove_property(&mut self, name: &str) -> CoreResult<String> {
        self.ensure_loaded()?;

        let key = self.key_mut();
        match key.properties.as_mut().and_then(|p| p.remove(name)) {
            Some(value) => {
                key.changed = true;
                Ok(value)
            }
            None => Err(CoreError::property_not_found(key.name.as_str(), name)),
        }
    }

    /// Replaces the whole property mapping, loading the key first if needed
    /// so the stored description is kept.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPropertyName` if any name cannot be stored (nothing is
    /// changed in that case), or an error from the implicit load.
    pub fn set_properties(&mut self, properties: PropertyMap) -> CoreResult<()> {
        if let Some(name) = properties.keys().find(|n| !ezdb_codec::is_valid_name(n)) {
            return Err(CoreError::invalid_property_name(name.as_str()));
        }
        self.ensure_loaded()?;

        let key = self.key_mut();
        key.properties = Some(properties);
        key.changed = true;
        Ok(())
    }

    /// Sets or clears the description, loading the key first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error from the implicit load.
    pub fn set_description(&mut self, description: Option<String>) -> CoreResult<()> {
        self.ensure_loaded()?;

        let key = self.key_mut();
        key.description = description;
        key.changed = true;
        Ok(())
    }

    /// Flags or unflags the key for removal on the next save.
    pub fn set_removed(&mut self, removed: bool) {
        let key = self.key_mut();
        key.removed = removed;
        key.changed = true;
    }

    /// Drops the loaded content and clears the changed flag.
    ///
    /// Unsaved edits are lost; the next access loads from disk again.
    pub fn free(&mut self) {
        let key = self.key_mut();
        key.properties = None;
        key.description = None;
        key.changed = false;
    }

    /// Saves this key alone, without rewriting the manifest.
    ///
    /// A key that has never been saved receives its identifier here. A
    /// removed key has its record file deleted and is excised from the
    /// database, which is why the handle is consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database folder cannot be prepared or the
    /// record file cannot be written or deleted.
    pub fn save(self) -> CoreResult<SaveOutcome> {
        self.db.dir.create_layout()?;
        let on_disk = self.db.dir.key_files()?;
        self.db.persist(self.index, &on_disk)
    }
}

impl Deref for KeyMut<'_> {
    type Target = Key;

    fn deref(&self) -> &Key {
        &self.db.keys[self.index]
    }
}
