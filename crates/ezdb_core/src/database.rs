//! Database facade.

use crate::config::Config;
use crate::dir::DatabaseDir;
use crate::error::{CoreError, CoreResult};
use crate::key::{IdAllocator, Key, KeyId, KeyMut};
use crate::pending::{PendingChange, SaveOutcome, SaveReport};
use crate::verify::{self, VerifyReport};
use ezdb_codec::Manifest;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The main database handle.
///
/// `Database` owns an ordered list of [`Key`]s bound to a folder. It:
/// - Keeps key names unique
/// - Loads the key index from the manifest, leaving key content unloaded
/// - Saves every dirty or removed key, then rewrites the manifest
///
/// Nothing touches the disk except [`Database::load`], [`Database::save`],
/// [`Database::verify`] and the loading/saving methods of [`KeyMut`].
///
/// # Opening a Database
///
/// ```rust,ignore
/// use ezdb_core::Database;
///
/// // Load the folder if it holds a database, start empty otherwise
/// let mut db = Database::open("saves/world")?;
///
/// let mut hero = db.add_key("hero").expect("name is free");
/// hero.set_property("hp", "100")?;
///
/// db.save()?;
/// ```
///
/// # Single Process
///
/// A folder is meant to be used by one `Database` at a time. Nothing guards
/// against concurrent access, and a save is not atomic: a crash between the
/// record writes and the manifest write leaves them out of step.
#[derive(Debug)]
pub struct Database {
    /// Configuration.
    config: Config,
    /// Database folder.
    pub(crate) dir: DatabaseDir,
    /// Keys in creation/load order.
    pub(crate) keys: Vec<Key>,
    /// Identifier generator for new keys.
    allocator: IdAllocator,
}

impl Database {
    /// Creates an empty database bound to `folder`. Nothing is read.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self::with_config(folder, Config::default())
    }

    /// Creates an empty database bound to `folder` with custom configuration.
    #[must_use]
    pub fn with_config(folder: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            dir: DatabaseDir::new(folder, config.sync_on_save),
            keys: Vec::new(),
            allocator: IdAllocator::new(config.id_length.max(1)),
            config,
        }
    }

    /// Opens the database in `folder` with the default configuration.
    ///
    /// See [`Database::open_with_config`].
    pub fn open(folder: impl Into<PathBuf>) -> CoreResult<Self> {
        Self::open_with_config(folder, Config::default())
    }

    /// Opens the database in `folder`.
    ///
    /// If the folder holds a manifest it is loaded. Otherwise the database
    /// starts empty when `create_if_missing` is set (nothing is written until
    /// the first save) and fails with `NotADatabase` when it is not.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ezdb_core::{Config, Database};
    ///
    /// let config = Config::default().create_if_missing(false);
    /// let db = Database::open_with_config("saves/world", config)?;
    /// ```
    pub fn open_with_config(folder: impl Into<PathBuf>, config: Config) -> CoreResult<Self> {
        let mut db = Self::with_config(folder, config);

        if db.exists() {
            db.load()?;
        } else if db.config.create_if_missing {
            warn!(folder = %db.folder().display(), "no database found, starting empty");
        } else {
            return Err(CoreError::not_a_database(db.folder()));
        }

        Ok(db)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the storage folder.
    #[must_use]
    pub fn folder(&self) -> &Path {
        self.dir.path()
    }

    /// Rebinds the database to another folder.
    ///
    /// Keys keep their identifiers; unloaded keys will be loaded from the
    /// new folder, and the next save writes there.
    pub fn set_folder(&mut self, folder: impl Into<PathBuf>) {
        self.dir.set_path(folder.into());
    }

    /// Returns the folder layout helper.
    #[must_use]
    pub fn dir(&self) -> &DatabaseDir {
        &self.dir
    }

    /// Returns all keys in order, including keys flagged for removal.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Iterates over the keys in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.keys.iter()
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the database has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.keys.iter().position(|key| key.name() == name)
    }

    /// Adds a new key named `name`.
    ///
    /// Returns `None`, and changes nothing, if a key with that name already
    /// exists. The new key has no identifier until it is saved.
    pub fn add_key(&mut self, name: impl Into<String>) -> Option<KeyMut<'_>> {
        let name = name.into();
        if self.position(&name).is_some() {
            return None;
        }

        self.keys.push(Key::new(name));
        let index = self.keys.len() - 1;
        Some(KeyMut::new(self, index))
    }

    /// Detaches the key named `name` and returns it.
    ///
    /// No file is touched: the key's record file stays on disk. To delete it
    /// as well, flag the key with [`KeyMut::set_removed`] and save instead.
    pub fn remove_key(&mut self, name: &str) -> Option<Key> {
        let index = self.position(name)?;
        Some(self.keys.remove(index))
    }

    /// Returns the key named `name`, even if it is flagged for removal.
    #[must_use]
    pub fn get_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().find(|key| key.name() == name)
    }

    /// Returns a mutable handle to the key named `name`.
    pub fn get_key_mut(&mut self, name: &str) -> Option<KeyMut<'_>> {
        let index = self.position(name)?;
        Some(KeyMut::new(self, index))
    }

    /// Checks if the folder exists and contains a manifest.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.dir.is_database()
    }

    /// Loads the key index from the manifest.
    ///
    /// The in-memory key list is replaced by one key per manifest entry, in
    /// manifest order, each with its identifier set and its content unloaded.
    ///
    /// # Errors
    ///
    /// - `NotADatabase` if the folder has no manifest
    /// - `CorruptManifest` if an entry lacks `name` or `src`, repeats one, or
    ///   the document is malformed
    pub fn load(&mut self) -> CoreResult<()> {
        if !self.exists() {
            return Err(CoreError::not_a_database(self.folder()));
        }

        let manifest = self.dir.load_manifest()?;
        self.keys = manifest
            .entries
            .into_iter()
            .map(|entry| Key::persisted(entry.name, KeyId::from_manifest(entry.src)))
            .collect();

        info!(folder = %self.folder().display(), keys = self.keys.len(), "loaded database");
        Ok(())
    }

    /// Saves every key, then rewrites the manifest.
    ///
    /// The folder and its record directory are created if missing. Keys are
    /// visited in order:
    /// - a key without identifier gets one and is written
    /// - a removed key has its record file deleted and is excised
    /// - a changed key is written
    /// - any other key is left alone
    ///
    /// The manifest then lists the surviving keys in order.
    ///
    /// # Errors
    ///
    /// Returns the first I/O or encoding error. Keys saved before the error
    /// stay saved; the manifest is not rewritten.
    pub fn save(&mut self) -> CoreResult<SaveReport> {
        self.dir.create_layout()?;
        let on_disk = self.dir.key_files()?;

        let mut report = SaveReport::default();
        let mut index = 0;
        while index < self.keys.len() {
            let outcome = self.persist(index, &on_disk)?;
            report.record(outcome);
            if outcome != SaveOutcome::Deleted {
                index += 1;
            }
        }

        self.dir.save_manifest(&self.manifest())?;

        info!(
            folder = %self.folder().display(),
            written = report.written,
            deleted = report.deleted,
            unchanged = report.unchanged,
            "saved database"
        );
        Ok(report)
    }

    /// Saves the key at `index`, excising it if it was removed.
    ///
    /// `on_disk` lists record files already present; new identifiers avoid
    /// them as well as the identifiers of every key in memory.
    pub(crate) fn persist(
        &mut self,
        index: usize,
        on_disk: &BTreeSet<String>,
    ) -> CoreResult<SaveOutcome> {
        let id = match self.keys[index].id() {
            Some(id) => id.clone(),
            None => {
                let id = self.allocate_id(on_disk)?;
                self.keys[index].assign_id(id.clone());
                id
            }
        };

        let key = &mut self.keys[index];

        if key.is_removed() {
            let existed = self.dir.delete_key(&id)?;
            debug!(key = %key.name(), %id, existed, "deleted key");
            self.keys.remove(index);
            return Ok(SaveOutcome::Deleted);
        }

        if !key.is_changed() {
            return Ok(SaveOutcome::Unchanged);
        }

        if !key.is_loaded() {
            key.replace_content(self.dir.load_key(&id)?);
        }
        self.dir.save_key(&id, &key.document())?;
        key.mark_clean();
        debug!(key = %key.name(), %id, "wrote key");
        Ok(SaveOutcome::Written)
    }

    fn allocate_id(&self, on_disk: &BTreeSet<String>) -> CoreResult<KeyId> {
        let taken: HashSet<&str> = self
            .keys
            .iter()
            .filter_map(Key::id)
            .map(KeyId::as_str)
            .chain(on_disk.iter().map(String::as_str))
            .collect();
        self.allocator.allocate(&taken)
    }

    /// Builds the manifest of every key that has an identifier, in order.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        let mut manifest = Manifest::new();
        for key in &self.keys {
            if let Some(id) = key.id() {
                manifest.push(key.name(), id.as_str());
            }
        }
        manifest
    }

    /// Lists what the next save would do, in key order.
    ///
    /// Clean keys are omitted. No I/O happens.
    #[must_use]
    pub fn pending_changes(&self) -> Vec<PendingChange> {
        self.keys.iter().filter_map(Key::pending_change).collect()
    }

    /// Compares the manifest on disk with the record files on disk.
    ///
    /// # Errors
    ///
    /// Returns `NotADatabase` if the folder has no manifest, or the errors of
    /// reading it.
    pub fn verify(&self) -> CoreResult<VerifyReport> {
        if !self.exists() {
            return Err(CoreError::not_a_database(self.folder()));
        }
        verify::verify(&self.dir)
    }
}

impl<'a> IntoIterator for &'a Database {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database")?;
        writeln!(f, "Folder: '{}'", self.folder().display())?;
        for key in &self.keys {
            match key.id() {
                Some(id) => writeln!(f, "  {id} : '{}'", key.name())?,
                None => writeln!(f, "  None : '{}'", key.name())?,
            }
        }
        Ok(())
    }
}
