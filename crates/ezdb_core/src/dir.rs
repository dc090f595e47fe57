//! Database directory management.
//!
//! This module handles the file system layout for EzDB:
//!
//! ```text
//! <folder>/
//! ├─ database.xml      # Manifest (key name -> identifier)
//! └─ keys/
//!    ├─ qwertyui.xml   # One record file per key
//!    └─ asdfghjk.xml
//! ```
//!
//! Every file is opened, read or written, and closed within a single call.

use crate::error::{CoreError, CoreResult};
use crate::key::KeyId;
use ezdb_codec::{KeyDocument, Manifest};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File names within the database directory.
const MANIFEST_FILE: &str = "database.xml";
const KEYS_DIR: &str = "keys";
const KEY_FILE_EXTENSION: &str = "xml";

/// Resolves and accesses the files of a database folder.
#[derive(Debug, Clone)]
pub struct DatabaseDir {
    /// Root directory path.
    path: PathBuf,
    /// Whether written files are fsynced.
    sync_on_save: bool,
}

impl DatabaseDir {
    /// Creates a handle for `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, sync_on_save: bool) -> Self {
        Self {
            path: path.into(),
            sync_on_save,
        }
    }

    /// Returns the path to the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }

    /// Returns the path to the manifest file.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    /// Returns the path to the record file directory.
    #[must_use]
    pub fn keys_dir(&self) -> PathBuf {
        self.path.join(KEYS_DIR)
    }

    /// Returns the path to the record file of `id`.
    #[must_use]
    pub fn key_path(&self, id: &KeyId) -> PathBuf {
        self.keys_dir().join(format!("{id}.{KEY_FILE_EXTENSION}"))
    }

    /// Checks if the folder exists and contains a manifest.
    #[must_use]
    pub fn is_database(&self) -> bool {
        self.path.is_dir() && self.manifest_path().is_file()
    }

    /// Creates the folder and its record directory if missing.
    pub fn create_layout(&self) -> CoreResult<()> {
        fs::create_dir_all(self.keys_dir())?;
        Ok(())
    }

    /// Loads and decodes the manifest.
    ///
    /// # Errors
    ///
    /// Returns `CorruptManifest` if the file cannot be decoded, or an I/O
    /// error if it cannot be read.
    pub fn load_manifest(&self) -> CoreResult<Manifest> {
        let path = self.manifest_path();
        let text = fs::read_to_string(&path)?;
        Manifest::decode(&text).map_err(|source| CoreError::corrupt_manifest(path, source))
    }

    /// Encodes and writes the manifest, replacing any previous content.
    pub fn save_manifest(&self, manifest: &Manifest) -> CoreResult<()> {
        let text = manifest.encode()?;
        self.write_file(&self.manifest_path(), &text)
    }

    /// Loads the record file of `id`.
    ///
    /// Returns `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CorruptKey` if the file cannot be decoded, or an I/O error if
    /// it cannot be read.
    pub fn load_key(&self, id: &KeyId) -> CoreResult<Option<KeyDocument>> {
        let text = match fs::read_to_string(self.key_path(id)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        KeyDocument::decode(&text)
            .map(Some)
            .map_err(|source| CoreError::corrupt_key(id.as_str(), source))
    }

    /// Writes the record file of `id`, replacing any previous content.
    pub fn save_key(&self, id: &KeyId, document: &KeyDocument) -> CoreResult<()> {
        let text = document.encode()?;
        self.write_file(&self.key_path(id), &text)
    }

    /// Deletes the record file of `id`.
    ///
    /// Returns whether a file was there to delete.
    pub fn delete_key(&self, id: &KeyId) -> CoreResult<bool> {
        match fs::remove_file(self.key_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists the identifiers of all record files in the record directory.
    ///
    /// A missing record directory yields an empty set. Files without the
    /// record extension are skipped.
    pub fn key_files(&self) -> CoreResult<BTreeSet<String>> {
        let entries = match fs::read_dir(self.keys_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = BTreeSet::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(KEY_FILE_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.insert(stem.to_string());
            }
        }
        Ok(ids)
    }

    fn write_file(&self, path: &Path, contents: &str) -> CoreResult<()> {
        let mut file = File::create(path)?;
        file.write_all(contents.as_bytes())?;
        if self.sync_on_save {
            file.sync_all()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn id(value: &str) -> KeyId {
        KeyId::parse(value).unwrap()
    }

    #[test]
    fn paths_are_correct() {
        let dir = DatabaseDir::new("root", false);
        assert_eq!(dir.manifest_path(), Path::new("root").join("database.xml"));
        assert_eq!(dir.keys_dir(), Path::new("root").join("keys"));
        assert_eq!(
            dir.key_path(&id("abcdefgh")),
            Path::new("root").join("keys").join("abcdefgh.xml")
        );
    }

    #[test]
    fn is_database_requires_manifest() {
        let temp = tempdir().unwrap();
        let dir = DatabaseDir::new(temp.path().join("db"), false);
        assert!(!dir.is_database());

        dir.create_layout().unwrap();
        assert!(dir.keys_dir().is_dir());
        assert!(!dir.is_database());

        dir.save_manifest(&Manifest::new()).unwrap();
        assert!(dir.is_database());
    }

    #[test]
    fn manifest_round_trip() {
        let temp = tempdir().unwrap();
        let dir = DatabaseDir::new(temp.path(), true);

        let mut manifest = Manifest::new();
        manifest.push("users", "aaaaaaaa");
        manifest.push("posts", "bbbbbbbb");
        dir.save_manifest(&manifest).unwrap();

        assert_eq!(dir.load_manifest().unwrap(), manifest);
    }

    #[test]
    fn corrupt_manifest_reports_path_and_line() {
        let temp = tempdir().unwrap();
        let dir = DatabaseDir::new(temp.path(), false);
        fs::write(dir.manifest_path(), "<database>\n<key name=\"a\"/>\n</database>").unwrap();

        let err = dir.load_manifest().unwrap_err();
        assert!(matches!(err, CoreError::CorruptManifest { .. }));
        assert_eq!(err.manifest_line(), Some(2));
        assert!(err.to_string().contains("database.xml"));
    }

    #[test]
    fn key_file_lifecycle() {
        let temp = tempdir().unwrap();
        let dir = DatabaseDir::new(temp.path(), false);
        dir.create_layout().unwrap();
        let key = id("qwertyui");

        assert_eq!(dir.load_key(&key).unwrap(), None);
        assert!(!dir.delete_key(&key).unwrap());

        let mut document = KeyDocument::new();
        document.properties.insert("x".into(), "1".into());
        dir.save_key(&key, &document).unwrap();
        assert_eq!(dir.load_key(&key).unwrap(), Some(document));
        assert!(dir.key_files().unwrap().contains("qwertyui"));

        assert!(dir.delete_key(&key).unwrap());
        assert!(dir.key_files().unwrap().is_empty());
    }

    #[test]
    fn corrupt_key_file() {
        let temp = tempdir().unwrap();
        let dir = DatabaseDir::new(temp.path(), false);
        dir.create_layout().unwrap();
        let key = id("brokenid");
        fs::write(dir.key_path(&key), "<key><properties a=\"1\"></key>").unwrap();

        let err = dir.load_key(&key).unwrap_err();
        assert!(matches!(err, CoreError::CorruptKey { ref id, .. } if id == "brokenid"));
    }

    #[test]
    fn key_files_skip_other_entries() {
        let temp = tempdir().unwrap();
        let dir = DatabaseDir::new(temp.path(), false);
        dir.create_layout().unwrap();
        fs::write(dir.keys_dir().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.keys_dir().join("nested.xml")).unwrap();
        fs::write(dir.keys_dir().join("abcdefgh.xml"), "<key/>").unwrap();
        fs::write(dir.key_path(&id("legacy.v1")), "<key/>").unwrap();

        let files: Vec<String> = dir.key_files().unwrap().into_iter().collect();
        assert_eq!(files, vec!["abcdefgh".to_string(), "legacy.v1".to_string()]);
    }

    #[test]
    fn missing_keys_dir_lists_nothing() {
        let temp = tempdir().unwrap();
        let dir = DatabaseDir::new(temp.path().join("absent"), false);
        assert!(dir.key_files().unwrap().is_empty());
    }
}
