//! Consistency check between the manifest and the record files.

use crate::dir::DatabaseDir;
use crate::error::CoreResult;
use ezdb_codec::ManifestEntry;

/// Result of comparing a manifest with the record directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Number of manifest entries.
    pub entries: usize,
    /// Manifest entries whose record file is missing.
    pub missing: Vec<ManifestEntry>,
    /// Record file stems that no manifest entry references.
    pub orphans: Vec<String>,
}

impl VerifyReport {
    /// Returns true if every entry has a file and every file an entry.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.orphans.is_empty()
    }
}

/// Reads the manifest and record directory of `dir` and compares them.
pub(crate) fn verify(dir: &DatabaseDir) -> CoreResult<VerifyReport> {
    let manifest = dir.load_manifest()?;
    let mut files = dir.key_files()?;

    let missing = manifest
        .iter()
        .filter(|entry| !files.remove(&entry.src))
        .cloned()
        .collect();

    Ok(VerifyReport {
        entries: manifest.len(),
        missing,
        orphans: files.into_iter().collect(),
    })
}
