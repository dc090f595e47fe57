//! Error types for EzDB core.

use ezdb_codec::CodecError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in EzDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// XML codec error outside of manifest or record decoding.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Another key already uses the requested name.
    #[error("another key is named '{name}'")]
    NameConflict {
        /// The contested name.
        name: String,
    },

    /// The key has no property with the given name.
    #[error("key '{key}' has no property '{property}'")]
    PropertyNotFound {
        /// Name of the key.
        key: String,
        /// Name of the missing property.
        property: String,
    },

    /// The property name cannot be stored as an attribute.
    #[error("'{name}' is not a valid property name")]
    InvalidPropertyName {
        /// Offending name.
        name: String,
    },

    /// The folder does not contain a database.
    #[error("the folder '{}' does not contain a database", path.display())]
    NotADatabase {
        /// Folder that was searched.
        path: PathBuf,
    },

    /// The manifest could not be decoded.
    #[error("corrupt manifest '{}': {source}", path.display())]
    CorruptManifest {
        /// Path of the manifest file.
        path: PathBuf,
        /// What was wrong, including the line.
        source: CodecError,
    },

    /// A record file could not be decoded.
    #[error("corrupt record file for key '{id}': {source}")]
    CorruptKey {
        /// Identifier of the key.
        id: String,
        /// What was wrong.
        source: CodecError,
    },

    /// Every identifier of the configured length is taken.
    #[error("no free identifier of length {length} left")]
    IdSpaceExhausted {
        /// Configured identifier length.
        length: usize,
    },
}

impl CoreError {
    /// Creates a name conflict error.
    pub fn name_conflict(name: impl Into<String>) -> Self {
        Self::NameConflict { name: name.into() }
    }

    /// Creates a property not found error.
    pub fn property_not_found(key: impl Into<String>, property: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            key: key.into(),
            property: property.into(),
        }
    }

    /// Creates an invalid property name error.
    pub fn invalid_property_name(name: impl Into<String>) -> Self {
        Self::InvalidPropertyName { name: name.into() }
    }

    /// Creates a not-a-database error.
    pub fn not_a_database(path: impl Into<PathBuf>) -> Self {
        Self::NotADatabase { path: path.into() }
    }

    /// Creates a corrupt manifest error.
    pub fn corrupt_manifest(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::CorruptManifest {
            path: path.into(),
            source,
        }
    }

    /// Creates a corrupt record error.
    pub fn corrupt_key(id: impl Into<String>, source: CodecError) -> Self {
        Self::CorruptKey {
            id: id.into(),
            source,
        }
    }

    /// Returns the manifest line an error points at, if any.
    #[must_use]
    pub fn manifest_line(&self) -> Option<usize> {
        match self {
            Self::CorruptManifest { source, .. } => source.line(),
            _ => None,
        }
    }
}
