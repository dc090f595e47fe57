//! Error types for the codec crate.

use quick_xml::events::attributes::AttrError;
use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The document is not well-formed XML.
    #[error("malformed XML at line {line}: {source}")]
    Syntax {
        /// Line (1-based) where the parser stopped.
        line: usize,
        /// Underlying parser error.
        source: quick_xml::Error,
    },

    /// An attribute could not be parsed.
    #[error("malformed attribute at line {line}: {source}")]
    Attribute {
        /// Line (1-based) of the element carrying the attribute.
        line: usize,
        /// Underlying attribute error.
        source: AttrError,
    },

    /// The document has no root element.
    #[error("document has no root element, expected <{expected}>")]
    MissingRoot {
        /// Expected root element name.
        expected: &'static str,
    },

    /// The root element has the wrong name.
    #[error("unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot {
        /// Expected root element name.
        expected: &'static str,
        /// Root element name found in the document.
        found: String,
    },

    /// A recognised element lacks a required attribute.
    #[error("attribute '{attribute}' is missing from <{element}> at line {line}")]
    MissingAttribute {
        /// Element name.
        element: &'static str,
        /// Missing attribute name.
        attribute: &'static str,
        /// Line (1-based) of the element.
        line: usize,
    },

    /// A required attribute has an unusable value.
    #[error("attribute '{attribute}' of <{element}> at line {line} has invalid value '{value}'")]
    InvalidAttribute {
        /// Element name.
        element: &'static str,
        /// Attribute name.
        attribute: &'static str,
        /// Offending value.
        value: String,
        /// Line (1-based) of the element.
        line: usize,
    },

    /// Two manifest entries share a value that must be unique.
    #[error("duplicate {attribute} '{value}' at line {line}")]
    Duplicate {
        /// Attribute that must be unique.
        attribute: &'static str,
        /// Repeated value.
        value: String,
        /// Line (1-based) of the second occurrence.
        line: usize,
    },

    /// A name cannot be written as an XML attribute name.
    #[error("'{name}' is not a valid attribute name")]
    InvalidName {
        /// Offending name.
        name: String,
    },

    /// Text or a name was not valid UTF-8.
    #[error("invalid UTF-8 at line {line}")]
    InvalidUtf8 {
        /// Line (1-based) where the bytes were found.
        line: usize,
    },

    /// Writing the document failed.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    /// The XML writer reported an error.
    #[error("XML writer error: {0}")]
    Writer(#[from] quick_xml::Error),
}

impl CodecError {
    /// Creates an invalid name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Returns the 1-based line the error refers to, when it has one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::Attribute { line, .. }
            | Self::MissingAttribute { line, .. }
            | Self::InvalidAttribute { line, .. }
            | Self::Duplicate { line, .. }
            | Self::InvalidUtf8 { line } => Some(*line),
            _ => None,
        }
    }
}
