//! # EzDB Codec
//!
//! XML encoding/decoding for EzDB.
//!
//! EzDB persists two kinds of documents:
//!
//! - the **manifest** (`database.xml`), an ordered list of `name` → `src`
//!   entries, see [`Manifest`];
//! - one **record** per key (`keys/<src>.xml`) holding an optional
//!   description and a flat property mapping, see [`KeyDocument`].
//!
//! Decoding is permissive about elements it does not know and strict about
//! required attributes on the elements it does.
//!
//! ## Usage
//!
//! ```
//! use ezdb_codec::{KeyDocument, Manifest};
//!
//! let mut manifest = Manifest::new();
//! manifest.push("player", "qwertyui");
//! let text = manifest.encode().unwrap();
//! assert_eq!(Manifest::decode(&text).unwrap(), manifest);
//!
//! let mut record = KeyDocument::new();
//! record.properties.insert("hp".into(), "100".into());
//! let text = record.encode().unwrap();
//! assert_eq!(KeyDocument::decode(&text).unwrap(), record);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod manifest;
mod record;
mod xml;

pub use error::{CodecError, CodecResult};
pub use manifest::{Manifest, ManifestEntry, MANIFEST_ROOT};
pub use record::{KeyDocument, PropertyMap, RECORD_ROOT};
pub use xml::{is_valid_file_stem, is_valid_name};
