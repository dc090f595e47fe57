//! Manifest codec.
//!
//! The manifest indexes every key of a database by name and record file stem:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <database>
//! 	<key name="player" src="qwertyui"/>
//! 	<key name="enemy" src="asdfghjk"/>
//! </database>
//! ```
//!
//! Entries may also be wrapped in a `<keys>` element; both layouts decode to
//! the same [`Manifest`]. Encoding always produces the flat layout.

use crate::error::{CodecError, CodecResult};
use crate::xml::{self, XmlReader};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::collections::HashSet;

/// Root element of the manifest document.
pub const MANIFEST_ROOT: &str = "database";
const KEYS_WRAPPER: &str = "keys";
const ENTRY: &str = "key";
const NAME_ATTR: &str = "name";
const SRC_ATTR: &str = "src";

/// One manifest line: a key name and the stem of its record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Key name, unique within the manifest.
    pub name: String,
    /// Record file stem, unique within the manifest.
    pub src: String,
}

/// The ordered index of a database's keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Entries in key order.
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, name: impl Into<String>, src: impl Into<String>) {
        self.entries.push(ManifestEntry {
            name: name.into(),
            src: src.into(),
        });
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    /// Returns true if some entry uses `src` as its record file stem.
    #[must_use]
    pub fn contains_src(&self, src: &str) -> bool {
        self.entries.iter().any(|entry| entry.src == src)
    }

    /// Encodes the manifest as an XML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn encode(&self) -> CodecResult<String> {
        let mut writer = xml::new_writer()?;

        if self.entries.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(MANIFEST_ROOT)))?;
            return Ok(xml::finish(writer));
        }

        writer.write_event(Event::Start(BytesStart::new(MANIFEST_ROOT)))?;
        for entry in &self.entries {
            let mut element = BytesStart::new(ENTRY);
            xml::push_attribute(&mut element, NAME_ATTR, &entry.name);
            xml::push_attribute(&mut element, SRC_ATTR, &entry.src);
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new(MANIFEST_ROOT)))?;

        Ok(xml::finish(writer))
    }

    /// Decodes a manifest document.
    ///
    /// Unknown elements are ignored. A `<key>` entry directly under the root
    /// (or under a `<keys>` wrapper) must carry both `name` and `src`; names
    /// and sources must be unique and sources must be usable file stems.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending line if the document is
    /// malformed or an entry is incomplete, duplicated or unusable.
    pub fn decode(text: &str) -> CodecResult<Self> {
        let mut reader = XmlReader::new(text);
        let mut decoder = Decoder::default();
        let mut open: Vec<Vec<u8>> = Vec::new();

        loop {
            match reader.next()? {
                Event::Start(start) => {
                    decoder.visit(&reader, &open, &start)?;
                    open.push(start.name().as_ref().to_vec());
                }
                Event::Empty(start) => decoder.visit(&reader, &open, &start)?,
                Event::End(_) => {
                    open.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !decoder.root_seen {
            return Err(CodecError::MissingRoot {
                expected: MANIFEST_ROOT,
            });
        }

        Ok(Self {
            entries: decoder.entries,
        })
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Default)]
struct Decoder {
    root_seen: bool,
    entries: Vec<ManifestEntry>,
    names: HashSet<String>,
    srcs: HashSet<String>,
}

impl Decoder {
    fn visit(
        &mut self,
        reader: &XmlReader<'_>,
        open: &[Vec<u8>],
        start: &BytesStart<'_>,
    ) -> CodecResult<()> {
        if open.is_empty() {
            reader.expect_root(start, MANIFEST_ROOT)?;
            self.root_seen = true;
            return Ok(());
        }

        let is_entry = start.name().as_ref() == ENTRY.as_bytes()
            && (open.len() == 1 || (open.len() == 2 && open[1] == KEYS_WRAPPER.as_bytes()));
        if is_entry {
            self.entry(reader, start)?;
        }
        Ok(())
    }

    fn entry(&mut self, reader: &XmlReader<'_>, start: &BytesStart<'_>) -> CodecResult<()> {
        let line = reader.line();
        let mut name = None;
        let mut src = None;
        for (key, value) in reader.attributes(start)? {
            match key.as_str() {
                NAME_ATTR => name = Some(value),
                SRC_ATTR => src = Some(value),
                _ => {}
            }
        }

        let name = name.ok_or(CodecError::MissingAttribute {
            element: ENTRY,
            attribute: NAME_ATTR,
            line,
        })?;
        let src = src.ok_or(CodecError::MissingAttribute {
            element: ENTRY,
            attribute: SRC_ATTR,
            line,
        })?;

        if !xml::is_valid_file_stem(&src) {
            return Err(CodecError::InvalidAttribute {
                element: ENTRY,
                attribute: SRC_ATTR,
                value: src,
                line,
            });
        }
        if !self.names.insert(name.clone()) {
            return Err(CodecError::Duplicate {
                attribute: NAME_ATTR,
                value: name,
                line,
            });
        }
        if !self.srcs.insert(src.clone()) {
            return Err(CodecError::Duplicate {
                attribute: SRC_ATTR,
                value: src,
                line,
            });
        }

        self.entries.push(ManifestEntry { name, src });
        Ok(())
    }
}
