//! Record codec.
//!
//! Each key is stored in its own file:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <key>
//! 	<description>Main character</description>
//! 	<properties hp="100" speed="2.5"/>
//! </key>
//! ```
//!
//! Both children are optional. Properties are a flat string mapping carried
//! as the attributes of `<properties>`.

use crate::error::{CodecError, CodecResult};
use crate::xml::{self, XmlReader};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::collections::BTreeMap;

/// Root element of a record document.
pub const RECORD_ROOT: &str = "key";
const DESCRIPTION: &str = "description";
const PROPERTIES: &str = "properties";

/// Property mapping of a key.
pub type PropertyMap = BTreeMap<String, String>;

/// The persisted content of a single key.
///
/// The key's name is not part of the record; it lives in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDocument {
    /// Optional free text.
    pub description: Option<String>,
    /// Flat property mapping.
    pub properties: PropertyMap,
}

impl KeyDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes the document as XML.
    ///
    /// The `<properties>` element is omitted when there are no properties and
    /// `<description>` is omitted when there is no description.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidName`] if a property name is not a valid
    /// attribute name, or an error if the writer fails.
    pub fn encode(&self) -> CodecResult<String> {
        if let Some(name) = self.properties.keys().find(|name| !xml::is_valid_name(name)) {
            return Err(CodecError::invalid_name(name.as_str()));
        }

        let mut writer = xml::new_writer()?;

        if self.description.is_none() && self.properties.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(RECORD_ROOT)))?;
            return Ok(xml::finish(writer));
        }

        writer.write_event(Event::Start(BytesStart::new(RECORD_ROOT)))?;

        if let Some(description) = &self.description {
            writer.write_event(Event::Start(BytesStart::new(DESCRIPTION)))?;
            writer.write_event(Event::Text(BytesText::new(description)))?;
            writer.write_event(Event::End(BytesEnd::new(DESCRIPTION)))?;
        }

        if !self.properties.is_empty() {
            let mut element = BytesStart::new(PROPERTIES);
            for (name, value) in &self.properties {
                xml::push_attribute(&mut element, name, value);
            }
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new(RECORD_ROOT)))?;
        Ok(xml::finish(writer))
    }

    /// Decodes a record document.
    ///
    /// Only direct children of the root are recognised; anything else is
    /// ignored. Repeated `<properties>` elements are merged in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or has the wrong root.
    pub fn decode(text: &str) -> CodecResult<Self> {
        let mut reader = XmlReader::new(text);
        let mut document = Self::default();
        let mut open: Vec<Vec<u8>> = Vec::new();
        let mut root_seen = false;

        loop {
            let in_description = open.len() == 2 && open[1] == DESCRIPTION.as_bytes();
            match reader.next()? {
                Event::Start(start) => {
                    if open.is_empty() {
                        reader.expect_root(&start, RECORD_ROOT)?;
                        root_seen = true;
                    } else if open.len() == 1 {
                        document.child(&reader, &start)?;
                    }
                    open.push(start.name().as_ref().to_vec());
                }
                Event::Empty(start) => {
                    if open.is_empty() {
                        reader.expect_root(&start, RECORD_ROOT)?;
                        root_seen = true;
                    } else if open.len() == 1 {
                        document.child(&reader, &start)?;
                    }
                }
                Event::Text(chunk) if in_description => {
                    let chunk = reader.text(&chunk)?;
                    document.description.get_or_insert_with(String::new).push_str(&chunk);
                }
                Event::CData(data) if in_description => {
                    let line = reader.line();
                    let chunk = std::str::from_utf8(&data).map_err(|_| CodecError::InvalidUtf8 { line })?;
                    document.description.get_or_insert_with(String::new).push_str(chunk);
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !root_seen {
            return Err(CodecError::MissingRoot {
                expected: RECORD_ROOT,
            });
        }

        Ok(document)
    }

    fn child(&mut self, reader: &XmlReader<'_>, start: &BytesStart<'_>) -> CodecResult<()> {
        match start.name().as_ref() {
            name if name == DESCRIPTION.as_bytes() => {
                self.description.get_or_insert_with(String::new);
            }
            name if name == PROPERTIES.as_bytes() => {
                self.properties.extend(reader.attributes(start)?);
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(description: Option<&str>, properties: &[(&str, &str)]) -> KeyDocument {
        KeyDocument {
            description: description.map(str::to_string),
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn empty_document_has_no_children() {
        let text = KeyDocument::new().encode().unwrap();
        assert!(text.contains("<key/>"));
        assert!(!text.contains("properties"));
        assert_eq!(KeyDocument::decode(&text).unwrap(), KeyDocument::new());
    }

    #[test]
    fn properties_roundtrip() {
        let doc = document(None, &[("x", "1"), ("label", "a < b & \"c\"")]);
        let text = doc.encode().unwrap();
        assert!(text.contains("<properties"));
        assert!(!text.contains("description"));
        assert_eq!(KeyDocument::decode(&text).unwrap(), doc);
    }

    #[test]
    fn property_whitespace_is_escaped() {
        let doc = document(None, &[("x", "l1\nl2\tz\r")]);
        let text = doc.encode().unwrap();
        assert!(text.contains("x=\"l1&#10;l2&#9;z&#13;\""));
        assert!(!text.contains("l2\tz"));
        assert_eq!(KeyDocument::decode(&text).unwrap(), doc);
    }

    #[test]
    fn description_roundtrip_keeps_whitespace() {
        let doc = document(Some("  two\nlines <tagged> "), &[("x", "1")]);
        let text = doc.encode().unwrap();
        assert_eq!(KeyDocument::decode(&text).unwrap(), doc);
    }

    #[test]
    fn empty_description_is_present() {
        let decoded = KeyDocument::decode("<key><description/></key>").unwrap();
        assert_eq!(decoded.description.as_deref(), Some(""));
    }

    #[test]
    fn invalid_property_name_rejected() {
        let doc = document(None, &[("not valid", "1")]);
        assert!(matches!(doc.encode(), Err(CodecError::InvalidName { .. })));
    }

    #[test]
    fn unknown_and_nested_elements_ignored() {
        let text = r#"<key>
            <notes>hello</notes>
            <wrapper><properties ignored="yes"/></wrapper>
            <properties a="1"/>
            <properties b="2"/>
        </key>"#;
        let decoded = KeyDocument::decode(text).unwrap();
        assert_eq!(decoded, document(None, &[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn cdata_description() {
        let decoded = KeyDocument::decode("<key><description><![CDATA[<raw>]]></description></key>").unwrap();
        assert_eq!(decoded.description.as_deref(), Some("<raw>"));
    }

    #[test]
    fn wrong_root_rejected() {
        assert!(matches!(
            KeyDocument::decode("<database/>"),
            Err(CodecError::UnexpectedRoot { .. })
        ));
        assert!(matches!(
            KeyDocument::decode("   "),
            Err(CodecError::MissingRoot { .. })
        ));
    }

    #[test]
    fn duplicate_attribute_rejected() {
        let err = KeyDocument::decode(r#"<key><properties a="1" a="2"/></key>"#).unwrap_err();
        assert!(matches!(err, CodecError::Attribute { .. }));
    }
}
