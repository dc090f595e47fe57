//! Reading and writing helpers shared by the manifest and record codecs.

use crate::error::{CodecError, CodecResult};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Indentation used for every written document.
const INDENT_CHAR: u8 = b'\t';
const INDENT_SIZE: usize = 1;

/// Returns the 1-based line that contains byte `offset` of `text`.
pub(crate) fn line_at(text: &str, offset: u64) -> usize {
    let end = usize::try_from(offset).unwrap_or(usize::MAX).min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Returns true if `name` can be written as an XML attribute name.
///
/// Accepted names start with a letter or `_`, followed by letters, digits,
/// `_`, `-` or `.`. Namespace prefixes (`:`) are not accepted.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Returns true if `stem` can be used as a record file name stem.
///
/// The stem must be non-empty, must not be `.` or `..`, and must not contain
/// path separators or NUL.
#[must_use]
pub fn is_valid_file_stem(stem: &str) -> bool {
    !stem.is_empty()
        && stem != "."
        && stem != ".."
        && !stem.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
}

/// Pull reader over an in-memory document that reports line numbers.
pub(crate) struct XmlReader<'a> {
    text: &'a str,
    reader: Reader<&'a [u8]>,
}

impl<'a> XmlReader<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            reader: Reader::from_str(text),
        }
    }

    /// Reads the next event.
    pub(crate) fn next(&mut self) -> CodecResult<Event<'a>> {
        self.reader.read_event().map_err(|source| CodecError::Syntax {
            line: line_at(self.text, self.reader.error_position()),
            source,
        })
    }

    /// Line of the most recently read event.
    pub(crate) fn line(&self) -> usize {
        line_at(self.text, self.reader.buffer_position())
    }

    /// Checks that `start` is the expected root element.
    pub(crate) fn expect_root(&self, start: &BytesStart<'_>, expected: &'static str) -> CodecResult<()> {
        if start.name().as_ref() == expected.as_bytes() {
            Ok(())
        } else {
            Err(CodecError::UnexpectedRoot {
                expected,
                found: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            })
        }
    }

    /// Collects the attributes of `start` in document order, unescaped.
    pub(crate) fn attributes(&self, start: &BytesStart<'_>) -> CodecResult<Vec<(String, String)>> {
        let line = self.line();
        start
            .attributes()
            .map(|attr| {
                let attr = attr.map_err(|source| CodecError::Attribute { line, source })?;
                let key = std::str::from_utf8(attr.key.as_ref())
                    .map_err(|_| CodecError::InvalidUtf8 { line })?
                    .to_owned();
                let value = attr
                    .unescape_value()
                    .map_err(|source| CodecError::Syntax { line, source })?
                    .into_owned();
                Ok((key, value))
            })
            .collect()
    }

    /// Returns the unescaped content of a text node.
    pub(crate) fn text(&self, text: &BytesText<'_>) -> CodecResult<String> {
        let line = self.line();
        text.unescape()
            .map(|cow| cow.into_owned())
            .map_err(|source| CodecError::Syntax { line, source })
    }
}

/// Escapes an attribute value, including the whitespace characters that
/// attribute-value normalization would otherwise turn into spaces.
pub(crate) fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

/// Appends `name="value"` to `element`, escaping the value.
pub(crate) fn push_attribute(element: &mut BytesStart<'_>, name: &str, value: &str) {
    let value = escape_attribute(value);
    element.push_attribute(Attribute::from((name.as_bytes(), value.as_bytes())));
}

/// Creates an indenting writer that has already emitted the XML declaration.
pub(crate) fn new_writer() -> CodecResult<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), INDENT_CHAR, INDENT_SIZE);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    Ok(writer)
}

/// Finishes a document produced by [`new_writer`].
pub(crate) fn finish(writer: Writer<Vec<u8>>) -> String {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    // Every byte written came from a `&str`.
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_one_based() {
        let text = "a\nb\nc";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 2), 2);
        assert_eq!(line_at(text, 4), 3);
        assert_eq!(line_at(text, 1000), 3);
    }

    #[test]
    fn attribute_names() {
        assert!(is_valid_name("x"));
        assert!(is_valid_name("_hidden"));
        assert!(is_valid_name("max-hp.base_2"));
        assert!(is_valid_name("città"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1st"));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name("ns:attr"));
        assert!(!is_valid_name("-dash"));
    }

    #[test]
    fn attribute_whitespace_is_escaped() {
        assert_eq!(escape_attribute("a\nb\r\tc"), "a&#10;b&#13;&#9;c");
        assert_eq!(escape_attribute("<\"&'>"), "&lt;&quot;&amp;&apos;&gt;");
        assert_eq!(escape_attribute("plain"), "plain");
    }

    #[test]
    fn file_stems() {
        assert!(is_valid_file_stem("abcdefgh"));
        assert!(is_valid_file_stem("legacy-id_01"));
        assert!(!is_valid_file_stem(""));
        assert!(!is_valid_file_stem("."));
        assert!(!is_valid_file_stem(".."));
        assert!(!is_valid_file_stem("../escape"));
        assert!(!is_valid_file_stem("a\\b"));
    }
}
