//! Reading units from any of their encodings.
//!
//! A [`Reader`] accepts plain text units and binary containers alike. Text is
//! sanitized, split into lines, has its `@include` directives replaced by the
//! included files' lines, and is finally parsed into the root [`Object`].

use crate::de::{parse_object, sanitize_source, split_source_to_lines};
use crate::envelope::{self, TEXT_SIGNATURE};
use crate::include::IncludeProvider;
use crate::{Error, Object, Result};
use std::io::Read;
use tracing::debug;

/// Maximum nesting of included files.
pub const MAX_INCLUDE_DEPTH: usize = 32;

const INCLUDE_DIRECTIVE: &str = "@include";

/// Reads units, optionally resolving `@include` directives.
///
/// A reader without an include provider fails on the first directive it meets.
/// Each call parses into a fresh tree; a reader can be reused for any number of
/// units.
///
/// # Examples
///
/// ```rust
/// use sii_unit::Reader;
///
/// let text = b"SiiNunit\n{\nclass : instance {\nattribute: 15\n}\n}\n";
/// let unit = Reader::new().read(text.as_slice())?;
///
/// let object = unit.child("instance").unwrap();
/// assert_eq!(object.attribute("attribute").and_then(|v| v.as_i64()), Some(15));
/// # Ok::<(), sii_unit::Error>(())
/// ```
#[derive(Default)]
pub struct Reader<'a> {
    include_provider: Option<Box<dyn IncludeProvider + 'a>>,
}

impl<'a> Reader<'a> {
    /// Creates a reader that rejects `@include` directives.
    #[must_use]
    pub fn new() -> Self {
        Reader {
            include_provider: None,
        }
    }

    /// Creates a reader resolving `@include` directives through `provider`.
    #[must_use]
    pub fn with_include_provider<P>(provider: P) -> Self
    where
        P: IncludeProvider + 'a,
    {
        Reader {
            include_provider: Some(Box::new(provider)),
        }
    }

    /// Reads a unit of any encoding.
    ///
    /// Input starting with the container signature is read as a binary container,
    /// anything else as text.
    pub fn read<R: Read>(&self, mut reader: R) -> Result<Object> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.read_slice(&data)
    }

    /// Reads a unit of any encoding from memory.
    pub fn read_slice(&self, data: &[u8]) -> Result<Object> {
        if envelope::is_encrypted(data) {
            debug!(len = data.len(), "detected binary container");
            let text = envelope::open(data)?;
            self.parse_text(&text)
        } else {
            debug!(len = data.len(), "reading as text");
            self.parse_text(data)
        }
    }

    /// Reads a plain text unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the text does not start with `SiiNunit`,
    /// or any error raised while parsing or expanding includes.
    pub fn read_text<R: Read>(&self, mut reader: R) -> Result<Object> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.parse_text(&data)
    }

    /// Reads a binary container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the header is missing or malformed,
    /// [`Error::Crypto`] if decryption fails, or any error raised by
    /// [`Reader::read_text`] on the decrypted text.
    pub fn read_binary<R: Read>(&self, mut reader: R) -> Result<Object> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let text = envelope::open(&data)?;
        self.parse_text(&text)
    }

    fn parse_text(&self, data: &[u8]) -> Result<Object> {
        let text = String::from_utf8_lossy(data);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        if !text.as_bytes().starts_with(TEXT_SIGNATURE) {
            return Err(Error::invalid_format("missing SiiNunit signature"));
        }

        let lines = split_source_to_lines(&sanitize_source(text)?);
        let lines = self.expand_includes(lines, 0)?;
        debug!(lines = lines.len(), "parsing unit");

        parse_object(&lines, 0, lines.len())
    }

    /// Replaces every directive line with the lines of the file it names, expanding
    /// includes within included files as well.
    fn expand_includes(&self, lines: Vec<String>, depth: usize) -> Result<Vec<String>> {
        if !lines.iter().any(|line| line.starts_with(INCLUDE_DIRECTIVE)) {
            return Ok(lines);
        }

        let mut expanded = Vec::with_capacity(lines.len());
        for line in lines {
            if !line.starts_with(INCLUDE_DIRECTIVE) {
                expanded.push(line);
                continue;
            }

            let provider = self.include_provider.as_ref().ok_or_else(|| {
                Error::UnsupportedOperation(
                    "cannot include external files without an inclusion provider".to_string(),
                )
            })?;
            let path = include_path(&line)?;
            if depth >= MAX_INCLUDE_DEPTH {
                return Err(Error::IncludeDepth {
                    path: path.to_string(),
                    depth: MAX_INCLUDE_DEPTH,
                });
            }

            let mut content = Vec::new();
            provider.include_file(path)?.read_to_end(&mut content)?;
            debug!(path, depth, bytes = content.len(), "resolved include");

            let included = sanitize_source(&String::from_utf8_lossy(&content))?;
            let included = self.expand_includes(split_source_to_lines(&included), depth + 1)?;
            expanded.extend(included);
        }
        Ok(expanded)
    }
}

/// Extracts the text between the first and last `"` of a directive line.
fn include_path(line: &str) -> Result<&str> {
    match (line.find('"'), line.rfind('"')) {
        (Some(first), Some(last)) if first < last => Ok(&line[first + 1..last]),
        _ => Err(Error::InvalidInclude(line.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    const UNIT: &[u8] = b"SiiNunit\n{\nclass : instance {\nattribute: 15\n}\n}\n";

    #[test]
    fn test_include_path() {
        assert_eq!(include_path("@include \"a/b.sii\"").unwrap(), "a/b.sii");
        assert_eq!(include_path("@include \"/x \"y\".sii\"").unwrap(), "/x \"y\".sii");
        assert!(matches!(
            include_path("@include a.sii"),
            Err(Error::InvalidInclude(_))
        ));
        assert!(matches!(
            include_path("@include \"a.sii"),
            Err(Error::InvalidInclude(_))
        ));
    }

    #[test]
    fn test_read_text() {
        let unit = Reader::new().read_text(UNIT).unwrap();

        assert_eq!(unit.name(), "SiiNunit");
        assert_eq!(
            unit.child("instance").and_then(|o| o.attribute("attribute")),
            Some(&Value::from(15))
        );
    }

    #[test]
    fn test_read_text_with_bom() {
        let mut data = b"\xef\xbb\xbf".to_vec();
        data.extend_from_slice(UNIT);

        assert_eq!(Reader::new().read_text(data.as_slice()).unwrap().child_count(), 1);
    }

    #[test]
    fn test_read_text_rejects_signature() {
        let result = Reader::new().read_text(b"NotAUnit\n{\n}".as_slice());
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_read_binary_rejects_text() {
        let result = Reader::new().read_binary(UNIT);
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_read_dispatch() {
        let sealed = envelope::seal(UNIT, &Default::default()).unwrap();

        let from_text = Reader::new().read(UNIT).unwrap();
        let from_binary = Reader::new().read(sealed.as_slice()).unwrap();
        assert_eq!(from_text, from_binary);
    }

    #[test]
    fn test_read_short_input() {
        let result = Reader::new().read(b"Sii".as_slice());
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_include_without_provider() {
        let result = Reader::new().read_text(b"SiiNunit\n{\n@include \"a.sii\"\n}".as_slice());
        assert!(matches!(result, Err(Error::UnsupportedOperation(_))));

        let result = Reader::new().read_text(b"SiiNunit\n{\n@include a.sii\n}".as_slice());
        assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
    }

    #[test]
    fn test_include_cycle() {
        let reader = Reader::with_include_provider(|_: &str| -> Result<Vec<u8>> {
            Ok(b"@include \"self.sii\"".to_vec())
        });

        let result = reader.read_text(b"SiiNunit\n{\n@include \"self.sii\"\n}".as_slice());
        assert!(matches!(
            result,
            Err(Error::IncludeDepth { ref path, depth: MAX_INCLUDE_DEPTH }) if path == "self.sii"
        ));
    }
}
