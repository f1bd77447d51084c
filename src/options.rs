//! Configuration options for writing units.
//!
//! - [`WriteOptions`]: text layout of serialized units
//! - [`SealOptions`]: how text is wrapped into a binary container
//! - [`Compression`]: the stream format used inside a container
//!
//! ## Examples
//!
//! ```rust
//! use sii_unit::{to_string_with_options, Object, WriteOptions};
//!
//! let object = Object::new("truck.0", "vehicle").with_attribute("wheels", 6);
//!
//! let text = to_string_with_options(&object, &WriteOptions::new().with_indent(4));
//! assert_eq!(text, "vehicle : truck.0 {\n    wheels: 6\n}\n");
//! ```

/// Text layout options for serialization.
///
/// # Examples
///
/// ```rust
/// use sii_unit::WriteOptions;
///
/// let options = WriteOptions::new();
/// assert_eq!(options.indent, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { indent: 1 }
    }
}

impl WriteOptions {
    /// Creates default options (one space per nesting level).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Stream format applied to unit text before encryption.
///
/// Reading detects the format on its own; this only matters when writing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    /// Encrypt the plain text.
    None,
    /// A gzip member.
    #[default]
    Gzip,
    /// A zlib stream, as the game itself writes.
    Zlib,
}

/// Options for sealing unit text into a binary container.
///
/// # Examples
///
/// ```rust
/// use sii_unit::{Compression, SealOptions};
///
/// let options = SealOptions::new()
///     .with_compression(Compression::Zlib)
///     .with_iv([7; 16]);
///
/// assert_eq!(options.compression, Compression::Zlib);
/// assert_eq!(options.iv, Some([7; 16]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SealOptions {
    pub compression: Compression,
    /// Initialization vector to encrypt with; a random one is drawn when `None`.
    pub iv: Option<[u8; 16]>,
}

impl SealOptions {
    /// Creates default options (gzip, random IV).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Uses a fixed initialization vector, making the output reproducible.
    #[must_use]
    pub fn with_iv(mut self, iv: [u8; 16]) -> Self {
        self.iv = Some(iv);
        self
    }
}
