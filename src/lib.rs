//! # sii_unit
//!
//! A reader and writer for SII units, the `SiiNunit` object-description format
//! games built on the Prism3D engine use for definitions, configuration and saves.
//!
//! ## What is a unit?
//!
//! A unit is a tree of typed, named objects whose attributes carry strings,
//! numbers, tokens, vectors and placements:
//!
//! ```text
//! SiiNunit
//! {
//! vehicle : truck.0 {
//!  brand: "scania"
//!  odometer: 120000
//!  fuel: &3f400000
//!  accessories: 2
//!  accessories[0]: truck.0.engine
//!  accessories[1]: truck.0.chassis
//!  placement: (0, 1, 0) (1; 0, 0, 0)
//! }
//! }
//! ```
//!
//! The same text also comes in a binary container: AES-256-CBC encrypted and,
//! usually, compressed. Every reading function here detects the encoding on its own.
//!
//! ## Key Features
//!
//! - **Typed values**: attribute types are inferred from their syntax; unrecognized
//!   syntax is kept verbatim instead of failing
//! - **Arrays**: `name[i]` and `name[]` lines are folded into a single array value
//! - **Both brace styles**: `{` on the header line or on its own line
//! - **Binary containers**: decryption, decompression and the reverse
//! - **Includes**: `@include` directives resolved through a pluggable provider
//! - **Serde export**: parsed trees implement `Serialize`
//!
//! ## Quick Start
//!
//! ```rust
//! use sii_unit::{from_str, to_string};
//!
//! let unit = from_str("SiiNunit\n{\nvehicle : truck.0 {\n brand: \"scania\"\n}\n}\n")?;
//!
//! let truck = unit.child("truck.0").unwrap();
//! assert_eq!(truck.class_name(), "vehicle");
//! assert_eq!(truck.attribute("brand").and_then(|v| v.as_str()), Some("scania"));
//!
//! // Serialized text parses back to an equal tree.
//! assert_eq!(from_str(&to_string(&unit))?, unit);
//! # Ok::<(), sii_unit::Error>(())
//! ```
//!
//! ### Binary containers
//!
//! ```rust
//! use sii_unit::{from_slice, from_str, to_binary, SealOptions};
//!
//! let unit = from_str("SiiNunit\n{\njob : job.0 {\n reward: 4200\n}\n}\n")?;
//! let sealed = to_binary(&unit, &SealOptions::new())?;
//!
//! assert_eq!(&sealed[..4], b"ScsC");
//! assert_eq!(from_slice(&sealed)?, unit);
//! # Ok::<(), sii_unit::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events at `debug` and `trace` level while reading and
//! writing. It never installs a subscriber.

pub mod attribute;
pub mod de;
pub mod envelope;
pub mod error;
pub mod include;
pub mod map;
pub mod object;
pub mod options;
pub mod reader;
pub mod ser;
pub mod value;

pub use attribute::{ArrayItem, Attribute};
pub use error::{Error, Result};
pub use include::{FsIncludeProvider, IncludeProvider};
pub use map::AttributeMap;
pub use object::Object;
pub use options::{Compression, SealOptions, WriteOptions};
pub use reader::Reader;
pub use ser::Serializer;
pub use value::{Placement, Value};

use std::io;

/// Reads a unit of any encoding from a reader.
///
/// `@include` directives are rejected; use a [`Reader`] with an
/// [`IncludeProvider`] to resolve them.
///
/// # Examples
///
/// ```rust
/// use sii_unit::from_reader;
/// use std::io::Cursor;
///
/// let unit = from_reader(Cursor::new(b"SiiNunit\n{\n}\n"))?;
/// assert_eq!(unit.child_count(), 0);
/// # Ok::<(), sii_unit::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the input is not a valid unit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(reader: R) -> Result<Object>
where
    R: io::Read,
{
    Reader::new().read(reader)
}

/// Reads a unit of any encoding from bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid unit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(data: &[u8]) -> Result<Object> {
    Reader::new().read_slice(data)
}

/// Reads a unit from text.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the text does not start with `SiiNunit`, or
/// the first structural error found while parsing.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(text: &str) -> Result<Object> {
    Reader::new().read_text(text.as_bytes())
}

/// Serializes an object tree to unit text.
///
/// # Examples
///
/// ```rust
/// use sii_unit::{to_string, Object};
///
/// let object = Object::new("instance", "class").with_attribute("attribute", 15);
/// assert_eq!(to_string(&object), "class : instance {\n attribute: 15\n}\n");
/// ```
#[must_use]
pub fn to_string(object: &Object) -> String {
    to_string_with_options(object, &WriteOptions::default())
}

/// Serializes an object tree to unit text with custom layout options.
#[must_use]
pub fn to_string_with_options(object: &Object, options: &WriteOptions) -> String {
    ser::serialize_object(object, options)
}

/// Serializes an object tree as text into a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, object: &Object) -> Result<()>
where
    W: io::Write,
{
    writer.write_all(to_string(object).as_bytes())?;
    Ok(())
}

/// Serializes an object tree into a binary container.
///
/// # Errors
///
/// Returns an error if compression fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_binary(object: &Object, options: &SealOptions) -> Result<Vec<u8>> {
    envelope::seal(to_string(object).as_bytes(), options)
}
