//! Dynamic value representation for SII attributes.
//!
//! This module provides the [`Value`] enum which represents any attribute value a
//! SII unit can carry, together with [`Placement`], the composite location and
//! rotation value.
//!
//! ## Core Types
//!
//! - [`Value`]: strings, booleans, arbitrary-precision integers, single-precision floats,
//!   identifiers, unrecognized raw text, numeric vectors, placements and arrays
//! - [`Placement`]: a 3-component location plus a 4-component rotation
//!
//! ## Textual Form
//!
//! `Display` writes the value the way it appears after the `:` of an attribute line:
//!
//! ```rust
//! use sii_unit::Value;
//!
//! assert_eq!(Value::from("hello").to_string(), "\"hello\"");
//! assert_eq!(Value::Float(0.625).to_string(), "&3f200000");
//! assert_eq!(Value::Float(2.0).to_string(), "2");
//! assert_eq!(Value::Identifier("my.token".into()).to_string(), "my.token");
//! ```
//!
//! Decoding goes the other way through [`Value::parse`]:
//!
//! ```rust
//! use sii_unit::Value;
//!
//! assert_eq!(Value::parse("0x10").as_i64(), Some(16));
//! assert_eq!(Value::parse("&3f200000"), Value::Float(0.625));
//! assert!(Value::parse("(1, 2, 3)").is_vector());
//! ```

use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fmt::Write as _;

/// A dynamically-typed representation of any SII attribute value.
///
/// The variant is inferred purely from the value's textual syntax. Text matching
/// no known form is kept verbatim as [`Value::Unknown`] so it can be written back
/// unchanged instead of being mistaken for a string.
///
/// Fixed-size arrays ([`Value::Array`]) and open-ended lists ([`Value::List`]) are
/// never written on a single line; they are rebuilt from `name[i]: ...` and
/// `name[]: ...` lines while an object body is parsed.
///
/// # Examples
///
/// ```rust
/// use sii_unit::Value;
///
/// let text = Value::from("hello");
/// let flag = Value::Bool(true);
///
/// assert!(text.is_string());
/// assert_eq!(flag.as_bool(), Some(true));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Quoted text, stored without its quotes and without unescaping.
    ///
    /// Backslash escapes are kept as written, so the content must already be in
    /// escaped form: an unescaped `"` or a single trailing `\` produces text
    /// that does not read back.
    String(String),
    Bool(bool),
    Integer(BigInt),
    Float(f32),
    /// A bare token or reference such as `company.volatile.abc`.
    Identifier(String),
    /// Raw text that matched no recognized syntax.
    Unknown(String),
    IntVector(Vec<BigInt>),
    FloatVector(Vec<f32>),
    Placement(Placement),
    /// An array whose length was declared by a `name: <count>` line.
    Array(Vec<Value>),
    /// An array built by appending `name[]: ...` lines.
    List(Vec<Value>),
}

/// The position and orientation of an object in space.
///
/// Written as `(x, y, z) (w; x, y, z)`.
///
/// # Examples
///
/// ```rust
/// use sii_unit::Placement;
///
/// let placement = Placement::new([0.0, 1.0, 0.0], [12.0, 6.0, 6.0, 6.0]);
/// assert_eq!(placement.to_string(), "(0, 1, 0) (12; 6, 6, 6)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct Placement {
    pub location: [f32; 3],
    pub rotation: [f32; 4],
}

impl Placement {
    #[must_use]
    pub const fn new(location: [f32; 3], rotation: [f32; 4]) -> Self {
        Placement { location, rotation }
    }
}

impl Value {
    /// Decodes the raw text of an attribute value.
    ///
    /// This never fails: text matching none of the known forms becomes
    /// [`Value::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Value {
        crate::attribute::decode_value(raw)
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Value::Identifier(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    /// Returns `true` for both integer and float vectors.
    #[inline]
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        matches!(self, Value::IntVector(_) | Value::FloatVector(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_placement(&self) -> bool {
        matches!(self, Value::Placement(_))
    }

    /// Returns `true` for both fixed-size arrays and open-ended lists.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_) | Value::List(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a quoted string, returns it without the quotes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sii_unit::Value;
    ///
    /// assert_eq!(Value::parse("\"Sdang\"").as_str(), Some("Sdang"));
    /// assert_eq!(Value::parse("Sdang").as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an identifier, returns its token text.
    #[inline]
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Value::Identifier(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// If the value is an integer that fits in an `i64`, returns it.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => i64::try_from(i).ok(),
            _ => None,
        }
    }

    /// Returns the value as a float, converting integers.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(bigint_to_f32(i)),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_placement(&self) -> Option<&Placement> {
        match self {
            Value::Placement(p) => Some(p),
            _ => None,
        }
    }

    /// If the value is a fixed array or an open-ended list, returns its elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }
}

pub(crate) fn bigint_to_f32(value: &BigInt) -> f32 {
    match i64::try_from(value) {
        Ok(small) => small as f32,
        Err(_) => value.to_string().parse().unwrap_or(f32::NAN),
    }
}

/// Writes a float the way the game does: whole numbers in decimal, everything else
/// as `&` followed by the big-endian hex of the IEEE-754 bit pattern.
pub(crate) fn write_float<W: fmt::Write>(out: &mut W, value: f32) -> fmt::Result {
    if value.fract() == 0.0 && value.abs() < 2_147_483_648.0 {
        write!(out, "{}", value as i32)
    } else {
        write!(out, "&{:08x}", value.to_bits())
    }
}

fn write_vector<W, T, F>(out: &mut W, items: &[T], mut write_item: F) -> fmt::Result
where
    W: fmt::Write,
    F: FnMut(&mut W, &T) -> fmt::Result,
{
    out.write_char('(')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_item(out, item)?;
    }
    out.write_char(')')
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_vector(f, &self.location, |out, v| write_float(out, *v))?;
        f.write_str(" (")?;
        for (i, v) in self.rotation.iter().enumerate() {
            match i {
                0 => {}
                1 => f.write_str("; ")?,
                _ => f.write_str(", ")?,
            }
            write_float(f, *v)?;
        }
        f.write_char(')')
    }
}

impl fmt::Display for Value {
    /// Arrays display as their element count, which is what a fixed array's
    /// length line carries; their items are written on their own lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write_float(f, *v),
            Value::Identifier(s) | Value::Unknown(s) => f.write_str(s),
            Value::IntVector(items) => write_vector(f, items, |out, v| write!(out, "{}", v)),
            Value::FloatVector(items) => write_vector(f, items, |out, v| write_float(out, *v)),
            Value::Placement(p) => write!(f, "{}", p),
            Value::Array(items) | Value::List(items) => write!(f, "{}", items.len()),
        }
    }
}

fn serialize_bigint<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    match i64::try_from(value) {
        Ok(small) => serializer.serialize_i64(small),
        Err(_) => serializer.serialize_str(&value.to_string()),
    }
}

struct BigIntRef<'a>(&'a BigInt);

impl Serialize for BigIntRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_bigint(self.0, serializer)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;

        match self {
            Value::String(s) | Value::Identifier(s) | Value::Unknown(s) => {
                serializer.serialize_str(s)
            }
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serialize_bigint(i, serializer),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::IntVector(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&BigIntRef(item))?;
                }
                seq.end()
            }
            Value::FloatVector(items) => items.serialize(serializer),
            Value::Placement(p) => p.serialize(serializer),
            Value::Array(items) | Value::List(items) => items.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(BigInt::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(BigInt::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(BigInt::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Integer(BigInt::from(value))
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Integer(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Placement> for Value {
    fn from(value: Placement) -> Self {
        Value::Placement(value)
    }
}
