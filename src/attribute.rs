//! Attribute decoding.
//!
//! A value's type is inferred from its syntax alone by testing an ordered list of
//! patterns; the first match wins. The order matters because several forms overlap:
//! `0x10` is an integer before it could be anything else, and `my.token` must not be
//! read as a number.
//!
//! | Order | Syntax | Result |
//! |-------|--------|--------|
//! | 1 | `"..."` | [`Value::String`] |
//! | 2 | `-12`, `0x1f`, `-0x1f` | [`Value::Integer`] |
//! | 3 | `&3f200000`, `0.625`, `-.5` | [`Value::Float`] |
//! | 4 | `true`, `false` | [`Value::Bool`] |
//! | 5 | `.local.token`, `some_name` | [`Value::Identifier`] |
//! | 6 | `(1, 2, 3)`, `(1, &3f800000)` | [`Value::IntVector`] / [`Value::FloatVector`] |
//! | 7 | `(1, 2, 3) (1; 0, 0, 0)` | [`Value::Placement`] |
//! | 8 | anything else | [`Value::Unknown`] |
//!
//! Attribute names ending in `[n]` or `[]` mark items of an array attribute and are
//! decoded into an [`ArrayItem`] instead of a plain [`Attribute`].

use crate::value::{bigint_to_f32, Placement};
use crate::Value;
use num_bigint::BigInt;

/// A named attribute value.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

/// One element of an array attribute, as read from a single `name[i]: value` or
/// `name[]: value` line.
///
/// Items only exist while an object body is parsed; they are merged into a single
/// array-valued attribute of the enclosing object.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayItem {
    /// Base attribute name, without the brackets.
    pub name: String,
    /// Position in a fixed array, `None` to append to an open-ended list.
    pub index: Option<usize>,
    pub value: Value,
}

impl ArrayItem {
    /// Returns `true` if this item appends to an open-ended list.
    #[inline]
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.index.is_none()
    }
}

/// The result of decoding one attribute line.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedAttribute {
    Plain(Attribute),
    Item(ArrayItem),
}

/// Decodes an attribute name and its raw value text.
///
/// # Examples
///
/// ```rust
/// use sii_unit::attribute::{decode_attribute, ParsedAttribute};
///
/// match decode_attribute("names[2]", "\"re\"") {
///     ParsedAttribute::Item(item) => {
///         assert_eq!(item.name, "names");
///         assert_eq!(item.index, Some(2));
///     }
///     ParsedAttribute::Plain(_) => unreachable!(),
/// }
/// ```
#[must_use]
pub fn decode_attribute(name: &str, raw: &str) -> ParsedAttribute {
    let value = decode_value(raw);

    match split_array_name(name) {
        Some((base, index)) => ParsedAttribute::Item(ArrayItem {
            name: base.to_string(),
            index,
            value,
        }),
        None => ParsedAttribute::Plain(Attribute {
            name: name.to_string(),
            value,
        }),
    }
}

type Matcher = fn(&str) -> bool;
type Decoder = fn(&str) -> Option<Value>;

const DECODERS: [(Matcher, Decoder); 7] = [
    (is_string, decode_string),
    (is_integer, decode_integer),
    (is_float, decode_float_value),
    (is_bool, decode_bool),
    (is_identifier, decode_identifier),
    (is_vector, decode_vector),
    (is_placement, decode_placement),
];

/// Decodes raw value text, falling back to [`Value::Unknown`].
///
/// A form whose pattern matches but whose elements cannot be decoded (for
/// example a vector containing a stray hex word) is also kept as unknown.
#[must_use]
pub fn decode_value(raw: &str) -> Value {
    match DECODERS.iter().find(|(matches, _)| matches(raw)) {
        Some((_, decode)) => decode(raw).unwrap_or_else(|| Value::Unknown(raw.to_string())),
        None => Value::Unknown(raw.to_string()),
    }
}

/// Splits `name[3]` into `("name", Some(3))` and `name[]` into `("name", None)`.
///
/// Returns `None` for names that do not end in an array suffix.
#[must_use]
pub fn split_array_name(name: &str) -> Option<(&str, Option<usize>)> {
    let inner = name.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let digits = &inner[open + 1..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let base = &name[..name.find('[')?];
    Some((base, digits.parse().ok()))
}

fn is_string(raw: &str) -> bool {
    raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"')
}

fn is_hex(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_decimal(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_integer(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    match unsigned.strip_prefix("0x") {
        Some(hex) => is_hex(hex),
        None => is_decimal(unsigned),
    }
}

fn is_float(raw: &str) -> bool {
    if let Some(bits) = raw.strip_prefix('&') {
        return bits.len() == 8 && is_hex(bits);
    }

    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    match unsigned.split_once('.') {
        Some((whole, fraction)) => {
            whole.bytes().all(|b| b.is_ascii_digit()) && is_decimal(fraction)
        }
        None => false,
    }
}

fn is_bool(raw: &str) -> bool {
    raw == "true" || raw == "false"
}

fn is_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) if first == '.' || first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '.' || c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

fn is_vector_char(c: char) -> bool {
    c.is_ascii_hexdigit() || matches!(c, ',' | ';' | '&' | 'x' | '-' | '.') || c.is_whitespace()
}

/// Matches one `( ... )` group and returns the text following it.
fn vector_group(raw: &str) -> Option<&str> {
    let inner = raw.strip_prefix('(')?;
    let close = inner.find(')')?;
    let body = &inner[..close];
    if body.is_empty() || !body.chars().all(is_vector_char) {
        return None;
    }
    Some(&inner[close + 1..])
}

fn is_vector(raw: &str) -> bool {
    vector_group(raw).map_or(false, str::is_empty)
}

fn is_placement(raw: &str) -> bool {
    vector_group(raw)
        .and_then(|rest| vector_group(rest.trim_start()))
        .map_or(false, str::is_empty)
}

fn decode_string(raw: &str) -> Option<Value> {
    Some(Value::String(raw[1..raw.len() - 1].to_string()))
}

pub(crate) fn parse_integer(raw: &str) -> Option<BigInt> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let magnitude = match unsigned.strip_prefix("0x") {
        Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16)?,
        None => BigInt::parse_bytes(unsigned.as_bytes(), 10)?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn decode_integer(raw: &str) -> Option<Value> {
    parse_integer(raw).map(Value::Integer)
}

/// Decodes a float: integers are converted, then plain decimals are tried, then the
/// `&` raw bit pattern.
pub(crate) fn parse_float(raw: &str) -> Option<f32> {
    if is_integer(raw) {
        return parse_integer(raw).map(|i| bigint_to_f32(&i));
    }
    if let Ok(value) = raw.parse::<f32>() {
        return Some(value);
    }

    let bits = raw.strip_prefix('&')?;
    if bits.len() != 8 || !is_hex(bits) {
        return None;
    }
    u32::from_str_radix(bits, 16).ok().map(f32::from_bits)
}

fn decode_float_value(raw: &str) -> Option<Value> {
    parse_float(raw).map(Value::Float)
}

fn decode_bool(raw: &str) -> Option<Value> {
    Some(Value::Bool(raw == "true"))
}

fn decode_identifier(raw: &str) -> Option<Value> {
    Some(Value::Identifier(raw.to_string()))
}

fn vector_elements(raw: &str) -> Vec<&str> {
    raw.split(|c| matches!(c, ',' | ';' | '(' | ')'))
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .collect()
}

fn parse_float_vector(raw: &str) -> Option<Vec<f32>> {
    vector_elements(raw).into_iter().map(parse_float).collect()
}

fn decode_vector(raw: &str) -> Option<Value> {
    let elements = vector_elements(raw);
    if elements.is_empty() {
        return None;
    }

    if elements.iter().all(|element| is_integer(element)) {
        elements
            .into_iter()
            .map(parse_integer)
            .collect::<Option<Vec<_>>>()
            .map(Value::IntVector)
    } else {
        elements
            .into_iter()
            .map(parse_float)
            .collect::<Option<Vec<_>>>()
            .map(Value::FloatVector)
    }
}

/// The `;` inside the rotation group only separates `w` visually; both groups are
/// decoded as plain float vectors.
fn decode_placement(raw: &str) -> Option<Value> {
    let split = raw.find(')')? + 1;
    let location = parse_float_vector(&raw[..split])?;
    let rotation = parse_float_vector(&raw[split..])?;

    Some(Value::Placement(Placement::new(
        location.try_into().ok()?,
        rotation.try_into().ok()?,
    )))
}
