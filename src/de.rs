//! Text structural parsing.
//!
//! This module turns unit text into an [`Object`] tree in a few line-oriented steps:
//!
//! 1. [`sanitize_source`] strips `#`, `//` and `/* */` comments outside quoted
//!    strings and trims every line.
//! 2. [`split_source_to_lines`] drops the empty lines.
//! 3. [`parse_object`] walks the lines, using [`is_object_beginning`] and
//!    [`object_end_line_index`] to find nested object bodies, and decodes every
//!    other line with [`parse_attribute`].
//!
//! An object header may carry its brace on the same line or on the next one:
//!
//! ```text
//! vehicle : truck.0 {        vehicle : truck.0
//!  brand: "scania"           {
//! }                           brand: "scania"
//!                            }
//! ```
//!
//! Most callers want [`crate::from_str`] or [`crate::Reader`] instead, which also
//! check the signature and expand `@include` directives.

use crate::attribute::{decode_attribute, ParsedAttribute};
use crate::map::AttributeMap;
use crate::{Error, Object, Result};
use indexmap::IndexMap;
use std::iter::Peekable;
use std::str::Chars;
use tracing::trace;

/// Removes comments from unit source text and trims every line.
///
/// Comment markers inside double-quoted strings are kept verbatim; a backslash
/// inside a string escapes the following character. Line comments keep their
/// terminating newline, block comments are removed entirely.
///
/// # Errors
///
/// Returns [`Error::Parse`] with the 1-based line of the opening marker if a block
/// comment or a string is still open at the end of the input.
///
/// # Examples
///
/// ```rust
/// use sii_unit::de::sanitize_source;
///
/// let text = "a: \"#1\" # comment\n  b: 2 /* block */\n// gone";
/// assert_eq!(sanitize_source(text)?, "a: \"#1\"\nb: 2\n");
/// # Ok::<(), sii_unit::Error>(())
/// ```
pub fn sanitize_source(source: &str) -> Result<String> {
    let mut output = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut line = 1;
    let mut string_start = None;

    while let Some(c) = chars.next() {
        if string_start.is_some() {
            match c {
                '"' => string_start = None,
                '\\' => {
                    output.push(c);
                    match chars.next() {
                        Some(escaped) => {
                            if escaped == '\n' {
                                line += 1;
                            }
                            output.push(escaped);
                        }
                        None => break,
                    }
                    continue;
                }
                '\n' => line += 1,
                _ => {}
            }
            output.push(c);
            continue;
        }

        match c {
            '"' => string_start = Some(line),
            '#' => {
                skip_line(&mut chars);
                continue;
            }
            '/' if chars.peek() == Some(&'/') => {
                skip_line(&mut chars);
                continue;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                line = skip_block(&mut chars, line)?;
                continue;
            }
            '\n' => line += 1,
            _ => {}
        }
        output.push(c);
    }

    if let Some(opened) = string_start {
        return Err(Error::parse(opened, "unterminated string"));
    }

    let lines: Vec<&str> = output.split('\n').map(str::trim).collect();
    Ok(lines.join("\n"))
}

/// Consumes a line comment up to, but not including, its newline.
fn skip_line(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|&c| c != '\n').is_some() {}
}

/// Consumes a block comment body and its `*/`, returning the updated line number.
fn skip_block(chars: &mut Peekable<Chars<'_>>, start_line: usize) -> Result<usize> {
    let mut line = start_line;
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.next_if_eq(&'/').is_some() => return Ok(line),
            '\n' => line += 1,
            _ => {}
        }
    }
    Err(Error::parse(start_line, "unterminated block comment"))
}

/// Splits sanitized source into its non-empty lines.
#[must_use]
pub fn split_source_to_lines(source: &str) -> Vec<String> {
    source
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Checks whether an object header starts at `index`.
///
/// Returns the index of the line holding the opening `{`: `index` itself when the
/// brace ends the header line, `index + 1` when the brace sits alone on the next
/// line, and `None` when no object begins here.
///
/// # Examples
///
/// ```rust
/// use sii_unit::de::is_object_beginning;
///
/// assert_eq!(is_object_beginning(&["class : instance {", "}"], 0), Some(0));
/// assert_eq!(is_object_beginning(&["class : instance", "{", "}"], 0), Some(1));
/// assert_eq!(is_object_beginning(&["class : instance", "}"], 0), None);
/// ```
#[must_use]
pub fn is_object_beginning<S: AsRef<str>>(lines: &[S], index: usize) -> Option<usize> {
    let line = lines.get(index)?.as_ref();
    if line.ends_with('{') {
        return Some(index);
    }

    match lines.get(index + 1) {
        Some(next) if next.as_ref() == "{" => Some(index + 1),
        _ => None,
    }
}

/// Finds the line holding the `}` that closes the object starting at `start`.
///
/// `start` is the object's header or brace line. Nested objects are skipped.
///
/// # Errors
///
/// Returns [`Error::UnexpectedEndOfObject`] naming the object if the lines run out
/// first.
pub fn object_end_line_index<S: AsRef<str>>(lines: &[S], start: usize) -> Result<usize> {
    let mut depth: isize = 0;
    let mut i = start;

    while i < lines.len() {
        if let Some(brace) = is_object_beginning(lines, i) {
            depth += 1;
            i = brace;
        } else if lines[i].as_ref() == "}" {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
        i += 1;
    }

    let (_, name) = object_header(lines, start);
    Err(Error::unexpected_end_of_object(name))
}

/// Splits an attribute line on its first `:` into a trimmed name and raw value.
///
/// # Errors
///
/// Returns [`Error::InvalidAttribute`] if the line has no `:`.
///
/// # Examples
///
/// ```rust
/// use sii_unit::de::parse_attribute;
///
/// assert_eq!(parse_attribute("MyAttr: 4")?, ("MyAttr", "4"));
/// assert_eq!(parse_attribute("time: 12:30")?, ("time", "12:30"));
/// # Ok::<(), sii_unit::Error>(())
/// ```
pub fn parse_attribute(line: &str) -> Result<(&str, &str)> {
    line.split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .ok_or_else(|| Error::InvalidAttribute(line.to_string()))
}

/// Returns `(class_name, name)` from the header of the object starting at `start`.
fn object_header<S: AsRef<str>>(lines: &[S], start: usize) -> (&str, &str) {
    let header_index = match lines.get(start) {
        Some(line) if line.as_ref() == "{" => start.saturating_sub(1),
        _ => start,
    };
    let header = lines.get(header_index).map_or("", |line| line.as_ref());

    match header.split_once(':') {
        Some((class, rest)) => {
            let name = rest.split(':').next().unwrap_or(rest);
            (class.trim(), trim_object_name(name))
        }
        None => ("", trim_object_name(header)),
    }
}

fn trim_object_name(name: &str) -> &str {
    name.trim_matches(|c: char| c == '{' || c.is_whitespace())
}

/// Parses the object starting at line `start` (its header or brace line), reading
/// its body up to, but not including, line `end`.
///
/// The whole unit is parsed with `parse_object(&lines, 0, lines.len())`; its
/// `SiiNunit` signature line acts as the header of a class-less root object.
///
/// # Errors
///
/// - [`Error::UnexpectedEndOfObject`] for a nested object that is never closed
/// - [`Error::InvalidAttribute`] for a body line that is neither an object nor an attribute
/// - [`Error::DuplicateKey`] for an attribute or child declared twice
/// - [`Error::ArrayIndexOutOfBounds`] for an indexed item past its declared length
///
/// # Examples
///
/// ```rust
/// use sii_unit::de::parse_object;
///
/// let lines = ["class : instance {", "attribute: 15", "other_attribute: \"Sdang\"", "}"];
/// let object = parse_object(&lines, 0, lines.len())?;
///
/// assert_eq!(object.class_name(), "class");
/// assert_eq!(object.name(), "instance");
/// assert_eq!(object.attributes().len(), 2);
/// # Ok::<(), sii_unit::Error>(())
/// ```
pub fn parse_object<S: AsRef<str>>(lines: &[S], start: usize, end: usize) -> Result<Object> {
    let (class_name, name) = object_header(lines, start);
    let end = end.min(lines.len());

    let mut attributes = AttributeMap::new();
    let mut children: IndexMap<String, Object> = IndexMap::new();

    let mut i = match lines.get(start + 1) {
        Some(next) if next.as_ref() == "{" => start + 2,
        _ => start + 1,
    };

    while i < end {
        if let Some(brace) = is_object_beginning(lines, i) {
            let child_end = object_end_line_index(lines, brace)?;
            let child = parse_object(lines, brace, child_end)?;
            if children.contains_key(child.name()) {
                return Err(Error::duplicate_key(name, child.name()));
            }
            children.insert(child.name().to_string(), child);
            i = child_end + 1;
            continue;
        }

        let line = lines[i].as_ref();
        if line != "}" {
            let (attribute_name, raw) = parse_attribute(line)?;
            match decode_attribute(attribute_name, raw) {
                ParsedAttribute::Plain(attribute) => attributes.insert_unique(name, attribute)?,
                ParsedAttribute::Item(item) => attributes.merge_item(name, item)?,
            }
        }
        i += 1;
    }

    trace!(
        class = class_name,
        object = name,
        attributes = attributes.len(),
        children = children.len(),
        "parsed object"
    );

    Ok(Object::from_parts(
        name.to_string(),
        class_name.to_string(),
        attributes,
        children,
    ))
}
