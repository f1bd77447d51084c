//! Unit text serialization.
//!
//! This module provides the [`Serializer`] that writes an [`Object`] tree back to
//! unit text. The output is not byte-identical to whatever was parsed, but it
//! parses back to an equal tree.
//!
//! ## Layout
//!
//! ```text
//! class : name {
//!  scalar: value
//!  fixed: 2
//!  fixed[0]: value
//!  fixed[1]: value
//!  list[]: value
//!  child_class : child_name {
//!  }
//! }
//! ```
//!
//! Objects without a class are written as `name {`. Fixed arrays get a length line
//! followed by indexed items, open-ended lists one `name[]` line per element.
//!
//! ## Usage
//!
//! Most users should use [`crate::to_string`]. The serializer can also be driven
//! directly to write several objects into one buffer:
//!
//! ```rust
//! use sii_unit::{Object, Serializer, WriteOptions};
//!
//! let mut serializer = Serializer::new(WriteOptions::new());
//! serializer.serialize_object(&Object::new("a", "job"));
//! serializer.serialize_object(&Object::new("b", "job"));
//!
//! assert_eq!(serializer.into_inner(), "job : a {\n}\njob : b {\n}\n");
//! ```

use crate::{Object, Value, WriteOptions};
use std::fmt::Write as _;

/// The unit text serializer.
pub struct Serializer {
    output: String,
    options: WriteOptions,
    indent_level: usize,
}

impl Serializer {
    pub fn new(options: WriteOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            indent_level: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn write_indent(&mut self) {
        let width = self.indent_level * self.options.indent;
        self.output.extend(std::iter::repeat(' ').take(width));
    }

    /// Appends an object and all of its descendants.
    pub fn serialize_object(&mut self, object: &Object) {
        self.write_indent();
        if !object.class_name().is_empty() {
            self.output.push_str(object.class_name());
            self.output.push_str(" : ");
        }
        self.output.push_str(object.name());
        self.output.push_str(" {\n");

        self.indent_level += 1;
        for (name, value) in object.attributes() {
            self.write_attribute(name, value);
        }
        for child in object.children() {
            self.serialize_object(child);
        }
        self.indent_level -= 1;

        self.write_indent();
        self.output.push_str("}\n");
    }

    /// Appends the line or lines of one attribute.
    pub fn write_attribute(&mut self, name: &str, value: &Value) {
        match value {
            Value::Array(items) => {
                self.write_line(name, &items.len());
                for (i, item) in items.iter().enumerate() {
                    self.write_line(&format!("{}[{}]", name, i), item);
                }
            }
            Value::List(items) => {
                let item_name = format!("{}[]", name);
                for item in items {
                    self.write_line(&item_name, item);
                }
            }
            _ => self.write_line(name, value),
        }
    }

    fn write_line(&mut self, name: &str, value: &dyn std::fmt::Display) {
        self.write_indent();
        // Writing into a String cannot fail.
        let _ = writeln!(self.output, "{}: {}", name, value);
    }
}

/// Serializes one object tree to text.
#[must_use]
pub fn serialize_object(object: &Object, options: &WriteOptions) -> String {
    let mut serializer = Serializer::new(options.clone());
    serializer.serialize_object(object);
    serializer.into_inner()
}
