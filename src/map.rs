//! Ordered attribute map for SII objects.
//!
//! This module provides [`AttributeMap`], a wrapper around [`IndexMap`] that keeps
//! attributes in the order they were declared, so a unit can be written back with
//! its attributes where a reader expects them.
//!
//! Besides plain insertion, the map knows how to fold the individual lines of an
//! array attribute into a single [`Value::Array`] or [`Value::List`]; see
//! [`AttributeMap::merge_item`].
//!
//! ## Examples
//!
//! ```rust
//! use sii_unit::{AttributeMap, Value};
//!
//! let mut map = AttributeMap::new();
//! map.insert("name".to_string(), Value::from("Scania"));
//! map.insert("wheels".to_string(), Value::from(6));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Scania"));
//! ```

use crate::attribute::{ArrayItem, Attribute};
use crate::{Error, Result, Value};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Upper bound for a declared array length.
const MAX_ARRAY_LEN: usize = 1 << 24;

/// An ordered map of attribute names to values.
///
/// Equality ignores insertion order: two maps are equal when they hold the same
/// names bound to equal values.
///
/// # Examples
///
/// ```rust
/// use sii_unit::{AttributeMap, Value};
///
/// let mut map = AttributeMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap(IndexMap<String, Value>);

impl AttributeMap {
    #[must_use]
    pub fn new() -> Self {
        AttributeMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AttributeMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts an attribute, returning the previous value if the name was taken.
    pub fn insert(&mut self, name: String, value: Value) -> Option<Value> {
        self.0.insert(name, value)
    }

    /// Inserts a decoded attribute of `object`, refusing to overwrite an existing one.
    pub fn insert_unique(&mut self, object: &str, attribute: Attribute) -> Result<()> {
        if self.0.contains_key(&attribute.name) {
            return Err(Error::duplicate_key(object, &attribute.name));
        }
        self.0.insert(attribute.name, attribute.value);
        Ok(())
    }

    /// Folds one array item of `object` into the array attribute it belongs to.
    ///
    /// - The first item of an undeclared array starts an open-ended [`Value::List`].
    /// - An integer attribute with the same name is the declared length of a fixed
    ///   array: it becomes a [`Value::Array`] of that many [`Value::Unknown`] slots.
    /// - Indexed items fill their slot of a fixed array; `name[]` items are appended.
    ///
    /// # Errors
    ///
    /// - [`Error::ArrayIndexOutOfBounds`] if an index exceeds the declared length
    /// - [`Error::InvalidAttribute`] if the declared length is negative or absurdly large
    /// - [`Error::DuplicateKey`] if the name is already bound to a non-array value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sii_unit::attribute::ArrayItem;
    /// use sii_unit::{AttributeMap, Value};
    ///
    /// let mut map = AttributeMap::new();
    /// map.insert("names".to_string(), Value::from(2));
    /// map.merge_item("unit", ArrayItem { name: "names".into(), index: Some(1), value: "re".into() })?;
    ///
    /// let names = map.get("names").and_then(Value::as_slice).unwrap();
    /// assert_eq!(names.len(), 2);
    /// assert_eq!(names[1].as_str(), Some("re"));
    /// # Ok::<(), sii_unit::Error>(())
    /// ```
    pub fn merge_item(&mut self, object: &str, item: ArrayItem) -> Result<()> {
        let ArrayItem { name, index, value } = item;

        let slot = match self.0.get_mut(&name) {
            Some(slot) => slot,
            None => {
                self.0.insert(name, Value::List(vec![value]));
                return Ok(());
            }
        };

        if let Value::Integer(declared) = slot {
            let len = usize::try_from(&*declared)
                .ok()
                .filter(|len| *len <= MAX_ARRAY_LEN)
                .ok_or_else(|| {
                    Error::InvalidAttribute(format!("{}: {} is not an array length", name, declared))
                })?;
            *slot = Value::Array(vec![Value::Unknown(String::new()); len]);
        }

        match (slot, index) {
            (Value::Array(items), Some(index)) => {
                let len = items.len();
                let target = items.get_mut(index).ok_or(Error::ArrayIndexOutOfBounds {
                    name,
                    index,
                    len,
                })?;
                *target = value;
            }
            (Value::Array(items), None) | (Value::List(items), _) => items.push(value),
            _ => return Err(Error::duplicate_key(object, &name)),
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the attribute names, in declaration order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the attribute values, in declaration order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the name-value pairs, in declaration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        AttributeMap(IndexMap::from_iter(iter))
    }
}
