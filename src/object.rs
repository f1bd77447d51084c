//! The object tree.
//!
//! A SII unit is a tree of [`Object`]s. Each object is an instance of a class, holds
//! an ordered set of attributes and owns its named child objects. The root object
//! returned by the readers is named `SiiNunit` and has no class.

use crate::map::AttributeMap;
use crate::Value;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// A named instance of a class.
///
/// Attribute and child names are unique within an object. Equality compares names,
/// classes, attributes and children structurally; declaration order is ignored.
///
/// # Examples
///
/// ```rust
/// use sii_unit::{Object, Value};
///
/// let truck = Object::new("truck.0", "vehicle")
///     .with_attribute("brand", Value::from("scania"))
///     .with_child(Object::new("truck.0.engine", "engine"));
///
/// assert_eq!(truck.attribute("brand").and_then(Value::as_str), Some("scania"));
/// assert_eq!(truck.child_count(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Object {
    name: String,
    class_name: String,
    attributes: AttributeMap,
    children: IndexMap<String, Object>,
}

impl Object {
    /// Creates an empty object. An empty `class_name` makes an anonymous object.
    #[must_use]
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Object {
            name: name.into(),
            class_name: class_name.into(),
            attributes: AttributeMap::new(),
            children: IndexMap::new(),
        }
    }

    pub(crate) fn from_parts(
        name: String,
        class_name: String,
        attributes: AttributeMap,
        children: IndexMap<String, Object>,
    ) -> Self {
        Object {
            name,
            class_name,
            attributes,
            children,
        }
    }

    /// Adds or replaces an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Adds or replaces a child, keyed by the child's name.
    #[must_use]
    pub fn with_child(mut self, child: Object) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class name, empty for anonymous objects.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns an iterator over the direct children, in declaration order.
    pub fn children(&self) -> indexmap::map::Values<'_, String, Object> {
        self.children.values()
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Object> {
        self.children.get(name)
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the direct children whose class is `class_name`.
    ///
    /// The iterator borrows the object and can be recreated at will.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sii_unit::Object;
    ///
    /// let unit = Object::new("SiiNunit", "")
    ///     .with_child(Object::new("a", "job"))
    ///     .with_child(Object::new("b", "truck"))
    ///     .with_child(Object::new("c", "job"));
    ///
    /// let jobs: Vec<_> = unit.children_by_class_name("job").map(|o| o.name()).collect();
    /// assert_eq!(jobs, vec!["a", "c"]);
    /// ```
    pub fn children_by_class_name<'a>(
        &'a self,
        class_name: &'a str,
    ) -> impl Iterator<Item = &'a Object> + 'a {
        self.children
            .values()
            .filter(move |child| child.class_name == class_name)
    }
}

impl fmt::Display for Object {
    /// Writes the object in unit text syntax, without the `SiiNunit` signature.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::serialize_object(self, &Default::default()))
    }
}

struct Children<'a>(&'a IndexMap<String, Object>);

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

impl Serialize for Object {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Object", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("class", &self.class_name)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.serialize_field("children", &Children(&self.children))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Object {
        Object::new("SiiNunit", "")
            .with_child(Object::new("obj.1", "MyObjectClass").with_attribute("value", 1))
            .with_child(Object::new("obj.2", "MyOtherClass"))
            .with_child(Object::new("obj.3", "MyObjectClass"))
    }

    #[test]
    fn test_children_by_class_name() {
        let root = sample();

        let names: Vec<_> = root
            .children_by_class_name("MyObjectClass")
            .map(Object::name)
            .collect();
        assert_eq!(names, vec!["obj.1", "obj.3"]);

        assert_eq!(root.children_by_class_name("MyOtherClass").count(), 1);
        assert_eq!(root.children_by_class_name("Missing").count(), 0);
    }

    #[test]
    fn test_children_by_class_name_is_reiterable() {
        let root = sample();
        let first = root.children_by_class_name("MyObjectClass").count();
        let second = root.children_by_class_name("MyObjectClass").count();
        assert_eq!(first, second);
    }

    #[test]
    fn test_accessors() {
        let root = sample();
        let child = root.child("obj.1").unwrap();

        assert_eq!(child.class_name(), "MyObjectClass");
        assert_eq!(child.attribute("value").and_then(Value::as_i64), Some(1));
        assert!(child.attribute("missing").is_none());
        assert_eq!(root.children().count(), 3);
        assert!(root.child("missing").is_none());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Object::new("o", "c").with_attribute("x", 1).with_attribute("y", 2);
        let b = Object::new("o", "c").with_attribute("y", 2).with_attribute("x", 1);
        let c = Object::new("o", "c").with_attribute("x", 1).with_attribute("y", 3);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serialize_json() {
        let object = Object::new("truck.0", "vehicle").with_attribute("brand", "scania");
        let json = serde_json::to_value(&object).unwrap();

        assert_eq!(json["name"], "truck.0");
        assert_eq!(json["class"], "vehicle");
        assert_eq!(json["attributes"]["brand"], "scania");
        assert!(json["children"].as_object().unwrap().is_empty());
    }
}
