//! The per-call result store.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ValueError;
use crate::option::OptionSchema;
use crate::schema::SchemaCore;
use crate::value::{FromValue, Value};

/// Identity of an option within its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(usize);

impl OptionId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Declaration index of the option.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Converted values of one `split` call, one per option in schema order.
///
/// The same values are reachable three ways: by [`OptionId`], by any of the
/// option's names, and by declaration index.
///
/// # Examples
///
/// ```
/// use argsplit_core::{OptionSchema, Schema, Shape, Splitter, Value};
///
/// let schema = Schema::new(vec![
///     OptionSchema::flag(["-v", "--verbose"]),
///     OptionSchema::varargs("files", Shape::String),
/// ])
/// .unwrap();
/// let id = schema.id_of("files").unwrap();
/// let splitter = Splitter::new(schema).unwrap();
///
/// let bag = splitter.split(["--verbose", "a", "b"]).unwrap();
/// assert_eq!(bag["-v"], Value::Bool(true));
/// assert_eq!(bag[id], bag[1]);
/// assert_eq!(bag.value::<Vec<String>>("files").unwrap(), vec!["a", "b"]);
/// ```
#[derive(Clone)]
pub struct ArgumentBag {
    core: Arc<SchemaCore>,
    values: Vec<Value>,
}

impl ArgumentBag {
    pub(crate) fn new(core: Arc<SchemaCore>, values: Vec<Value>) -> Self {
        debug_assert_eq!(core.options.len(), values.len());
        Self { core, values }
    }

    /// Number of stored values (equal to the number of options).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: schemas declare at least one option.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the option with identity `id`.
    pub fn get(&self, id: OptionId) -> Option<&Value> {
        self.values.get(id.index())
    }

    /// Value of the option declaring `name`.
    pub fn by_name(&self, name: &str) -> Option<&Value> {
        self.core
            .registry
            .lookup(name)
            .and_then(|index| self.values.get(index))
    }

    /// Value at declaration index `index`.
    pub fn by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Identity of the option declaring `name`.
    pub fn id_of(&self, name: &str) -> Option<OptionId> {
        self.core.registry.lookup(name).map(OptionId::new)
    }

    /// All values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Pairs of option and value in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&OptionSchema, &Value)> {
        self.core.options.iter().zip(self.values.iter())
    }

    /// Consumes the bag, returning its values in declaration order.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Converts a copy of the value of `name` into `T`.
    pub fn value<T: FromValue>(&self, name: &str) -> Result<T, ValueError> {
        let value = self
            .by_name(name)
            .ok_or_else(|| ValueError::UnknownOption(name.to_string()))?;
        T::from_value(value.clone())
    }

    /// Moves the value of `name` out of the bag, leaving
    /// [`Value::Absent`] behind, and converts it into `T`.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, ValueError> {
        let index = self
            .core
            .registry
            .lookup(name)
            .ok_or_else(|| ValueError::UnknownOption(name.to_string()))?;
        T::from_value(std::mem::replace(&mut self.values[index], Value::Absent))
    }

    /// `true` if `name` is a flag that was set. Unknown names read as unset.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.by_name(name), Some(Value::Bool(true)))
    }

    /// Renders the bag as JSON keyed by primary option names.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if the bag cannot be rendered as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Index<OptionId> for ArgumentBag {
    type Output = Value;

    fn index(&self, id: OptionId) -> &Value {
        &self.values[id.index()]
    }
}

impl Index<usize> for ArgumentBag {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl Index<&str> for ArgumentBag {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if no option declares `name`.
    fn index(&self, name: &str) -> &Value {
        match self.by_name(name) {
            Some(value) => value,
            None => panic!("no option named {name}"),
        }
    }
}

/// Bags are equal when they hold equal values under the same primary names.
impl PartialEq for ArgumentBag {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
            && self
                .core
                .options
                .iter()
                .map(OptionSchema::primary_name)
                .eq(other.core.options.iter().map(OptionSchema::primary_name))
    }
}

impl fmt::Debug for ArgumentBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(option, value)| (option.primary_name(), value)))
            .finish()
    }
}

impl Serialize for ArgumentBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (option, value) in self.iter() {
            map.serialize_entry(option.primary_name(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Shape;
    use crate::schema::Schema;

    fn bag() -> (Schema, ArgumentBag) {
        let schema = Schema::new(vec![
            OptionSchema::flag(["-v", "--verbose"]),
            OptionSchema::single(["-o", "--output"], Shape::Path),
            OptionSchema::varargs("files", Shape::String),
        ])
        .unwrap();
        let bag = ArgumentBag::new(
            Arc::clone(schema.core()),
            vec![
                Value::Bool(true),
                Value::Absent,
                Value::List(vec![Value::Str("a".into())]),
            ],
        );
        (schema, bag)
    }

    #[test]
    fn test_three_lookup_views_agree() {
        let (schema, bag) = bag();
        let id = schema.id_of("files").unwrap();
        assert_eq!(bag.get(id), bag.by_index(2));
        assert_eq!(bag.by_name("files"), bag.by_index(2));
        assert_eq!(bag.by_name("--verbose"), Some(&Value::Bool(true)));
        assert_eq!(bag.id_of("-o"), schema.id_of("--output"));
    }

    #[test]
    fn test_take_leaves_absent() {
        let (_, mut bag) = bag();
        let files: Vec<String> = bag.take("files").unwrap();
        assert_eq!(files, vec!["a"]);
        assert!(bag["files"].is_absent());
        assert_eq!(
            bag.take::<bool>("--nope"),
            Err(ValueError::UnknownOption("--nope".into()))
        );
    }

    #[test]
    fn test_flag_accessor() {
        let (_, bag) = bag();
        assert!(bag.flag("-v"));
        assert!(!bag.flag("--output"));
        assert!(!bag.flag("--unknown"));
    }

    #[test]
    fn test_serializes_by_primary_name() {
        let (_, bag) = bag();
        assert_eq!(
            bag.to_json().unwrap(),
            serde_json::json!({ "-v": true, "-o": null, "files": ["a"] })
        );
    }
}
