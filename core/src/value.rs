//! Converted option values and typed extraction.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::bag::ArgumentBag;
use crate::error::ValueError;

/// A host value produced by an escape-hatch converter.
///
/// Implemented for every `Debug + Send + Sync + 'static` type, so any type
/// parsed through [`Resolver::parsed`](crate::Resolver::parsed) can be stored
/// in a [`Value::Custom`].
pub trait CustomValue: Any + fmt::Debug + Send + Sync {
    /// Upcasts to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> CustomValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A converted option value.
///
/// The variant produced for an option depends on its kind and shape:
/// flags always yield [`Bool`](Value::Bool), list-like kinds yield
/// [`List`](Value::List), branches and option groups yield
/// [`Group`](Value::Group), and options that never received input yield
/// [`Absent`](Value::Absent).
#[derive(Debug, Clone)]
pub enum Value {
    /// No value was supplied.
    Absent,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    Path(PathBuf),
    /// The matched name of an enumerated value.
    Enum(String),
    List(Vec<Value>),
    /// Result of a nested schema (branch or option group).
    Group(Box<ArgumentBag>),
    /// Escape-hatch value built by a host type's own parser.
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Path(_) => "path",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Group(_) => "group",
            Value::Custom(_) => "custom",
        }
    }

    /// Returns `true` for [`Value::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Returns the flag state, or `None` for non-boolean values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrows textual values (`Str` and `Enum`).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows list elements.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the nested bag of a branch or option group.
    pub fn as_group(&self) -> Option<&ArgumentBag> {
        match self {
            Value::Group(bag) => Some(bag),
            _ => None,
        }
    }

    /// Downcasts a [`Value::Custom`] to its concrete type.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use std::sync::Arc;
    /// use argsplit_core::Value;
    ///
    /// let value = Value::Custom(Arc::new(Ipv4Addr::LOCALHOST));
    /// assert_eq!(value.downcast_ref::<Ipv4Addr>(), Some(&Ipv4Addr::LOCALHOST));
    /// ```
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(custom) => (**custom).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// Structural equality. Custom values compare equal when they share an
/// allocation or render identically with `Debug`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Group(a), Value::Group(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => {
                Arc::ptr_eq(a, b) || format!("{a:?}") == format!("{b:?}")
            }
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Absent => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::UInt(n) => serializer.serialize_u64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Str(s) | Value::Enum(s) => serializer.serialize_str(s),
            Value::Path(p) => serializer.serialize_str(&p.to_string_lossy()),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Group(bag) => bag.serialize(serializer),
            Value::Custom(custom) => serializer.serialize_str(&format!("{custom:?}")),
        }
    }
}

/// Conversion from a [`Value`] into a Rust type, used by finalizers.
///
/// # Examples
///
/// ```
/// use argsplit_core::{FromValue, Value};
///
/// let ports = Vec::<u16>::from_value(Value::List(vec![Value::Int(80), Value::Int(443)]));
/// assert_eq!(ports.unwrap(), vec![80, 443]);
///
/// let missing = Option::<String>::from_value(Value::Absent).unwrap();
/// assert_eq!(missing, None);
/// ```
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch<T>(expected: &'static str, found: &Value) -> Result<T, ValueError> {
    Err(ValueError::TypeMismatch {
        expected,
        found: found.kind_name(),
    })
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) | Value::Enum(s) => Ok(s),
            Value::Path(p) => Ok(p.to_string_lossy().into_owned()),
            other => mismatch("String", &other),
        }
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Char(c) => Ok(c),
            other => mismatch("char", &other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(n) => Ok(n),
            Value::Int(n) => Ok(n as f64),
            Value::UInt(n) => Ok(n as f64),
            other => mismatch("f64", &other),
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Path(p) => Ok(p),
            Value::Str(s) => Ok(PathBuf::from(s)),
            other => mismatch("PathBuf", &other),
        }
    }
}

impl FromValue for ArgumentBag {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Group(bag) => Ok(*bag),
            other => mismatch("ArgumentBag", &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Absent => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            Value::Absent => Ok(Vec::new()),
            other => mismatch("Vec", &other),
        }
    }
}

macro_rules! from_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let out_of_range = |v: String| ValueError::OutOfRange {
                        value: v,
                        target: stringify!($ty),
                    };
                    match value {
                        Value::Int(n) => <$ty>::try_from(n).map_err(|_| out_of_range(n.to_string())),
                        Value::UInt(n) => <$ty>::try_from(n).map_err(|_| out_of_range(n.to_string())),
                        other => mismatch(stringify!($ty), &other),
                    }
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);
