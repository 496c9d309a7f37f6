//! Value shapes and the converter resolver chain.
//!
//! Every value-bearing option declares a [`Shape`]. When a
//! [`Splitter`](crate::Splitter) is built, each shape is handed to a
//! [`Resolver`], an ordered chain of resolver functions. The first function
//! that returns a [`Converter`] wins; later ones are never consulted.
//!
//! # Example
//!
//! ```
//! use argsplit_core::{Resolver, Shape, Value};
//!
//! let resolver = Resolver::default();
//! let convert = resolver.resolve(&Shape::list(Shape::Int)).unwrap();
//! assert_eq!(
//!     convert("1,2").unwrap(),
//!     Value::List(vec![Value::Int(1), Value::Int(2)])
//! );
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ConversionError;
use crate::value::{CustomValue, Value};

/// The target shape of an option's value.
///
/// Serialized in snake case so descriptors can spell shapes as `int`,
/// `{ list: path }` or `{ enum: { name: Mode, values: [fast, slow] } }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Bool,
    /// Verbatim text (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    #[serde(rename = "uint")]
    UInt,
    Float,
    Char,
    Path,
    /// Closed set of value names, matched exactly.
    Enum {
        name: String,
        values: Vec<String>,
    },
    /// Empty input converts to [`Value::Absent`].
    Optional(Box<Shape>),
    /// Comma-separated elements.
    List(Box<Shape>),
    /// A shape known only to a user-registered resolver.
    Named(String),
}

impl Shape {
    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    pub fn list(inner: Shape) -> Self {
        Shape::List(Box::new(inner))
    }

    /// Builds an enumerated shape from its value names.
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Shape::Enum {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Shape::Named(name.into())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Bool => f.write_str("bool"),
            Shape::String => f.write_str("string"),
            Shape::Int => f.write_str("int"),
            Shape::UInt => f.write_str("uint"),
            Shape::Float => f.write_str("float"),
            Shape::Char => f.write_str("char"),
            Shape::Path => f.write_str("path"),
            Shape::Enum { name, .. } => write!(f, "enum {name}"),
            Shape::Optional(inner) => write!(f, "optional<{inner}>"),
            Shape::List(inner) => write!(f, "list<{inner}>"),
            Shape::Named(name) => f.write_str(name),
        }
    }
}

/// A resolved string-to-value conversion.
pub type Converter = Arc<dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync>;

/// One link of a resolver chain. The second argument is the full chain, so
/// container shapes can resolve their element shape through user overrides.
type ResolveFn = dyn Fn(&Shape, &Resolver) -> Option<Converter> + Send + Sync;

/// Ordered chain of resolver functions.
///
/// # Examples
///
/// User resolvers placed first shadow the built-ins:
///
/// ```
/// use std::sync::Arc;
/// use argsplit_core::{Converter, Resolver, Shape, Value};
///
/// let hex = Resolver::new(|shape: &Shape, _: &Resolver| {
///     (*shape == Shape::Int).then(|| {
///         Arc::new(|s: &str| {
///             i64::from_str_radix(s, 16)
///                 .map(Value::Int)
///                 .map_err(|e| argsplit_core::ConversionError::invalid("hex int", e))
///         }) as Converter
///     })
/// });
/// let resolver = hex.or(Resolver::default());
/// let convert = resolver.resolve(&Shape::list(Shape::Int)).unwrap();
/// assert_eq!(
///     convert("ff,10").unwrap(),
///     Value::List(vec![Value::Int(255), Value::Int(16)])
/// );
/// ```
#[derive(Clone)]
pub struct Resolver {
    chain: Vec<Arc<ResolveFn>>,
}

impl Resolver {
    /// A chain holding a single user resolver function.
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&Shape, &Resolver) -> Option<Converter> + Send + Sync + 'static,
    {
        Self {
            chain: vec![Arc::new(resolve)],
        }
    }

    /// A chain that resolves nothing.
    pub fn empty() -> Self {
        Self { chain: Vec::new() }
    }

    /// Primitive, text, path, optional and list shapes.
    pub fn basic() -> Self {
        Self::new(resolve_basic)
    }

    /// Enumerated shapes, matched case-sensitively against declared names.
    pub fn enumerated() -> Self {
        Self::new(|shape, _| match shape {
            Shape::Enum { name, values } => Some(enum_converter(name.clone(), values.clone())),
            _ => None,
        })
    }

    /// Resolves `Shape::Named(name)` by deferring to `T`'s own [`FromStr`]
    /// implementation. The parsed value is stored as a [`Value::Custom`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::IpAddr;
    /// use argsplit_core::{Resolver, Shape};
    ///
    /// let resolver = Resolver::parsed::<IpAddr>("ip").or(Resolver::default());
    /// let convert = resolver.resolve(&Shape::named("ip")).unwrap();
    /// let value = convert("127.0.0.1").unwrap();
    /// assert!(value.downcast_ref::<IpAddr>().unwrap().is_loopback());
    /// ```
    pub fn parsed<T>(name: impl Into<String>) -> Self
    where
        T: FromStr + CustomValue,
        T::Err: fmt::Display,
    {
        let name = name.into();
        Self::new(move |shape, _| match shape {
            Shape::Named(n) if *n == name => {
                let expected = name.clone();
                Some(Arc::new(move |s: &str| {
                    s.parse::<T>()
                        .map(|v| Value::Custom(Arc::new(v)))
                        .map_err(|e| ConversionError::invalid(expected.clone(), e))
                }) as Converter)
            }
            _ => None,
        })
    }

    /// Resolves `Shape::Named(name)` by converting with `inner`'s converter
    /// and passing the result through `wrap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argsplit_core::{ConversionError, Resolver, Shape, Value};
    ///
    /// let port = Resolver::wrapped("port", Shape::UInt, |value| match value {
    ///     Value::UInt(n) if n <= 65535 => Ok(value),
    ///     _ => Err(ConversionError::custom("port out of range")),
    /// });
    /// let resolver = port.or(Resolver::default());
    /// let convert = resolver.resolve(&Shape::named("port")).unwrap();
    /// assert_eq!(convert("8080").unwrap(), Value::UInt(8080));
    /// assert!(convert("70000").is_err());
    /// ```
    pub fn wrapped<F>(name: impl Into<String>, inner: Shape, wrap: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        let name = name.into();
        let wrap = Arc::new(wrap);
        Self::new(move |shape, chain| match shape {
            Shape::Named(n) if *n == name => {
                let convert = chain.resolve(&inner)?;
                let wrap = Arc::clone(&wrap);
                Some(Arc::new(move |s: &str| wrap(convert(s)?)) as Converter)
            }
            _ => None,
        })
    }

    /// Appends `other` after this chain; this chain keeps precedence.
    pub fn or(mut self, other: Resolver) -> Self {
        self.chain.extend(other.chain);
        self
    }

    /// Returns the converter of the first link that resolves `shape`.
    pub fn resolve(&self, shape: &Shape) -> Option<Converter> {
        let resolved = self.chain.iter().find_map(|link| link(shape, self));
        trace!(%shape, resolved = resolved.is_some(), "resolve converter");
        resolved
    }
}

impl Default for Resolver {
    /// `basic().or(enumerated())`.
    fn default() -> Self {
        Self::basic().or(Self::enumerated())
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("links", &self.chain.len())
            .finish()
    }
}

fn resolve_basic(shape: &Shape, chain: &Resolver) -> Option<Converter> {
    let converter: Converter = match shape {
        Shape::Bool => Arc::new(parse_bool),
        Shape::String => Arc::new(|s: &str| -> Result<Value, ConversionError> {
            Ok(Value::Str(s.to_string()))
        }),
        Shape::Int => Arc::new(|s: &str| {
            s.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| ConversionError::invalid("int", e))
        }),
        Shape::UInt => Arc::new(|s: &str| {
            s.parse::<u64>()
                .map(Value::UInt)
                .map_err(|e| ConversionError::invalid("uint", e))
        }),
        Shape::Float => Arc::new(|s: &str| {
            s.parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ConversionError::invalid("float", e))
        }),
        Shape::Char => Arc::new(parse_char),
        Shape::Path => Arc::new(|s: &str| -> Result<Value, ConversionError> {
            Ok(Value::Path(PathBuf::from(s)))
        }),
        Shape::Optional(inner) => {
            let convert = chain.resolve(inner)?;
            Arc::new(move |s: &str| {
                if s.is_empty() {
                    Ok(Value::Absent)
                } else {
                    convert(s)
                }
            })
        }
        Shape::List(inner) => {
            let convert = chain.resolve(inner)?;
            Arc::new(move |s: &str| {
                if s.is_empty() {
                    return Ok(Value::List(Vec::new()));
                }
                s.split(',')
                    .map(|piece| convert(piece))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            })
        }
        Shape::Enum { .. } | Shape::Named(_) => return None,
    };
    Some(converter)
}

fn parse_bool(s: &str) -> Result<Value, ConversionError> {
    if s.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if s.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err(ConversionError::invalid(
            "bool",
            format!("{s:?} is neither true nor false"),
        ))
    }
}

fn parse_char(s: &str) -> Result<Value, ConversionError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Char(c)),
        _ => Err(ConversionError::invalid(
            "char",
            format!("{s:?} is not a single character"),
        )),
    }
}

fn enum_converter(name: String, values: Vec<String>) -> Converter {
    Arc::new(move |s: &str| {
        if values.iter().any(|v| v == s) {
            Ok(Value::Enum(s.to_string()))
        } else {
            Err(ConversionError::NotAChoice {
                name: name.clone(),
                valid: values.clone(),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(shape: Shape, input: &str) -> Result<Value, ConversionError> {
        let converter = Resolver::default()
            .resolve(&shape)
            .expect("shape should resolve");
        converter(input)
    }

    #[test]
    fn test_basic_primitives() {
        assert_eq!(convert(Shape::Int, "-42"), Ok(Value::Int(-42)));
        assert_eq!(convert(Shape::UInt, "42"), Ok(Value::UInt(42)));
        assert_eq!(convert(Shape::Float, "2.5"), Ok(Value::Float(2.5)));
        assert_eq!(convert(Shape::Bool, "TRUE"), Ok(Value::Bool(true)));
        assert_eq!(convert(Shape::Char, "x"), Ok(Value::Char('x')));
        assert_eq!(
            convert(Shape::Path, "a/b.txt"),
            Ok(Value::Path(PathBuf::from("a/b.txt")))
        );
        assert_eq!(
            convert(Shape::String, "  spaced "),
            Ok(Value::Str("  spaced ".into()))
        );
    }

    #[test]
    fn test_basic_failures() {
        assert!(matches!(
            convert(Shape::UInt, "-1"),
            Err(ConversionError::InvalidValue { .. })
        ));
        assert!(convert(Shape::Char, "ab").is_err());
        assert!(convert(Shape::Bool, "yes").is_err());
    }

    #[test]
    fn test_optional_and_list() {
        assert_eq!(convert(Shape::optional(Shape::Int), ""), Ok(Value::Absent));
        assert_eq!(convert(Shape::optional(Shape::Int), "3"), Ok(Value::Int(3)));
        assert_eq!(
            convert(Shape::list(Shape::String), "a,,b"),
            Ok(Value::List(vec![
                Value::Str("a".into()),
                Value::Str(String::new()),
                Value::Str("b".into()),
            ]))
        );
        assert_eq!(
            convert(Shape::list(Shape::Int), ""),
            Ok(Value::List(Vec::new()))
        );
    }

    #[test]
    fn test_enumerated_is_case_sensitive() {
        let shape = Shape::enumeration("Mode", ["fast", "slow"]);
        assert_eq!(convert(shape.clone(), "fast"), Ok(Value::Enum("fast".into())));
        assert_eq!(
            convert(shape, "Fast"),
            Err(ConversionError::NotAChoice {
                name: "Mode".into(),
                valid: vec!["fast".into(), "slow".into()],
            })
        );
    }

    #[test]
    fn test_named_shape_unresolved_without_user_resolver() {
        assert!(Resolver::default().resolve(&Shape::named("ip")).is_none());
        assert!(Resolver::empty().resolve(&Shape::Int).is_none());
    }

    fn seven(_: &str) -> Result<Value, ConversionError> {
        Ok(Value::Int(7))
    }

    #[test]
    fn test_earlier_links_take_precedence() {
        let always_seven = Resolver::new(|shape, _| {
            (*shape == Shape::Int).then(|| Arc::new(seven) as Converter)
        });
        let resolver = always_seven.or(Resolver::default());
        let converter = resolver.resolve(&Shape::Int).unwrap();
        assert_eq!(converter("1"), Ok(Value::Int(7)));

        let resolver = Resolver::default().or(Resolver::new(|shape, _| {
            (*shape == Shape::Int).then(|| Arc::new(seven) as Converter)
        }));
        let converter = resolver.resolve(&Shape::Int).unwrap();
        assert_eq!(converter("1"), Ok(Value::Int(1)));
    }

    #[test]
    fn test_parsed_reports_host_error() {
        let resolver = Resolver::parsed::<std::net::Ipv4Addr>("ipv4");
        let converter = resolver.resolve(&Shape::named("ipv4")).unwrap();
        assert!(matches!(
            converter("300.0.0.1"),
            Err(ConversionError::InvalidValue { ref expected, .. }) if expected == "ipv4"
        ));
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(Shape::optional(Shape::list(Shape::Path)).to_string(), "optional<list<path>>");
        assert_eq!(Shape::enumeration("Mode", ["a"]).to_string(), "enum Mode");
    }

    #[test]
    fn test_shape_deserializes_from_yaml_like_json() {
        let shape: Shape = serde_json::from_str(r#"{"list":"uint"}"#).unwrap();
        assert_eq!(shape, Shape::list(Shape::UInt));
        let shape: Shape =
            serde_json::from_str(r#"{"enum":{"name":"Mode","values":["a","b"]}}"#).unwrap();
        assert_eq!(shape, Shape::enumeration("Mode", ["a", "b"]));
    }
}
