//! Schemas: ordered options plus a finalizer.
//!
//! A [`Schema`] is validated once, when it is constructed, and is immutable
//! afterwards. Cloning is cheap (the option list is shared), so the same
//! schema can be nested under a branch and reused by independent splitters.
//!
//! # Examples
//!
//! ```
//! use argsplit_core::{ConfigError, OptionSchema, Schema, Shape};
//!
//! let schema = Schema::new(vec![
//!     OptionSchema::flag(["-v", "--verbose"]),
//!     OptionSchema::required("input", Shape::Path),
//! ])
//! .unwrap();
//! assert_eq!(schema.options().len(), 2);
//! assert_eq!(schema.id_of("--verbose").map(|id| id.index()), Some(0));
//!
//! let err = Schema::new(vec![
//!     OptionSchema::flag("-v"),
//!     OptionSchema::single("-v", Shape::String),
//! ])
//! .unwrap_err();
//! assert_eq!(err, ConfigError::DuplicateName("-v".into()));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::bag::{ArgumentBag, OptionId};
use crate::error::{ConfigError, ValueError};
use crate::names::NameRegistry;
use crate::option::{OptionKind, OptionSchema};

/// Assembles converted values into the caller's result type.
pub type Finalizer<T> = Arc<dyn Fn(ArgumentBag) -> Result<T, ValueError> + Send + Sync>;

/// Validated option list shared by a schema, its clones and every bag it
/// produces.
#[derive(Debug)]
pub(crate) struct SchemaCore {
    pub(crate) options: Vec<OptionSchema>,
    pub(crate) registry: NameRegistry,
}

impl SchemaCore {
    fn build(options: Vec<OptionSchema>) -> Result<Self, ConfigError> {
        if options.is_empty() {
            return Err(ConfigError::EmptySchema);
        }

        let mut registry = NameRegistry::default();
        let mut terminal: Option<&OptionSchema> = None;

        for (index, option) in options.iter().enumerate() {
            registry.register(index, option.kind().name(), option.names())?;

            let multi = matches!(
                option.kind(),
                OptionKind::Single(_) | OptionKind::Repeatable(_)
            );
            if option.cardinality() == 0 || (!multi && option.cardinality() != 1) {
                return Err(ConfigError::InvalidCardinality(
                    option.primary_name().to_string(),
                ));
            }

            if option.kind().is_positional() {
                if let Some(after) = terminal {
                    return Err(ConfigError::PositionalAfterTerminal {
                        option: option.primary_name().to_string(),
                        after: after.primary_name().to_string(),
                    });
                }
                if option.kind().is_terminal() {
                    terminal = Some(option);
                }
            }
        }

        Ok(Self { options, registry })
    }
}

/// Ordered options plus a finalizer producing `T`.
///
/// `Schema` without a type parameter produces the raw [`ArgumentBag`]; this
/// is also the form nested under branches and option groups.
pub struct Schema<T = ArgumentBag> {
    core: Arc<SchemaCore>,
    finalizer: Finalizer<T>,
}

impl Schema {
    /// Validates `options` and returns a schema whose result is the
    /// [`ArgumentBag`] itself.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty option list, missing, malformed
    /// or duplicate names, zero cardinality, a cardinality other than one on
    /// a flag, required, varargs or branch option, or a positional option
    /// declared after a varargs or branch option.
    pub fn new(options: Vec<OptionSchema>) -> Result<Self, ConfigError> {
        Self::with_finalizer(options, Ok)
    }
}

impl<T> Schema<T> {
    /// Validates `options` and attaches a finalizer.
    ///
    /// # Examples
    ///
    /// ```
    /// use argsplit_core::{OptionSchema, Schema, Shape, Splitter};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct CopyArgs { verbose: bool, from: String, to: String }
    ///
    /// let schema = Schema::with_finalizer(
    ///     vec![
    ///         OptionSchema::flag("-v"),
    ///         OptionSchema::required("from", Shape::String),
    ///         OptionSchema::required("to", Shape::String),
    ///     ],
    ///     |bag| {
    ///         Ok(CopyArgs {
    ///             verbose: bag.value("-v")?,
    ///             from: bag.value("from")?,
    ///             to: bag.value("to")?,
    ///         })
    ///     },
    /// )
    /// .unwrap();
    ///
    /// let splitter = Splitter::new(schema).unwrap();
    /// let copy = splitter.split(["a.txt", "-v", "b.txt"]).unwrap();
    /// assert_eq!(copy, CopyArgs { verbose: true, from: "a.txt".into(), to: "b.txt".into() });
    /// ```
    pub fn with_finalizer<F>(options: Vec<OptionSchema>, finalizer: F) -> Result<Self, ConfigError>
    where
        F: Fn(ArgumentBag) -> Result<T, ValueError> + Send + Sync + 'static,
    {
        Ok(Self {
            core: Arc::new(SchemaCore::build(options)?),
            finalizer: Arc::new(finalizer),
        })
    }

    /// Post-processes this schema's result with `f`.
    pub fn map<U, F>(self, f: F) -> Schema<U>
    where
        T: 'static,
        U: 'static,
        F: Fn(T) -> Result<U, ValueError> + Send + Sync + 'static,
    {
        let inner = self.finalizer;
        Schema {
            core: self.core,
            finalizer: Arc::new(move |bag| f(inner(bag)?)),
        }
    }

    /// Options in declaration order.
    pub fn options(&self) -> &[OptionSchema] {
        &self.core.options
    }

    /// The option with identity `id`.
    pub fn option(&self, id: OptionId) -> Option<&OptionSchema> {
        self.core.options.get(id.index())
    }

    /// Identity of the option declaring `name`.
    pub fn id_of(&self, name: &str) -> Option<OptionId> {
        self.core.registry.lookup(name).map(OptionId::new)
    }

    /// Runs the finalizer over a bag produced for this schema.
    pub fn finalize(&self, bag: ArgumentBag) -> Result<T, ValueError> {
        (self.finalizer)(bag)
    }

    pub(crate) fn core(&self) -> &Arc<SchemaCore> {
        &self.core
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            finalizer: Arc::clone(&self.finalizer),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("options", &self.core.options)
            .finish_non_exhaustive()
    }
}
