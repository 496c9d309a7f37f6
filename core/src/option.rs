//! Declared options.
//!
//! An [`OptionSchema`] describes one switch or positional slot: its
//! [`OptionKind`] (with the kind's payload), its [`Names`], optional help
//! text and the number of tokens it consumes per occurrence.
//!
//! # Examples
//!
//! ```
//! use argsplit_core::{OptionSchema, Shape};
//!
//! let verbose = OptionSchema::flag(["-v", "--verbose"]).with_help("Print more output");
//! assert_eq!(verbose.primary_name(), "-v");
//! assert!(!verbose.kind().is_positional());
//!
//! let files = OptionSchema::varargs("files", Shape::Path);
//! assert!(files.kind().is_positional());
//! ```

use std::fmt;

use crate::convert::Shape;
use crate::names::Names;
use crate::schema::Schema;

/// The value carried by a [`Single`](OptionKind::Single) or
/// [`Repeatable`](OptionKind::Repeatable) option.
#[derive(Debug, Clone)]
pub enum ValueSpec {
    /// Each token is converted with the converter resolved for this shape.
    Scalar(Shape),
    /// Each value-group is split by a nested schema.
    Group(Schema),
}

/// Kind of a declared option, with the payload that kind needs.
#[derive(Debug, Clone)]
pub enum OptionKind {
    /// Boolean presence switch.
    Flag,
    /// Optional named value; the last occurrence wins.
    Single(ValueSpec),
    /// Accumulating named value; occurrences append in encounter order.
    Repeatable(ValueSpec),
    /// Mandatory value, given positionally or by name.
    Required(Shape),
    /// Every leftover positional token.
    Varargs(Shape),
    /// Sub-schema that takes over the rest of the token stream.
    Branch(Schema),
}

impl OptionKind {
    /// Lowercase kind name used in diagnostics and help output.
    pub fn name(&self) -> &'static str {
        match self {
            OptionKind::Flag => "flag",
            OptionKind::Single(_) => "single",
            OptionKind::Repeatable(_) => "repeatable",
            OptionKind::Required(_) => "required",
            OptionKind::Varargs(_) => "varargs",
            OptionKind::Branch(_) => "branch",
        }
    }

    /// `Required`, `Varargs` and `Branch` bind to unnamed tokens in
    /// declaration order.
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            OptionKind::Required(_) | OptionKind::Varargs(_) | OptionKind::Branch(_)
        )
    }

    /// `Varargs` and `Branch` consume everything after them, so no
    /// positional slot may follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OptionKind::Varargs(_) | OptionKind::Branch(_))
    }

    /// The nested schema of a branch or option group.
    pub fn nested_schema(&self) -> Option<&Schema> {
        match self {
            OptionKind::Branch(schema)
            | OptionKind::Single(ValueSpec::Group(schema))
            | OptionKind::Repeatable(ValueSpec::Group(schema)) => Some(schema),
            _ => None,
        }
    }

    /// The shape converted per token, if the kind converts tokens directly.
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            OptionKind::Single(ValueSpec::Scalar(shape))
            | OptionKind::Repeatable(ValueSpec::Scalar(shape))
            | OptionKind::Required(shape)
            | OptionKind::Varargs(shape) => Some(shape),
            _ => None,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared option.
#[derive(Debug, Clone)]
pub struct OptionSchema {
    kind: OptionKind,
    names: Names,
    help: Option<String>,
    cardinality: usize,
}

impl OptionSchema {
    fn with_kind(names: impl Into<Names>, kind: OptionKind) -> Self {
        Self {
            kind,
            names: names.into(),
            help: None,
            cardinality: 1,
        }
    }

    /// A boolean switch, `true` when present.
    pub fn flag(names: impl Into<Names>) -> Self {
        Self::with_kind(names, OptionKind::Flag)
    }

    /// An optional named value of `shape`.
    pub fn single(names: impl Into<Names>, shape: Shape) -> Self {
        Self::with_kind(names, OptionKind::Single(ValueSpec::Scalar(shape)))
    }

    /// A named value of `shape` that accumulates across occurrences.
    pub fn repeatable(names: impl Into<Names>, shape: Shape) -> Self {
        Self::with_kind(names, OptionKind::Repeatable(ValueSpec::Scalar(shape)))
    }

    /// A mandatory value, bound positionally or given by name.
    pub fn required(names: impl Into<Names>, shape: Shape) -> Self {
        Self::with_kind(names, OptionKind::Required(shape))
    }

    /// All remaining positional tokens, each converted as `shape`.
    pub fn varargs(names: impl Into<Names>, shape: Shape) -> Self {
        Self::with_kind(names, OptionKind::Varargs(shape))
    }

    /// A sub-schema selected by name that owns the rest of the input.
    pub fn branch(names: impl Into<Names>, schema: Schema) -> Self {
        Self::with_kind(names, OptionKind::Branch(schema))
    }

    /// An optional named value-group split by `schema`.
    ///
    /// Consumes one token per `Required` option of `schema` unless
    /// [`with_cardinality`](Self::with_cardinality) says otherwise.
    pub fn single_group(names: impl Into<Names>, schema: Schema) -> Self {
        let cardinality = group_cardinality(&schema);
        Self::with_kind(names, OptionKind::Single(ValueSpec::Group(schema)))
            .with_cardinality(cardinality)
    }

    /// An accumulating named value-group split by `schema`.
    pub fn repeatable_group(names: impl Into<Names>, schema: Schema) -> Self {
        let cardinality = group_cardinality(&schema);
        Self::with_kind(names, OptionKind::Repeatable(ValueSpec::Group(schema)))
            .with_cardinality(cardinality)
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the number of tokens consumed per occurrence.
    ///
    /// Only `Single` and `Repeatable` options may consume more than one
    /// token. Zero, or anything but one on other kinds, is rejected when the
    /// schema is built.
    pub fn with_cardinality(mut self, cardinality: usize) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn kind(&self) -> &OptionKind {
        &self.kind
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn primary_name(&self) -> &str {
        self.names.primary()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }
}

fn group_cardinality(schema: &Schema) -> usize {
    schema
        .options()
        .iter()
        .filter(|o| matches!(o.kind(), OptionKind::Required(_)))
        .count()
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let required = OptionSchema::required("file", Shape::Path);
        assert!(required.kind().is_positional());
        assert!(!required.kind().is_terminal());

        let varargs = OptionSchema::varargs("rest", Shape::String);
        assert!(varargs.kind().is_terminal());

        let single = OptionSchema::single("--out", Shape::Path);
        assert!(!single.kind().is_positional());
        assert_eq!(single.kind().shape(), Some(&Shape::Path));
    }

    #[test]
    fn test_group_cardinality_counts_required_options() {
        let point = Schema::new(vec![
            OptionSchema::required("x", Shape::Int),
            OptionSchema::required("y", Shape::Int),
            OptionSchema::flag("--polar"),
        ])
        .unwrap();
        let option = OptionSchema::repeatable_group("--point", point);
        assert_eq!(option.cardinality(), 2);
        assert!(option.kind().nested_schema().is_some());
        assert!(option.kind().shape().is_none());
    }

    #[test]
    fn test_builder_sets_help() {
        let option = OptionSchema::flag(["-q", "--quiet"]).with_help("Say less");
        assert_eq!(option.help(), Some("Say less"));
        assert_eq!(option.names().to_string(), "-q, --quiet");
        assert_eq!(option.kind().to_string(), "flag");
    }
}
