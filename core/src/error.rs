//! Error types for schema construction, conversion, expansion and splitting.
//!
//! Errors fall into three families that surface at different times:
//!
//! - [`ConfigError`]: raised while building a [`Schema`](crate::Schema) or a
//!   [`Splitter`](crate::Splitter). These indicate a programming mistake in
//!   the declared schema and are expected to be caught during development.
//! - [`ExpandError`]: raised by the `@file` expansion stage before any
//!   matching happens.
//! - [`SplitError`]: raised by a single `split` call. A failed call never
//!   yields a partial result.

use std::path::PathBuf;

use thiserror::Error;

/// Schema or splitter construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A schema was declared without any options.
    #[error("schema must declare at least one option")]
    EmptySchema,
    /// An option was declared without any names.
    #[error("{kind} option at position {index} has no names")]
    NoNames {
        /// Kind of the offending option.
        kind: &'static str,
        /// Position of the option in its schema.
        index: usize,
    },
    /// A name is empty, contains whitespace or `=`, is `--`, or starts with `@`.
    #[error("invalid option name: {0:?}")]
    InvalidName(String),
    /// Two options (or one option twice) declare the same name.
    #[error("duplicate option name: {0}")]
    DuplicateName(String),
    /// A positional slot follows an unbounded varargs or branch slot.
    #[error("positional option {option} is declared after terminal option {after}")]
    PositionalAfterTerminal {
        /// Primary name of the unreachable option.
        option: String,
        /// Primary name of the varargs/branch option it follows.
        after: String,
    },
    /// Cardinality is zero, or is set on an option that takes at most one
    /// token per occurrence.
    #[error("option {0} has an invalid cardinality")]
    InvalidCardinality(String),
    /// No resolver in the chain produced a converter for the option's shape.
    #[error("no converter resolves shape {shape} for option {option}")]
    UnresolvedConverter {
        /// Primary name of the option.
        option: String,
        /// Rendered value shape.
        shape: String,
    },
}

/// A converter rejected its textual input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The input is not a valid value of the expected shape.
    #[error("expected {expected}: {reason}")]
    InvalidValue {
        /// Rendered expected shape.
        expected: String,
        /// Underlying parser message.
        reason: String,
    },
    /// The input does not name one of the declared enum values.
    #[error("expected one of [{}] for {name}", .valid.join(", "))]
    NotAChoice {
        /// Name of the enumerated shape.
        name: String,
        /// All accepted values in declaration order.
        valid: Vec<String>,
    },
    /// Free-form failure reported by a user converter.
    #[error("{0}")]
    Custom(String),
}

impl ConversionError {
    /// Builds an [`InvalidValue`](Self::InvalidValue) error.
    pub fn invalid(expected: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidValue {
            expected: expected.into(),
            reason: reason.to_string(),
        }
    }

    /// Builds a [`Custom`](Self::Custom) error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Argument-file expansion failure.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The referenced file could not be read.
    #[error("cannot read argument file '{}': {source}", .path.display())]
    Unreadable {
        /// Resolved path of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// An argument file references another argument file.
    #[error("argument file '{}' line {line}: nested reference {token:?} is not allowed", .path.display())]
    NestedReference {
        /// File containing the reference.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The offending line, trimmed.
        token: String,
    },
}

/// Typed extraction failure raised by [`FromValue`](crate::FromValue) and
/// [`ArgumentBag`](crate::ArgumentBag) accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The bag has no option with this name.
    #[error("no option named {0}")]
    UnknownOption(String),
    /// The stored value has a different shape.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Requested Rust type.
        expected: &'static str,
        /// Kind of the stored value.
        found: &'static str,
    },
    /// A numeric value does not fit the requested integer type.
    #[error("value {value} does not fit in {target}")]
    OutOfRange {
        /// Rendered numeric value.
        value: String,
        /// Requested Rust type.
        target: &'static str,
    },
}

/// Failure of a single `split` call.
#[derive(Debug, Error)]
pub enum SplitError {
    /// A token looks like an option name but matches nothing.
    #[error("unknown option: {0}")]
    UnknownOption(String),
    /// A positional token has no slot left to fill.
    #[error("unexpected argument: {0:?}")]
    UnexpectedArgument(String),
    /// An inline `=value` was given to an option that takes none.
    #[error("option {option} does not take a value (got {value:?})")]
    UnexpectedValue {
        /// Primary name of the option.
        option: String,
        /// The rejected inline value.
        value: String,
    },
    /// Input ended before a value-taking option received all its tokens.
    #[error("option {option} expects {expected} value(s), got {found}")]
    MissingValue {
        /// Primary name of the option.
        option: String,
        /// Tokens required per occurrence.
        expected: usize,
        /// Tokens actually available.
        found: usize,
    },
    /// A required option never received a value.
    #[error("missing required argument: {0}")]
    MissingArgument(String),
    /// A matched raw value failed conversion.
    #[error("invalid value {input:?} for {option}: {source}")]
    Conversion {
        /// Primary name of the option.
        option: String,
        /// The raw token that failed.
        input: String,
        /// Underlying conversion failure.
        #[source]
        source: ConversionError,
    },
    /// The `@file` stage failed.
    #[error(transparent)]
    Expand(#[from] ExpandError),
    /// The schema's finalizer rejected the converted values.
    #[error("cannot assemble result: {0}")]
    Finalize(#[from] ValueError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_choice_lists_values() {
        let err = ConversionError::NotAChoice {
            name: "Mode".into(),
            valid: vec!["fast".into(), "slow".into()],
        };
        assert_eq!(err.to_string(), "expected one of [fast, slow] for Mode");
    }

    #[test]
    fn test_conversion_error_names_option_and_input() {
        let err = SplitError::Conversion {
            option: "--port".into(),
            input: "http".into(),
            source: ConversionError::invalid("int", "invalid digit found in string"),
        };
        assert_eq!(
            err.to_string(),
            "invalid value \"http\" for --port: expected int: invalid digit found in string"
        );
    }
}
