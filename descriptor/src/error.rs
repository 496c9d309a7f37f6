//! Error types for descriptor loading and schema building.

use std::path::PathBuf;

use argsplit_core::ConfigError;
use thiserror::Error;

use crate::descriptor::FieldKind;

/// Errors that can occur while loading or building a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file extension is neither `.json`, `.yml` nor `.yaml`.
    #[error("unsupported descriptor format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A branch field without a nested schema.
    #[error("field '{field}' of kind {kind} requires a nested schema")]
    MissingSchema { field: String, kind: FieldKind },

    /// A nested schema on a field kind that cannot carry one.
    #[error("field '{field}' of kind {kind} cannot have a nested schema")]
    UnexpectedSchema { field: String, kind: FieldKind },

    /// A flag declared with a value shape other than `bool`.
    #[error("flag '{field}' cannot have shape {shape}")]
    FlagShape { field: String, shape: String },

    /// The built schema or splitter was rejected.
    #[error("invalid schema: {0}")]
    Config(#[from] ConfigError),

    /// Bad input paths passed to descriptor collection.
    #[error("{0}")]
    InvalidInput(String),
}

/// Convenience alias for results with [`DescriptorError`].
pub type Result<T> = std::result::Result<T, DescriptorError>;
