//! Serializable schema descriptors.
//!
//! A descriptor is the data form of a [`Schema`]: an ordered list of fields,
//! each naming its kind, names, value shape and optional nested descriptor.
//!
//! # Example YAML
//!
//! ```yaml
//! name: jar
//! description: Create and list archives
//! settings:
//!   expand_arg_files: true
//! fields:
//!   - kind: flag
//!     names: [-v, --verbose]
//!     help: Print more output
//!   - kind: repeatable
//!     names: [-D, --define]
//!   - kind: required
//!     names: [jar]
//!     shape: path
//!   - kind: branch
//!     names: [help]
//!     schema:
//!       fields:
//!         - kind: required
//!           names: [topic]
//! ```

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use argsplit_core::{
    ArgFileExpander, NoExpansion, OptionSchema, Resolver, Schema, Shape, Splitter,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DescriptorError, Result};

/// Kind of a declared field; mirrors [`argsplit_core::OptionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Flag,
    Single,
    Repeatable,
    Required,
    Varargs,
    Branch,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Flag => "flag",
            FieldKind::Single => "single",
            FieldKind::Repeatable => "repeatable",
            FieldKind::Required => "required",
            FieldKind::Varargs => "varargs",
            FieldKind::Branch => "branch",
        })
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    /// Accepted names; the first is the primary name.
    pub names: Vec<String>,
    /// Value shape. Defaults to `string` for value-bearing kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Tokens per occurrence; only single and repeatable fields accept a
    /// value other than 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<usize>,
    /// Nested descriptor of a branch, or of a single/repeatable group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<SchemaDescriptor>>,
}

impl FieldDescriptor {
    /// A field of `kind` with the given names and no other settings.
    pub fn new<I, S>(kind: FieldKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            names: names.into_iter().map(Into::into).collect(),
            shape: None,
            help: None,
            cardinality: None,
            schema: None,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_cardinality(mut self, cardinality: usize) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = Some(Box::new(schema));
        self
    }

    fn label(&self) -> String {
        self.names.first().cloned().unwrap_or_default()
    }

    /// Converts this field into an [`OptionSchema`].
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when the nested schema does not fit the
    /// kind, a flag declares a non-bool shape, or a nested schema is invalid.
    pub fn build(&self) -> Result<OptionSchema> {
        let names = self.names.clone();
        let shape = || self.shape.clone().unwrap_or_default();
        let nested = match (&self.schema, self.kind) {
            (Some(schema), FieldKind::Branch | FieldKind::Single | FieldKind::Repeatable) => {
                Some(schema.build()?)
            }
            (None, FieldKind::Branch) => {
                return Err(DescriptorError::MissingSchema {
                    field: self.label(),
                    kind: self.kind,
                });
            }
            (Some(_), _) => {
                return Err(DescriptorError::UnexpectedSchema {
                    field: self.label(),
                    kind: self.kind,
                });
            }
            (None, _) => None,
        };

        let option = match (self.kind, nested) {
            (FieldKind::Flag, _) => match &self.shape {
                None | Some(Shape::Bool) => OptionSchema::flag(names),
                Some(other) => {
                    return Err(DescriptorError::FlagShape {
                        field: self.label(),
                        shape: other.to_string(),
                    });
                }
            },
            (FieldKind::Single, Some(schema)) => OptionSchema::single_group(names, schema),
            (FieldKind::Single, None) => OptionSchema::single(names, shape()),
            (FieldKind::Repeatable, Some(schema)) => OptionSchema::repeatable_group(names, schema),
            (FieldKind::Repeatable, None) => OptionSchema::repeatable(names, shape()),
            (FieldKind::Required, _) => OptionSchema::required(names, shape()),
            (FieldKind::Varargs, _) => OptionSchema::varargs(names, shape()),
            (FieldKind::Branch, Some(schema)) => OptionSchema::branch(names, schema),
            (FieldKind::Branch, None) => unreachable!("branch without schema rejected above"),
        };

        let option = match self.cardinality {
            Some(cardinality) => option.with_cardinality(cardinality),
            None => option,
        };
        Ok(match &self.help {
            Some(help) => option.with_help(help.clone()),
            None => option,
        })
    }
}

fn default_true() -> bool {
    true
}

/// Settings for the splitter built from a top-level descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSettings {
    /// Inline `@file` references before splitting.
    #[serde(default = "default_true")]
    pub expand_arg_files: bool,
    /// Directory relative `@file` paths are resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            expand_arg_files: true,
            base_dir: None,
        }
    }
}

/// Declarative description of a [`Schema`].
///
/// # Examples
///
/// ```
/// use argsplit_descriptor::SchemaDescriptor;
///
/// let descriptor = SchemaDescriptor::from_yaml(r#"
/// name: greet
/// fields:
///   - kind: flag
///     names: [-l, --loud]
///   - kind: required
///     names: [who]
/// "#).unwrap();
///
/// let splitter = descriptor.splitter().unwrap();
/// let bag = splitter.split(["-l", "world"]).unwrap();
/// assert!(bag.flag("--loud"));
/// assert_eq!(bag.value::<String>("who").unwrap(), "world");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only read on the top-level descriptor.
    #[serde(default)]
    pub settings: SplitSettings,
    pub fields: Vec<FieldDescriptor>,
}

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("json") => Ok(Format::Json),
            Some("yml" | "yaml") => Ok(Format::Yaml),
            _ => Err(DescriptorError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl SchemaDescriptor {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: None,
            description: None,
            settings: SplitSettings::default(),
            fields,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a descriptor from a `.json`, `.yml` or `.yaml` file.
    ///
    /// A relative `settings.base_dir` is resolved against the directory
    /// holding the file.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](DescriptorError::UnsupportedFormat) for
    /// other extensions, [`IoError`](DescriptorError::IoError) if the file
    /// cannot be read, or a parse error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let reader = BufReader::new(File::open(path)?);
        let mut descriptor: Self = match format {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };

        if let (Some(base), Some(parent)) = (&descriptor.settings.base_dir, path.parent()) {
            if base.is_relative() {
                descriptor.settings.base_dir = Some(parent.join(base));
            }
        }

        debug!(
            path = %path.display(),
            fields = descriptor.fields.len(),
            "loaded schema descriptor"
        );
        Ok(descriptor)
    }

    /// Saves the descriptor, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](DescriptorError::UnsupportedFormat) for
    /// unknown extensions, or an I/O or serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let writer = BufWriter::new(File::create(path)?);
        match format {
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    /// Builds the described [`Schema`], recursing into nested descriptors.
    pub fn build(&self) -> Result<Schema> {
        let options = self
            .fields
            .iter()
            .map(FieldDescriptor::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema::new(options)?)
    }

    /// Builds a splitter with the default resolver chain.
    pub fn splitter(&self) -> Result<Splitter> {
        self.splitter_with(Resolver::default())
    }

    /// Builds a splitter resolving converters through `resolver`, with
    /// expansion configured from [`settings`](Self::settings).
    pub fn splitter_with(&self, resolver: Resolver) -> Result<Splitter> {
        let builder = Splitter::builder(self.build()?).resolver(resolver);
        let builder = match (self.settings.expand_arg_files, &self.settings.base_dir) {
            (false, _) => builder.expander(NoExpansion),
            (true, Some(dir)) => builder.expander(ArgFileExpander::with_base_dir(dir.clone())),
            (true, None) => builder.expander(ArgFileExpander::new()),
        };
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argsplit_core::{ConfigError, OptionKind, Value};

    fn jar_yaml() -> &'static str {
        r#"
name: jar
description: Create and list archives
fields:
  - kind: flag
    names: [-v, --verbose]
    help: Print more output
  - kind: repeatable
    names: [-D, --define]
    cardinality: 2
  - kind: required
    names: [jar]
    shape: path
  - kind: branch
    names: [help]
    schema:
      fields:
        - kind: required
          names: [topic]
"#
    }

    #[test]
    fn test_deserialize_yaml() {
        let descriptor = SchemaDescriptor::from_yaml(jar_yaml()).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("jar"));
        assert_eq!(descriptor.fields.len(), 4);
        assert_eq!(descriptor.fields[1].cardinality, Some(2));
        assert_eq!(descriptor.fields[2].shape, Some(Shape::Path));
        assert!(descriptor.settings.expand_arg_files);
        assert!(descriptor.fields[3].schema.is_some());
    }

    #[test]
    fn test_build_schema() {
        let schema = SchemaDescriptor::from_yaml(jar_yaml()).unwrap().build().unwrap();
        let options = schema.options();
        assert_eq!(options[0].help(), Some("Print more output"));
        assert_eq!(options[1].cardinality(), 2);
        assert!(matches!(options[2].kind(), OptionKind::Required(Shape::Path)));
        assert!(matches!(options[3].kind(), OptionKind::Branch(_)));
    }

    #[test]
    fn test_shape_defaults_to_string() {
        let field = FieldDescriptor::new(FieldKind::Single, ["--name"]);
        let option = field.build().unwrap();
        assert_eq!(option.kind().shape(), Some(&Shape::String));
    }

    #[test]
    fn test_branch_requires_schema() {
        let err = FieldDescriptor::new(FieldKind::Branch, ["help"]).build().unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::MissingSchema { ref field, kind: FieldKind::Branch } if field == "help"
        ));
    }

    #[test]
    fn test_required_rejects_schema() {
        let nested = SchemaDescriptor::new(vec![FieldDescriptor::new(FieldKind::Flag, ["-x"])]);
        let err = FieldDescriptor::new(FieldKind::Required, ["file"])
            .with_schema(nested)
            .build()
            .unwrap_err();
        assert!(matches!(err, DescriptorError::UnexpectedSchema { .. }));
    }

    #[test]
    fn test_flag_rejects_value_shape() {
        let err = FieldDescriptor::new(FieldKind::Flag, ["-n"])
            .with_shape(Shape::Int)
            .build()
            .unwrap_err();
        assert!(matches!(err, DescriptorError::FlagShape { ref shape, .. } if shape == "int"));

        let ok = FieldDescriptor::new(FieldKind::Flag, ["-n"]).with_shape(Shape::Bool);
        assert!(ok.build().is_ok());
    }

    #[test]
    fn test_group_field() {
        let point = SchemaDescriptor::new(vec![
            FieldDescriptor::new(FieldKind::Required, ["x"]).with_shape(Shape::Int),
            FieldDescriptor::new(FieldKind::Required, ["y"]).with_shape(Shape::Int),
        ]);
        let descriptor = SchemaDescriptor::new(vec![
            FieldDescriptor::new(FieldKind::Single, ["--at"]).with_schema(point),
        ]);
        let splitter = descriptor.splitter().unwrap();
        let bag = splitter.split(["--at", "3", "4"]).unwrap();
        let at = bag["--at"].as_group().unwrap();
        assert_eq!(at["x"], Value::Int(3));
        assert_eq!(at["y"], Value::Int(4));
    }

    #[test]
    fn test_invalid_schema_wrapped() {
        let descriptor = SchemaDescriptor::new(Vec::new());
        let err = descriptor.build().unwrap_err();
        assert!(matches!(err, DescriptorError::Config(_)));
    }

    #[test]
    fn test_cardinality_on_required_rejected() {
        let descriptor = SchemaDescriptor::from_yaml(
            "fields:\n  - kind: required\n    names: [file]\n    cardinality: 2\n",
        )
        .unwrap();
        let err = descriptor.build().unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::Config(ConfigError::InvalidCardinality(ref name)) if name == "file"
        ));
    }

    #[test]
    fn test_unknown_field_kind_rejected() {
        let err = SchemaDescriptor::from_yaml("fields:\n  - kind: toggle\n    names: [-t]\n")
            .unwrap_err();
        assert!(matches!(err, DescriptorError::YamlError(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SchemaDescriptor::load("schema.toml").unwrap_err();
        assert!(matches!(err, DescriptorError::UnsupportedFormat(_)));
    }
}
