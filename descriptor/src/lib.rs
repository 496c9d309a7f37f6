//! Declarative schema descriptors for argsplit.
//!
//! A [`SchemaDescriptor`] is the serializable form of an
//! [`argsplit_core::Schema`]. Descriptors load from YAML or JSON files,
//! build into schemas and splitters, and carry [`SplitSettings`] for the
//! `@file` expansion stage.
//!
//! # Quick start
//!
//! ```no_run
//! use argsplit_descriptor::{SchemaDescriptor, collect_descriptor_paths};
//!
//! let descriptor = SchemaDescriptor::load("schemas/jar.yaml").unwrap();
//! let splitter = descriptor.splitter().unwrap();
//! let bag = splitter.split(["-v", "app.jar"]).unwrap();
//! println!("{}", bag.to_json().unwrap());
//!
//! // Validate every descriptor in a directory
//! for path in collect_descriptor_paths(&["schemas".into()]).unwrap() {
//!     SchemaDescriptor::load(&path).unwrap().build().unwrap();
//! }
//! ```

mod descriptor;
mod error;
mod paths;

pub use descriptor::{FieldDescriptor, FieldKind, SchemaDescriptor, SplitSettings};
pub use error::{DescriptorError, Result};
pub use paths::collect_descriptor_paths;
