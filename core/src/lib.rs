//! Schema-driven splitting of command-line tokens into typed values.
//!
//! This crate defines the argument model and the engine that applies it:
//!
//! - [`OptionSchema`]: one declared option with an [`OptionKind`] (flag, single,
//!   repeatable, required, varargs or branch), its [`Names`], help text and
//!   cardinality.
//! - [`Schema`]: an ordered, validated option list plus a finalizer that
//!   turns the converted values into the caller's result type.
//! - [`Resolver`]: an ordered chain mapping a value [`Shape`] to a
//!   [`Converter`]; user resolvers placed first shadow the built-ins.
//! - [`Splitter`]: a schema bound to its resolved converters and a
//!   [`TokenExpander`]; one [`split`](Splitter::split) call is one
//!   left-to-right pass over the tokens.
//! - [`ArgumentBag`]: converted values of one call, addressable by
//!   [`OptionId`], by name and by declaration index.
//!
//! Configuration mistakes surface as [`ConfigError`] when a schema or
//! splitter is built; bad input surfaces as [`SplitError`] from `split`.
//!
//! # Example
//!
//! ```
//! use argsplit_core::*;
//!
//! let topic = Schema::new(vec![OptionSchema::required("topic", Shape::String)]).unwrap();
//! let schema = Schema::new(vec![
//!     OptionSchema::flag(["-v", "--verbose"]).with_help("Print more output"),
//!     OptionSchema::single(["-o", "--output"], Shape::Path),
//!     OptionSchema::required("jar", Shape::Path),
//!     OptionSchema::branch("help", topic),
//! ])
//! .unwrap();
//! let splitter = Splitter::new(schema).unwrap();
//!
//! let bag = splitter.split(["-v", "app.jar", "--output=out"]).unwrap();
//! assert!(bag.flag("--verbose"));
//! assert_eq!(bag["-o"], Value::Path("out".into()));
//! assert!(bag["help"].is_absent());
//!
//! let bag = splitter.split(["help", "install"]).unwrap();
//! let help = bag["help"].as_group().unwrap();
//! assert_eq!(help["topic"], Value::Str("install".into()));
//! ```

mod bag;
mod convert;
mod error;
mod expand;
mod help;
mod names;
mod option;
mod schema;
mod splitter;
mod value;

pub use bag::{ArgumentBag, OptionId};
pub use convert::{Converter, Resolver, Shape};
pub use error::{ConfigError, ConversionError, ExpandError, SplitError, ValueError};
pub use expand::{ArgFileExpander, NoExpansion, TokenExpander, parse_arg_file};
pub use help::render_help;
pub use names::Names;
pub use option::{OptionKind, OptionSchema, ValueSpec};
pub use schema::{Finalizer, Schema};
pub use splitter::{Splitter, SplitterBuilder};
pub use value::{CustomValue, FromValue, Value};
