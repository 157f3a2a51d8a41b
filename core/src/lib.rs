//! Schema-driven command-line argument binding.
//!
//! This crate turns a raw command line into typed arguments:
//!
//! - [`CommandSchema`] / [`ArgumentSpec`]: declarative description of the
//!   positional, named and flag arguments a command accepts, with value
//!   types, defaults, constraints and nested subcommands.
//! - [`tokenize`]: splits a line into a command name and argument tokens.
//! - [`SchemaRegistry`]: validated, immutable set of schemas built once at
//!   startup through a [`RegistryBuilder`].
//! - [`ParsedArguments`] / [`Value`]: the typed result, read through
//!   accessors that fail predictably on a kind mismatch.
//! - [`Dispatcher`]: routes parsed lines to per-command handlers.
//!
//! User-input failures are reported as a single [`ParseError`]; mistakes in
//! schema definitions are [`SchemaError`]s raised when the registry is built.
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! let registry = SchemaRegistry::builder()
//!     .register(
//!         CommandSchema::new("sub")
//!             .with_arg(ArgumentSpec::optional_named("left", ValueType::Decimal))
//!             .with_arg(ArgumentSpec::named("right", ValueType::Decimal)),
//!     )
//!     .register(
//!         CommandSchema::new("date")
//!             .with_arg(ArgumentSpec::positional("date", ValueType::custom(DATE_TYPE))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let parsed = registry.parse("sub --right 5.0").unwrap();
//! assert_eq!(parsed.arguments.get_decimal("right"), Ok(5.0));
//! assert!(!parsed.arguments.contains("left"));
//!
//! let err = registry.parse("date 2024/01/15").unwrap_err();
//! assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
//! assert!(err.message.contains("yyyy-mm-dd"));
//! ```

mod bind;
mod config;
mod convert;
mod dispatch;
mod error;
mod package;
mod registry;
mod tokenize;
mod types;
mod validate;
mod value;

pub use config::ParserConfig;
pub use convert::{DATE_TYPE, DateParser, ValueParser, ValueTypeTable, convert};
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use error::{ParseError, ParseErrorKind, SchemaError};
pub use package::{SCHEMA_FORMAT_VERSION, SchemaPackage};
pub use registry::{RegistryBuilder, SchemaRegistry};
pub use tokenize::{TokenizedLine, tokenize};
pub use types::*;
pub use validate::{validate_package, validate_schema};
pub use value::{AccessError, ParsedArguments, ParsedCommand, Subcommand, Value};
