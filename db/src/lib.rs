//! Loading command schemas from files.
//!
//! Schemas can be written by hand as JSON or YAML, one command per file, or
//! shipped as a [`SchemaPackage`](command_args_core::SchemaPackage) bundle.
//! This crate reads them into a [`SchemaSet`] that feeds a
//! [`RegistryBuilder`](command_args_core::RegistryBuilder), and holds the
//! YAML [`CliConfig`] used by the `command-args` tool.
//!
//! # Quick start
//!
//! ```no_run
//! use command_args_core::SchemaRegistry;
//! use command_args_db::{CliConfig, SchemaSet};
//!
//! // Load schemas from a directory, falling back to the built-in set
//! let set = SchemaSet::builder()
//!     .from_dir("schemas/")
//!     .with_builtin()
//!     .build()
//!     .unwrap();
//! let registry = set.register_into(SchemaRegistry::builder()).build().unwrap();
//!
//! // Or let a configuration file decide
//! let registry = CliConfig::load("command-args.yml").unwrap().registry().unwrap();
//! ```

mod config;
mod error;
mod loader;

pub use config::{CONFIG_VERSION, CliConfig};
pub use error::{LoadError, Result};
pub use loader::{FileFormat, SchemaSet, SchemaSetBuilder, SchemaSource};
