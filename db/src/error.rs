//! Error types for schema loading.
//!
//! One error type covers every failure while reading schema definitions:
//! I/O, JSON/YAML decoding, unrecognised file formats and invalid packages.

use std::path::PathBuf;

use command_args_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading schemas or configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension is not `.json`, `.yaml` or `.yml`.
    #[error("unsupported schema file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A package document was read but its contents are unusable.
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    /// Loaded schemas were rejected when the registry was built.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
