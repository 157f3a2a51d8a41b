//! Command-line tool configuration.
//!
//! Defines the YAML-serializable configuration that selects which schemas are
//! loaded and how command lines are tokenized.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! builtin_schemas: true
//! schema_dirs:
//!   - schemas/
//! schema_bundles:
//!   - dist/commands.json
//! parser:
//!   flag_prefix: "--"
//!   quoting: true
//!   inline_values: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use command_args_core::{ParserConfig, SchemaRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::loader::SchemaSet;

/// Current configuration format version.
pub const CONFIG_VERSION: &str = "1.0";

/// Top-level tool configuration.
///
/// Every field has a default, so an empty document is a valid configuration
/// that loads only the built-in command set.
///
/// # Examples
///
/// ```
/// use command_args_db::CliConfig;
///
/// let config: CliConfig = serde_yaml::from_str("parser: { quoting: true }").unwrap();
/// assert!(config.parser.quoting);
/// assert_eq!(config.parser.flag_prefix, "--");
/// assert!(config.builtin_schemas);
///
/// let registry = config.registry().unwrap();
/// assert!(registry.contains("date"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Tokenizer and binder settings.
    pub parser: ParserConfig,
    /// Load the compiled-in `add`/`sub`/`sqrt`/`calc`/`date` schemas.
    pub builtin_schemas: bool,
    /// Directories scanned for schema files.
    pub schema_dirs: Vec<PathBuf>,
    /// [`SchemaPackage`](command_args_core::SchemaPackage) files.
    pub schema_bundles: Vec<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            parser: ParserConfig::default(),
            builtin_schemas: true,
            schema_dirs: Vec::new(),
            schema_bundles: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::LoadError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::LoadError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::LoadError::Io) if the file cannot be written, or
    /// [`Yaml`](crate::LoadError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Loads every configured schema source, built-ins first, then
    /// directories, then bundles.
    pub fn schema_set(&self) -> Result<SchemaSet> {
        let mut set = if self.builtin_schemas {
            SchemaSet::builtin()?
        } else {
            SchemaSet::empty()
        };
        for dir in &self.schema_dirs {
            set.extend(SchemaSet::from_dir(dir)?);
        }
        for bundle in &self.schema_bundles {
            set.extend(SchemaSet::from_bundle(bundle)?);
        }
        debug!(schemas = set.len(), "resolved configured schema sources");
        Ok(set)
    }

    /// Loads the configured schemas and builds a registry with this
    /// configuration's parser settings.
    ///
    /// # Errors
    ///
    /// Any loading error, or [`Schema`](crate::LoadError::Schema) if the
    /// registry rejects a schema.
    pub fn registry(&self) -> Result<SchemaRegistry> {
        let builder = SchemaRegistry::builder().with_config(self.parser.clone());
        let registry = self.schema_set()?.register_into(builder).build()?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
builtin_schemas: false
schema_dirs:
  - /opt/schemas
schema_bundles:
  - /opt/commands.json
parser:
  flag_prefix: "/"
  quoting: true
  inline_values: false
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: CliConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(!config.builtin_schemas);
        assert_eq!(config.schema_dirs, vec![PathBuf::from("/opt/schemas")]);
        assert_eq!(config.schema_bundles, vec![PathBuf::from("/opt/commands.json")]);
        assert_eq!(config.parser.flag_prefix, "/");
        assert!(config.parser.quoting);
        assert!(!config.parser.inline_values);
    }

    #[test]
    fn test_deserialize_empty_document() {
        let config: CliConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");

        let original: CliConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_missing_dir_fails_schema_set() {
        let config = CliConfig {
            schema_dirs: vec![PathBuf::from("/nonexistent/schemas")],
            ..Default::default()
        };
        assert!(config.schema_set().is_err());
    }

    #[test]
    fn test_registry_uses_parser_config() {
        let config = CliConfig {
            parser: ParserConfig {
                quoting: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let registry = config.registry().unwrap();
        assert!(registry.config().quoting);
        assert_eq!(registry.len(), 5);
    }
}
