use serde::{Deserialize, Serialize};

use crate::CommandSchema;

/// Version of the schema file format (semver).
pub const SCHEMA_FORMAT_VERSION: &str = "1.0.0";

/// Serializable bundle of command schemas used for distribution.
///
/// A package groups several [`CommandSchema`] values with version metadata,
/// so a whole command set can be shipped as one JSON or YAML file.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0");
/// package.name = Some("scenarios".into());
/// package.schemas.push(CommandSchema::new("add"));
/// package.schemas.push(CommandSchema::new("sub"));
///
/// assert_eq!(package.schema_count(), 2);
/// assert_eq!(package.format_version.as_deref(), Some(SCHEMA_FORMAT_VERSION));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaPackage {
    /// File format version (populated from [`SCHEMA_FORMAT_VERSION`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    /// Package version (semver string).
    pub version: String,
    /// Optional package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional package description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Command schemas included in this package.
    #[serde(default)]
    pub schemas: Vec<CommandSchema>,
}

impl SchemaPackage {
    /// Creates an empty package with the given version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            format_version: Some(SCHEMA_FORMAT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            schemas: Vec::new(),
        }
    }

    /// Returns the number of schemas in this package.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
