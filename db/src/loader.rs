//! Schema loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaSet`] for an ordered collection of loaded schemas and
//! [`SchemaSetBuilder`] for loading from several sources with automatic
//! fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use command_args_db::SchemaSet;
//!
//! // One schema per file
//! let set = SchemaSet::from_file("schemas/add.yaml").unwrap();
//!
//! // Every .json/.yaml/.yml file in a directory
//! let set = SchemaSet::from_dir("schemas/").unwrap();
//! assert!(set.get("add").is_some());
//!
//! // A SchemaPackage bundle
//! let set = SchemaSet::from_bundle("commands.json").unwrap();
//!
//! // Fallback chain
//! let set = SchemaSet::builder()
//!     .from_dir("schemas/")
//!     .from_bundle("commands.json")
//!     .with_builtin()
//!     .build()
//!     .unwrap();
//! ```

use std::path::{Path, PathBuf};

use command_args_core::{CommandSchema, RegistryBuilder, SCHEMA_FORMAT_VERSION, SchemaPackage};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{LoadError, Result};

const BUILTIN_PACKAGE: &str = include_str!("../schemas/scenarios.json");

/// Describes where a [`SchemaSet`] was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// A single schema file.
    File(PathBuf),
    /// A directory of schema files.
    Directory(PathBuf),
    /// A single [`SchemaPackage`] file.
    Bundle(PathBuf),
    /// The package compiled into this crate.
    Builtin,
    /// Several sources combined with [`SchemaSet::extend`] or tried by a
    /// [`SchemaSetBuilder`].
    Multiple(Vec<SchemaSource>),
}

/// Serialization format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Detects the format of `path` from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for anything other than
    /// `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn is_schema_file(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }

    fn decode<T: DeserializeOwned>(self, raw: &str) -> Result<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(raw)?,
            Self::Yaml => serde_yaml::from_str(raw)?,
        })
    }
}

/// A schema file holds either one command or a whole package.
enum Document {
    Schema(CommandSchema),
    Package(SchemaPackage),
}

fn read_document(path: &Path) -> Result<Document> {
    let format = FileFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path)?;

    let is_package = match format {
        FileFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            value.get("schemas").is_some()
        }
        FileFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(&raw)?;
            value.get("schemas").is_some()
        }
    };

    if is_package {
        Ok(Document::Package(format.decode(&raw)?))
    } else {
        Ok(Document::Schema(format.decode(&raw)?))
    }
}

fn check_package(package: &SchemaPackage) -> Result<()> {
    let Some(found) = package.format_version.as_deref() else {
        return Ok(());
    };
    let major = |v: &str| v.split('.').next().unwrap_or_default().to_string();
    if major(found) != major(SCHEMA_FORMAT_VERSION) {
        return Err(LoadError::InvalidPackage(format!(
            "format version {found} is not compatible with {SCHEMA_FORMAT_VERSION}"
        )));
    }
    Ok(())
}

/// Ordered collection of command schemas read from files.
///
/// A set is not validated: duplicate names and malformed specs are reported
/// by [`RegistryBuilder::build`] once the set is registered.
///
/// # Examples
///
/// ```
/// use command_args_core::SchemaRegistry;
/// use command_args_db::SchemaSet;
///
/// let set = SchemaSet::builtin().unwrap();
/// assert_eq!(set.commands().collect::<Vec<_>>(), ["add", "sub", "sqrt", "calc", "date"]);
///
/// let registry = set.register_into(SchemaRegistry::builder()).build().unwrap();
/// let parsed = registry.parse("add 2 3").unwrap();
/// assert_eq!(parsed.arguments.get_integer("right"), Ok(3));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaSet {
    schemas: Vec<CommandSchema>,
    source: SchemaSource,
}

impl SchemaSet {
    /// Returns a new [`SchemaSetBuilder`] for configuring a fallback chain.
    pub fn builder() -> SchemaSetBuilder {
        SchemaSetBuilder::new()
    }

    /// Creates an empty set with no source.
    pub fn empty() -> Self {
        Self {
            schemas: Vec::new(),
            source: SchemaSource::Multiple(Vec::new()),
        }
    }

    /// Loads the reference command set compiled into this crate:
    /// `add`, `sub`, `sqrt`, `calc` and `date`.
    pub fn builtin() -> Result<Self> {
        let package: SchemaPackage = serde_json::from_str(BUILTIN_PACKAGE)?;
        check_package(&package)?;
        Ok(Self {
            schemas: package.schemas,
            source: SchemaSource::Builtin,
        })
    }

    /// Loads a file containing a single [`CommandSchema`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for an unknown extension,
    /// [`LoadError::Io`] if the file cannot be read, or a decoding error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let raw = std::fs::read_to_string(path)?;
        let schema: CommandSchema = format.decode(&raw)?;
        debug!(path = %path.display(), command = %schema.name, "loaded schema file");

        Ok(Self {
            schemas: vec![schema],
            source: SchemaSource::File(path.to_path_buf()),
        })
    }

    /// Loads every `.json`, `.yaml` and `.yml` file in a directory.
    ///
    /// Files are read in path order so the result does not depend on the
    /// file system. A file holding a package contributes all of its schemas.
    /// Files with other extensions are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the directory or a file cannot be read,
    /// or the first decoding error.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() && FileFormat::is_schema_file(&file_path) {
                files.push(file_path);
            }
        }
        files.sort();

        let mut schemas = Vec::new();
        for file in &files {
            match read_document(file)? {
                Document::Schema(schema) => schemas.push(schema),
                Document::Package(package) => {
                    check_package(&package)?;
                    schemas.extend(package.schemas);
                }
            }
        }
        debug!(path = %path.display(), files = files.len(), schemas = schemas.len(), "loaded schema directory");

        Ok(Self {
            schemas,
            source: SchemaSource::Directory(path.to_path_buf()),
        })
    }

    /// Loads a [`SchemaPackage`] file (JSON or YAML).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidPackage`] if the document is a bare schema
    /// or declares an incompatible format version, plus the I/O and decoding
    /// errors of [`from_file`](Self::from_file).
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let package = match read_document(path)? {
            Document::Package(package) => package,
            Document::Schema(schema) => {
                return Err(LoadError::InvalidPackage(format!(
                    "{} holds the single schema '{}', not a package",
                    path.display(),
                    schema.name
                )));
            }
        };
        check_package(&package)?;
        debug!(path = %path.display(), schemas = package.schema_count(), "loaded schema bundle");

        Ok(Self {
            schemas: package.schemas,
            source: SchemaSource::Bundle(path.to_path_buf()),
        })
    }

    /// Loads `path` as a directory, a package or a single schema, whichever
    /// it turns out to be.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Self::from_dir(path);
        }
        match read_document(path)? {
            Document::Schema(schema) => Ok(Self {
                schemas: vec![schema],
                source: SchemaSource::File(path.to_path_buf()),
            }),
            Document::Package(package) => {
                check_package(&package)?;
                Ok(Self {
                    schemas: package.schemas,
                    source: SchemaSource::Bundle(path.to_path_buf()),
                })
            }
        }
    }

    /// Appends the schemas of `other`, recording both sources.
    pub fn extend(&mut self, other: SchemaSet) {
        self.schemas.extend(other.schemas);
        let source = std::mem::replace(&mut self.source, SchemaSource::Builtin);
        self.source = match source {
            SchemaSource::Multiple(mut sources) => {
                sources.push(other.source);
                SchemaSource::Multiple(sources)
            }
            single => SchemaSource::Multiple(vec![single, other.source]),
        };
    }

    /// Looks up the first schema named `command`.
    pub fn get(&self, command: &str) -> Option<&CommandSchema> {
        self.schemas.iter().find(|s| s.name == command)
    }

    pub fn contains(&self, command: &str) -> bool {
        self.get(command).is_some()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over command names in load order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.name.as_str())
    }

    pub fn schemas(&self) -> &[CommandSchema] {
        &self.schemas
    }

    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    /// Feeds every schema into `builder`.
    pub fn register_into(self, builder: RegistryBuilder) -> RegistryBuilder {
        builder.register_all(self.schemas)
    }

    /// Wraps the schemas in a distributable [`SchemaPackage`].
    pub fn into_package(self, version: &str) -> SchemaPackage {
        let mut package = SchemaPackage::new(version);
        package.schemas = self.schemas;
        package
    }
}

/// Builder for loading a [`SchemaSet`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`LoadError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```
/// use command_args_db::{SchemaSet, SchemaSource};
///
/// let set = SchemaSet::builder()
///     .from_dir("/nonexistent/schemas/")
///     .with_builtin()
///     .build()
///     .unwrap();
/// assert!(set.contains("calc"));
/// assert!(matches!(set.source(), SchemaSource::Multiple(_)));
/// ```
pub struct SchemaSetBuilder {
    sources: Vec<SchemaSource>,
}

impl SchemaSetBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a single schema file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(SchemaSource::File(path.into()));
        self
    }

    /// Adds a directory of schema files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(SchemaSource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaPackage`] file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(SchemaSource::Bundle(path.into()));
        self
    }

    /// Adds the compiled-in command set as a source.
    pub fn with_builtin(mut self) -> Self {
        self.sources.push(SchemaSource::Builtin);
        self
    }

    /// Attempts to load schemas from configured sources in order.
    ///
    /// Returns the first successfully loaded set. If all sources fail,
    /// returns [`LoadError::NoSourcesAvailable`].
    pub fn build(self) -> Result<SchemaSet> {
        if self.sources.is_empty() {
            return Err(LoadError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                SchemaSource::File(path) => SchemaSet::from_file(path),
                SchemaSource::Directory(path) => SchemaSet::from_dir(path),
                SchemaSource::Bundle(path) => SchemaSet::from_bundle(path),
                SchemaSource::Builtin => SchemaSet::builtin(),
                SchemaSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut set) => {
                    set.source = SchemaSource::Multiple(all_sources);
                    return Ok(set);
                }
                Err(err) => warn!(?source, %err, "schema source failed, trying next"),
            }
        }

        Err(LoadError::NoSourcesAvailable)
    }
}

impl Default for SchemaSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
