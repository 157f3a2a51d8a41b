//! Schema registry with builder-based initialization.
//!
//! A [`SchemaRegistry`] is assembled once through a [`RegistryBuilder`]:
//! schemas and custom value types are registered, then [`build`] validates
//! everything and freezes the result. A built registry has no mutating
//! methods and can be shared across threads without locking.
//!
//! [`build`]: RegistryBuilder::build
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! let registry = SchemaRegistry::builder()
//!     .register(
//!         CommandSchema::new("sqrt").with_arg(
//!             ArgumentSpec::positional("number", ValueType::Integer)
//!                 .with_constraint(Constraint::NonNegative),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let parsed = registry.parse("sqrt 16").unwrap();
//! assert_eq!(parsed.arguments.get_integer("number"), Ok(16));
//!
//! let err = registry.parse("sqrt -1").unwrap_err();
//! assert_eq!(err.kind, ParseErrorKind::ValidationError);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::bind::Binder;
use crate::validate::normalize_defaults;
use crate::{
    CommandSchema, ParseError, ParsedArguments, ParsedCommand, ParserConfig, SchemaError,
    ValueParser, ValueTypeTable, tokenize, validate_schema,
};

/// Collects schemas, custom value types and configuration before a registry
/// is frozen.
///
/// Registration never fails on its own; every problem is reported by
/// [`build`](RegistryBuilder::build).
pub struct RegistryBuilder {
    schemas: Vec<CommandSchema>,
    value_types: Vec<(String, Arc<dyn ValueParser>)>,
    config: ParserConfig,
}

impl RegistryBuilder {
    fn new() -> Self {
        Self {
            schemas: Vec::new(),
            value_types: Vec::new(),
            config: ParserConfig::default(),
        }
    }

    /// Adds a command schema.
    pub fn register(mut self, schema: CommandSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Adds several command schemas.
    pub fn register_all(mut self, schemas: impl IntoIterator<Item = CommandSchema>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    /// Adds a custom value type referenced by `ValueType::Custom(name)`.
    pub fn register_value_type<P>(mut self, name: &str, parser: P) -> Self
    where
        P: ValueParser + 'static,
    {
        let parser: Arc<dyn ValueParser> = Arc::new(parser);
        self.value_types.push((name.to_string(), parser));
        self
    }

    /// Replaces the parser configuration.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates every registration and freezes the registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found: an invalid configuration, a
    /// custom type registered twice (built-ins included), a duplicate
    /// command name, or any problem reported by
    /// [`validate_schema`](crate::validate_schema).
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        self.config.validate()?;

        let mut types = ValueTypeTable::with_builtins();
        for (name, parser) in self.value_types {
            if !types.insert(&name, parser) {
                return Err(SchemaError::DuplicateValueType(name));
            }
        }

        let mut schemas = BTreeMap::new();
        for mut schema in self.schemas {
            if schemas.contains_key(&schema.name) {
                return Err(SchemaError::DuplicateCommand(schema.name));
            }
            if let Some(err) = validate_schema(&schema, &types).into_iter().next() {
                return Err(err);
            }
            normalize_defaults(&mut schema, &types);
            debug!(command = %schema.name, "registered schema");
            schemas.insert(schema.name.clone(), schema);
        }

        info!(
            commands = schemas.len(),
            value_types = types.names().len(),
            "schema registry initialized"
        );

        Ok(SchemaRegistry {
            schemas,
            types,
            config: self.config,
        })
    }
}

/// Immutable collection of validated command schemas.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let registry = SchemaRegistry::builder()
///     .register(CommandSchema::new("add"))
///     .register(CommandSchema::new("sub"))
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.commands().collect::<Vec<_>>(), vec!["add", "sub"]);
/// assert!(registry.lookup("add").is_ok());
/// assert_eq!(
///     registry.lookup("mul").unwrap_err().kind,
///     ParseErrorKind::UnknownCommand
/// );
/// ```
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, CommandSchema>,
    types: ValueTypeTable,
    config: ParserConfig,
}

impl SchemaRegistry {
    /// Returns a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a schema by command name.
    ///
    /// # Errors
    ///
    /// Fails with [`UnknownCommand`](crate::ParseErrorKind::UnknownCommand)
    /// if no schema is registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<&CommandSchema, ParseError> {
        self.schemas
            .get(name)
            .ok_or_else(|| ParseError::unknown_command(name))
    }

    /// Binds `tokens` against `schema` using this registry's configuration
    /// and custom value types.
    pub fn bind(
        &self,
        schema: &CommandSchema,
        tokens: &[String],
    ) -> Result<ParsedArguments, ParseError> {
        Binder::new(&self.config, &self.types).bind(schema, tokens)
    }

    /// Tokenizes `line`, looks up its command and binds the remaining tokens.
    pub fn parse(&self, line: &str) -> Result<ParsedCommand, ParseError> {
        let line = tokenize(line, &self.config)?;
        let schema = self.lookup(&line.command)?;
        let arguments = self.bind(schema, &line.tokens)?;
        Ok(ParsedCommand {
            command: line.command,
            arguments,
        })
    }

    /// Iterates over registered command names in sorted order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Iterates over registered schemas in command name order.
    pub fn schemas(&self) -> impl Iterator<Item = &CommandSchema> {
        self.schemas.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn value_types(&self) -> &ValueTypeTable {
        &self.types
    }
}
