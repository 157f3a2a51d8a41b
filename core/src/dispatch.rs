//! Routing parsed command lines to handlers.
//!
//! A [`Dispatcher`] pairs a frozen [`SchemaRegistry`] with one handler per
//! command, replacing a hand-written `match` over command names.
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! let registry = SchemaRegistry::builder()
//!     .register(
//!         CommandSchema::new("add")
//!             .with_arg(ArgumentSpec::positional("left", ValueType::Integer))
//!             .with_arg(ArgumentSpec::positional("right", ValueType::Integer)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::builder(registry)
//!     .handler("add", |args: &ParsedArguments| {
//!         args.get_integer("left").unwrap() + args.get_integer("right").unwrap()
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(dispatcher.dispatch("add 2 3"), Ok(5));
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::{ParseError, ParsedArguments, SchemaError, SchemaRegistry};

type Handler<O> = Box<dyn Fn(&ParsedArguments) -> O + Send + Sync>;

/// Collects handlers before a [`Dispatcher`] is built.
pub struct DispatcherBuilder<O> {
    registry: SchemaRegistry,
    handlers: Vec<(String, Handler<O>)>,
}

impl<O> DispatcherBuilder<O> {
    /// Registers the handler invoked for `command`.
    pub fn handler<F>(mut self, command: &str, handler: F) -> Self
    where
        F: Fn(&ParsedArguments) -> O + Send + Sync + 'static,
    {
        let handler: Handler<O> = Box::new(handler);
        self.handlers.push((command.to_string(), handler));
        self
    }

    /// Checks every handler against the registry and freezes the table.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownHandlerCommand`] if a handler names an
    /// unregistered command, or [`SchemaError::DuplicateHandler`] if a
    /// command has two handlers.
    pub fn build(self) -> Result<Dispatcher<O>, SchemaError> {
        let mut handlers = HashMap::with_capacity(self.handlers.len());
        for (command, handler) in self.handlers {
            if !self.registry.contains(&command) {
                return Err(SchemaError::UnknownHandlerCommand(command));
            }
            if handlers.contains_key(&command) {
                return Err(SchemaError::DuplicateHandler(command));
            }
            handlers.insert(command, handler);
        }

        Ok(Dispatcher {
            registry: self.registry,
            handlers,
        })
    }
}

/// A registry plus a handler per command.
///
/// Commands registered without a handler still parse through
/// [`registry`](Dispatcher::registry), but [`dispatch`](Dispatcher::dispatch)
/// reports them as unknown.
pub struct Dispatcher<O> {
    registry: SchemaRegistry,
    handlers: HashMap<String, Handler<O>>,
}

impl<O> Dispatcher<O> {
    /// Returns a builder wrapping `registry`.
    pub fn builder(registry: SchemaRegistry) -> DispatcherBuilder<O> {
        DispatcherBuilder {
            registry,
            handlers: Vec::new(),
        }
    }

    /// Parses `line` and runs the handler registered for its command.
    pub fn dispatch(&self, line: &str) -> Result<O, ParseError> {
        let parsed = self.registry.parse(line)?;
        let handler = self
            .handlers
            .get(&parsed.command)
            .ok_or_else(|| ParseError::unknown_command(&parsed.command))?;
        debug!(command = %parsed.command, "dispatching");
        Ok(handler(&parsed.arguments))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Returns `true` if a handler is registered for `command`.
    pub fn handles(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }
}

impl<O> fmt::Debug for Dispatcher<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        commands.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("handlers", &commands)
            .finish()
    }
}
