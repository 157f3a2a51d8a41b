//! Error types for parsing and schema registration.
//!
//! [`ParseError`] covers user-input failures and is returned per call.
//! [`SchemaError`] covers programmer errors in schema definitions and is
//! raised once, when a registry is built.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Category of a user-input parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// Command or subcommand name is not registered.
    UnknownCommand,
    /// A required argument, or the value of a named argument, is missing.
    MissingRequired,
    /// A token could not be converted to the declared type.
    TypeMismatch,
    /// A token is not recognized (unknown flag, malformed quoting).
    UnexpectedToken,
    /// A token was left over after every argument was bound.
    ExtraneousArgument,
    /// A converted value violates a domain constraint.
    ValidationError,
}

impl ParseErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::MissingRequired => "missing required argument",
            Self::TypeMismatch => "type mismatch",
            Self::UnexpectedToken => "unexpected token",
            Self::ExtraneousArgument => "extraneous argument",
            Self::ValidationError => "validation error",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-input parse failure.
///
/// Carries the failure category, a human-readable message, and whatever
/// context is known: the argument name, the offending token and its
/// zero-based position among the tokens following the command name.
///
/// # Examples
///
/// ```
/// use command_args_core::{ParseError, ParseErrorKind};
///
/// let err = ParseError::unexpected_token("--colour", 2);
/// assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
/// assert_eq!(err.to_string(), "unexpected token '--colour' at position 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ParseError {
    /// Failure category.
    pub kind: ParseErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Argument the failure concerns.
    pub argument: Option<String>,
    /// Offending token.
    pub token: Option<String>,
    /// Position of the offending token.
    pub position: Option<usize>,
}

impl ParseError {
    fn new(kind: ParseErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            argument: None,
            token: None,
            position: None,
        }
    }

    fn with_argument(mut self, argument: &str) -> Self {
        self.argument = Some(argument.to_string());
        self
    }

    fn with_token(mut self, token: &str, position: usize) -> Self {
        self.token = Some(token.to_string());
        self.position = Some(position);
        self
    }

    pub fn unknown_command(name: &str) -> Self {
        let message = if name.is_empty() {
            "no command given".to_string()
        } else {
            format!("unknown command '{name}'")
        };
        let mut err = Self::new(ParseErrorKind::UnknownCommand, message);
        err.token = Some(name.to_string());
        err
    }

    pub fn unknown_subcommand(command: &str, selector: &str, name: &str, position: usize) -> Self {
        Self::new(
            ParseErrorKind::UnknownCommand,
            format!("unknown subcommand '{name}' for '{command}'"),
        )
        .with_argument(selector)
        .with_token(name, position)
    }

    pub fn missing_required(argument: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingRequired,
            format!("missing required argument '{argument}'"),
        )
        .with_argument(argument)
    }

    pub fn missing_value(argument: &str, flag: &str, position: usize) -> Self {
        Self::new(
            ParseErrorKind::MissingRequired,
            format!("expected a value after '{flag}'"),
        )
        .with_argument(argument)
        .with_token(flag, position)
    }

    pub fn type_mismatch(argument: &str, token: &str, position: usize, detail: &str) -> Self {
        Self::new(
            ParseErrorKind::TypeMismatch,
            format!("invalid value '{token}' for '{argument}': {detail}"),
        )
        .with_argument(argument)
        .with_token(token, position)
    }

    pub fn unexpected_token(token: &str, position: usize) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            format!("unexpected token '{token}' at position {position}"),
        )
        .with_token(token, position)
    }

    pub fn flag_with_value(argument: &str, token: &str, position: usize) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            format!("flag '{argument}' does not take a value"),
        )
        .with_argument(argument)
        .with_token(token, position)
    }

    pub fn unterminated_quote() -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            "unterminated quote or trailing escape".to_string(),
        )
    }

    pub fn extraneous(token: &str, position: usize) -> Self {
        Self::new(
            ParseErrorKind::ExtraneousArgument,
            format!("extraneous argument '{token}' at position {position}"),
        )
        .with_token(token, position)
    }

    pub fn repeated(argument: &str, token: &str, position: usize) -> Self {
        Self::new(
            ParseErrorKind::ExtraneousArgument,
            format!("argument '{argument}' given more than once"),
        )
        .with_argument(argument)
        .with_token(token, position)
    }

    pub fn validation(argument: &str, detail: &str) -> Self {
        Self::new(
            ParseErrorKind::ValidationError,
            format!("argument '{argument}' {detail}"),
        )
        .with_argument(argument)
    }
}

/// Schema definition errors.
///
/// These are programmer errors: they are reported when a registry is built,
/// before any line is parsed, and are never part of a parse result.
/// `command` fields hold the full path for nested schemas (e.g. `"calc add"`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Command or subcommand name is empty or contains whitespace.
    #[error("invalid command name: '{0}'")]
    InvalidCommandName(String),
    /// Two registered schemas share a command name.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
    /// Two subcommands in the same schema share a name.
    #[error("duplicate subcommand in '{command}': {name}")]
    DuplicateSubcommand { command: String, name: String },
    /// Argument name is empty, contains whitespace or `=`, or starts with `-`.
    #[error("invalid argument name in '{command}': '{name}'")]
    InvalidArgumentName { command: String, name: String },
    /// Two arguments in the same schema share a name.
    #[error("duplicate argument in '{command}': {name}")]
    DuplicateArgument { command: String, name: String },
    /// A spec sits in the wrong list (named spec among positionals or vice versa).
    #[error("argument '{name}' in '{command}' is declared in the wrong list for its kind")]
    MisplacedArgument { command: String, name: String },
    /// A required argument declares a default.
    #[error("required argument '{name}' in '{command}' cannot have a default")]
    RequiredWithDefault { command: String, name: String },
    /// A default value does not fit the declared type.
    #[error("default for '{name}' in '{command}' is not a valid {expected}")]
    DefaultTypeMismatch {
        command: String,
        name: String,
        expected: String,
    },
    /// A default value violates one of the argument's constraints.
    #[error("default for '{name}' in '{command}' {detail}")]
    DefaultViolatesConstraint {
        command: String,
        name: String,
        detail: String,
    },
    /// A variadic positional is followed by another positional.
    #[error("variadic argument '{name}' in '{command}' must be the last positional")]
    VariadicNotLast { command: String, name: String },
    /// A required positional follows an optional one.
    #[error("required argument '{name}' in '{command}' follows an optional positional")]
    RequiredAfterOptional { command: String, name: String },
    /// A schema declares both positionals and subcommands.
    #[error("'{0}' cannot declare positional arguments alongside subcommands")]
    PositionalWithSubcommands(String),
    /// A flag is required, variadic, or not boolean.
    #[error("flag '{name}' in '{command}' must be an optional, single boolean")]
    InvalidFlag { command: String, name: String },
    /// A choice type lists no values.
    #[error("choice argument '{name}' in '{command}' has no values")]
    EmptyChoice { command: String, name: String },
    /// A constraint cannot apply to the argument's type.
    #[error("constraint on '{name}' in '{command}' does not apply to {value_type}")]
    IncompatibleConstraint {
        command: String,
        name: String,
        value_type: String,
    },
    /// A custom value type is referenced but not registered.
    #[error("unknown value type '{type_name}' for '{name}' in '{command}'")]
    UnknownValueType {
        command: String,
        name: String,
        type_name: String,
    },
    /// A custom value type name is registered twice.
    #[error("duplicate value type: {0}")]
    DuplicateValueType(String),
    /// A handler names a command that is not registered.
    #[error("handler registered for unknown command: {0}")]
    UnknownHandlerCommand(String),
    /// Two handlers are registered for the same command.
    #[error("duplicate handler for command: {0}")]
    DuplicateHandler(String),
    /// Parser configuration is unusable.
    #[error("invalid parser configuration: {0}")]
    InvalidConfig(String),
}
