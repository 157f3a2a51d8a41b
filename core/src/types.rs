//! Schema type definitions for command argument modeling.
//!
//! This module defines the declarative data model a caller uses to describe
//! what a command accepts. Schemas are plain data: they are built once (in
//! code or deserialized from JSON/YAML), validated when registered, and never
//! mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Argument name used for the selected subcommand when a schema does not
/// override it.
pub const DEFAULT_SELECTOR: &str = "subcommand";

/// How an argument is introduced on the command line.
///
/// # Examples
///
/// ```
/// use command_args_core::ArgKind;
///
/// assert_eq!(ArgKind::default(), ArgKind::Positional);
/// assert!(ArgKind::Flag.is_named());
/// assert!(!ArgKind::Positional.is_named());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// Bound by position in the token sequence (the default).
    #[default]
    Positional,
    /// Introduced by `--name` and followed by exactly one value token.
    Named,
    /// Introduced by `--name`, takes no value and binds `true`.
    Flag,
}

impl ArgKind {
    /// Returns `true` for kinds introduced by a flag prefix.
    pub fn is_named(self) -> bool {
        matches!(self, Self::Named | Self::Flag)
    }
}

/// Declared value type of an argument.
///
/// The type of a bound value is always decided by the schema, never inferred
/// from the token's content.
///
/// # Examples
///
/// ```
/// use command_args_core::ValueType;
///
/// let ops = ValueType::Choice(vec!["add".into(), "div".into()]);
/// assert_eq!(ops.describe(), "one of add|div");
/// assert_eq!(ValueType::custom("date").describe(), "date");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// 64-bit signed integer.
    Integer,
    /// Finite floating point number.
    Decimal,
    /// Verbatim string (the default).
    #[default]
    String,
    /// `true` or `false`.
    Boolean,
    /// One of a fixed, case-sensitive set of values.
    Choice(Vec<String>),
    /// A type converted by a parser registered under this name.
    Custom(String),
}

impl ValueType {
    /// Shorthand for [`ValueType::Choice`].
    pub fn choice<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choice(values.into_iter().map(Into::into).collect())
    }

    /// Shorthand for [`ValueType::Custom`].
    pub fn custom(name: &str) -> Self {
        Self::Custom(name.to_string())
    }

    /// Human-readable description used in usage lines and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Integer => "integer".to_string(),
            Self::Decimal => "decimal".to_string(),
            Self::String => "string".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Choice(values) => format!("one of {}", values.join("|")),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Returns `true` for integer and decimal types.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }
}

/// Domain constraint checked after a value converts successfully.
///
/// A failing constraint is reported as a validation error, distinct from a
/// conversion failure.
///
/// # Examples
///
/// ```
/// use command_args_core::{Constraint, Value};
///
/// assert!(Constraint::NonNegative.check(&Value::Integer(16)).is_ok());
/// assert!(Constraint::NonNegative.check(&Value::Integer(-1)).is_err());
///
/// let percent = Constraint::Range { min: 0.0, max: 100.0 };
/// assert!(percent.check(&Value::Decimal(100.5)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Numeric value must be `>= 0`.
    NonNegative,
    /// Numeric value must lie within `min..=max`.
    Range {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// String value must not be empty.
    NonEmpty,
}

impl Constraint {
    /// Returns `true` if this constraint can be applied to `value_type`.
    ///
    /// Custom types are always accepted since their converted kind is only
    /// known at runtime.
    pub fn applies_to(&self, value_type: &ValueType) -> bool {
        match (self, value_type) {
            (_, ValueType::Custom(_)) => true,
            (Self::NonNegative | Self::Range { .. }, _) => value_type.is_numeric(),
            (Self::NonEmpty, _) => matches!(value_type, ValueType::String),
        }
    }

    /// Checks a converted value, returning a description of the violation.
    ///
    /// Lists are checked element by element.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if let Value::List(items) = value {
            return items.iter().try_for_each(|item| self.check(item));
        }

        match self {
            Self::NonNegative => match numeric(value) {
                Some(n) if n < 0.0 => Err(format!("must be non-negative, got {value}")),
                _ => Ok(()),
            },
            Self::Range { min, max } => match numeric(value) {
                Some(n) if n < *min || n > *max => {
                    Err(format!("must be between {min} and {max}, got {value}"))
                }
                _ => Ok(()),
            },
            Self::NonEmpty => match value {
                Value::String(s) if s.is_empty() => Err("must not be empty".to_string()),
                _ => Ok(()),
            },
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

/// Schema for a single argument.
///
/// Use the constructors ([`positional`](ArgumentSpec::positional),
/// [`named`](ArgumentSpec::named), [`flag`](ArgumentSpec::flag), ...) and
/// chain builder methods to refine the argument.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgumentSpec, ArgKind, Constraint, Value, ValueType};
///
/// let number = ArgumentSpec::positional("number", ValueType::Integer)
///     .with_constraint(Constraint::NonNegative);
/// assert!(number.required);
///
/// let left = ArgumentSpec::optional_named("left", ValueType::Decimal)
///     .with_default(Value::Decimal(0.0));
/// assert_eq!(left.kind, ArgKind::Named);
/// assert!(!left.required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Argument name, unique within a command.
    pub name: String,
    /// How the argument is introduced.
    #[serde(default)]
    pub kind: ArgKind,
    /// Declared type of the bound value.
    #[serde(default)]
    pub value_type: ValueType,
    /// Whether the argument must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Value bound when the argument is not supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Collects every remaining positional token, or every repetition of a
    /// named argument, into a list.
    #[serde(default)]
    pub multiple: bool,
    /// Domain checks applied after conversion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArgumentSpec {
    fn new(name: &str, kind: ArgKind, value_type: ValueType, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value_type,
            required,
            default: None,
            multiple: false,
            constraints: Vec::new(),
            description: None,
        }
    }

    /// Creates a required positional argument.
    pub fn positional(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ArgKind::Positional, value_type, true)
    }

    /// Creates an optional positional argument.
    pub fn optional_positional(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ArgKind::Positional, value_type, false)
    }

    /// Creates a required named argument (`--name value`).
    pub fn named(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ArgKind::Named, value_type, true)
    }

    /// Creates an optional named argument (`--name value`).
    pub fn optional_named(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ArgKind::Named, value_type, false)
    }

    /// Creates a boolean flag (`--name`), `false` unless present.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{ArgumentSpec, Value};
    ///
    /// let verbose = ArgumentSpec::flag("verbose");
    /// assert_eq!(verbose.default, Some(Value::Boolean(false)));
    /// ```
    pub fn flag(name: &str) -> Self {
        Self::new(name, ArgKind::Flag, ValueType::Boolean, false).with_default(Value::Boolean(false))
    }

    /// Sets the default value. An argument with a default is optional.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.required = false;
        self
    }

    /// Adds a domain constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Marks the argument as variadic.
    pub fn allow_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Renders the argument as it appears in a usage line.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{ArgumentSpec, ValueType};
    ///
    /// assert_eq!(ArgumentSpec::positional("left", ValueType::Integer).usage("--"), "<left>");
    /// assert_eq!(
    ///     ArgumentSpec::optional_named("left", ValueType::Decimal).usage("--"),
    ///     "[--left <decimal>]"
    /// );
    /// ```
    pub fn usage(&self, flag_prefix: &str) -> String {
        let mut rendered = match self.kind {
            ArgKind::Positional => format!("<{}>", self.name),
            ArgKind::Named => format!(
                "{flag_prefix}{} <{}>",
                self.name,
                self.value_type.describe()
            ),
            ArgKind::Flag => format!("{flag_prefix}{}", self.name),
        };
        if self.multiple {
            rendered.push_str("...");
        }
        if self.required {
            rendered
        } else {
            format!("[{rendered}]")
        }
    }
}

/// Complete schema for a command.
///
/// Positional specs are kept in declaration order; named specs and flags are
/// looked up by name. A schema may instead declare nested subcommands, in
/// which case its first positional token selects the nested schema that
/// binds the remaining tokens.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let sub = CommandSchema::new("sub")
///     .with_arg(ArgumentSpec::optional_named("left", ValueType::Decimal))
///     .with_arg(ArgumentSpec::named("right", ValueType::Decimal));
///
/// assert!(sub.positional.is_empty());
/// assert!(sub.find_named("right").is_some());
/// assert_eq!(sub.usage("--"), "sub [--left <decimal>] --right <decimal>");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Command name (first token of a command line).
    pub name: String,
    /// Short description of the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Positional arguments in binding order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional: Vec<ArgumentSpec>,
    /// Named arguments and flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub named: Vec<ArgumentSpec>,
    /// Nested schemas selected by the first positional token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSchema>,
    /// Argument name the selected subcommand is bound under.
    #[serde(default = "default_selector")]
    pub selector: String,
}

fn default_selector() -> String {
    DEFAULT_SELECTOR.to_string()
}

impl CommandSchema {
    /// Creates an empty schema with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            positional: Vec::new(),
            named: Vec::new(),
            subcommands: Vec::new(),
            selector: default_selector(),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds an argument, routed to the positional or named list by its kind.
    pub fn with_arg(mut self, spec: ArgumentSpec) -> Self {
        if spec.kind.is_named() {
            self.named.push(spec);
        } else {
            self.positional.push(spec);
        }
        self
    }

    /// Adds a nested subcommand schema.
    pub fn with_subcommand(mut self, sub: CommandSchema) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Overrides the argument name the selected subcommand is bound under.
    pub fn with_selector(mut self, name: &str) -> Self {
        self.selector = name.to_string();
        self
    }

    /// Finds a named argument or flag by name (without prefix).
    pub fn find_named(&self, name: &str) -> Option<&ArgumentSpec> {
        self.named.iter().find(|spec| spec.name == name)
    }

    /// Finds a nested subcommand by name.
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandSchema> {
        self.subcommands.iter().find(|sub| sub.name == name)
    }

    /// Gets all subcommand names in declaration order.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|s| s.name.as_str()).collect()
    }

    /// Iterates over every argument spec: positionals first, then named.
    pub fn specs(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.positional.iter().chain(self.named.iter())
    }

    /// Renders a one-line usage summary.
    pub fn usage(&self, flag_prefix: &str) -> String {
        let mut parts = vec![self.name.clone()];
        parts.extend(self.named.iter().map(|spec| spec.usage(flag_prefix)));
        parts.extend(self.positional.iter().map(|spec| spec.usage(flag_prefix)));
        if !self.subcommands.is_empty() {
            parts.push(format!("<{}>", self.subcommand_names().join("|")));
        }
        parts.join(" ")
    }
}

impl fmt::Display for CommandSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.usage("--"))
    }
}
