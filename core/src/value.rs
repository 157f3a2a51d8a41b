//! Typed argument values and the parse result mapping.
//!
//! Every bound argument is stored as a [`Value`], a tagged union over the
//! supported value kinds. Callers read values back through the typed
//! accessors on [`ParsedArguments`], which fail with an [`AccessError`]
//! instead of panicking when a name is absent or holds another kind.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ValueType;

/// A converted argument value.
///
/// Serialized untagged, so a JSON rendering of parsed arguments reads like
/// `{"left": 1, "right": 2}`. Deserialization (used for schema defaults)
/// yields the closest variant; registration coerces it to the declared type.
///
/// # Examples
///
/// ```
/// use command_args_core::Value;
///
/// let v = Value::Integer(16);
/// assert_eq!(v.as_integer(), Some(16));
/// assert_eq!(v.as_decimal(), None);
/// assert_eq!(v.kind_name(), "integer");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// `true` / `false`.
    Boolean(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Finite floating point number.
    Decimal(f64),
    /// Free-form string. Listed before the other string-backed variants so a
    /// deserialized literal keeps its text until a declared type converts it.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Member of a choice set.
    Choice(String),
    /// Values collected by a variadic argument.
    List(Vec<Value>),
}

impl Value {
    /// Name of the variant, used in accessor errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::String(_) => "string",
            Self::Choice(_) => "choice",
            Self::List(_) => "list",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Coerces a value to the variant `value_type` produces.
    ///
    /// Used to normalize schema defaults, which deserialize to whatever
    /// variant fits the literal first. Returns `None` when the value cannot
    /// represent the declared type. Custom types are never coerced here: they
    /// need the parser registered under their name.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{Value, ValueType};
    ///
    /// assert_eq!(
    ///     Value::Integer(0).coerce_to(&ValueType::Decimal),
    ///     Some(Value::Decimal(0.0))
    /// );
    /// assert_eq!(
    ///     Value::String("add".into()).coerce_to(&ValueType::choice(["add", "div"])),
    ///     Some(Value::Choice("add".into()))
    /// );
    /// assert_eq!(Value::Boolean(true).coerce_to(&ValueType::Integer), None);
    /// ```
    pub fn coerce_to(&self, value_type: &ValueType) -> Option<Value> {
        match (value_type, self) {
            (_, Self::List(_)) => None,
            (ValueType::Integer, Self::Integer(_))
            | (ValueType::Decimal, Self::Decimal(_))
            | (ValueType::Boolean, Self::Boolean(_))
            | (ValueType::String, Self::String(_)) => Some(self.clone()),
            (ValueType::Decimal, Self::Integer(i)) => Some(Self::Decimal(*i as f64)),
            (ValueType::String, Self::Choice(s)) => Some(Self::String(s.clone())),
            (ValueType::String, Self::Date(d)) => Some(Self::String(d.to_string())),
            (ValueType::Choice(values), Self::String(s) | Self::Choice(s)) => values
                .contains(s)
                .then(|| Self::Choice(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::String(s) | Self::Choice(s) => f.write_str(s),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&rendered.join(" "))
            }
        }
    }
}

/// Failure reading a value back out of [`ParsedArguments`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No value is bound under this name.
    #[error("argument '{0}' is not present")]
    Missing(String),
    /// A value is bound, but of another kind.
    #[error("argument '{name}' is a {found}, not a {expected}")]
    WrongType {
        /// Argument name.
        name: String,
        /// Kind the caller asked for.
        expected: &'static str,
        /// Kind actually bound.
        found: &'static str,
    },
}

/// The subcommand chosen by a selector and its own bound arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subcommand {
    /// Name of the selected nested schema.
    pub name: String,
    /// Arguments bound against the nested schema.
    pub arguments: ParsedArguments,
}

/// Mapping from argument name to typed value produced by a successful bind.
///
/// Only arguments that were supplied or have a default are present; an
/// unsupplied optional argument without a default is simply absent.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let registry = SchemaRegistry::builder()
///     .register(
///         CommandSchema::new("add")
///             .with_arg(ArgumentSpec::positional("left", ValueType::Integer))
///             .with_arg(ArgumentSpec::positional("right", ValueType::Integer)),
///     )
///     .build()
///     .unwrap();
///
/// let parsed = registry.parse("add 1 2").unwrap().arguments;
/// assert_eq!(parsed.get_integer("left"), Ok(1));
/// assert_eq!(parsed.get_integer("right"), Ok(2));
/// assert!(parsed.get_decimal("left").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParsedArguments {
    values: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subcommand: Option<Box<Subcommand>>,
}

impl ParsedArguments {
    pub(crate) fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub(crate) fn set_subcommand(&mut self, name: &str, arguments: ParsedArguments) {
        self.subcommand = Some(Box::new(Subcommand {
            name: name.to_string(),
            arguments,
        }));
    }

    /// Returns the raw value bound under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns `true` if a value is bound under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bound values (the subcommand's own values excluded).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over bound values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The selected subcommand, if the schema declared any.
    pub fn subcommand(&self) -> Option<&Subcommand> {
        self.subcommand.as_deref()
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, AccessError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| AccessError::Missing(name.to_string()))?;
        extract(value).ok_or_else(|| AccessError::WrongType {
            name: name.to_string(),
            expected,
            found: value.kind_name(),
        })
    }

    pub fn get_integer(&self, name: &str) -> Result<i64, AccessError> {
        self.typed(name, "integer", Value::as_integer)
    }

    pub fn get_decimal(&self, name: &str) -> Result<f64, AccessError> {
        self.typed(name, "decimal", Value::as_decimal)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, AccessError> {
        self.typed(name, "boolean", Value::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Result<&str, AccessError> {
        self.typed(name, "string", Value::as_str)
    }

    pub fn get_choice(&self, name: &str) -> Result<&str, AccessError> {
        self.typed(name, "choice", Value::as_choice)
    }

    pub fn get_date(&self, name: &str) -> Result<NaiveDate, AccessError> {
        self.typed(name, "date", Value::as_date)
    }

    pub fn get_list(&self, name: &str) -> Result<&[Value], AccessError> {
        self.typed(name, "list", Value::as_list)
    }
}

/// A parsed command line: the command name and its bound arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCommand {
    pub command: String,
    pub arguments: ParsedArguments,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParsedArguments {
        let mut args = ParsedArguments::default();
        args.insert("count", Value::Integer(3));
        args.insert("name", Value::String("demo".into()));
        args.insert(
            "when",
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        );
        args
    }

    #[test]
    fn test_typed_accessors() {
        let args = sample();
        assert_eq!(args.get_integer("count"), Ok(3));
        assert_eq!(args.get_str("name"), Ok("demo"));
        assert_eq!(
            args.get_date("when"),
            Ok(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_accessor_errors() {
        let args = sample();
        assert_eq!(
            args.get_integer("missing"),
            Err(AccessError::Missing("missing".into()))
        );
        assert_eq!(
            args.get_decimal("count"),
            Err(AccessError::WrongType {
                name: "count".into(),
                expected: "decimal",
                found: "integer",
            })
        );
    }

    #[test]
    fn test_serializes_untagged() {
        let mut args = sample();
        args.set_subcommand("add", ParsedArguments::default());
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["values"]["count"], 3);
        assert_eq!(json["values"]["when"], "2024-01-15");
        assert_eq!(json["subcommand"]["name"], "add");
    }

    #[test]
    fn test_default_literals_deserialize_and_coerce() {
        let zero: Value = serde_json::from_str("0").unwrap();
        assert_eq!(zero, Value::Integer(0));
        assert_eq!(zero.coerce_to(&ValueType::Decimal), Some(Value::Decimal(0.0)));

        let loose: Value = serde_json::from_str("\"2024-1-5\"").unwrap();
        assert_eq!(loose, Value::String("2024-1-5".into()));
        assert_eq!(
            loose.coerce_to(&ValueType::String),
            Some(Value::String("2024-1-5".into()))
        );

        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(
            date.coerce_to(&ValueType::String),
            Some(Value::String("2024-01-15".into()))
        );
        assert_eq!(date.coerce_to(&ValueType::custom("date")), None);
    }

    #[test]
    fn test_display_formats_values() {
        assert_eq!(Value::Decimal(5.0).to_string(), "5");
        assert_eq!(
            Value::List(vec![Value::Integer(1), Value::Integer(2)]).to_string(),
            "1 2"
        );
    }
}
