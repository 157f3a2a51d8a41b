//! Conversion of raw tokens into typed values.
//!
//! Built-in types are converted here directly. Types a caller defines are
//! converted by a [`ValueParser`] looked up by name in a [`ValueTypeTable`].

use std::collections::HashMap;
use std::fmt;
use std::num::IntErrorKind;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{Value, ValueType};

/// Name under which the built-in calendar date type is registered.
pub const DATE_TYPE: &str = "date";

/// Converter for a custom value type.
///
/// Implementations must be pure: the same input always yields the same
/// result.
///
/// # Examples
///
/// ```
/// use command_args_core::{Value, ValueParser};
///
/// struct Hex;
///
/// impl ValueParser for Hex {
///     fn parse(&self, raw: &str) -> Result<Value, String> {
///         let digits = raw.strip_prefix("0x").ok_or("missing 0x prefix")?;
///         i64::from_str_radix(digits, 16)
///             .map(Value::Integer)
///             .map_err(|e| e.to_string())
///     }
///
///     fn expected_format(&self) -> &str {
///         "0x-prefixed hexadecimal"
///     }
/// }
///
/// assert_eq!(Hex.parse("0xff"), Ok(Value::Integer(255)));
/// assert!(Hex.parse("ff").is_err());
/// ```
pub trait ValueParser: Send + Sync {
    /// Converts `raw`, describing the problem on failure.
    fn parse(&self, raw: &str) -> Result<Value, String>;

    /// Describes the accepted textual form, quoted in error messages.
    fn expected_format(&self) -> &str;
}

/// ISO-8601 calendar date in the `yyyy-mm-dd` form.
///
/// # Examples
///
/// ```
/// use command_args_core::{DateParser, ValueParser};
///
/// assert!(DateParser.parse("2024-01-15").is_ok());
/// assert!(DateParser.parse("2024/01/15").is_err());
/// assert!(DateParser.parse("2024-02-30").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DateParser;

impl ValueParser for DateParser {
    fn parse(&self, raw: &str) -> Result<Value, String> {
        let bytes = raw.as_bytes();
        let shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shaped {
            return Err(format!("expected format {}", self.expected_format()));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| format!("not a calendar date (expected format {})", self.expected_format()))
    }

    fn expected_format(&self) -> &str {
        "yyyy-mm-dd"
    }
}

/// Named custom value parsers.
///
/// [`ValueTypeTable::with_builtins`] pre-registers [`DateParser`] as
/// [`DATE_TYPE`].
#[derive(Clone, Default)]
pub struct ValueTypeTable {
    parsers: HashMap<String, Arc<dyn ValueParser>>,
}

impl ValueTypeTable {
    /// Creates a table holding the built-in custom types.
    pub fn with_builtins() -> Self {
        let mut table = Self::default();
        table.insert(DATE_TYPE, Arc::new(DateParser));
        table
    }

    /// Adds or replaces a parser, returning `true` if the name was new.
    pub fn insert(&mut self, name: &str, parser: Arc<dyn ValueParser>) -> bool {
        self.parsers.insert(name.to_string(), parser).is_none()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ValueParser>> {
        self.parsers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ValueTypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueTypeTable")
            .field("types", &self.names())
            .finish()
    }
}

/// Converts one raw token to `value_type`.
///
/// The error string describes why the token was rejected; the caller wraps
/// it into a [`ParseError`](crate::ParseError) with argument and position.
pub fn convert(raw: &str, value_type: &ValueType, types: &ValueTypeTable) -> Result<Value, String> {
    match value_type {
        ValueType::Integer => parse_integer(raw).map(Value::Integer),
        ValueType::Decimal => parse_decimal(raw).map(Value::Decimal),
        ValueType::String => Ok(Value::String(raw.to_string())),
        ValueType::Boolean => match raw {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err("expected true or false".to_string()),
        },
        ValueType::Choice(values) => {
            if values.iter().any(|v| v == raw) {
                Ok(Value::Choice(raw.to_string()))
            } else {
                Err(format!("expected one of {}", values.join(", ")))
            }
        }
        ValueType::Custom(name) => match types.get(name) {
            Some(parser) => parser.parse(raw),
            None => Err(format!("no parser registered for type '{name}'")),
        },
    }
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    raw.parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            format!("integer out of range ({} to {})", i64::MIN, i64::MAX)
        }
        _ => "expected an integer".to_string(),
    })
}

fn parse_decimal(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err("expected a finite decimal number".to_string()),
        Err(_) => Err("expected a decimal number".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("42", Ok(42))]
    #[case("-7", Ok(-7))]
    #[case("+3", Ok(3))]
    #[case("abc", Err("expected an integer"))]
    #[case("1.5", Err("expected an integer"))]
    fn test_parse_integer(#[case] raw: &str, #[case] expected: Result<i64, &str>) {
        assert_eq!(parse_integer(raw), expected.map_err(String::from));
    }

    #[test]
    fn test_parse_integer_out_of_range() {
        let err = parse_integer("9223372036854775808").unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[rstest]
    #[case("5.0", Some(5.0))]
    #[case("-0.25", Some(-0.25))]
    #[case("1e3", Some(1000.0))]
    #[case("NaN", None)]
    #[case("inf", None)]
    #[case("abc", None)]
    fn test_parse_decimal(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_decimal(raw).ok(), expected);
    }

    #[test]
    fn test_choice_is_case_sensitive() {
        let ops = ValueType::choice(["add", "div"]);
        let types = ValueTypeTable::default();
        assert_eq!(
            convert("add", &ops, &types),
            Ok(Value::Choice("add".into()))
        );
        assert_eq!(
            convert("ADD", &ops, &types),
            Err("expected one of add, div".to_string())
        );
    }

    #[test]
    fn test_boolean_literals() {
        let types = ValueTypeTable::default();
        assert_eq!(
            convert("true", &ValueType::Boolean, &types),
            Ok(Value::Boolean(true))
        );
        assert!(convert("yes", &ValueType::Boolean, &types).is_err());
    }

    #[rstest]
    #[case("2024/01/15")]
    #[case("2024-1-15")]
    #[case("+2024-01-15")]
    #[case("15-01-2024")]
    fn test_date_rejects_other_shapes(#[case] raw: &str) {
        let err = DateParser.parse(raw).unwrap_err();
        assert!(err.contains("yyyy-mm-dd"), "{err}");
    }

    #[test]
    fn test_date_parses_iso() {
        assert_eq!(
            DateParser.parse("2024-01-15"),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        );
    }

    #[test]
    fn test_builtins_include_date() {
        let types = ValueTypeTable::with_builtins();
        assert!(types.contains(DATE_TYPE));
        assert_eq!(types.names(), vec!["date"]);
        assert!(convert("2024-01-15", &ValueType::custom("date"), &types).is_ok());
    }

    #[test]
    fn test_unregistered_custom_type() {
        let err = convert("x", &ValueType::custom("ipv4"), &ValueTypeTable::default()).unwrap_err();
        assert!(err.contains("ipv4"));
    }
}
