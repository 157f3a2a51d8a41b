//! Binding argument tokens against a command schema.
//!
//! Binding runs in fixed phases: scan tokens into positional and named
//! buckets, assign positionals in declared order, check for missing required
//! arguments, convert every supplied token, then apply domain constraints.
//! When the schema declares subcommands, the first positional token selects
//! the nested schema and the tokens after it are bound recursively. The
//! first failure aborts the bind and nothing is returned.

use std::collections::HashMap;

use tracing::debug;

use crate::convert::{ValueTypeTable, convert};
use crate::{
    ArgKind, ArgumentSpec, CommandSchema, ParseError, ParsedArguments, ParserConfig, Value,
};

#[derive(Debug, Clone, Copy)]
struct RawToken<'t> {
    text: &'t str,
    position: usize,
}

/// Tokens sorted into buckets by the scan phase.
struct Scan<'s, 't> {
    positional: Vec<RawToken<'t>>,
    named: HashMap<&'s str, Vec<RawToken<'t>>>,
    /// Selected subcommand and the index of the first token after the selector.
    selection: Option<(&'s CommandSchema, usize)>,
}

pub(crate) struct Binder<'a> {
    config: &'a ParserConfig,
    types: &'a ValueTypeTable,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(config: &'a ParserConfig, types: &'a ValueTypeTable) -> Self {
        Self { config, types }
    }

    pub(crate) fn bind(
        &self,
        schema: &CommandSchema,
        tokens: &[String],
    ) -> Result<ParsedArguments, ParseError> {
        self.bind_at(schema, tokens, 0)
    }

    fn bind_at(
        &self,
        schema: &CommandSchema,
        tokens: &[String],
        offset: usize,
    ) -> Result<ParsedArguments, ParseError> {
        debug!(command = %schema.name, tokens = tokens.len(), offset, "binding arguments");

        let mut scan = self.scan(schema, tokens, offset)?;

        let mut bindings: Vec<(&ArgumentSpec, Vec<RawToken<'_>>)> =
            Vec::with_capacity(schema.positional.len() + schema.named.len());
        let mut rest = scan.positional.into_iter();
        for spec in &schema.positional {
            let raws = if spec.multiple {
                rest.by_ref().collect()
            } else {
                rest.next().into_iter().collect()
            };
            bindings.push((spec, raws));
        }
        if let Some(extra) = rest.next() {
            return Err(ParseError::extraneous(extra.text, extra.position));
        }
        for spec in &schema.named {
            let raws = scan.named.remove(spec.name.as_str()).unwrap_or_default();
            bindings.push((spec, raws));
        }

        if !schema.subcommands.is_empty() && scan.selection.is_none() {
            return Err(ParseError::missing_required(&schema.selector));
        }
        if let Some((spec, _)) = bindings
            .iter()
            .find(|(spec, raws)| spec.required && raws.is_empty())
        {
            return Err(ParseError::missing_required(&spec.name));
        }

        let mut parsed = ParsedArguments::default();
        for (spec, raws) in &bindings {
            let value = if raws.is_empty() {
                match &spec.default {
                    Some(default) => default.clone(),
                    None => continue,
                }
            } else {
                self.convert_spec(spec, raws)?
            };
            parsed.insert(&spec.name, value);
        }

        // Defaults were checked at registration; only supplied values here.
        for (spec, raws) in &bindings {
            if raws.is_empty() {
                continue;
            }
            if let Some(value) = parsed.get(&spec.name) {
                for constraint in &spec.constraints {
                    constraint
                        .check(value)
                        .map_err(|detail| ParseError::validation(&spec.name, &detail))?;
                }
            }
        }

        if let Some((sub, next)) = scan.selection {
            let nested = self.bind_at(sub, &tokens[next..], offset + next)?;
            parsed.insert(&schema.selector, Value::Choice(sub.name.clone()));
            parsed.set_subcommand(&sub.name, nested);
        }

        Ok(parsed)
    }

    fn scan<'s, 't>(
        &self,
        schema: &'s CommandSchema,
        tokens: &'t [String],
        offset: usize,
    ) -> Result<Scan<'s, 't>, ParseError> {
        let mut scan = Scan {
            positional: Vec::new(),
            named: HashMap::new(),
            selection: None,
        };
        let mut options_done = false;
        let mut index = 0;

        while index < tokens.len() {
            let text = tokens[index].as_str();
            let position = offset + index;
            index += 1;

            if !options_done && self.config.is_terminator(text) {
                options_done = true;
                continue;
            }

            if options_done || !self.config.is_flag_token(text) {
                if !schema.subcommands.is_empty() {
                    let sub = schema.find_subcommand(text).ok_or_else(|| {
                        ParseError::unknown_subcommand(&schema.name, &schema.selector, text, position)
                    })?;
                    scan.selection = Some((sub, index));
                    break;
                }
                scan.positional.push(RawToken { text, position });
                continue;
            }

            let body = &text[self.config.flag_prefix.len()..];
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) if self.config.inline_values => (name, Some(value)),
                _ => (body, None),
            };
            let spec = schema
                .find_named(name)
                .ok_or_else(|| ParseError::unexpected_token(text, position))?;

            let raw = if spec.kind == ArgKind::Flag {
                if inline.is_some() {
                    return Err(ParseError::flag_with_value(&spec.name, text, position));
                }
                RawToken { text, position }
            } else if let Some(value) = inline {
                RawToken {
                    text: value,
                    position,
                }
            } else {
                match tokens.get(index) {
                    Some(next)
                        if !self.config.is_flag_token(next) && !self.config.is_terminator(next) =>
                    {
                        let raw = RawToken {
                            text: next.as_str(),
                            position: offset + index,
                        };
                        index += 1;
                        raw
                    }
                    _ => return Err(ParseError::missing_value(&spec.name, text, position)),
                }
            };

            let entry = scan.named.entry(spec.name.as_str()).or_default();
            if !entry.is_empty() && !spec.multiple {
                return Err(ParseError::repeated(&spec.name, text, position));
            }
            entry.push(raw);
        }

        Ok(scan)
    }

    fn convert_spec(&self, spec: &ArgumentSpec, raws: &[RawToken<'_>]) -> Result<Value, ParseError> {
        if spec.kind == ArgKind::Flag {
            return Ok(Value::Boolean(true));
        }

        let mut values = raws
            .iter()
            .map(|raw| {
                convert(raw.text, &spec.value_type, self.types).map_err(|detail| {
                    ParseError::type_mismatch(&spec.name, raw.text, raw.position, &detail)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if spec.multiple {
            return Ok(Value::List(values));
        }
        values
            .pop()
            .ok_or_else(|| ParseError::missing_required(&spec.name))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Constraint, ParseErrorKind, ValueType};

    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn bind(schema: &CommandSchema, line: &str) -> Result<ParsedArguments, ParseError> {
        let config = ParserConfig::default();
        let types = ValueTypeTable::with_builtins();
        Binder::new(&config, &types).bind(schema, &tokens(line))
    }

    fn grep() -> CommandSchema {
        CommandSchema::new("grep")
            .with_arg(ArgumentSpec::flag("count"))
            .with_arg(
                ArgumentSpec::optional_named("context", ValueType::Integer)
                    .with_constraint(Constraint::NonNegative),
            )
            .with_arg(ArgumentSpec::optional_named("exclude", ValueType::String).allow_multiple())
            .with_arg(ArgumentSpec::positional("pattern", ValueType::String))
            .with_arg(ArgumentSpec::optional_positional("files", ValueType::String).allow_multiple())
    }

    #[test]
    fn test_flags_and_named_mix_with_positionals() {
        let parsed = bind(&grep(), "--count foo --context 2 a.txt b.txt").unwrap();
        assert_eq!(parsed.get_bool("count"), Ok(true));
        assert_eq!(parsed.get_integer("context"), Ok(2));
        assert_eq!(parsed.get_str("pattern"), Ok("foo"));
        assert_eq!(
            parsed.get_list("files").unwrap(),
            &[Value::String("a.txt".into()), Value::String("b.txt".into())]
        );
        assert!(!parsed.contains("exclude"));
    }

    #[test]
    fn test_flag_defaults_to_false() {
        let parsed = bind(&grep(), "foo").unwrap();
        assert_eq!(parsed.get_bool("count"), Ok(false));
        assert!(!parsed.contains("files"));
    }

    #[test]
    fn test_variadic_named_collects_repetitions() {
        let parsed = bind(&grep(), "--exclude a --exclude=b foo").unwrap();
        assert_eq!(
            parsed.get_list("exclude").unwrap(),
            &[Value::String("a".into()), Value::String("b".into())]
        );
    }

    #[test]
    fn test_repeated_named_is_extraneous() {
        let err = bind(&grep(), "--context 1 --context 2 foo").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExtraneousArgument);
        assert_eq!(err.position, Some(2));
    }

    #[test]
    fn test_terminator_makes_rest_positional() {
        let parsed = bind(&grep(), "-- --count").unwrap();
        assert_eq!(parsed.get_str("pattern"), Ok("--count"));
        assert_eq!(parsed.get_bool("count"), Ok(false));
    }

    #[test]
    fn test_flag_rejects_inline_value() {
        let err = bind(&grep(), "--count=yes foo").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.argument.as_deref(), Some("count"));
    }

    #[test]
    fn test_value_that_looks_like_flag_is_missing() {
        let err = bind(&grep(), "--context --count foo").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingRequired);
        assert_eq!(err.argument.as_deref(), Some("context"));
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn test_validation_runs_after_all_conversions() {
        // `a` would fail validation, but the type error on `b` comes first.
        let schema = CommandSchema::new("demo")
            .with_arg(
                ArgumentSpec::positional("a", ValueType::Integer)
                    .with_constraint(Constraint::NonNegative),
            )
            .with_arg(ArgumentSpec::positional("b", ValueType::Integer));

        let err = bind(&schema, "-1 x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
        assert_eq!(err.position, Some(1));

        let err = bind(&schema, "-1 2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ValidationError);
        assert_eq!(err.argument.as_deref(), Some("a"));
    }

    #[test]
    fn test_nested_positions_are_absolute() {
        let schema = CommandSchema::new("calc").with_subcommand(
            CommandSchema::new("add")
                .with_arg(ArgumentSpec::positional("left", ValueType::Integer))
                .with_arg(ArgumentSpec::positional("right", ValueType::Integer)),
        );

        let err = bind(&schema, "add 1 x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
        assert_eq!(err.position, Some(2));
        assert_eq!(err.argument.as_deref(), Some("right"));
    }
}
