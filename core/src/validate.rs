//! Schema and package validation.
//!
//! Validates structural invariants of command schemas before they are
//! registered: unique names, defaults that fit their declared types,
//! positional ordering, flag shape, and references to custom value types.
//! These are programmer errors, reported once at startup.
//!
//! # Examples
//!
//! ```
//! use command_args_core::*;
//!
//! let types = ValueTypeTable::with_builtins();
//!
//! let ok = CommandSchema::new("date")
//!     .with_arg(ArgumentSpec::positional("date", ValueType::custom("date")));
//! assert!(validate_schema(&ok, &types).is_empty());
//!
//! // Required argument with a default
//! let mut bad = ArgumentSpec::named("right", ValueType::Decimal);
//! bad.default = Some(Value::Decimal(0.0));
//! let bad = CommandSchema::new("sub").with_arg(bad);
//! assert!(!validate_schema(&bad, &types).is_empty());
//! ```

use std::collections::HashSet;

use crate::{
    ArgKind, ArgumentSpec, CommandSchema, SchemaError, SchemaPackage, Value, ValueType,
    ValueTypeTable,
};

/// Validates a full schema package.
///
/// Checks for duplicate command names and validates each schema
/// individually against `types`.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0");
/// package.schemas.push(CommandSchema::new("add"));
/// package.schemas.push(CommandSchema::new("add"));
///
/// let errors = validate_package(&package, &ValueTypeTable::with_builtins());
/// assert_eq!(errors, vec![SchemaError::DuplicateCommand("add".into())]);
/// ```
pub fn validate_package(package: &SchemaPackage, types: &ValueTypeTable) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for schema in &package.schemas {
        if !seen.insert(schema.name.as_str()) {
            errors.push(SchemaError::DuplicateCommand(schema.name.clone()));
            continue;
        }
        errors.extend(validate_schema(schema, types));
    }

    errors
}

/// Validates a command schema and its nested subcommands.
///
/// Returns every problem found; an empty vector means the schema can be
/// registered.
pub fn validate_schema(schema: &CommandSchema, types: &ValueTypeTable) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    validate_command(schema, &schema.name, types, &mut errors);
    errors
}

fn validate_command(
    schema: &CommandSchema,
    path: &str,
    types: &ValueTypeTable,
    errors: &mut Vec<SchemaError>,
) {
    if !valid_command_name(&schema.name) {
        errors.push(SchemaError::InvalidCommandName(schema.name.clone()));
        return;
    }

    let mut names: HashSet<&str> = HashSet::new();
    for spec in schema.specs() {
        if !names.insert(spec.name.as_str()) {
            errors.push(SchemaError::DuplicateArgument {
                command: path.to_string(),
                name: spec.name.clone(),
            });
        }
        validate_spec(spec, path, types, errors);
    }

    for spec in &schema.positional {
        if spec.kind != ArgKind::Positional {
            errors.push(misplaced(path, spec));
        }
    }
    for spec in &schema.named {
        if !spec.kind.is_named() {
            errors.push(misplaced(path, spec));
        }
    }

    validate_positional_order(&schema.positional, path, errors);

    if schema.subcommands.is_empty() {
        return;
    }

    if !schema.positional.is_empty() {
        errors.push(SchemaError::PositionalWithSubcommands(path.to_string()));
    }
    if names.contains(schema.selector.as_str()) || !valid_argument_name(&schema.selector) {
        errors.push(SchemaError::InvalidArgumentName {
            command: path.to_string(),
            name: schema.selector.clone(),
        });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for sub in &schema.subcommands {
        if !seen.insert(sub.name.as_str()) {
            errors.push(SchemaError::DuplicateSubcommand {
                command: path.to_string(),
                name: sub.name.clone(),
            });
            continue;
        }
        validate_command(sub, &format!("{path} {}", sub.name), types, errors);
    }
}

fn validate_spec(
    spec: &ArgumentSpec,
    path: &str,
    types: &ValueTypeTable,
    errors: &mut Vec<SchemaError>,
) {
    let command = path.to_string();
    let name = spec.name.clone();

    if !valid_argument_name(&spec.name) {
        errors.push(SchemaError::InvalidArgumentName { command, name });
        return;
    }

    match &spec.value_type {
        ValueType::Choice(values) if values.is_empty() => {
            errors.push(SchemaError::EmptyChoice {
                command: command.clone(),
                name: name.clone(),
            });
        }
        ValueType::Custom(type_name) if !types.contains(type_name) => {
            errors.push(SchemaError::UnknownValueType {
                command: command.clone(),
                name: name.clone(),
                type_name: type_name.clone(),
            });
        }
        _ => {}
    }

    if spec.kind == ArgKind::Flag
        && (spec.required || spec.multiple || spec.value_type != ValueType::Boolean)
    {
        errors.push(SchemaError::InvalidFlag {
            command: command.clone(),
            name: name.clone(),
        });
    }

    if spec
        .constraints
        .iter()
        .any(|constraint| !constraint.applies_to(&spec.value_type))
    {
        errors.push(SchemaError::IncompatibleConstraint {
            command: command.clone(),
            name: name.clone(),
            value_type: spec.value_type.describe(),
        });
    }

    if let Some(default) = &spec.default {
        if spec.required {
            errors.push(SchemaError::RequiredWithDefault { command, name });
            return;
        }
        match coerce_default(spec, default, types) {
            Ok(value) => {
                if let Some(detail) = spec
                    .constraints
                    .iter()
                    .find_map(|constraint| constraint.check(&value).err())
                {
                    errors.push(SchemaError::DefaultViolatesConstraint {
                        command,
                        name,
                        detail,
                    });
                }
            }
            Err(expected) => errors.push(SchemaError::DefaultTypeMismatch {
                command,
                name,
                expected,
            }),
        }
    }
}

fn validate_positional_order(
    positional: &[ArgumentSpec],
    path: &str,
    errors: &mut Vec<SchemaError>,
) {
    let mut seen_optional = false;
    for (index, spec) in positional.iter().enumerate() {
        if spec.multiple && index + 1 != positional.len() {
            errors.push(SchemaError::VariadicNotLast {
                command: path.to_string(),
                name: spec.name.clone(),
            });
        }
        if spec.required && seen_optional {
            errors.push(SchemaError::RequiredAfterOptional {
                command: path.to_string(),
                name: spec.name.clone(),
            });
        }
        seen_optional |= !spec.required;
    }
}

/// Coerces a declared default to the variant its declared type produces.
///
/// Variadic specs take a list default whose items are coerced one by one.
/// On failure returns the description of what was expected.
pub(crate) fn coerce_default(
    spec: &ArgumentSpec,
    default: &Value,
    types: &ValueTypeTable,
) -> Result<Value, String> {
    match (spec.multiple, default) {
        (true, Value::List(items)) => items
            .iter()
            .map(|item| coerce_scalar(item, &spec.value_type, types))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        (true, _) => Err(format!("a list of {}", spec.value_type.describe())),
        (false, value) => coerce_scalar(value, &spec.value_type, types),
    }
}

/// Custom types run the literal's text through their registered parser, the
/// same way a command-line token is converted.
fn coerce_scalar(
    value: &Value,
    value_type: &ValueType,
    types: &ValueTypeTable,
) -> Result<Value, String> {
    let ValueType::Custom(type_name) = value_type else {
        return value
            .coerce_to(value_type)
            .ok_or_else(|| value_type.describe());
    };
    // Unknown custom types are reported as UnknownValueType.
    let Some(parser) = types.get(type_name) else {
        return Ok(value.clone());
    };
    if matches!(value, Value::List(_)) {
        return Err(parser.expected_format().to_string());
    }
    parser
        .parse(&value.to_string())
        .map_err(|_| parser.expected_format().to_string())
}

/// Rewrites every default in `schema` (and its subcommands) to its coerced
/// form, and gives flags without a default `false`. Must only run on a
/// schema that passed [`validate_schema`].
pub(crate) fn normalize_defaults(schema: &mut CommandSchema, types: &ValueTypeTable) {
    for spec in schema.positional.iter_mut().chain(schema.named.iter_mut()) {
        spec.default = match spec.default.take() {
            Some(default) => coerce_default(spec, &default, types).ok(),
            None if spec.kind == ArgKind::Flag => Some(Value::Boolean(false)),
            None => None,
        };
    }
    for sub in &mut schema.subcommands {
        normalize_defaults(sub, types);
    }
}

fn misplaced(path: &str, spec: &ArgumentSpec) -> SchemaError {
    SchemaError::MisplacedArgument {
        command: path.to_string(),
        name: spec.name.clone(),
    }
}

fn valid_command_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

fn valid_argument_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains('=')
        && !name.chars().any(char::is_whitespace)
}
