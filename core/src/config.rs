//! Tokenizer and binder settings.

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Settings shared by the tokenizer and the binder.
///
/// Every field has a default, so an empty YAML/JSON object deserializes to
/// [`ParserConfig::default`].
///
/// # Examples
///
/// ```
/// use command_args_core::ParserConfig;
///
/// let config = ParserConfig::default();
/// assert_eq!(config.flag_prefix, "--");
/// assert!(!config.quoting);
/// assert!(config.inline_values);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Prefix introducing named arguments and flags. A token equal to the
    /// prefix alone ends option scanning.
    pub flag_prefix: String,
    /// Honour shell-style single/double quotes and backslash escapes.
    pub quoting: bool,
    /// Accept `--name=value` in addition to `--name value`.
    pub inline_values: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            flag_prefix: "--".to_string(),
            quoting: false,
            inline_values: true,
        }
    }
}

impl ParserConfig {
    /// Checks that the configuration can drive a parse.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.flag_prefix.is_empty() {
            return Err(SchemaError::InvalidConfig(
                "flag prefix cannot be empty".to_string(),
            ));
        }
        if self.flag_prefix.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidConfig(format!(
                "flag prefix '{}' contains whitespace",
                self.flag_prefix
            )));
        }
        Ok(())
    }

    /// Returns `true` if `token` introduces a named argument or flag.
    pub(crate) fn is_flag_token(&self, token: &str) -> bool {
        token.len() > self.flag_prefix.len() && token.starts_with(&self.flag_prefix)
    }

    /// Returns `true` if `token` is the bare end-of-options marker.
    pub(crate) fn is_terminator(&self, token: &str) -> bool {
        token == self.flag_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_token_detection() {
        let config = ParserConfig::default();
        assert!(config.is_flag_token("--right"));
        assert!(!config.is_flag_token("--"));
        assert!(!config.is_flag_token("-1"));
        assert!(config.is_terminator("--"));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = ParserConfig {
            flag_prefix: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SchemaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: ParserConfig = serde_json::from_str(r#"{"quoting": true}"#).unwrap();
        assert!(config.quoting);
        assert_eq!(config.flag_prefix, "--");
    }
}
