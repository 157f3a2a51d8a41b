//! Splitting a raw command line into a command name and argument tokens.

use tracing::debug;

use crate::{ParseError, ParserConfig};

/// A command line split into its command name and the tokens after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine {
    /// First token; empty if the line was blank.
    pub command: String,
    /// Remaining tokens, in order.
    pub tokens: Vec<String>,
}

/// Splits `line` into a command name and argument tokens.
///
/// Tokens are separated by runs of whitespace. With
/// [`ParserConfig::quoting`] enabled, shell-style quotes group words and an
/// unterminated quote fails with
/// [`UnexpectedToken`](crate::ParseErrorKind::UnexpectedToken).
///
/// # Examples
///
/// ```
/// use command_args_core::{tokenize, ParserConfig};
///
/// let line = tokenize("  add 1   2 ", &ParserConfig::default()).unwrap();
/// assert_eq!(line.command, "add");
/// assert_eq!(line.tokens, vec!["1", "2"]);
///
/// let quoted = ParserConfig { quoting: true, ..Default::default() };
/// let line = tokenize(r#"greet --name "Ada Lovelace""#, &quoted).unwrap();
/// assert_eq!(line.tokens, vec!["--name", "Ada Lovelace"]);
/// ```
pub fn tokenize(line: &str, config: &ParserConfig) -> Result<TokenizedLine, ParseError> {
    let mut words: Vec<String> = if config.quoting {
        shlex::split(line).ok_or_else(ParseError::unterminated_quote)?
    } else {
        line.split_whitespace().map(String::from).collect()
    };

    let command = if words.is_empty() {
        String::new()
    } else {
        words.remove(0)
    };
    debug!(command = %command, tokens = words.len(), "tokenized line");

    Ok(TokenizedLine {
        command,
        tokens: words,
    })
}
