//! Command line tokenizer.
//!
//! A command line is a sequence of space-separated tokens. A token that
//! starts with `"` runs to the next `"` and may contain spaces; the quotes
//! themselves are stripped and the token remembers that it was quoted.
//! There is no escaping.
//!
//! At most [`MAX_NUM_ARGS`] tokens are captured. Text after the last
//! captured token is dropped without error, so a free-form argument such as
//! a message body has to be the final token of its command.

use std::fmt;

use crate::error::ParseError;
use crate::limits::{MAX_MESSAGE_LENGTH, MAX_NUM_ARGS};

/// One argument of a command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    /// A token that was not wrapped in quotes.
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// A token that was wrapped in double quotes (quotes already removed).
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    /// The token text without any wrapping quotes.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the token was delimited by double quotes.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Byte length of the token text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take ownership of the token text.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// Split a command line into at most [`MAX_NUM_ARGS`] tokens.
///
/// An empty line yields no tokens. A line made only of spaces yields one
/// empty token, and `""` yields one empty quoted token.
///
/// # Errors
///
/// - [`ParseError::TooLong`] if the line is not shorter than
///   [`MAX_MESSAGE_LENGTH`].
/// - [`ParseError::UnterminatedQuote`] if a captured token opens a quote
///   that never closes.
///
/// # Example
///
/// ```
/// use confbot_proto::tokenize;
///
/// let tokens = tokenize("one two three four five six").unwrap();
/// assert_eq!(tokens, ["one", "two", "three", "four"]);
/// ```
pub fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    if line.len() >= MAX_MESSAGE_LENGTH {
        return Err(ParseError::TooLong { len: line.len() });
    }

    let mut tokens = Vec::with_capacity(MAX_NUM_ARGS);
    let mut rest = line;

    while !rest.is_empty() && tokens.len() < MAX_NUM_ARGS {
        let tail = if let Some(open) = rest.strip_prefix('"') {
            let close = open.find('"').ok_or(ParseError::UnterminatedQuote)?;
            tokens.push(Token::quoted(&open[..close]));
            &open[close + 1..]
        } else {
            match rest.find(' ') {
                Some(end) => {
                    tokens.push(Token::bare(&rest[..end]));
                    &rest[end..]
                }
                None => {
                    tokens.push(Token::bare(rest));
                    ""
                }
            }
        };

        rest = tail.trim_start_matches(' ');
    }

    Ok(tokens)
}
