//! Error types for path queries
//!
//! Parse errors carry the byte position inside the expression so callers can
//! point at the offending character.
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while parsing or executing a path expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonPathError {
    /// Malformed expression
    #[error("Parse error at position {position}: {message}")]
    Parse {
        message: String,
        position: usize,
        input: String,
    },

    /// Unexpected token, with the tokens that would have been accepted
    #[error("Syntax error at position {position}: {message}")]
    Syntax {
        message: String,
        position: usize,
        input: String,
        expected: Vec<String>,
        found: String,
    },

    /// Valid JSONPath that this engine does not evaluate
    #[error("Unsupported feature: {feature}")]
    Unsupported {
        feature: String,
        alternative: Option<String>,
    },

    /// Runtime failure while walking a value
    #[error("Execution error: {message}")]
    Execution { message: String, path: String },
}

impl JsonPathError {
    /// Create a parse error with position and input
    pub fn parse(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    /// Create a syntax error with the expected alternatives
    pub fn syntax(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            input: input.into(),
            expected,
            found: found.into(),
        }
    }

    /// Create an unsupported feature error
    pub fn unsupported(feature: impl Into<String>, alternative: Option<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
            alternative,
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Position of the error inside the expression, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Parse { position, .. } | Self::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Render the message with a caret under the failing character
    pub fn detailed_message(&self) -> String {
        match self {
            Self::Parse { message, position, input } => {
                let mut result = format!("Parse error at position {}: {}", position, message);
                push_caret(&mut result, input, *position);
                result
            }
            Self::Syntax { message, position, input, expected, found } => {
                let mut result = format!("Syntax error at position {}: {}", position, message);
                result.push_str(&format!("\nExpected one of: {}", expected.join(", ")));
                result.push_str(&format!("\nFound: {}", found));
                push_caret(&mut result, input, *position);
                result
            }
            Self::Unsupported { feature, alternative } => {
                let mut result = format!("Unsupported feature: {}", feature);
                if let Some(alternative) = alternative {
                    result.push_str(&format!("\nTry instead: {}", alternative));
                }
                result
            }
            _ => self.to_string(),
        }
    }
}

fn push_caret(out: &mut String, input: &str, position: usize) {
    if input.is_empty() {
        return;
    }
    out.push_str(&format!("\nInput: {}", input));
    if position <= input.len() {
        out.push_str(&format!("\n       {}^", " ".repeat(position)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = JsonPathError::parse("Unterminated string literal", 4, "$['a");
        assert_eq!(err.to_string(), "Parse error at position 4: Unterminated string literal");
        assert_eq!(err.position(), Some(4));
    }

    #[test]
    fn test_detailed_message_points_at_position() {
        let err = JsonPathError::syntax(
            "Expected identifier",
            2,
            "$.9",
            vec!["letter or _".to_string()],
            "9",
        );
        let detailed = err.detailed_message();
        assert!(detailed.contains("Expected one of: letter or _"));
        assert!(detailed.ends_with("         ^"));
    }

    #[test]
    fn test_unsupported_suggests_alternative() {
        let err = JsonPathError::unsupported("filter expressions", Some("middleware".to_string()));
        assert!(err.detailed_message().contains("Try instead: middleware"));
        assert_eq!(err.position(), None);
    }
}
