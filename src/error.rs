//! Typed error causes.
//!
//! Public functions return `anyhow::Result`; the causes below are carried inside
//! the `anyhow::Error` and can be recovered with `downcast_ref::<JsonError>()`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonError {
    /// The path string does not follow the `name[index].name` grammar.
    #[error("malformed path '{path}': {reason}")]
    MalformedPath {
        path: String,
        reason: String,
    },

    /// A present node cannot be viewed or converted as requested.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// JSON text could not be parsed.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl JsonError {
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.into(),
        }
    }

    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            JsonError::malformed_path("a[-1]", "negative index -1").to_string(),
            "malformed path 'a[-1]': negative index -1"
        );
        assert_eq!(
            JsonError::type_mismatch("integer", "string \"x\"").to_string(),
            r#"type mismatch: expected integer, found string "x""#
        );
        assert_eq!(JsonError::syntax(3, 7, "unexpected ','").to_string(), "syntax error at 3:7: unexpected ','");
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let err: anyhow::Error = JsonError::type_mismatch("object", "array").into();
        assert_eq!(err.downcast_ref::<JsonError>(), Some(&JsonError::type_mismatch("object", "array")));
    }
}
