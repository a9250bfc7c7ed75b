//! Document error types.

use thiserror::Error;

/// DocumentError is returned by loading, navigating and writing documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input is not a well-formed YAML document.
    #[error("line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// The document parsed, but lacks the shape the caller expects.
    #[error("{path}: {message}")]
    Structure { path: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// Creates a parse error at a 1-based line and column.
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        DocumentError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates a structure error for the given path.
    pub fn structure(path: impl ToString, message: impl Into<String>) -> Self {
        DocumentError::Structure {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Returns true for parse errors.
    pub fn is_parse(&self) -> bool {
        matches!(self, DocumentError::Parse { .. })
    }

    /// Returns true for structure errors.
    pub fn is_structure(&self) -> bool {
        matches!(self, DocumentError::Structure { .. })
    }
}
