//! Manifest error types.

use crate::document::DocumentError;
use std::path::PathBuf;
use thiserror::Error;

/// ManifestError is returned by manifest adapters and the adapter factory.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest type is unknown, or known but not implemented.
    #[error("unsupported manifest type '{kind}': {reason}")]
    UnsupportedKind { kind: String, reason: String },

    /// The adapter was used before a document was loaded into it.
    #[error("{}: manifest has not been loaded", path.display())]
    NotLoaded { path: PathBuf },
}

impl ManifestError {
    /// Creates an unsupported kind error.
    pub fn unsupported(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        ManifestError::UnsupportedKind {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error comes from a malformed or misshapen document.
    pub fn is_document(&self) -> bool {
        matches!(self, ManifestError::Document(_))
    }
}
