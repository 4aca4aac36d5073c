use std::io;
use thiserror::Error;

/// Failures raised while reading evidence from a project directory.
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Path escapes project root: {path}")]
    OutsideRoot { path: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid glob pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl EvidenceError {
    pub(crate) fn from_io(path: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            EvidenceError::NotFound {
                path: path.to_string(),
            }
        } else {
            EvidenceError::Io {
                path: path.to_string(),
                source,
            }
        }
    }

    /// Absence is never an error for detection purposes.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EvidenceError::NotFound { .. })
    }
}
