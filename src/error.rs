//! Error taxonomy for editing operations
//!
//! Every failure is recovered at the operation boundary and turned into a
//! structured reply for the client; nothing here terminates a session.

use std::io;
use thiserror::Error;

/// Failure of a single editing operation or protocol frame.
#[derive(Debug, Error)]
pub enum EditError {
    /// The requested path is absolute or escapes the docs root.
    #[error("invalid path {path:?}: not inside the docs directory")]
    InvalidPath { path: String },

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    /// Any other filesystem failure.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Malformed or unrecognized client message.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl EditError {
    /// Classify an `io::Error` for the given path.
    pub fn from_io(path: impl Into<String>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => EditError::NotFound { path },
            io::ErrorKind::PermissionDenied => EditError::PermissionDenied { path },
            _ => EditError::Io { path, source: err },
        }
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        EditError::InvalidPath { path: path.into() }
    }
}
