//! Error types for the world cruise extractor.
//!
//! Library crates use [`WorldCruiseError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all worldcruise operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldCruiseError {
    /// Configuration or override-table loading/validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The input document could not be read or fetched.
    #[error("load error: {0}")]
    Load(String),

    /// The document deviates from the expected heading/marker layout.
    #[error("structure error at heading {heading:?}: {message}")]
    Structure { heading: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON encoding or decoding error.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Invalid user-supplied value.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WorldCruiseError>;

impl WorldCruiseError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a structure error for the given heading.
    pub fn structure(heading: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Structure {
            heading: heading.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for WorldCruiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
