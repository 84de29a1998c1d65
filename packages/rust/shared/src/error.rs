//! Error types for postcraft.
//!
//! Library crates use [`PostcraftError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use serde::Serialize;

use crate::types::Version;

/// Top-level error type for all postcraft operations.
#[derive(Debug, thiserror::Error)]
pub enum PostcraftError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// No template is stored under the requested id.
    #[error("template {id} not found")]
    NotFound { id: String },

    /// Submitted data was rejected (unbalanced placeholders, empty name, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Feedback text was empty or whitespace only.
    #[error("no feedback provided for analysis")]
    MissingFeedback,

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// A compare-and-swap write lost against a concurrent writer.
    #[error("version conflict on template {id}: expected {expected}")]
    VersionConflict { id: String, expected: Version },

    /// JSON encoding/decoding of a stored record failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PostcraftError>;

/// Coarse error taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Persistence,
    Config,
}

impl PostcraftError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error for a template id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } | Self::MissingFeedback => ErrorKind::Validation,
            Self::Storage(_)
            | Self::VersionConflict { .. }
            | Self::Serialization(_)
            | Self::Io { .. } => ErrorKind::Persistence,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Status string reported to callers alongside [`ToString::to_string`].
    pub fn status(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "not_found",
            _ => "error",
        }
    }
}

impl From<serde_json::Error> for PostcraftError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PostcraftError::config("missing home directory");
        assert_eq!(err.to_string(), "config error: missing home directory");

        let err = PostcraftError::not_found("t1");
        assert_eq!(err.to_string(), "template t1 not found");
    }

    #[test]
    fn status_and_kind() {
        assert_eq!(PostcraftError::not_found("x").status(), "not_found");
        assert_eq!(PostcraftError::MissingFeedback.status(), "error");
        assert!(PostcraftError::MissingFeedback.to_string().contains("no feedback"));
        assert_eq!(
            PostcraftError::Storage("disk full".into()).kind(),
            ErrorKind::Persistence
        );
        assert_eq!(
            PostcraftError::validation("unbalanced braces").kind(),
            ErrorKind::Validation
        );
    }
}
