//! Error types for mergedown.
//!
//! Library crates use [`MergeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Note that most faults inside a merge run are *not* errors in this sense:
//! discovery and per-document failures are absorbed into the run's
//! warning/error lists (best-effort semantics). `MergeError` covers the
//! faults that must reach the caller — bad configuration, invalid glob
//! patterns, and unrecoverable I/O.

use std::path::PathBuf;

/// Top-level error type for all mergedown operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Configuration loading or validation error (unknown preset,
    /// out-of-range option, unrecognized encoding label).
    #[error("config error: {message}")]
    Config { message: String },

    /// Invalid include/exclude glob pattern.
    #[error("invalid pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed input, invalid state).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MergeError>;

impl MergeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a pattern error for a glob that failed to compile.
    pub fn pattern(pattern: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MergeError::config("unknown preset: fancy");
        assert_eq!(err.to_string(), "config error: unknown preset: fancy");

        let err = MergeError::pattern("[bad", "unclosed character class");
        assert!(err.to_string().contains("[bad"));

        let err = MergeError::validation("toc_depth must be between 1 and 6");
        assert!(err.to_string().contains("toc_depth"));
    }
}
