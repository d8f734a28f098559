//! Error types for the UPSC news curator.
//!
//! Library crates use [`UpscNewsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::Stage;

/// Top-level error type for all curator operations.
#[derive(Debug, thiserror::Error)]
pub enum UpscNewsError {
    /// One or more required credential environment variables are absent.
    #[error("missing environment variables: {}", vars.join(", "))]
    MissingCredentials { vars: Vec<String> },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A stage produced output that does not match its contract.
    #[error("parse error in {stage} stage: {message}")]
    Parse { stage: Stage, message: String },

    /// Transport failure talking to the search provider or the LLM API.
    #[error("network error: {0}")]
    Network(String),

    /// The search provider or LLM API answered with a failure.
    #[error("{service} error: {message}")]
    Upstream { service: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (empty query, bad flag value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UpscNewsError>;

impl UpscNewsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a stage contract error.
    pub fn parse(stage: Stage, msg: impl Into<String>) -> Self {
        Self::Parse {
            stage,
            message: msg.into(),
        }
    }

    /// Create an upstream error for a named collaborator (`"search"`, `"llm"`).
    pub fn upstream(service: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
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
