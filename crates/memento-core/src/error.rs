//! Centralized error types for Memento.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Memento operations.
#[derive(Error, Debug)]
pub enum MementoError {
    #[error("Home directory could not be determined")]
    HomeNotFound,

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt log {}: {reason}", path.display())]
    CorruptLog { path: PathBuf, reason: String },

    #[error("Baseline estimate failed: {0}")]
    Baseline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Memento operations.
pub type MementoResult<T> = Result<T, MementoError>;

impl MementoError {
    /// Create a baseline error.
    pub fn baseline(msg: impl Into<String>) -> Self {
        Self::Baseline(msg.into())
    }

    /// Create a corrupt log error.
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptLog {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
