//! Error types for flashsess-core.

use thiserror::Error;

use crate::config::ConfigValidationError;

/// Result type alias using flashsess-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for session operations
#[derive(Error, Debug)]
pub enum Error {
    // Path errors
    #[error("Invalid session path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Shape mismatch at '{path}': found {found}, expected {expected}")]
    ShapeMismatch {
        path: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("Path '{0}' is reserved for flash bookkeeping")]
    ReservedPath(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Backend errors
    #[error("Session backend lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(
        path: impl Into<String>,
        found: &'static str,
        expected: &'static str,
    ) -> Self {
        Self::ShapeMismatch {
            path: path.into(),
            found,
            expected,
        }
    }

    /// Check if this error is an invalid path error
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath { .. })
    }

    /// Check if this error is a shape mismatch
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}
