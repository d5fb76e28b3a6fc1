//! Core error types for kiln.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for kiln operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Identity errors
    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    // Configuration errors
    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    #[error("failed to parse configuration: {reason}")]
    ConfigParseFailed { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration parse error.
    pub fn config_parse_failed(reason: impl Into<String>) -> Self {
        Self::ConfigParseFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
