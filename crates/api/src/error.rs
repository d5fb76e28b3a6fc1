//! Errors reported by the external collaborators that inspect upstream state.
//!
//! Both types display as their bare reason so the text can be copied verbatim
//! into a `Ready=False` condition message.

use thiserror::Error;

/// A source resolver failed to inspect its upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ResolveError {
    reason: String,
}

impl ResolveError {
    /// Create a resolve error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The upstream's explanation, verbatim.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The builder metadata retriever failed to inspect the builder image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RetrieveError {
    reason: String,
}

impl RetrieveError {
    /// Create a retrieve error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The upstream's explanation, verbatim.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
