//! Error types for the reconciler crate.
//!
//! [`Error::class`] tells the outer work queue what to do with a failed
//! reconcile: structural errors need a spec edit, transient errors are retried
//! with backoff, permanent errors are already recorded in the object's status.

use kiln_api::{ResolveError, RetrieveError};
use kiln_core::ObjectKey;
use thiserror::Error;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How a failed reconcile should be treated by the work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The object is malformed; retrying without an edit cannot succeed.
    Structural,
    /// Infrastructure failure; retry with backoff.
    Transient,
    /// Already recorded in status; do not retry.
    Permanent,
}

/// Upstream inspection failure surfaced by a resolver or the metadata retriever.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Retrieve(#[from] RetrieveError),
}

/// Object store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The object does not exist (or no longer exists).
    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },
    /// The store could not be reached.
    #[error("object store unavailable: {reason}")]
    Unavailable { reason: String },
    /// The write lost a race with a concurrent update.
    #[error("conflicting write: {reason}")]
    Conflict { reason: String },
}

impl StoreError {
    /// Create a not found error.
    pub fn not_found(kind: &'static str, key: &ObjectKey) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Delayed queue failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// No async runtime is available to run the delay.
    #[error("no tokio runtime available to schedule delayed work")]
    NoRuntime,
    /// The consumer side of the queue is gone.
    #[error("delayed queue closed")]
    Closed,
}

/// Reconciler error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed key or configuration.
    #[error(transparent)]
    Core(#[from] kiln_core::Error),

    /// No registered resolver accepts the declared source.
    #[error("unsupported source kind for '{key}': {reason}")]
    UnsupportedSource { key: String, reason: String },

    /// Cache lookup failed for a reason other than the object being gone.
    #[error("failed to get {kind} '{key}': {source}")]
    LookupFailed {
        kind: &'static str,
        key: String,
        source: StoreError,
    },

    /// Persisting the computed status failed.
    #[error("failed to update status of {kind} '{key}': {source}")]
    StatusUpdateFailed {
        kind: &'static str,
        key: String,
        source: StoreError,
    },

    /// The polling re-check could not be scheduled.
    #[error("failed to schedule poll of '{key}': {source}")]
    ScheduleFailed { key: String, source: QueueError },

    /// Upstream failure already written into status.
    #[error("permanent error: {0}")]
    Permanent(#[source] DomainError),
}

impl Error {
    /// Create an unsupported source error.
    pub fn unsupported_source(key: &ObjectKey, reason: impl Into<String>) -> Self {
        Self::UnsupportedSource {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a lookup failed error.
    pub fn lookup_failed(kind: &'static str, key: &ObjectKey, source: StoreError) -> Self {
        Self::LookupFailed {
            kind,
            key: key.to_string(),
            source,
        }
    }

    /// Create a status update failed error.
    pub fn status_update_failed(kind: &'static str, key: &ObjectKey, source: StoreError) -> Self {
        Self::StatusUpdateFailed {
            kind,
            key: key.to_string(),
            source,
        }
    }

    /// Create a schedule failed error.
    pub fn schedule_failed(key: &ObjectKey, source: QueueError) -> Self {
        Self::ScheduleFailed {
            key: key.to_string(),
            source,
        }
    }

    /// Wrap a domain error as permanent.
    pub fn permanent(err: impl Into<DomainError>) -> Self {
        Self::Permanent(err.into())
    }

    /// Classify the error for the work queue.
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Core(_) | Self::UnsupportedSource { .. } => ErrorClass::Structural,
            Self::LookupFailed { .. }
            | Self::StatusUpdateFailed { .. }
            | Self::ScheduleFailed { .. } => ErrorClass::Transient,
            Self::Permanent(_) => ErrorClass::Permanent,
        }
    }

    /// Whether the work queue should retry with backoff.
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Transient)
    }

    pub const fn is_permanent(&self) -> bool {
        matches!(self.class(), ErrorClass::Permanent)
    }

    /// The wrapped domain error of a permanent failure.
    pub const fn domain_error(&self) -> Option<&DomainError> {
        match self {
            Self::Permanent(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let key = ObjectKey::new("ns", "app");

        assert_eq!(
            Error::unsupported_source(&key, "no source declared").class(),
            ErrorClass::Structural
        );
        assert_eq!(
            Error::from(kiln_core::Error::invalid_key("a/b/c", "bad")).class(),
            ErrorClass::Structural
        );
        assert!(Error::lookup_failed("Builder", &key, StoreError::unavailable("down")).is_retryable());
        assert!(Error::status_update_failed("Builder", &key, StoreError::conflict("stale")).is_retryable());
        assert!(Error::schedule_failed(&key, QueueError::Closed).is_retryable());

        let permanent = Error::permanent(ResolveError::new("bad ref"));
        assert!(permanent.is_permanent());
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn test_permanent_keeps_domain_message() {
        let err = Error::permanent(RetrieveError::new("manifest unknown"));
        assert!(err.to_string().contains("manifest unknown"));
        assert_eq!(
            err.domain_error().map(ToString::to_string),
            Some("manifest unknown".to_string())
        );
    }

    #[test]
    fn test_store_error_not_found() {
        let err = StoreError::not_found("SourceResolver", &ObjectKey::new("ns", "gone"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "SourceResolver 'ns/gone' not found");
        assert!(!StoreError::unavailable("timeout").is_not_found());
    }
}
