//! Result type definition and tap-style extension traits.

use crate::error::Error;

/// The standard Result type for kiln core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Generic extension trait for any Result type.
///
/// Lets callers attach side effects (usually logging) to a result without
/// breaking a `?` chain.
pub trait GenericResultExt<T, E> {
    /// Perform a side effect on Ok value without consuming the Result.
    #[must_use]
    fn tap_ok<F: FnOnce(&T)>(self, f: F) -> Self;

    /// Perform a side effect on Err value without consuming the Result.
    #[must_use]
    fn tap_err<F: FnOnce(&E)>(self, f: F) -> Self;
}

impl<T, E> GenericResultExt<T, E> for std::result::Result<T, E> {
    fn tap_ok<F: FnOnce(&T)>(self, f: F) -> Self {
        if let Ok(ref v) = self {
            f(v);
        }
        self
    }

    fn tap_err<F: FnOnce(&E)>(self, f: F) -> Self {
        if let Err(ref e) = self {
            f(e);
        }
        self
    }
}
