//! The capability every reconciled object type provides.

use std::fmt::Debug;

use kiln_core::{ObjectKey, ObjectMeta};

/// A declarative object with a spec owned by external actors and a status
/// owned by its reconciler.
pub trait Resource: Debug + Clone + Send + Sync + 'static {
    /// Kind name used in logs and errors.
    const KIND: &'static str;

    /// Status document. Equality is semantic: volatile timestamps are ignored.
    type Status: Debug + Clone + PartialEq + Send + Sync;

    fn meta(&self) -> &ObjectMeta;

    fn status(&self) -> &Self::Status;

    fn status_mut(&mut self) -> &mut Self::Status;

    /// Fill in spec fields the author left unset. Must be idempotent.
    fn set_defaults(&mut self) {}

    fn key(&self) -> ObjectKey {
        self.meta().key()
    }
}
