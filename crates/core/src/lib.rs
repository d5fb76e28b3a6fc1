//! Core types shared by the kiln reconcilers.
//!
//! - **Identity**: [`ObjectMeta`] and the `namespace/name` [`ObjectKey`]
//! - **Conditions**: [`Condition`], [`Conditions`] and the [`ConditionedStatus`]
//!   block embedded in every status document
//! - **Errors**: [`Error`], [`Result`] and the tap-style [`GenericResultExt`]

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod condition;
pub mod error;
pub mod meta;
pub mod result;

pub use condition::{
    Condition, ConditionStatus, ConditionType, ConditionedStatus, Conditions, VolatileTime,
};
pub use error::Error;
pub use meta::{ObjectKey, ObjectMeta};
pub use result::{GenericResultExt, Result};
