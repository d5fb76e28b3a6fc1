//! Declarative objects reconciled by kiln.
//!
//! - [`SourceResolver`]: pins a git, blob or registry source to a concrete
//!   upstream revision and records whether that revision can move
//! - [`Builder`]: tracks the buildpacks and stack baked into a builder image
//!
//! Both implement [`Resource`], the capability the generic reconciler needs.
//! The error types here are what the external upstream inspectors report.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod builder;
pub mod error;
pub mod resolved;
pub mod resource;
pub mod source;
pub mod source_resolver;

pub use builder::{
    BuildStack, Builder, BuilderRecord, BuilderSpec, BuilderStatus, BuildpackMetadata,
    UpdatePolicy,
};
pub use error::{ResolveError, RetrieveError};
pub use resolved::{
    GitRevisionKind, ResolvedBlobSource, ResolvedGitSource, ResolvedRegistrySource,
    ResolvedSourceConfig,
};
pub use resource::Resource;
pub use source::{BlobSource, GitSource, RegistrySource, SourceConfig, SourceKind};
pub use source_resolver::{SourceResolver, SourceResolverSpec, SourceResolverStatus};
