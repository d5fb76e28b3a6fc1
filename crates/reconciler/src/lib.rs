//! K8s-style reconcilers for source resolvers and builders.
//!
//! Each reconcile is driven by an object key handed out by an external work
//! queue:
//!
//! 1. Look the object up in the local cache (a deleted object is a no-op)
//! 2. Copy and default it, then compute its next status from the upstream
//! 3. Persist the status, but only when it differs from what is stored
//! 4. Re-enqueue the key after the polling delay if its upstream can move
//! 5. Report upstream failures as permanent errors once they are in status
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use kiln_reconciler::{
//!     InMemoryObjectStore, ReconcilerOptions, ResolverRegistry, TokioDelayedQueue,
//!     source_resolver_reconciler,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let options = ReconcilerOptions::from_env();
//!     let store = InMemoryObjectStore::new_arc();
//!     let registry = ResolverRegistry::new()
//!         .with_resolver(git_resolver)
//!         .with_resolver(blob_resolver)
//!         .with_resolver(registry_resolver);
//!     let (queue, keys) = TokioDelayedQueue::channel();
//!
//!     let reconciler = source_resolver_reconciler(&options, store, registry, Arc::new(queue));
//!     reconciler.run(keys).await;
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod builder;
pub mod config;
pub mod error;
pub mod polling;
pub mod reconciler;
pub mod registry;
pub mod resolve;
pub mod source_resolver;
pub mod store;

// Re-export main types
pub use builder::{
    BUILDER_CONTROLLER, BuilderDomain, BuilderReconciler, MetadataRetriever, builder_reconciler,
};
pub use config::{BUILDER_POLLING_FREQUENCY_ENV, ReconcilerOptions, SOURCE_POLLING_FREQUENCY_ENV};
pub use error::{DomainError, Error, ErrorClass, QueueError, Result, StoreError};
pub use polling::{DelayedQueue, PollingScheduler, TokioDelayedQueue};
pub use reconciler::{ReconcileDomain, Reconciler};
pub use registry::{Resolver, ResolverRegistry};
pub use resolve::{Resolution, SourceResolutionEngine};
pub use source_resolver::{
    SOURCE_RESOLVER_CONTROLLER, SourceResolverDomain, SourceResolverReconciler,
    source_resolver_reconciler,
};
pub use store::{InMemoryObjectStore, ObjectStore, StoreResult, TracingObjectStore};
