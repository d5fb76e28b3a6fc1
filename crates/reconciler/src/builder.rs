//! The builder reconciler.
//!
//! A builder's status mirrors what the registry says about its image: the
//! buildpacks it carries, its stack, and the digest the tag pointed at.
//! Builders with the polling update policy are re-inspected periodically so
//! pushes to the same tag are noticed.

use std::sync::Arc;

use async_trait::async_trait;
use kiln_api::{Builder, BuilderRecord, BuilderStatus, Resource, RetrieveError, UpdatePolicy};
use kiln_core::{Condition, ConditionedStatus};
use tracing::debug;

use crate::config::ReconcilerOptions;
use crate::error::{DomainError, Result};
use crate::polling::{DelayedQueue, PollingScheduler};
use crate::reconciler::{ReconcileDomain, Reconciler};
use crate::resolve::Resolution;
use crate::store::ObjectStore;

/// Controller name of the builder reconciler.
pub const BUILDER_CONTROLLER: &str = "Builders";

/// Reconciles [`Builder`] objects.
pub type BuilderReconciler = Reconciler<BuilderDomain>;

/// Inspects builder images in their registry.
#[async_trait]
pub trait MetadataRetriever: Send + Sync {
    /// Read the buildpack and stack metadata of `builder`'s image, using its
    /// pull secrets.
    async fn get_builder_image(
        &self,
        builder: &Builder,
    ) -> std::result::Result<BuilderRecord, RetrieveError>;
}

/// Synthesizes builder status from the retrieved image metadata.
#[derive(Clone)]
pub struct BuilderDomain {
    retriever: Arc<dyn MetadataRetriever>,
}

impl BuilderDomain {
    pub fn new(retriever: Arc<dyn MetadataRetriever>) -> Self {
        Self { retriever }
    }
}

impl std::fmt::Debug for BuilderDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderDomain").finish_non_exhaustive()
    }
}

#[async_trait]
impl ReconcileDomain for BuilderDomain {
    type Object = Builder;

    async fn resolve(&self, mut object: Builder) -> Result<Resolution<Builder>> {
        let generation = object.metadata.generation;
        let mut conditions = object.status.status.conditions.clone();

        let (status, domain_error) = match self.retriever.get_builder_image(&object).await {
            Ok(record) => {
                debug!(
                    key = %object.key(),
                    image = %record.image,
                    buildpacks = record.buildpacks.len(),
                    "Retrieved builder image"
                );
                conditions.set(Condition::ready());
                let status = BuilderStatus {
                    status: ConditionedStatus {
                        observed_generation: generation,
                        conditions,
                    },
                    builder_metadata: record.buildpacks,
                    latest_image: Some(record.image),
                    stack: Some(record.stack),
                };
                (status, None)
            }
            Err(err) => {
                conditions.set(Condition::not_ready(err.to_string()));
                let status = BuilderStatus {
                    status: ConditionedStatus {
                        observed_generation: generation,
                        conditions,
                    },
                    ..BuilderStatus::default()
                };
                (status, Some(DomainError::from(err)))
            }
        };

        object.status = status;
        Ok(Resolution::updated(object).with_domain_error(domain_error))
    }

    fn polling_eligible(&self, object: &Builder) -> bool {
        object.update_policy() == UpdatePolicy::Polling
    }
}

/// Wire a builder reconciler.
///
/// Builders with the polling update policy are re-enqueued on `queue` every
/// [`ReconcilerOptions::builder_polling_frequency`].
pub fn builder_reconciler(
    options: &ReconcilerOptions,
    store: Arc<dyn ObjectStore<Builder>>,
    retriever: Arc<dyn MetadataRetriever>,
    queue: Arc<dyn DelayedQueue>,
) -> BuilderReconciler {
    Reconciler::new(
        BUILDER_CONTROLLER,
        BuilderDomain::new(retriever),
        store,
        PollingScheduler::new(queue, options.builder_polling_frequency),
    )
}
