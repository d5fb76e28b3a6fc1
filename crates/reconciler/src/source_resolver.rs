//! The source resolver reconciler.

use std::sync::Arc;

use async_trait::async_trait;
use kiln_api::SourceResolver;

use crate::config::ReconcilerOptions;
use crate::error::Result;
use crate::polling::{DelayedQueue, PollingScheduler};
use crate::reconciler::{ReconcileDomain, Reconciler};
use crate::registry::ResolverRegistry;
use crate::resolve::{Resolution, SourceResolutionEngine};
use crate::store::ObjectStore;

/// Controller name of the source resolver reconciler.
pub const SOURCE_RESOLVER_CONTROLLER: &str = "SourceResolvers";

/// Reconciles [`SourceResolver`] objects.
pub type SourceResolverReconciler = Reconciler<SourceResolverDomain>;

/// Resolves declared sources through a [`SourceResolutionEngine`] and polls
/// the ones whose upstream can move.
#[derive(Debug, Clone)]
pub struct SourceResolverDomain {
    engine: SourceResolutionEngine,
}

impl SourceResolverDomain {
    pub const fn new(engine: SourceResolutionEngine) -> Self {
        Self { engine }
    }

    pub const fn engine(&self) -> &SourceResolutionEngine {
        &self.engine
    }
}

#[async_trait]
impl ReconcileDomain for SourceResolverDomain {
    type Object = SourceResolver;

    async fn resolve(&self, object: SourceResolver) -> Result<Resolution<SourceResolver>> {
        self.engine.run(&object).await
    }

    fn polling_eligible(&self, object: &SourceResolver) -> bool {
        object.status.polling_enabled
    }
}

/// Wire a source resolver reconciler.
///
/// Pollable sources are re-enqueued on `queue` every
/// [`ReconcilerOptions::source_polling_frequency`].
pub fn source_resolver_reconciler(
    options: &ReconcilerOptions,
    store: Arc<dyn ObjectStore<SourceResolver>>,
    registry: ResolverRegistry,
    queue: Arc<dyn DelayedQueue>,
) -> SourceResolverReconciler {
    Reconciler::new(
        SOURCE_RESOLVER_CONTROLLER,
        SourceResolverDomain::new(SourceResolutionEngine::new(registry)),
        store,
        PollingScheduler::new(queue, options.source_polling_frequency),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::polling::TokioDelayedQueue;
    use crate::store::InMemoryObjectStore;

    #[test]
    fn test_constructor_uses_source_frequency() {
        let options = ReconcilerOptions::default()
            .with_source_polling_frequency(Duration::from_secs(15))
            .with_builder_polling_frequency(Duration::from_secs(600));
        let (queue, _receiver) = TokioDelayedQueue::channel();

        let reconciler = source_resolver_reconciler(
            &options,
            InMemoryObjectStore::<SourceResolver>::new_arc(),
            ResolverRegistry::new(),
            Arc::new(queue),
        );

        assert_eq!(reconciler.name(), "SourceResolvers");
        assert_eq!(reconciler.poller().delay(), Duration::from_secs(15));
        assert!(reconciler.domain().engine().registry().is_empty());
    }
}
