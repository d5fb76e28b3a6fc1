//! Ordered dispatch across source-kind resolvers.

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use kiln_api::{ResolveError, ResolvedSourceConfig, Resource, SourceResolver};

use crate::error::{Error, Result};

/// Resolves one kind of declared source against its upstream.
///
/// Implementations live outside this crate (git remotes, blob storage,
/// registries); this crate only dispatches to them.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Whether this resolver handles the object's declared source.
    fn can_resolve(&self, source_resolver: &SourceResolver) -> bool;

    /// Inspect the upstream.
    ///
    /// An `Err` carries no partial result: the engine records the object as
    /// [`ResolvedSourceConfig::Unknown`] and copies the error text into the
    /// `Ready` condition. A resolver that learned something but could not pin
    /// it (a git revision that matched nothing, say) should return `Ok` with
    /// an unknown git source such as [`kiln_api::ResolvedGitSource::unknown`]
    /// instead, which is still treated as unresolved.
    async fn resolve(
        &self,
        source_resolver: &SourceResolver,
    ) -> std::result::Result<ResolvedSourceConfig, ResolveError>;
}

/// Fixed, ordered list of resolvers. The first one whose capability check
/// passes wins; there is no fallback.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver after the ones already registered.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether no resolver is registered.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Pick the resolver for `source_resolver`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSource`] when no resolver accepts the
    /// declared source. That happens for an empty or multi-branch source, or
    /// a kind nobody registered; none of these heal without a spec edit.
    pub fn select(&self, source_resolver: &SourceResolver) -> Result<&dyn Resolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.can_resolve(source_resolver))
            .map(|resolver| &**resolver)
            .ok_or_else(|| {
                Error::unsupported_source(&source_resolver.key(), describe(source_resolver))
            })
    }
}

impl FromIterator<Arc<dyn Resolver>> for ResolverRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Resolver>>>(iter: I) -> Self {
        Self {
            resolvers: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

fn describe(source_resolver: &SourceResolver) -> String {
    let declared = source_resolver.spec.source.populated_kinds().join(", ");
    if declared.is_empty() {
        "invalid source type: no source declared".to_string()
    } else {
        format!("invalid source type: no resolver accepts [{declared}]")
    }
}
