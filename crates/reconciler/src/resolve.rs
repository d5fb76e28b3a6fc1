//! Source resolution: one pass of "what does this declared source point at
//! right now".

use kiln_api::{ResolvedSourceConfig, Resource, SourceResolver};
use kiln_core::Condition;
use tracing::debug;

use crate::error::{DomainError, Result};
use crate::registry::ResolverRegistry;

/// Outcome of running a domain step against one object.
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    /// The object carrying the freshly computed status.
    pub object: T,
    /// Whether the computed status should be persisted.
    pub need_update: bool,
    /// Upstream failure that was folded into the status.
    pub domain_error: Option<DomainError>,
}

impl<T> Resolution<T> {
    /// A resolution whose status must be written.
    pub const fn updated(object: T) -> Self {
        Self {
            object,
            need_update: true,
            domain_error: None,
        }
    }

    /// Keep the object as it is.
    pub const fn unchanged(object: T) -> Self {
        Self {
            object,
            need_update: false,
            domain_error: None,
        }
    }

    #[must_use]
    pub fn with_domain_error(mut self, err: Option<DomainError>) -> Self {
        self.domain_error = err;
        self
    }
}

/// Dispatches a [`SourceResolver`] to the matching resolver and folds the
/// result into a new status.
#[derive(Debug, Clone)]
pub struct SourceResolutionEngine {
    registry: ResolverRegistry,
}

impl SourceResolutionEngine {
    pub const fn new(registry: ResolverRegistry) -> Self {
        Self { registry }
    }

    pub const fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Resolve `snapshot` and compute its next status.
    ///
    /// The snapshot is never modified; the returned object is a copy.
    ///
    /// An unknown resolution for a generation that was already observed
    /// leaves the last good status untouched and asks for no write. A
    /// resolver failure is reported as an unknown resolution with the
    /// failure attached, and the `Ready` condition carries its message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedSource`] when no resolver accepts
    /// the declared source.
    pub async fn run(&self, snapshot: &SourceResolver) -> Result<Resolution<SourceResolver>> {
        let resolver = self.registry.select(snapshot)?;
        let mut object = snapshot.clone();

        let (config, domain_error) = match resolver.resolve(snapshot).await {
            Ok(config) => (config, None),
            Err(err) => (ResolvedSourceConfig::Unknown, Some(DomainError::from(err))),
        };

        if config.is_unknown() && object.observes_current_generation() {
            debug!(
                key = %object.key(),
                generation = object.metadata.generation,
                "Unknown resolution for an observed generation, keeping status"
            );
            return Ok(Resolution::unchanged(object).with_domain_error(domain_error));
        }

        let condition = domain_error
            .as_ref()
            .map_or_else(Condition::ready, |err| Condition::not_ready(err.to_string()));

        let generation = object.metadata.generation;
        let status = &mut object.status;
        status.polling_enabled = config.is_pollable();
        status.resolved_source = Some(config);
        status.status.conditions.set(condition);
        status.status.observed_generation = generation;

        Ok(Resolution::updated(object).with_domain_error(domain_error))
    }
}
