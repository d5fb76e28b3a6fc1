//! Generic reconciler implementation.

use std::sync::Arc;

use async_trait::async_trait;
use kiln_api::Resource;
use kiln_core::{GenericResultExt, ObjectKey};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{Error, ErrorClass, Result};
use crate::polling::PollingScheduler;
use crate::resolve::Resolution;
use crate::store::ObjectStore;

/// The per-kind part of a reconcile: compute the next status of an object
/// and say whether it needs re-checking later.
#[async_trait]
pub trait ReconcileDomain: Send + Sync {
    type Object: Resource;

    /// Compute the next status of `object`, a defaulted private copy.
    ///
    /// Upstream failures belong in [`Resolution::domain_error`], not in the
    /// returned `Err`; an `Err` aborts the reconcile before anything is
    /// persisted.
    async fn resolve(&self, object: Self::Object) -> Result<Resolution<Self::Object>>;

    /// Whether `object` should be re-enqueued after the polling delay.
    fn polling_eligible(&self, object: &Self::Object) -> bool;
}

/// K8s-style reconciler: converges the stored status of one object kind
/// towards what its spec and the upstream say it should be.
pub struct Reconciler<D: ReconcileDomain> {
    name: &'static str,
    domain: D,
    store: Arc<dyn ObjectStore<D::Object>>,
    poller: PollingScheduler,
}

impl<D: ReconcileDomain> Reconciler<D> {
    /// Create a new reconciler.
    pub fn new(
        name: &'static str,
        domain: D,
        store: Arc<dyn ObjectStore<D::Object>>,
        poller: PollingScheduler,
    ) -> Self {
        Self {
            name,
            domain,
            store,
            poller,
        }
    }

    /// Controller name used in logs.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn domain(&self) -> &D {
        &self.domain
    }

    pub const fn poller(&self) -> &PollingScheduler {
        &self.poller
    }

    /// Reconcile the object named by `key` (`namespace/name`).
    ///
    /// A deleted object is not an error. Upstream failures are written into
    /// status first and then returned as [`Error::Permanent`].
    ///
    /// # Errors
    ///
    /// See [`Error::class`] for how each failure should be retried.
    pub async fn reconcile(&self, key: &str) -> Result<()> {
        let key = ObjectKey::parse(key)?;
        let kind = <D::Object as Resource>::KIND;

        let cached = match self.store.get(&key).await {
            Ok(cached) => cached,
            Err(err) if err.is_not_found() => {
                debug!(controller = self.name, key = %key, "Object no longer exists");
                return Ok(());
            }
            Err(err) => return Err(Error::lookup_failed(kind, &key, err)),
        };

        // The cached snapshot is shared; all mutation happens on a copy.
        let mut object = (*cached).clone();
        object.set_defaults();

        let Resolution {
            object,
            need_update,
            domain_error,
        } = self.domain.resolve(object).await?;

        if need_update {
            self.update_status(&key, &object).await?;
        }

        if self.domain.polling_eligible(&object) {
            self.poller
                .enqueue(&key)
                .map_err(|err| Error::schedule_failed(&key, err))?;
        }

        match domain_error {
            Some(err) => {
                warn!(controller = self.name, key = %key, error = %err, "Upstream resolution failed");
                Err(Error::permanent(err))
            }
            None => {
                debug!(controller = self.name, key = %key, "Reconcile succeeded");
                Ok(())
            }
        }
    }

    /// Write `desired`'s status unless the stored status already matches.
    async fn update_status(&self, key: &ObjectKey, desired: &D::Object) -> Result<()> {
        let kind = <D::Object as Resource>::KIND;

        let current = self
            .store
            .get(key)
            .await
            .map_err(|err| Error::status_update_failed(kind, key, err))?;

        if current.status() == desired.status() {
            debug!(controller = self.name, key = %key, "Status unchanged, skipping write");
            return Ok(());
        }

        self.store
            .update_status(desired)
            .await
            .tap_ok(|_| {
                info!(
                    controller = self.name,
                    key = %key,
                    generation = desired.meta().generation,
                    "Updated status"
                );
            })
            .map(|_| ())
            .map_err(|err| Error::status_update_failed(kind, key, err))
    }

    /// Drain `keys`, reconciling each one, until every sender is gone.
    ///
    /// Failures are logged by class; retry with backoff is left to the
    /// caller feeding the channel.
    pub async fn run(&self, mut keys: mpsc::UnboundedReceiver<ObjectKey>) {
        info!(controller = self.name, "Reconciler worker started");
        while let Some(key) = keys.recv().await {
            let outcome = self.reconcile(&key.to_string()).await;
            if let Err(err) = outcome {
                match err.class() {
                    ErrorClass::Transient => {
                        warn!(controller = self.name, key = %key, error = %err, "Transient failure");
                    }
                    ErrorClass::Structural | ErrorClass::Permanent => {
                        debug!(controller = self.name, key = %key, error = %err, "Not retrying");
                    }
                }
            }
        }
        info!(controller = self.name, "Reconciler worker stopped");
    }
}

impl<D: ReconcileDomain> std::fmt::Debug for Reconciler<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("name", &self.name)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}
