//! Object store trait and implementations.
//!
//! The store is the reconcilers' view of the cluster: a read-mostly cache of
//! shared snapshots plus a status write path. Snapshots are handed out as
//! `Arc<T>` and must be treated as immutable; callers clone before mutating.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kiln_api::Resource;
use kiln_core::ObjectKey;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Trait for object storage backends.
#[async_trait]
pub trait ObjectStore<T: Resource>: Send + Sync {
    /// Get the cached snapshot of an object.
    async fn get(&self, key: &ObjectKey) -> StoreResult<Arc<T>>;

    /// Persist `object`'s status. Only the status subresource is written;
    /// the stored spec and metadata are left alone.
    async fn update_status(&self, object: &T) -> StoreResult<Arc<T>>;
}

/// In-memory object store for tests and embedding.
pub struct InMemoryObjectStore<T: Resource> {
    objects: RwLock<HashMap<ObjectKey, Arc<T>>>,
    status_writes: AtomicUsize,
}

impl<T: Resource> Default for InMemoryObjectStore<T> {
    fn default() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            status_writes: AtomicUsize::new(0),
        }
    }
}

impl<T: Resource> InMemoryObjectStore<T> {
    /// Create a new in-memory object store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new in-memory object store wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or replace an object, as an external spec author would.
    pub async fn insert(&self, object: T) -> Arc<T> {
        let object = Arc::new(object);
        self.objects
            .write()
            .await
            .insert(object.key(), Arc::clone(&object));
        object
    }

    /// Delete an object.
    pub async fn remove(&self, key: &ObjectKey) -> Option<Arc<T>> {
        self.objects.write().await.remove(key)
    }

    /// Number of status writes accepted so far.
    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Resource> ObjectStore<T> for InMemoryObjectStore<T> {
    async fn get(&self, key: &ObjectKey) -> StoreResult<Arc<T>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(T::KIND, key))
    }

    async fn update_status(&self, object: &T) -> StoreResult<Arc<T>> {
        let key = object.key();
        let mut objects = self.objects.write().await;
        let stored = objects
            .get(&key)
            .ok_or_else(|| StoreError::not_found(T::KIND, &key))?;

        let mut updated = (**stored).clone();
        *updated.status_mut() = object.status().clone();
        let updated = Arc::new(updated);

        objects.insert(key, Arc::clone(&updated));
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(updated)
    }
}

/// A wrapper that adds tracing to an object store.
pub struct TracingObjectStore<S, T> {
    inner: S,
    _kind: PhantomData<fn() -> T>,
}

impl<S: ObjectStore<T>, T: Resource> TracingObjectStore<S, T> {
    /// Create a new tracing object store.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            _kind: PhantomData,
        }
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ObjectStore<T>, T: Resource> ObjectStore<T> for TracingObjectStore<S, T> {
    async fn get(&self, key: &ObjectKey) -> StoreResult<Arc<T>> {
        tracing::trace!(kind = T::KIND, key = %key, "Getting object");
        self.inner.get(key).await
    }

    async fn update_status(&self, object: &T) -> StoreResult<Arc<T>> {
        tracing::debug!(
            kind = T::KIND,
            key = %object.key(),
            generation = object.meta().generation,
            "Updating status"
        );
        let result = self.inner.update_status(object).await;
        if let Err(ref err) = result {
            tracing::warn!(
                kind = T::KIND,
                key = %object.key(),
                error = %err,
                "Status update rejected"
            );
        }
        result
    }
}
