//! Shared fakes for the reconciler scenario tests.

#![allow(dead_code)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kiln_api::{
    BuildStack, Builder, BuilderRecord, BuildpackMetadata, ResolveError, ResolvedGitSource,
    ResolvedSourceConfig, Resource, RetrieveError, SourceKind, SourceResolver,
};
use kiln_core::ObjectKey;
use kiln_reconciler::{
    DelayedQueue, InMemoryObjectStore, ObjectStore, QueueError, Resolver, ResolverRegistry,
    StoreError, StoreResult,
};

/// Test helper: Unwrap a Result or panic with context
pub fn unwrap_result<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{}: {}", context, e),
    }
}

/// Install a fmt subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Resolvers
// ============================================================================

/// Resolves exactly one source kind, the way the real git, blob and registry
/// resolvers partition the declared source.
pub struct FakeResolver {
    kind: SourceKind,
    calls: Mutex<usize>,
}

impl FakeResolver {
    pub fn new(kind: SourceKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            calls: Mutex::new(0),
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().map(|calls| *calls).unwrap_or_default()
    }
}

#[async_trait]
impl Resolver for FakeResolver {
    fn can_resolve(&self, source_resolver: &SourceResolver) -> bool {
        source_resolver.source_kind() == Some(self.kind)
    }

    async fn resolve(
        &self,
        source_resolver: &SourceResolver,
    ) -> Result<ResolvedSourceConfig, ResolveError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        let source = &source_resolver.spec.source;
        match self.kind {
            SourceKind::Git => {
                let git = source
                    .git
                    .as_ref()
                    .ok_or_else(|| ResolveError::new("no git source"))?;
                Ok(resolve_git(&git.url, &git.revision).into())
            }
            SourceKind::Blob => {
                let blob = source
                    .blob
                    .as_ref()
                    .ok_or_else(|| ResolveError::new("no blob source"))?;
                Ok(ResolvedSourceConfig::blob(blob.url.clone()))
            }
            SourceKind::Registry => {
                let registry = source
                    .registry
                    .as_ref()
                    .ok_or_else(|| ResolveError::new("no registry source"))?;
                if registry.image.contains(' ') || registry.image.is_empty() {
                    return Err(ResolveError::new(format!(
                        "could not parse reference: {}",
                        registry.image
                    )));
                }
                Ok(ResolvedSourceConfig::registry(registry.image.clone()))
            }
        }
    }
}

/// Full commit shas resolve to themselves; everything else is a branch.
fn resolve_git(url: &str, revision: &str) -> ResolvedGitSource {
    let is_commit = revision.len() == 40 && revision.chars().all(|c| c.is_ascii_hexdigit());
    if is_commit {
        ResolvedGitSource::commit(url, revision)
    } else {
        ResolvedGitSource::branch(url, revision, "0123456789abcdef0123456789abcdef01234567")
    }
}

/// Fails every resolution with the same message.
pub struct FailingResolver {
    message: String,
}

impl FailingResolver {
    pub fn new(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            message: message.into(),
        })
    }
}

#[async_trait]
impl Resolver for FailingResolver {
    fn can_resolve(&self, source_resolver: &SourceResolver) -> bool {
        source_resolver.source_kind().is_some()
    }

    async fn resolve(
        &self,
        _source_resolver: &SourceResolver,
    ) -> Result<ResolvedSourceConfig, ResolveError> {
        Err(ResolveError::new(self.message.clone()))
    }
}

/// Accepts every source and resolves it to a blob named after its tag, so
/// tests can tell overlapping resolvers apart.
pub struct TaggedResolver {
    tag: String,
}

impl TaggedResolver {
    pub fn new(tag: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { tag: tag.into() })
    }
}

#[async_trait]
impl Resolver for TaggedResolver {
    fn can_resolve(&self, _source_resolver: &SourceResolver) -> bool {
        true
    }

    async fn resolve(
        &self,
        _source_resolver: &SourceResolver,
    ) -> Result<ResolvedSourceConfig, ResolveError> {
        Ok(ResolvedSourceConfig::blob(self.tag.clone()))
    }
}

/// Registry with one resolver per source kind, in git, blob, registry order.
pub fn default_registry() -> ResolverRegistry {
    SourceKind::ALL
        .into_iter()
        .map(|kind| FakeResolver::new(kind) as Arc<dyn Resolver>)
        .collect()
}

// ============================================================================
// Builder metadata
// ============================================================================

/// Serves a fixed image record, or a fixed error.
pub struct FakeMetadataRetriever {
    outcome: Result<BuilderRecord, RetrieveError>,
}

impl FakeMetadataRetriever {
    pub fn serving(record: BuilderRecord) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(record),
        })
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(RetrieveError::new(message)),
        })
    }
}

#[async_trait]
impl kiln_reconciler::MetadataRetriever for FakeMetadataRetriever {
    async fn get_builder_image(&self, _builder: &Builder) -> Result<BuilderRecord, RetrieveError> {
        self.outcome.clone()
    }
}

pub fn builder_record(digest: &str) -> BuilderRecord {
    BuilderRecord {
        image: format!("gcr.io/builders/base@sha256:{digest}"),
        buildpacks: vec![
            BuildpackMetadata {
                id: "io.buildpacks.java".to_string(),
                version: "1.0.0".to_string(),
            },
            BuildpackMetadata {
                id: "io.buildpacks.node".to_string(),
                version: "2.3.1".to_string(),
            },
        ],
        stack: BuildStack {
            id: "io.buildpacks.stacks.bionic".to_string(),
            run_image: "gcr.io/run/base".to_string(),
        },
    }
}

// ============================================================================
// Queue and store
// ============================================================================

/// Records every delayed enqueue instead of scheduling it.
#[derive(Default)]
pub struct RecordingQueue {
    added: Mutex<Vec<(ObjectKey, Duration)>>,
    fail: bool,
}

impl RecordingQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            added: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn added(&self) -> Vec<(ObjectKey, Duration)> {
        self.added
            .lock()
            .map(|added| added.clone())
            .unwrap_or_default()
    }
}

impl DelayedQueue for RecordingQueue {
    fn add_after(&self, key: ObjectKey, delay: Duration) -> Result<(), QueueError> {
        if self.fail {
            return Err(QueueError::Closed);
        }
        if let Ok(mut added) = self.added.lock() {
            added.push((key, delay));
        }
        Ok(())
    }
}

/// Store whose reads succeed but whose status writes are rejected, or whose
/// reads fail outright.
pub struct BrokenStore<T: Resource> {
    inner: Arc<InMemoryObjectStore<T>>,
    fail_reads: bool,
}

impl<T: Resource> BrokenStore<T> {
    pub fn rejecting_writes(inner: Arc<InMemoryObjectStore<T>>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_reads: false,
        })
    }

    pub fn unreachable(inner: Arc<InMemoryObjectStore<T>>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_reads: true,
        })
    }
}

#[async_trait]
impl<T: Resource> ObjectStore<T> for BrokenStore<T> {
    async fn get(&self, key: &ObjectKey) -> StoreResult<Arc<T>> {
        if self.fail_reads {
            return Err(StoreError::unavailable("connection refused"));
        }
        self.inner.get(key).await
    }

    async fn update_status(&self, _object: &T) -> StoreResult<Arc<T>> {
        Err(StoreError::conflict("object has been modified"))
    }
}
