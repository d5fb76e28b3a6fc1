//! The `SourceResolver` object.

use kiln_core::{ConditionedStatus, ObjectMeta};
use serde::{Deserialize, Serialize};

use crate::resolved::ResolvedSourceConfig;
use crate::resource::Resource;
use crate::source::{SourceConfig, SourceKind};

/// Pins a declared source to a concrete upstream revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResolver {
    pub metadata: ObjectMeta,
    pub spec: SourceResolverSpec,
    #[serde(default)]
    pub status: SourceResolverStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResolverSpec {
    pub source: SourceConfig,
}

/// Persisted as `{observedGeneration, conditions, resolvedSource, pollingEnabled}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResolverStatus {
    #[serde(flatten)]
    pub status: ConditionedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_source: Option<ResolvedSourceConfig>,
    /// Whether the resolved upstream is mutable and must be re-resolved
    /// periodically.
    #[serde(default)]
    pub polling_enabled: bool,
}

impl SourceResolver {
    /// Create an unresolved source resolver.
    pub fn new(metadata: ObjectMeta, source: SourceConfig) -> Self {
        Self {
            metadata,
            spec: SourceResolverSpec { source },
            status: SourceResolverStatus::default(),
        }
    }

    /// The declared source kind, if exactly one branch is populated.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.spec.source.kind()
    }

    /// Whether status already reflects the current spec generation.
    pub fn observes_current_generation(&self) -> bool {
        self.status.status.observed_generation == self.metadata.generation
    }

    pub fn is_ready(&self) -> bool {
        self.status.status.conditions.is_ready()
    }
}

impl Resource for SourceResolver {
    const KIND: &'static str = "SourceResolver";

    type Status = SourceResolverStatus;

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn status(&self) -> &SourceResolverStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut SourceResolverStatus {
        &mut self.status
    }
}

#[cfg(test)]
mod tests {
    use kiln_core::Condition;

    use super::*;

    #[test]
    fn test_new_resolver_is_stale() {
        let resolver = SourceResolver::new(
            ObjectMeta::new("ns", "app-source"),
            SourceConfig::git("https://example/repo", "main"),
        );
        assert!(!resolver.observes_current_generation());
        assert!(!resolver.is_ready());
        assert_eq!(resolver.source_kind(), Some(SourceKind::Git));
    }

    #[test]
    fn test_status_document_shape() {
        let status = SourceResolverStatus {
            status: ConditionedStatus::observing(3, Condition::ready()),
            resolved_source: Some(ResolvedSourceConfig::blob("https://example/app.jar")),
            polling_enabled: false,
        };

        let json = serde_json::to_value(&status).unwrap_or_default();
        assert_eq!(json["observedGeneration"], 3);
        assert_eq!(json["conditions"][0]["type"], "Ready");
        assert_eq!(json["resolvedSource"]["blob"]["url"], "https://example/app.jar");
        assert_eq!(json["pollingEnabled"], false);
    }

    #[test]
    fn test_status_deserializes_without_resolution() {
        let status: Option<SourceResolverStatus> =
            serde_json::from_str(r#"{"observedGeneration": 2}"#).ok();
        assert_eq!(
            status.map(|s| (s.status.observed_generation, s.resolved_source, s.polling_enabled)),
            Some((2, None, false))
        );
    }
}
