//! The `Builder` object: a builder image whose buildpack metadata is tracked.

use kiln_core::{ConditionedStatus, ObjectMeta};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// When the builder image is re-inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Only on spec edits.
    Manual,
    /// Periodically, to pick up image pushes to the same tag.
    Polling,
}

/// Builder image whose buildpacks and stack are published in status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Builder {
    pub metadata: ObjectMeta,
    pub spec: BuilderSpec,
    #[serde(default)]
    pub status: BuilderStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderSpec {
    /// Image reference, usually a tag.
    pub image: String,
    /// Names of the secrets holding registry credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<String>,
    /// Unset until defaulted; see [`Resource::set_defaults`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_policy: Option<UpdatePolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildpackMetadata {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStack {
    pub id: String,
    pub run_image: String,
}

/// Status of a builder. Metadata fields are empty while the image cannot be
/// inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderStatus {
    #[serde(flatten)]
    pub status: ConditionedStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub builder_metadata: Vec<BuildpackMetadata>,
    /// Digest-pinned reference of the inspected image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<BuildStack>,
}

/// What the metadata retriever learned about a builder image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderRecord {
    /// Digest-pinned image reference.
    pub image: String,
    pub buildpacks: Vec<BuildpackMetadata>,
    pub stack: BuildStack,
}

impl Builder {
    /// Create a builder for `image` with no explicit update policy.
    pub fn new(metadata: ObjectMeta, image: impl Into<String>) -> Self {
        Self {
            metadata,
            spec: BuilderSpec {
                image: image.into(),
                ..BuilderSpec::default()
            },
            status: BuilderStatus::default(),
        }
    }

    #[must_use]
    pub const fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.spec.update_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn with_pull_secret(mut self, secret: impl Into<String>) -> Self {
        self.spec.image_pull_secrets.push(secret.into());
        self
    }

    /// The effective update policy; polling unless set otherwise.
    pub fn update_policy(&self) -> UpdatePolicy {
        self.spec.update_policy.unwrap_or(UpdatePolicy::Polling)
    }

    pub fn image(&self) -> &str {
        &self.spec.image
    }

    pub fn image_pull_secrets(&self) -> &[String] {
        &self.spec.image_pull_secrets
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn is_ready(&self) -> bool {
        self.status.status.conditions.is_ready()
    }
}

impl Resource for Builder {
    const KIND: &'static str = "Builder";

    type Status = BuilderStatus;

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn status(&self) -> &BuilderStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut BuilderStatus {
        &mut self.status
    }

    fn set_defaults(&mut self) {
        if self.spec.update_policy.is_none() {
            self.spec.update_policy = Some(UpdatePolicy::Polling);
        }
    }
}
