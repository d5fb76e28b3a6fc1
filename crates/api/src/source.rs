//! Declared upstream sources.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Discriminant of a declared source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Git,
    Blob,
    Registry,
}

impl SourceKind {
    /// All kinds, in dispatch order.
    pub const ALL: [Self; 3] = [Self::Git, Self::Blob, Self::Registry];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Blob => write!(f, "blob"),
            Self::Registry => write!(f, "registry"),
        }
    }
}

/// A git repository at a revision (branch, tag or commit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    pub url: String,
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
}

/// An archive in blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobSource {
    pub url: String,
}

/// A source image in a container registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySource {
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<String>,
}

/// Declared upstream of a `SourceResolver`.
///
/// Exactly one branch is expected to be populated. The wire shape cannot
/// enforce that, so [`SourceConfig::kind`] reports `None` for zero or
/// several populated branches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<BlobSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistrySource>,
}

impl SourceConfig {
    /// A git source.
    pub fn git(url: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            git: Some(GitSource {
                url: url.into(),
                revision: revision.into(),
                sub_path: None,
            }),
            ..Self::default()
        }
    }

    /// A blob source.
    pub fn blob(url: impl Into<String>) -> Self {
        Self {
            blob: Some(BlobSource { url: url.into() }),
            ..Self::default()
        }
    }

    /// A registry source.
    pub fn registry(image: impl Into<String>) -> Self {
        Self {
            registry: Some(RegistrySource {
                image: image.into(),
                image_pull_secrets: Vec::new(),
            }),
            ..Self::default()
        }
    }

    /// Kinds whose branch is populated, in dispatch order.
    pub fn populated_kinds(&self) -> impl Iterator<Item = SourceKind> {
        [
            self.git.as_ref().map(|_| SourceKind::Git),
            self.blob.as_ref().map(|_| SourceKind::Blob),
            self.registry.as_ref().map(|_| SourceKind::Registry),
        ]
        .into_iter()
        .flatten()
    }

    /// The declared kind, if exactly one branch is populated.
    pub fn kind(&self) -> Option<SourceKind> {
        self.populated_kinds().exactly_one().ok()
    }
}
