//! Results of resolving a declared source against its upstream.

use serde::{Deserialize, Serialize};

use crate::source::SourceKind;

/// What a git revision turned out to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GitRevisionKind {
    Branch,
    Tag,
    Commit,
    /// The remote could not be inspected.
    Unknown,
}

/// A git revision pinned to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGitSource {
    pub url: String,
    /// The revision as declared.
    pub revision: String,
    /// Commit the revision pointed at; absent when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_commit: Option<String>,
    #[serde(rename = "type")]
    pub kind: GitRevisionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
}

impl ResolvedGitSource {
    /// A branch and the commit at its tip.
    pub fn branch(
        url: impl Into<String>,
        revision: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self::resolved(url, revision, commit, GitRevisionKind::Branch)
    }

    /// A tag and the commit it points at.
    pub fn tag(
        url: impl Into<String>,
        revision: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self::resolved(url, revision, commit, GitRevisionKind::Tag)
    }

    /// A revision that already is a commit.
    pub fn commit(url: impl Into<String>, commit: impl Into<String>) -> Self {
        let commit = commit.into();
        Self::resolved(url, commit.clone(), commit, GitRevisionKind::Commit)
    }

    /// The declared revision, echoed back because the remote was unreachable.
    pub fn unknown(url: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            revision: revision.into(),
            resolved_commit: None,
            kind: GitRevisionKind::Unknown,
            sub_path: None,
        }
    }

    fn resolved(
        url: impl Into<String>,
        revision: impl Into<String>,
        commit: impl Into<String>,
        kind: GitRevisionKind,
    ) -> Self {
        Self {
            url: url.into(),
            revision: revision.into(),
            resolved_commit: Some(commit.into()),
            kind,
            sub_path: None,
        }
    }

    /// Set the sub-path within the repository.
    #[must_use]
    pub fn with_sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = Some(sub_path.into());
        self
    }
}

/// A blob URL. Blob sources are addressed immutably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBlobSource {
    pub url: String,
}

/// A registry image pinned by digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRegistrySource {
    pub image: String,
}

/// Tagged result of a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvedSourceConfig {
    Git(ResolvedGitSource),
    Blob(ResolvedBlobSource),
    Registry(ResolvedRegistrySource),
    /// Nothing could be learned about the upstream.
    Unknown,
}

impl ResolvedSourceConfig {
    /// A resolved blob URL.
    pub fn blob(url: impl Into<String>) -> Self {
        Self::Blob(ResolvedBlobSource { url: url.into() })
    }

    /// A resolved registry image.
    pub fn registry(image: impl Into<String>) -> Self {
        Self::Registry(ResolvedRegistrySource {
            image: image.into(),
        })
    }

    /// Whether the upstream can change without a spec edit, i.e. the
    /// declared reference is a branch or tag rather than a pinned commit.
    pub fn is_pollable(&self) -> bool {
        match self {
            Self::Git(git) => matches!(git.kind, GitRevisionKind::Branch | GitRevisionKind::Tag),
            Self::Blob(_) | Self::Registry(_) | Self::Unknown => false,
        }
    }

    /// Whether the attempt learned nothing about the upstream.
    pub fn is_unknown(&self) -> bool {
        match self {
            Self::Git(git) => git.kind == GitRevisionKind::Unknown,
            Self::Blob(_) | Self::Registry(_) => false,
            Self::Unknown => true,
        }
    }

    /// Kind of the resolved source, `None` for [`ResolvedSourceConfig::Unknown`].
    pub const fn kind(&self) -> Option<SourceKind> {
        match self {
            Self::Git(_) => Some(SourceKind::Git),
            Self::Blob(_) => Some(SourceKind::Blob),
            Self::Registry(_) => Some(SourceKind::Registry),
            Self::Unknown => None,
        }
    }
}

impl From<ResolvedGitSource> for ResolvedSourceConfig {
    fn from(git: ResolvedGitSource) -> Self {
        Self::Git(git)
    }
}
