//! Object identity.
//!
//! Every reconciled object carries an [`ObjectMeta`]; the work queue refers to
//! objects by [`ObjectKey`], whose string form is `"<namespace>/<name>"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::result::Result;

/// Metadata shared by every declarative object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Namespace; empty for cluster-scoped objects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Object name, unique within the namespace.
    pub name: String,
    /// Spec version. Bumped by the object store on every spec edit.
    #[serde(default)]
    pub generation: i64,
}

impl ObjectMeta {
    /// Create metadata for a freshly created object (generation 1).
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            generation: 1,
        }
    }

    /// Set the generation.
    #[must_use]
    pub const fn with_generation(mut self, generation: i64) -> Self {
        self.generation = generation;
        self
    }

    /// The work-queue key of this object.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace.clone(), self.name.clone())
    }
}

/// Identity of an object in the store and on the work queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    namespace: String,
    name: String,
}

impl ObjectKey {
    /// Create a namespaced key.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Create a key for a cluster-scoped object.
    pub fn cluster_scoped(name: impl Into<String>) -> Self {
        Self::new(String::new(), name)
    }

    /// Parse a `"<namespace>/<name>"` or `"<name>"` key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] when the key has more than one `/` or an
    /// empty name.
    pub fn parse(key: &str) -> Result<Self> {
        let mut parts = key.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) if !name.is_empty() => Ok(Self::cluster_scoped(name)),
            (Some(namespace), Some(name), None) if !name.is_empty() => {
                Ok(Self::new(namespace, name))
            }
            _ => Err(Error::invalid_key(
                key,
                "expected '<namespace>/<name>' or '<name>'",
            )),
        }
    }

    /// The namespace; empty for cluster-scoped objects.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The object name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ObjectKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}
