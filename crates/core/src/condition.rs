//! Status conditions and the conditioned status block shared by every
//! reconciled object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamp that never takes part in equality.
///
/// Status documents are recomputed from scratch on every reconcile, so two
/// documents that differ only in their transition times describe the same
/// state and must compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolatileTime(DateTime<Utc>);

impl VolatileTime {
    /// The current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap an existing timestamp.
    pub const fn from_datetime(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    /// The wrapped timestamp.
    pub const fn inner(&self) -> DateTime<Utc> {
        self.0
    }
}

impl PartialEq for VolatileTime {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for VolatileTime {}

/// Kind of condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// The object's latest resolution succeeded.
    Ready,
}

/// Tri-state condition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// A single observation about an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionType,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_transition_time: VolatileTime,
}

impl Condition {
    /// `Ready=True`.
    pub fn ready() -> Self {
        Self {
            kind: ConditionType::Ready,
            status: ConditionStatus::True,
            message: None,
            last_transition_time: VolatileTime::now(),
        }
    }

    /// `Ready=False` carrying the failure message.
    pub fn not_ready(message: impl Into<String>) -> Self {
        Self {
            kind: ConditionType::Ready,
            status: ConditionStatus::False,
            message: Some(message.into()),
            last_transition_time: VolatileTime::now(),
        }
    }

    /// Whether the condition status is `True`.
    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// Set of conditions, at most one per [`ConditionType`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    /// Create an empty condition set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a condition by type.
    pub fn get(&self, kind: ConditionType) -> Option<&Condition> {
        self.0.iter().find(|c| c.kind == kind)
    }

    /// The `Ready` condition, if any.
    pub fn ready(&self) -> Option<&Condition> {
        self.get(ConditionType::Ready)
    }

    /// Whether `Ready=True` is present.
    pub fn is_ready(&self) -> bool {
        self.ready().is_some_and(Condition::is_true)
    }

    /// Insert or replace the condition of the same type.
    ///
    /// A replacement with the same status and message keeps the previous
    /// transition time.
    pub fn set(&mut self, mut condition: Condition) {
        match self.0.iter_mut().find(|c| c.kind == condition.kind) {
            Some(existing) => {
                if existing.status == condition.status && existing.message == condition.message {
                    condition.last_transition_time = existing.last_transition_time;
                }
                *existing = condition;
            }
            None => self.0.push(condition),
        }
    }

    /// Iterate over all conditions.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no condition has been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Condition> for Conditions {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut conditions = Self::new();
        for condition in iter {
            conditions.set(condition);
        }
        conditions
    }
}

/// The status block every reconciled object shares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionedStatus {
    /// Last spec generation whose resolution is reflected in this status.
    #[serde(default)]
    pub observed_generation: i64,
    #[serde(default)]
    pub conditions: Conditions,
}

impl ConditionedStatus {
    /// Create a status observing `generation` with a single condition.
    pub fn observing(generation: i64, condition: Condition) -> Self {
        Self {
            observed_generation: generation,
            conditions: std::iter::once(condition).collect(),
        }
    }
}
