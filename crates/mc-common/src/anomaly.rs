//! Anomaly candidates and the confirmation values fed back by a reviewer.
//!
//! Detection produces [`AnomalyCandidate`]s. Whoever reviews them hands the
//! accepted ones back as plain values: a [`ResetDates`] set for resets and
//! an [`AnomalySet`] of `(timestamp, field)` keys for spikes and delta
//! exclusions. The engine only reads these sets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::id::FieldId;
use crate::record::Timestamp;

/// What a candidate looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A register dropped below its previous value.
    Reset,
    /// A register went from zero to a large value.
    NewFieldSpike,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyKind::Reset => write!(f, "reset"),
            AnomalyKind::NewFieldSpike => write!(f, "new_field_spike"),
        }
    }
}

/// A detected, not yet trusted, anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnomalyCandidate {
    pub timestamp: Timestamp,
    pub field: FieldId,
    pub kind: AnomalyKind,
    /// Raw cumulative value at `timestamp`.
    pub raw_value: f64,
    /// Reference value: the previous reading for resets, the average
    /// established-field delta for spikes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
}

impl AnomalyCandidate {
    /// The key a reviewer confirms to accept this candidate.
    pub fn key(&self) -> AnomalyKey {
        AnomalyKey::new(self.timestamp, self.field.clone())
    }
}

/// One confirmed `(timestamp, field)` pair.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct AnomalyKey {
    pub timestamp: Timestamp,
    pub field: FieldId,
}

impl AnomalyKey {
    pub fn new(timestamp: Timestamp, field: impl Into<FieldId>) -> Self {
        Self {
            timestamp,
            field: field.into(),
        }
    }
}

/// Confirmed spikes, or delta exclusions, keyed by timestamp and field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnomalySet(BTreeSet<AnomalyKey>);

impl AnomalySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: AnomalyKey) -> bool {
        self.0.insert(key)
    }

    pub fn contains(&self, timestamp: Timestamp, field: &FieldId) -> bool {
        // Keys order by timestamp first, so this is a bounded range scan.
        self.0
            .range(AnomalyKey::new(timestamp, FieldId::new(""))..)
            .take_while(|k| k.timestamp == timestamp)
            .any(|k| &k.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnomalyKey> {
        self.0.iter()
    }
}

impl FromIterator<AnomalyKey> for AnomalySet {
    fn from_iter<I: IntoIterator<Item = AnomalyKey>>(iter: I) -> Self {
        AnomalySet(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a AnomalyCandidate> for AnomalySet {
    fn from_iter<I: IntoIterator<Item = &'a AnomalyCandidate>>(iter: I) -> Self {
        AnomalySet(iter.into_iter().map(AnomalyCandidate::key).collect())
    }
}

/// Confirmed reset timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ResetDates(BTreeSet<Timestamp>);

impl ResetDates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timestamp: Timestamp) -> bool {
        self.0.insert(timestamp)
    }

    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.0.contains(&timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timestamp> {
        self.0.iter()
    }
}

impl FromIterator<Timestamp> for ResetDates {
    fn from_iter<I: IntoIterator<Item = Timestamp>>(iter: I) -> Self {
        ResetDates(iter.into_iter().collect())
    }
}
