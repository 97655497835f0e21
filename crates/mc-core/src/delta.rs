//! Cumulative → per-interval delta conversion.
//!
//! Each consecutive pair of readings yields one [`DeltaRecord`] stamped with
//! the later reading's timestamp, so `n` readings produce `n - 1` deltas.
//!
//! Two policies decide what a drop in a register means:
//! - [`DeltaPolicy::ResetReplace`]: the register restarted from zero, so the
//!   post-drop value is itself the consumption (heating rooms, electricity).
//! - [`DeltaPolicy::ClampNegative`]: drops count as zero consumption
//!   (water registers).

use mc_common::{AnomalySet, DeltaRecord, FieldMap, Reading, RecordShape};
use mc_config::DeltaSettings;
use serde::{Deserialize, Serialize};

/// How a register drop between two readings is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaPolicy {
    /// `max(0, current - previous)`.
    ClampNegative,
    /// `current` when `current < previous`, else `current - previous`.
    ResetReplace,
}

impl DeltaPolicy {
    /// Policy for a record shape.
    ///
    /// Fixed-field meters clamp unless `unify_reset_semantics` is set.
    pub fn for_shape(shape: RecordShape, settings: &DeltaSettings) -> Self {
        match shape {
            RecordShape::FixedFields if !settings.unify_reset_semantics => {
                DeltaPolicy::ClampNegative
            }
            RecordShape::FixedFields | RecordShape::DynamicFields | RecordShape::SingleField => {
                DeltaPolicy::ResetReplace
            }
        }
    }

    /// Consumption between two cumulative values of one register.
    pub fn delta(self, previous: f64, current: f64) -> f64 {
        match self {
            DeltaPolicy::ClampNegative => (current - previous).max(0.0),
            DeltaPolicy::ResetReplace => {
                if current < previous {
                    current
                } else {
                    current - previous
                }
            }
        }
    }
}

/// Delta for one interval, for every field present in `current`.
pub fn interval_delta(
    previous: &Reading,
    current: &Reading,
    policy: DeltaPolicy,
    exclusions: &AnomalySet,
) -> DeltaRecord {
    let fields: FieldMap = current
        .fields
        .iter()
        .map(|(field, &value)| {
            let delta = if exclusions.contains(current.timestamp, field) {
                0.0
            } else {
                policy.delta(previous.value(field), value)
            };
            (field.clone(), delta)
        })
        .collect();

    DeltaRecord {
        timestamp: current.timestamp,
        fields,
    }
}

/// Convert ascending cumulative readings into interval deltas.
///
/// `(timestamp, field)` pairs in `exclusions` yield a zero delta, which
/// keeps a confirmed new-register jump out of the consumption figures.
pub fn calculate_deltas(
    readings: &[Reading],
    policy: DeltaPolicy,
    exclusions: &AnomalySet,
) -> Vec<DeltaRecord> {
    readings
        .windows(2)
        .map(|pair| interval_delta(&pair[0], &pair[1], policy, exclusions))
        .collect()
}
