//! Advisory anomaly detection over cumulative readings.
//!
//! Nothing found here is ever applied automatically. Candidates go to an
//! external reviewer, and only the confirmed subset comes back as
//! [`ResetDates`](mc_common::ResetDates) or [`AnomalySet`](mc_common::AnomalySet)
//! for the correction passes.

use mc_common::{AnomalyCandidate, AnomalyKind, Reading, Timestamp};
use mc_config::SpikeThresholds;
use mc_math::mean;

use crate::logging::event_names;

/// Per-field drops between consecutive readings.
///
/// Every field present in the later reading is checked against the earlier
/// one; a field missing from the earlier reading counts as 0 and so can
/// never drop.
pub fn detect_reset_candidates(readings: &[Reading]) -> Vec<AnomalyCandidate> {
    let mut candidates = Vec::new();

    for pair in readings.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        for (field, &value) in &current.fields {
            let before = previous.value(field);
            if value < before {
                tracing::debug!(
                    target: event_names::DETECT_RESET,
                    timestamp = %current.timestamp,
                    field = %field,
                    previous = before,
                    current = value,
                    "register dropped"
                );
                candidates.push(AnomalyCandidate {
                    timestamp: current.timestamp,
                    field: field.clone(),
                    kind: AnomalyKind::Reset,
                    raw_value: value,
                    baseline: Some(before),
                });
            }
        }
    }

    candidates
}

/// Dates on which at least one register dropped.
///
/// Several fields dropping on one date yield a single entry. Output is
/// ascending when the input is.
pub fn detect_reset_dates(readings: &[Reading]) -> Vec<Timestamp> {
    let mut dates: Vec<Timestamp> = Vec::new();
    for candidate in detect_reset_candidates(readings) {
        if dates.last() != Some(&candidate.timestamp) {
            dates.push(candidate.timestamp);
        }
    }
    dates
}

/// Average growth of the established fields between two readings.
///
/// A field is established when its earlier value is positive. Returns 0 when
/// no field is established.
pub fn established_baseline(previous: &Reading, current: &Reading) -> f64 {
    let growth: Vec<f64> = previous
        .fields
        .iter()
        .filter(|(_, &before)| before > 0.0)
        .map(|(field, &before)| (current.value(field) - before).max(0.0))
        .collect();

    mean(&growth).unwrap_or(0.0)
}

/// Whether a new field's first value is large enough to be a spike.
pub fn is_spike(delta: f64, baseline: f64, thresholds: &SpikeThresholds) -> bool {
    if delta <= thresholds.min_absolute {
        return false;
    }
    if baseline == 0.0 {
        delta > thresholds.no_baseline_floor
    } else {
        delta > thresholds.baseline_multiplier * baseline
    }
}

/// Fields that appear from zero with a value far above the household's
/// usual growth, typically a room that started being recorded mid-series.
pub fn detect_new_field_spikes(
    readings: &[Reading],
    thresholds: &SpikeThresholds,
) -> Vec<AnomalyCandidate> {
    let mut spikes = Vec::new();

    for pair in readings.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        let baseline = established_baseline(previous, current);

        for (field, &value) in &current.fields {
            if previous.value(field) != 0.0 || value <= 0.0 {
                continue;
            }
            if is_spike(value, baseline, thresholds) {
                tracing::debug!(
                    target: event_names::DETECT_SPIKE,
                    timestamp = %current.timestamp,
                    field = %field,
                    value,
                    baseline,
                    "new field spike"
                );
                spikes.push(AnomalyCandidate {
                    timestamp: current.timestamp,
                    field: field.clone(),
                    kind: AnomalyKind::NewFieldSpike,
                    raw_value: value,
                    baseline: Some(baseline),
                });
            }
        }
    }

    spikes
}
