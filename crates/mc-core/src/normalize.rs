//! Daily-average rescaling of interval deltas.

use mc_common::{DeltaRecord, NormalizedRecord, Reading, Timestamp};
use mc_config::NormalizationSettings;
use mc_math::round_half_up;

use crate::logging::event_names;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days between two timestamps.
pub fn elapsed_days(from: Timestamp, to: Timestamp) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Interval length used for scaling.
///
/// Intervals at or below `min_interval_days` (same-day or sub-day entries,
/// and out-of-order pairs) count as `fallback_days`.
pub fn effective_days(days: f64, settings: &NormalizationSettings) -> f64 {
    if days <= settings.min_interval_days {
        settings.fallback_days
    } else {
        days
    }
}

/// Rescale deltas to a per-day rate.
///
/// `deltas[i]` covers `readings[i]..readings[i + 1]`. The result is padded
/// at the front with a copy of the first record stamped `readings[0]`, so it
/// lines up with the reading timeline. No deltas means no output.
pub fn calculate_daily_average(
    deltas: &[DeltaRecord],
    readings: &[Reading],
    settings: &NormalizationSettings,
) -> Vec<NormalizedRecord> {
    let mut normalized: Vec<NormalizedRecord> = deltas
        .iter()
        .zip(readings.windows(2))
        .map(|(delta, pair)| {
            let days = elapsed_days(pair[0].timestamp, pair[1].timestamp);
            let days_diff = effective_days(days, settings);
            if days_diff != days {
                tracing::trace!(
                    target: event_names::NORMALIZE_CLAMPED,
                    timestamp = %delta.timestamp,
                    days,
                    days_diff,
                    "short interval"
                );
            }

            let fields = delta
                .fields
                .iter()
                .map(|(field, &raw)| (field.clone(), round_half_up(raw / days_diff)))
                .collect();

            NormalizedRecord {
                timestamp: delta.timestamp,
                fields,
                raw: delta.fields.clone(),
                days_diff,
            }
        })
        .collect();

    if let (Some(first), Some(start)) = (normalized.first(), readings.first()) {
        let padding = NormalizedRecord {
            timestamp: start.timestamp,
            ..first.clone()
        };
        normalized.insert(0, padding);
    }

    normalized
}
