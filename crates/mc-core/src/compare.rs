//! Benchmark series aligned to a household's consumption timeline.
//!
//! Both generators emit a constant daily figure per point; the input records
//! only supply timestamps.

use mc_common::id::{BATHROOM_COLD, BATHROOM_WARM, KITCHEN_COLD, KITCHEN_WARM, SINGLE_VALUE};
use mc_common::{ComparisonPoint, FieldMap, FieldId, Timestamped};

/// Kitchen share of daily water use.
pub const KITCHEN_SHARE: f64 = 0.15;
/// Bathroom share of daily water use.
pub const BATHROOM_SHARE: f64 = 0.85;
/// Hot-water share within a room.
pub const WARM_SHARE: f64 = 0.40;
/// Cold-water share within a room.
pub const COLD_SHARE: f64 = 0.60;

/// Average year length used to spread annual electricity figures.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Daily household water benchmark split across the four registers.
pub fn water_split(liters_per_person_per_day: f64, family_size: u32) -> FieldMap {
    let total = liters_per_person_per_day * f64::from(family_size);
    let kitchen = total * KITCHEN_SHARE;
    let bathroom = total * BATHROOM_SHARE;

    [
        (KITCHEN_WARM, kitchen * WARM_SHARE),
        (KITCHEN_COLD, kitchen * COLD_SHARE),
        (BATHROOM_WARM, bathroom * WARM_SHARE),
        (BATHROOM_COLD, bathroom * COLD_SHARE),
    ]
    .into_iter()
    .map(|(field, value)| (FieldId::new(field), value))
    .collect()
}

/// Daily household electricity benchmark from an annual per-person figure.
pub fn electricity_daily(annual_kwh_per_person: f64, family_size: u32) -> f64 {
    annual_kwh_per_person / DAYS_PER_YEAR * f64::from(family_size)
}

/// One water benchmark point per record, stamped with the record's time.
///
/// Records are expected at daily-average scale already (normally the padded
/// normalized series). Empty for empty input or an empty household.
pub fn water_comparison<T: Timestamped>(
    records: &[T],
    liters_per_person_per_day: f64,
    family_size: u32,
) -> Vec<ComparisonPoint> {
    if records.is_empty() || family_size == 0 {
        return Vec::new();
    }

    let split = water_split(liters_per_person_per_day, family_size);
    records
        .iter()
        .map(|record| ComparisonPoint {
            timestamp: record.timestamp(),
            fields: split.clone(),
        })
        .collect()
}

/// Electricity benchmark points for the given records, plus a copy of the
/// first point at the front.
///
/// The extra point mirrors the padding [`calculate_daily_average`] adds, so
/// a delta-aligned input comes out aligned to the reading timeline.
///
/// [`calculate_daily_average`]: crate::normalize::calculate_daily_average
pub fn electricity_comparison<T: Timestamped>(
    records: &[T],
    annual_kwh_per_person: f64,
    family_size: u32,
) -> Vec<ComparisonPoint> {
    if records.is_empty() || family_size == 0 {
        return Vec::new();
    }

    let daily = electricity_daily(annual_kwh_per_person, family_size);
    let mut points: Vec<ComparisonPoint> = records
        .iter()
        .map(|record| ComparisonPoint {
            timestamp: record.timestamp(),
            fields: FieldMap::from([(FieldId::new(SINGLE_VALUE), daily)]),
        })
        .collect();

    if let Some(first) = points.first().cloned() {
        points.insert(0, first);
    }
    points
}
