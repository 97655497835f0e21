//! Row model for spreadsheet and PDF collaborators.
//!
//! Export encoders render these rows as they like; the consumption column
//! comes from the same [`DeltaPolicy`] the charts use, so tables and charts
//! never disagree about a reset.

use mc_common::{AnomalySet, FieldMap, Reading, Timestamp};
use serde::{Deserialize, Serialize};

use crate::delta::{interval_delta, DeltaPolicy};

/// One table row: the reading as entered, plus the consumption since the
/// previous row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub timestamp: Timestamp,
    pub readings: FieldMap,
    /// `None` for the first row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption: Option<FieldMap>,
}

/// Build table rows for ascending readings.
pub fn tabular_rows(
    readings: &[Reading],
    policy: DeltaPolicy,
    exclusions: &AnomalySet,
) -> Vec<TableRow> {
    readings
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let consumption = i
                .checked_sub(1)
                .map(|j| interval_delta(&readings[j], current, policy, exclusions).fields);
            TableRow {
                timestamp: current.timestamp,
                readings: current.fields.clone(),
                consumption,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mc_common::FieldId;

    use crate::delta::calculate_deltas;

    fn reading(d: u32, value: f64) -> Reading {
        let ts = Utc.with_ymd_and_hms(2024, 6, d, 18, 0, 0).unwrap();
        Reading::from_pairs(ts, [("value", value)])
    }

    #[test]
    fn first_row_has_no_consumption() {
        let rows = tabular_rows(
            &[reading(1, 10.0), reading(2, 14.0)],
            DeltaPolicy::ResetReplace,
            &AnomalySet::new(),
        );
        assert_eq!(rows.len(), 2);
        assert!(rows[0].consumption.is_none());
        assert_eq!(rows[1].consumption.as_ref().unwrap()[&FieldId::single()], 4.0);
        assert_eq!(rows[1].readings[&FieldId::single()], 14.0);
    }

    #[test]
    fn rows_agree_with_deltas() {
        let readings = [reading(1, 100.0), reading(2, 30.0), reading(3, 45.0)];
        for policy in [DeltaPolicy::ResetReplace, DeltaPolicy::ClampNegative] {
            let rows = tabular_rows(&readings, policy, &AnomalySet::new());
            let deltas = calculate_deltas(&readings, policy, &AnomalySet::new());
            for (row, delta) in rows[1..].iter().zip(&deltas) {
                assert_eq!(row.consumption.as_ref(), Some(&delta.fields));
            }
        }
    }

    #[test]
    fn first_row_omits_consumption_in_json() {
        let rows = tabular_rows(&[reading(1, 1.0)], DeltaPolicy::ResetReplace, &AnomalySet::new());
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert!(json.get("consumption").is_none());
        assert_eq!(json["readings"]["value"], 1.0);
    }
}
