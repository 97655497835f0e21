//! Per-field trendlines over a normalized series.

use std::collections::BTreeSet;

use mc_common::{FieldId, NormalizedRecord};
use mc_math::{linear_regression, trendline_from_fit, LinearFit};
use serde::{Deserialize, Serialize};

/// Fitted trend for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTrend {
    pub field: FieldId,
    pub fit: LinearFit,
    /// Rounded, non-negative line values, one per input record.
    pub points: Vec<f64>,
}

/// Trend of one field; records without the field contribute 0.
pub fn field_trend(records: &[NormalizedRecord], field: &FieldId) -> FieldTrend {
    let series: Vec<f64> = records
        .iter()
        .map(|record| record.fields.get(field).copied().unwrap_or(0.0))
        .collect();
    let fit = linear_regression(&series);

    FieldTrend {
        field: field.clone(),
        fit,
        points: trendline_from_fit(&fit, series.len()),
    }
}

/// Trends for every field that appears anywhere in the series, in field order.
pub fn trends_for(records: &[NormalizedRecord]) -> Vec<FieldTrend> {
    let fields: BTreeSet<&FieldId> = records
        .iter()
        .flat_map(|record| record.fields.keys())
        .collect();

    fields
        .into_iter()
        .map(|field| field_trend(records, field))
        .collect()
}
