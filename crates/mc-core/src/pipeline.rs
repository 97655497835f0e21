//! One-call correction pass over a meter's readings.
//!
//! The pipeline picks the stages a meter kind needs and runs them in order:
//! detect (advisory) → correct (confirmed anomalies) → delta → normalize →
//! compare → trend. Each run opens an `info` span carrying a pass ID and the
//! meter kind, with a nested span per stage.

use std::sync::atomic::{AtomicU64, Ordering};

use mc_common::{
    is_ascending, readings_from, AnomalyCandidate, AnomalySet, ComparisonPoint, DeltaRecord,
    MeterKind, MeterReading, NormalizedRecord, Reading, ResetDates, SCHEMA_VERSION,
};
use mc_config::{validate_config, EngineConfig};
use serde::{Deserialize, Serialize};

use crate::compare::{electricity_comparison, water_comparison};
use crate::correct::{correct_resets, correct_spikes};
use crate::delta::{calculate_deltas, DeltaPolicy};
use crate::detect::{detect_new_field_spikes, detect_reset_candidates};
use crate::logging::{event_names, Stage};
use crate::normalize::calculate_daily_average;
use crate::trend::{trends_for, FieldTrend};

static PASS_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Inputs for one correction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRequest {
    pub meter: MeterKind,
    /// Ascending cumulative readings.
    pub readings: Vec<Reading>,
    /// Reviewer-confirmed reset dates (water).
    #[serde(default)]
    pub confirmed_resets: ResetDates,
    /// Reviewer-confirmed new-field spikes (heating).
    #[serde(default)]
    pub confirmed_spikes: AnomalySet,
    /// Pairs whose delta is forced to zero.
    #[serde(default)]
    pub exclusions: AnomalySet,
    /// Household size for benchmark series; 0 disables them.
    #[serde(default)]
    pub family_size: u32,
}

impl ConsumptionRequest {
    pub fn new(meter: MeterKind, readings: Vec<Reading>) -> Self {
        ConsumptionRequest {
            meter,
            readings,
            confirmed_resets: ResetDates::new(),
            confirmed_spikes: AnomalySet::new(),
            exclusions: AnomalySet::new(),
            family_size: 0,
        }
    }

    /// Request from shape-specific readings.
    pub fn from_meter_readings(meter: MeterKind, readings: &[MeterReading]) -> Self {
        Self::new(meter, readings_from(readings))
    }

    pub fn with_confirmed_resets(mut self, resets: ResetDates) -> Self {
        self.confirmed_resets = resets;
        self
    }

    pub fn with_confirmed_spikes(mut self, spikes: AnomalySet) -> Self {
        self.confirmed_spikes = spikes;
        self
    }

    pub fn with_exclusions(mut self, exclusions: AnomalySet) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_family_size(mut self, family_size: u32) -> Self {
        self.family_size = family_size;
        self
    }
}

/// Everything a chart or export needs from one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionReport {
    pub schema_version: String,
    pub meter: MeterKind,
    /// Advisory anomalies found in the raw readings.
    pub candidates: Vec<AnomalyCandidate>,
    /// Readings after confirmed corrections.
    pub corrected: Vec<Reading>,
    pub deltas: Vec<DeltaRecord>,
    /// Daily averages, padded to the reading timeline.
    pub normalized: Vec<NormalizedRecord>,
    /// Benchmark series aligned with `normalized`; empty for heating.
    pub comparison: Vec<ComparisonPoint>,
    pub trends: Vec<FieldTrend>,
}

/// Validated engine configuration bound to the correction stages.
#[derive(Debug, Clone)]
pub struct ConsumptionPipeline {
    config: EngineConfig,
}

impl ConsumptionPipeline {
    /// Create a pipeline, rejecting invalid configuration.
    pub fn new(config: EngineConfig) -> mc_common::Result<Self> {
        validate_config(&config)?;
        Ok(ConsumptionPipeline { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Delta policy used for a meter kind under this configuration.
    pub fn policy_for(&self, meter: MeterKind) -> DeltaPolicy {
        DeltaPolicy::for_shape(meter.shape(), &self.config.delta)
    }

    /// Run every stage for the request's meter kind.
    pub fn run(&self, request: &ConsumptionRequest) -> ConsumptionReport {
        let pass_id = PASS_COUNTER.fetch_add(1, Ordering::Relaxed);
        let span = tracing::info_span!("pass", pass_id, meter = request.meter.as_str());
        let _enter = span.enter();

        let readings = &request.readings;
        tracing::info!(
            target: event_names::PIPELINE_STARTED,
            readings = readings.len(),
            "correction pass started"
        );
        if !is_ascending(readings) {
            tracing::warn!(
                target: event_names::PIPELINE_UNSORTED_INPUT,
                "readings are not in ascending order; results are unspecified"
            );
        }

        let candidates = in_stage(Stage::Detect, || self.detect(request.meter, readings));
        let corrected = in_stage(Stage::Correct, || self.correct(request));

        let policy = self.policy_for(request.meter);
        let deltas = in_stage(Stage::Delta, || {
            calculate_deltas(&corrected, policy, &request.exclusions)
        });
        let normalized = in_stage(Stage::Normalize, || {
            calculate_daily_average(&deltas, &corrected, &self.config.normalization)
        });
        let comparison = in_stage(Stage::Compare, || {
            self.compare(request.meter, &deltas, &normalized, request.family_size)
        });
        let trends = in_stage(Stage::Trend, || trends_for(&normalized));

        tracing::info!(
            target: event_names::PIPELINE_FINISHED,
            candidates = candidates.len(),
            deltas = deltas.len(),
            "correction pass finished"
        );

        ConsumptionReport {
            schema_version: SCHEMA_VERSION.to_string(),
            meter: request.meter,
            candidates,
            corrected,
            deltas,
            normalized,
            comparison,
            trends,
        }
    }

    fn detect(&self, meter: MeterKind, readings: &[Reading]) -> Vec<AnomalyCandidate> {
        match meter {
            MeterKind::Water | MeterKind::Electricity => detect_reset_candidates(readings),
            MeterKind::Heating => detect_new_field_spikes(readings, &self.config.detection),
        }
    }

    fn correct(&self, request: &ConsumptionRequest) -> Vec<Reading> {
        match request.meter {
            MeterKind::Water => correct_resets(&request.readings, &request.confirmed_resets),
            MeterKind::Heating => correct_spikes(&request.readings, &request.confirmed_spikes),
            MeterKind::Electricity => request.readings.clone(),
        }
    }

    fn compare(
        &self,
        meter: MeterKind,
        deltas: &[DeltaRecord],
        normalized: &[NormalizedRecord],
        family_size: u32,
    ) -> Vec<ComparisonPoint> {
        let benchmarks = &self.config.benchmarks;
        match meter {
            MeterKind::Water => water_comparison(
                normalized,
                benchmarks.water_liters_per_person_per_day,
                family_size,
            ),
            MeterKind::Electricity => electricity_comparison(
                deltas,
                benchmarks.electricity_kwh_per_person_per_year,
                family_size,
            ),
            MeterKind::Heating => Vec::new(),
        }
    }
}

impl Default for ConsumptionPipeline {
    fn default() -> Self {
        ConsumptionPipeline {
            config: EngineConfig::default(),
        }
    }
}

fn in_stage<T>(stage: Stage, f: impl FnOnce() -> T) -> T {
    tracing::debug_span!("stage", stage = stage.as_str()).in_scope(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use mc_common::{AnomalyKey, FieldId, Timestamp};

    fn day(d: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::days(d)
    }

    fn reading(d: i64, pairs: &[(&str, f64)]) -> Reading {
        Reading::from_pairs(day(d), pairs.iter().copied())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.normalization.fallback_days = 0.0;
        let err = ConsumptionPipeline::new(config).unwrap_err();
        assert_eq!(err.code(), 11);
    }

    #[test]
    fn empty_request_yields_empty_report() {
        let pipeline = ConsumptionPipeline::default();
        let report = pipeline.run(&ConsumptionRequest::new(MeterKind::Water, Vec::new()));
        assert!(report.candidates.is_empty());
        assert!(report.corrected.is_empty());
        assert!(report.deltas.is_empty());
        assert!(report.normalized.is_empty());
        assert!(report.comparison.is_empty());
        assert!(report.trends.is_empty());
        assert_eq!(report.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn water_reset_is_corrected_and_clamped() {
        let readings = vec![
            reading(0, &[("kitchen_warm", 100.0)]),
            reading(1, &[("kitchen_warm", 110.0)]),
            reading(2, &[("kitchen_warm", 4.0)]),
            reading(3, &[("kitchen_warm", 9.0)]),
        ];
        let pipeline = ConsumptionPipeline::default();

        // unconfirmed: the drop shows as a candidate and clamps to zero
        let request = ConsumptionRequest::new(MeterKind::Water, readings).with_family_size(2);
        let report = pipeline.run(&request);
        assert_eq!(report.candidates.len(), 1);
        let warm = FieldId::new("kitchen_warm");
        let deltas: Vec<f64> = report.deltas.iter().map(|d| d.fields[&warm]).collect();
        assert_eq!(deltas, vec![10.0, 0.0, 5.0]);

        // confirmed: the series continues across the reset
        let confirmed = request
            .clone()
            .with_confirmed_resets([day(2)].into_iter().collect());
        let report = pipeline.run(&confirmed);
        let deltas: Vec<f64> = report.deltas.iter().map(|d| d.fields[&warm]).collect();
        assert_eq!(deltas, vec![10.0, 4.0, 5.0]);
        assert_eq!(report.normalized.len(), 4);
        assert_eq!(report.comparison.len(), 4);
        assert_eq!(report.trends.len(), 1);
    }

    #[test]
    fn heating_spike_confirmation() {
        let readings = vec![
            reading(0, &[("r1", 100.0), ("r2", 0.0)]),
            reading(1, &[("r1", 110.0), ("r2", 500.0)]),
            reading(2, &[("r1", 120.0), ("r2", 512.0)]),
        ];
        let request = ConsumptionRequest::new(MeterKind::Heating, readings)
            .with_confirmed_spikes([AnomalyKey::new(day(1), "r2")].into_iter().collect())
            .with_family_size(3);
        let report = ConsumptionPipeline::default().run(&request);

        assert_eq!(report.candidates.len(), 1);
        let r2 = FieldId::new("r2");
        let deltas: Vec<f64> = report.deltas.iter().map(|d| d.fields[&r2]).collect();
        assert_eq!(deltas, vec![0.0, 12.0]);
        assert!(report.comparison.is_empty());
    }

    #[test]
    fn electricity_comparison_lines_up() {
        let readings = vec![
            reading(0, &[("value", 1000.0)]),
            reading(2, &[("value", 1010.0)]),
            reading(4, &[("value", 6.0)]),
        ];
        let request = ConsumptionRequest::new(MeterKind::Electricity, readings).with_family_size(1);
        let report = ConsumptionPipeline::default().run(&request);

        let value = FieldId::single();
        let normalized: Vec<f64> = report.normalized.iter().map(|r| r.fields[&value]).collect();
        assert_eq!(normalized, vec![5.0, 5.0, 3.0]);
        assert_eq!(report.comparison.len(), report.normalized.len());
        assert_eq!(report.corrected, request.readings);
    }

    #[test]
    fn unified_semantics_switch() {
        let mut config = EngineConfig::default();
        config.delta.unify_reset_semantics = true;
        let pipeline = ConsumptionPipeline::new(config).unwrap();
        assert_eq!(pipeline.policy_for(MeterKind::Water), DeltaPolicy::ResetReplace);
        assert_eq!(
            ConsumptionPipeline::default().policy_for(MeterKind::Water),
            DeltaPolicy::ClampNegative
        );
    }

    #[test]
    fn report_serializes() {
        let readings = vec![reading(0, &[("value", 1.0)]), reading(1, &[("value", 2.0)])];
        let report = ConsumptionPipeline::default()
            .run(&ConsumptionRequest::new(MeterKind::Electricity, readings));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["meter"], "electricity");
        assert_eq!(json["deltas"].as_array().unwrap().len(), 1);
    }
}
