//! No-mock scenario tests for the correction engine.
//!
//! These tests use real reading fixtures (no mocks) and cover:
//! - The documented reference scenarios for every stage
//! - Full pipeline passes per meter kind, with and without confirmations
//! - Export rows built from the same reset-aware diff
//! - JSONL logging of a pipeline pass

use chrono::{DateTime, TimeZone, Utc};
use mc_common::{
    AnomalyKey, AnomalyKind, AnomalySet, FieldId, MeterKind, MeterReading, Reading, ResetDates,
};
use mc_config::{EngineConfig, NormalizationSettings, SpikeThresholds};
use mc_core::logging::JsonlLayer;
use mc_core::{
    calculate_daily_average, calculate_deltas, correct_spikes, detect_new_field_spikes,
    detect_reset_dates, tabular_rows, ConsumptionPipeline, ConsumptionRequest, DeltaPolicy,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Fixture Helpers
// ============================================================================

fn fixtures_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .leak()
}

fn load_fixture(name: &str) -> Vec<MeterReading> {
    let path = fixtures_dir().join(name);
    let content = fs::read_to_string(&path).expect("read reading fixture");
    serde_json::from_str(&content).expect("parse reading fixture")
}

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn series(readings: &[Reading], field: &str) -> Vec<f64> {
    let field = FieldId::new(field);
    readings.iter().map(|r| r.value(&field)).collect()
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn scenario_flat_field_increase() {
    let readings = [
        Reading::from_pairs(ts(2024, 1, 1), [("kitchen_warm", 100.0)]),
        Reading::from_pairs(ts(2024, 1, 2), [("kitchen_warm", 101.0)]),
    ];
    let policy = DeltaPolicy::for_shape(MeterKind::Water.shape(), &Default::default());
    let deltas = calculate_deltas(&readings, policy, &AnomalySet::new());
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].fields[&FieldId::new("kitchen_warm")], 1.0);
}

#[test]
fn scenario_dynamic_field_reset() {
    let readings = [
        Reading::from_pairs(ts(2024, 1, 1), [("r", 100.0)]),
        Reading::from_pairs(ts(2024, 1, 2), [("r", 50.0)]),
    ];
    let policy = DeltaPolicy::for_shape(MeterKind::Heating.shape(), &Default::default());
    let deltas = calculate_deltas(&readings, policy, &AnomalySet::new());
    assert_eq!(deltas[0].fields[&FieldId::new("r")], 50.0);
}

#[test]
fn scenario_new_room_spike_detected() {
    let readings = [
        Reading::from_pairs(ts(2024, 1, 1), [("r1", 100.0), ("r2", 0.0)]),
        Reading::from_pairs(ts(2024, 1, 2), [("r1", 110.0), ("r2", 500.0)]),
    ];
    let spikes = detect_new_field_spikes(&readings, &SpikeThresholds::default());
    assert_eq!(spikes.len(), 1);
    assert_eq!(spikes[0].field, FieldId::new("r2"));
    assert_eq!(spikes[0].raw_value, 500.0);
    assert_eq!(spikes[0].baseline, Some(10.0));
}

#[test]
fn scenario_spike_offset_self_heals() {
    let readings = [
        Reading::from_pairs(ts(2024, 1, 1), [("r1", 100.0), ("r2", 0.0)]),
        Reading::from_pairs(ts(2024, 1, 2), [("r1", 110.0), ("r2", 500.0)]),
        Reading::from_pairs(ts(2024, 1, 3), [("r1", 120.0), ("r2", 0.0)]),
    ];
    let confirmed: AnomalySet = [AnomalyKey::new(ts(2024, 1, 2), "r2")].into_iter().collect();
    let corrected = correct_spikes(&readings, &confirmed);
    assert_eq!(series(&corrected, "r2"), vec![0.0, 0.0, 0.0]);
    assert_eq!(series(&corrected, "r1"), vec![100.0, 110.0, 120.0]);
}

#[test]
fn scenario_ten_day_daily_average() {
    let readings = [
        Reading::from_pairs(ts(2024, 1, 1), [("value", 0.0)]),
        Reading::from_pairs(ts(2024, 1, 11), [("value", 100.0)]),
    ];
    let deltas = calculate_deltas(&readings, DeltaPolicy::ResetReplace, &AnomalySet::new());
    let normalized = calculate_daily_average(&deltas, &readings, &NormalizationSettings::default());
    assert_eq!(normalized.len(), 2);
    assert_eq!(normalized[1].fields[&FieldId::single()], 10.0);
    assert_eq!(normalized[0].timestamp, ts(2024, 1, 1));
}

// ============================================================================
// Water Pipeline
// ============================================================================

#[test]
fn test_water_fixture_reset_flow() {
    let fixture = load_fixture("water_household.json");
    assert!(fixture.iter().all(|r| r.kind() == MeterKind::Water));

    let request = ConsumptionRequest::from_meter_readings(MeterKind::Water, &fixture)
        .with_family_size(2);
    let pipeline = ConsumptionPipeline::default();

    // Review step: the kitchen hot-water meter was replaced on 2024-03-31
    assert_eq!(detect_reset_dates(&request.readings), vec![ts(2024, 3, 31)]);
    let unconfirmed = pipeline.run(&request);
    assert_eq!(unconfirmed.candidates.len(), 1);
    assert_eq!(unconfirmed.candidates[0].kind, AnomalyKind::Reset);
    let kitchen_warm: Vec<f64> = unconfirmed
        .normalized
        .iter()
        .map(|r| r.fields[&FieldId::new("kitchen_warm")])
        .collect();
    assert_eq!(kitchen_warm, vec![10.0, 10.0, 10.0, 0.0, 10.0]);

    let confirmed: ResetDates = unconfirmed.candidates.iter().map(|c| c.timestamp).collect();
    let report = pipeline.run(&request.clone().with_confirmed_resets(confirmed));

    assert_eq!(
        series(&report.corrected, "kitchen_warm"),
        vec![1000.0, 1300.0, 1600.0, 1900.0, 2200.0]
    );
    assert_eq!(report.normalized.len(), fixture.len());
    for record in &report.normalized {
        assert_eq!(record.fields[&FieldId::new("kitchen_warm")], 10.0);
        assert_eq!(record.fields[&FieldId::new("kitchen_cold")], 20.0);
        assert_eq!(record.fields[&FieldId::new("bathroom_warm")], 50.0);
        assert_eq!(record.fields[&FieldId::new("bathroom_cold")], 80.0);
        assert_eq!(record.days_diff, 30.0);
    }

    assert_eq!(report.comparison.len(), report.normalized.len());
    let daily: f64 = report.comparison[0].fields.values().sum();
    let expected = EngineConfig::default().benchmarks.water_liters_per_person_per_day * 2.0;
    assert!((daily - expected).abs() < 1e-9);

    assert_eq!(report.trends.len(), 4);
    assert!(report
        .trends
        .iter()
        .all(|t| t.fit.slope.abs() < 1e-9 && t.points.len() == fixture.len()));
}

#[test]
fn test_water_unified_semantics_counts_reset_value() {
    let fixture = load_fixture("water_household.json");
    let mut config = EngineConfig::default();
    config.delta.unify_reset_semantics = true;
    let pipeline = ConsumptionPipeline::new(config).expect("valid config");

    let report = pipeline.run(&ConsumptionRequest::from_meter_readings(
        MeterKind::Water,
        &fixture,
    ));
    let field = FieldId::new("kitchen_warm");
    assert_eq!(report.deltas[2].fields[&field], 300.0);
}

// ============================================================================
// Heating Pipeline
// ============================================================================

#[test]
fn test_heating_fixture_spike_flow() {
    let fixture = load_fixture("heating_rooms.json");
    let request = ConsumptionRequest::from_meter_readings(MeterKind::Heating, &fixture);
    let pipeline = ConsumptionPipeline::default();

    let unconfirmed = pipeline.run(&request);
    assert_eq!(unconfirmed.candidates.len(), 1);
    let spike = &unconfirmed.candidates[0];
    assert_eq!(spike.field, FieldId::new("office"));
    assert_eq!(spike.timestamp, ts(2024, 1, 15));
    assert_eq!(spike.baseline, Some(52.5));

    let office = FieldId::new("office");
    let raw_deltas: Vec<f64> = unconfirmed.deltas.iter().map(|d| d.fields[&office]).collect();
    assert_eq!(raw_deltas, vec![0.0, 900.0, 35.0, 10.0]);

    let confirmed: AnomalySet = unconfirmed.candidates.iter().collect();
    let report = pipeline.run(&request.clone().with_confirmed_spikes(confirmed));

    // the office meter was swapped on 2024-01-29, so the stale offset heals
    assert_eq!(series(&report.corrected, "office"), vec![0.0, 0.0, 0.0, 35.0, 10.0]);
    let deltas: Vec<f64> = report.deltas.iter().map(|d| d.fields[&office]).collect();
    assert_eq!(deltas, vec![0.0, 0.0, 35.0, 10.0]);

    let living: Vec<f64> = report
        .normalized
        .iter()
        .map(|r| r.fields[&FieldId::new("living")])
        .collect();
    assert_eq!(living, vec![10.0, 10.0, 10.0, 10.0, 10.0]);
    assert!(report.comparison.is_empty());
    assert_eq!(report.trends.len(), 3);
}

#[test]
fn test_heating_exclusion_zeroes_spike_interval() {
    let fixture = load_fixture("heating_rooms.json");
    let exclusions: AnomalySet = [AnomalyKey::new(ts(2024, 1, 15), "office")]
        .into_iter()
        .collect();
    let request = ConsumptionRequest::from_meter_readings(MeterKind::Heating, &fixture)
        .with_exclusions(exclusions);
    let report = ConsumptionPipeline::default().run(&request);

    let office = FieldId::new("office");
    let deltas: Vec<f64> = report.deltas.iter().map(|d| d.fields[&office]).collect();
    assert_eq!(deltas, vec![0.0, 0.0, 35.0, 10.0]);
}

// ============================================================================
// Electricity Pipeline
// ============================================================================

#[test]
fn test_electricity_fixture_flow() {
    let fixture = load_fixture("electricity.json");
    let request = ConsumptionRequest::from_meter_readings(MeterKind::Electricity, &fixture)
        .with_family_size(2);
    let report = ConsumptionPipeline::default().run(&request);

    // the drop on 2024-04-01 is advisory only
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.corrected, request.readings);

    let value = FieldId::single();
    let normalized: Vec<f64> = report.normalized.iter().map(|r| r.fields[&value]).collect();
    assert_eq!(normalized, vec![10.0, 10.0, 10.0, 10.0]);

    assert_eq!(report.comparison.len(), fixture.len());
    let per_year = EngineConfig::default()
        .benchmarks
        .electricity_kwh_per_person_per_year;
    let expected = per_year / 365.25 * 2.0;
    assert!(report
        .comparison
        .iter()
        .all(|p| (p.fields[&value] - expected).abs() < 1e-9));
}

// ============================================================================
// Export Rows
// ============================================================================

#[test]
fn test_export_rows_match_report() {
    let fixture = load_fixture("electricity.json");
    let request = ConsumptionRequest::from_meter_readings(MeterKind::Electricity, &fixture);
    let pipeline = ConsumptionPipeline::default();
    let report = pipeline.run(&request);

    let rows = tabular_rows(
        &report.corrected,
        pipeline.policy_for(MeterKind::Electricity),
        &request.exclusions,
    );
    assert_eq!(rows.len(), fixture.len());
    assert!(rows[0].consumption.is_none());
    for (row, delta) in rows[1..].iter().zip(&report.deltas) {
        assert_eq!(row.consumption.as_ref(), Some(&delta.fields));
    }
    assert_eq!(rows[3].consumption.as_ref().unwrap()[&FieldId::single()], 310.0);
}

// ============================================================================
// Logging
// ============================================================================

struct BufWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_pipeline_emits_jsonl_events() {
    let fixture = load_fixture("heating_rooms.json");
    let request = ConsumptionRequest::from_meter_readings(MeterKind::Heating, &fixture);

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(JsonlLayer::new(BufWriter(buffer.clone())));
    tracing::subscriber::with_default(subscriber, || {
        ConsumptionPipeline::default().run(&request);
    });

    let output = buffer.lock().unwrap();
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid JSONL"))
        .collect();

    let started = lines
        .iter()
        .find(|l| l["event"] == "pipeline.started")
        .expect("pipeline.started event");
    assert_eq!(started["meter"], "heating");
    assert!(started["pass_id"].is_u64());

    let spike = lines
        .iter()
        .find(|l| l["event"] == "detect.spike")
        .expect("detect.spike event");
    assert_eq!(spike["stage"], "detect");
    assert_eq!(spike["fields"]["field"], "office");

    assert!(lines.iter().any(|l| l["event"] == "pipeline.finished"));
}

#[test]
fn test_unsorted_input_is_reported() {
    let mut fixture = load_fixture("electricity.json");
    fixture.reverse();
    let request = ConsumptionRequest::from_meter_readings(MeterKind::Electricity, &fixture);

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(JsonlLayer::new(BufWriter(buffer.clone())));
    tracing::subscriber::with_default(subscriber, || {
        ConsumptionPipeline::default().run(&request);
    });

    let output = buffer.lock().unwrap();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("pipeline.unsorted_input"));
}
