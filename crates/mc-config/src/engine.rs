//! Engine configuration types.
//!
//! Every section defaults to the engine's reference behavior, so an empty
//! `{}` file (or no file at all) reproduces the built-in thresholds exactly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub detection: SpikeThresholds,

    #[serde(default)]
    pub normalization: NormalizationSettings,

    #[serde(default)]
    pub delta: DeltaSettings,

    #[serde(default)]
    pub benchmarks: Benchmarks,

    #[serde(default)]
    pub notes: Option<String>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            detection: SpikeThresholds::default(),
            normalization: NormalizationSettings::default(),
            delta: DeltaSettings::default(),
            benchmarks: Benchmarks::default(),
            notes: None,
        }
    }
}

/// Thresholds for flagging a new-field spike.
///
/// A field going from zero to `delta` is flagged when `delta > min_absolute`
/// and either `delta > baseline_multiplier × baseline` or, with no
/// established baseline, `delta > no_baseline_floor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SpikeThresholds {
    pub min_absolute: f64,
    pub baseline_multiplier: f64,
    pub no_baseline_floor: f64,
}

impl Default for SpikeThresholds {
    fn default() -> Self {
        Self {
            min_absolute: 50.0,
            baseline_multiplier: 5.0,
            no_baseline_floor: 100.0,
        }
    }
}

/// Guards for daily-average normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NormalizationSettings {
    /// Intervals at or below this many days are treated as too short.
    pub min_interval_days: f64,
    /// Day count used instead of a too-short interval.
    pub fallback_days: f64,
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        Self {
            min_interval_days: 0.5,
            fallback_days: 1.0,
        }
    }
}

/// Delta policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DeltaSettings {
    /// Apply reset-replace semantics to fixed-field (water) meters too.
    ///
    /// Off by default: water deltas clamp drops to zero, and switching
    /// this on changes historical water output.
    pub unify_reset_semantics: bool,
}

/// Benchmark consumption figures for comparison series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Benchmarks {
    /// ISO country code the figures belong to.
    pub country: String,
    pub water_liters_per_person_per_day: f64,
    pub electricity_kwh_per_person_per_year: f64,
}

impl Default for Benchmarks {
    fn default() -> Self {
        crate::preset::get_preset(crate::preset::PresetName::Germany)
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Canonical JSON form, used for hashing snapshots.
    pub fn to_canonical_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// JSON Schema describing engine.json.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(EngineConfig)).unwrap_or_default()
    }
}
