//! Configuration snapshots for auditing correction runs.
//!
//! A snapshot records which configuration produced a set of corrected
//! figures, so a chart can later be traced back to its thresholds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::EngineConfig;
use crate::resolve::{ConfigPath, ConfigSource};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Source of the configuration.
    pub config_source: String,

    /// SHA-256 of the canonical configuration JSON.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub spike_min_absolute: f64,
    pub spike_baseline_multiplier: f64,
    pub spike_no_baseline_floor: f64,
    pub min_interval_days: f64,
    pub unify_reset_semantics: bool,
    pub benchmark_country: String,
}

impl ConfigSnapshot {
    /// Create a snapshot of a loaded configuration.
    pub fn new(config: &EngineConfig, path: &ConfigPath) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_path: path.path.as_ref().map(|p| p.display().to_string()),
            config_source: path.source.to_string(),
            config_hash: hash_content(&config.to_canonical_json()),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Snapshot of the built-in defaults.
    pub fn defaults_only() -> Self {
        let path = ConfigPath {
            path: None,
            source: ConfigSource::BuiltinDefault,
        };
        Self::new(&EngineConfig::default(), &path)
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

impl ConfigSummary {
    fn from_config(config: &EngineConfig) -> Self {
        ConfigSummary {
            spike_min_absolute: config.detection.min_absolute,
            spike_baseline_multiplier: config.detection.baseline_multiplier,
            spike_no_baseline_floor: config.detection.no_baseline_floor,
            min_interval_days: config.normalization.min_interval_days,
            unify_reset_semantics: config.delta.unify_reset_semantics,
            benchmark_country: config.benchmarks.country.clone(),
        }
    }
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
