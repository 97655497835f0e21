//! Structured event definitions for logging.
//!
//! Engine stages emit `tracing` events whose target is one of the
//! [`event_names`] constants, so JSONL consumers can filter on `event`.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of a correction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Anomaly candidate detection.
    Detect,
    /// Offset correction with confirmed anomalies.
    Correct,
    /// Cumulative → delta conversion.
    Delta,
    /// Daily-average rescaling.
    Normalize,
    /// Benchmark series generation.
    Compare,
    /// Trendline fitting.
    Trend,
    /// Tabular row building for export collaborators.
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Detect => "detect",
            Stage::Correct => "correct",
            Stage::Delta => "delta",
            Stage::Normalize => "normalize",
            Stage::Compare => "compare",
            Stage::Trend => "trend",
            Stage::Export => "export",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Pipeline lifecycle
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    pub const PIPELINE_FINISHED: &str = "pipeline.finished";
    pub const PIPELINE_UNSORTED_INPUT: &str = "pipeline.unsorted_input";

    // Detect stage
    pub const DETECT_RESET: &str = "detect.reset";
    pub const DETECT_SPIKE: &str = "detect.spike";

    // Correct stage
    pub const CORRECT_OFFSET_APPLIED: &str = "correct.offset_applied";
    pub const CORRECT_OFFSET_HEALED: &str = "correct.offset_healed";

    // Normalize stage
    pub const NORMALIZE_CLAMPED: &str = "normalize.clamped";

    // Config events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
}
