//! Meter Correction Core Library
//!
//! This library turns cumulative utility-meter readings into chartable
//! consumption figures:
//! - Cumulative → delta conversion with per-shape reset policies
//! - Advisory detection of resets and new-field spikes
//! - Offset correction for reviewer-confirmed anomalies
//! - Daily-average normalization and benchmark comparison series
//! - Per-field trendlines
//! - Table rows for export collaborators
//!
//! Every stage is a pure function of its inputs. [`pipeline`] wires them
//! together for a meter kind.

pub mod compare;
pub mod correct;
pub mod delta;
pub mod detect;
pub mod export;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod trend;

pub use compare::{electricity_comparison, water_comparison};
pub use correct::{correct_resets, correct_spikes, OffsetState};
pub use delta::{calculate_deltas, DeltaPolicy};
pub use detect::{detect_new_field_spikes, detect_reset_candidates, detect_reset_dates};
pub use export::{tabular_rows, TableRow};
pub use normalize::calculate_daily_average;
pub use pipeline::{ConsumptionPipeline, ConsumptionReport, ConsumptionRequest};
pub use trend::{field_trend, trends_for, FieldTrend};
