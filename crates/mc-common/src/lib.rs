//! Meter correction common types, field IDs, and errors.
//!
//! This crate provides the data model shared by the engine crates:
//! - Field identity and the three concrete record shapes
//! - Cumulative readings and the derived record types
//! - Anomaly candidates and confirmation sets
//! - Common error types

pub mod anomaly;
pub mod error;
pub mod id;
pub mod record;

pub use anomaly::{AnomalyCandidate, AnomalyKey, AnomalyKind, AnomalySet, ResetDates};
pub use error::{Error, ErrorCategory, Result};
pub use id::FieldId;
pub use record::{
    is_ascending, readings_from, ComparisonPoint, DeltaRecord, FieldMap, MeterKind, MeterReading,
    NormalizedRecord, Reading, RecordShape, Timestamp, Timestamped,
};

/// Schema version for serialized engine outputs.
pub const SCHEMA_VERSION: &str = "1.0.0";
