//! Readings and the records derived from them.
//!
//! All record types expose the same `fields` map so the engine stages can
//! treat the three meter shapes uniformly. Maps are ordered by field ID,
//! which keeps every derived output deterministic.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::id::{FieldId, BATHROOM_COLD, BATHROOM_WARM, KITCHEN_COLD, KITCHEN_WARM};

/// Point in time a reading was taken.
pub type Timestamp = DateTime<Utc>;

/// Values keyed by register or room.
pub type FieldMap = BTreeMap<FieldId, f64>;

/// Anything positioned on the reading timeline.
pub trait Timestamped {
    fn timestamp(&self) -> Timestamp;
}

/// Layout of the registers in a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    /// A fixed set of named registers (water).
    FixedFields,
    /// An open-ended map of room IDs (heating).
    DynamicFields,
    /// One register (electricity).
    SingleField,
}

/// Utility being metered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MeterKind {
    Water,
    Heating,
    Electricity,
}

impl MeterKind {
    pub fn shape(self) -> RecordShape {
        match self {
            MeterKind::Water => RecordShape::FixedFields,
            MeterKind::Heating => RecordShape::DynamicFields,
            MeterKind::Electricity => RecordShape::SingleField,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MeterKind::Water => "water",
            MeterKind::Heating => "heating",
            MeterKind::Electricity => "electricity",
        }
    }
}

impl std::fmt::Display for MeterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cumulative snapshot of one or more registers.
///
/// Registers are expected to be non-decreasing between readings except
/// at a reset. A register absent from the map reads as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Reading {
    pub timestamp: Timestamp,
    pub fields: FieldMap,
}

impl Reading {
    pub fn new(timestamp: Timestamp, fields: FieldMap) -> Self {
        Self { timestamp, fields }
    }

    /// Build a reading from `(field, value)` pairs.
    pub fn from_pairs<I, K>(timestamp: Timestamp, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<FieldId>,
    {
        Self {
            timestamp,
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Value of a register, zero when absent.
    pub fn value(&self, field: &FieldId) -> f64 {
        self.fields.get(field).copied().unwrap_or(0.0)
    }
}

impl Timestamped for Reading {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// A reading in one of the three concrete meter layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeterReading {
    Water {
        timestamp: Timestamp,
        kitchen_warm: f64,
        kitchen_cold: f64,
        bathroom_warm: f64,
        bathroom_cold: f64,
    },
    Heating {
        timestamp: Timestamp,
        rooms: FieldMap,
    },
    Electricity {
        timestamp: Timestamp,
        value: f64,
    },
}

impl MeterReading {
    pub fn kind(&self) -> MeterKind {
        match self {
            MeterReading::Water { .. } => MeterKind::Water,
            MeterReading::Heating { .. } => MeterKind::Heating,
            MeterReading::Electricity { .. } => MeterKind::Electricity,
        }
    }

    /// Uniform field-map view of this reading.
    pub fn to_reading(&self) -> Reading {
        match self {
            MeterReading::Water {
                timestamp,
                kitchen_warm,
                kitchen_cold,
                bathroom_warm,
                bathroom_cold,
            } => Reading::from_pairs(
                *timestamp,
                [
                    (KITCHEN_WARM, *kitchen_warm),
                    (KITCHEN_COLD, *kitchen_cold),
                    (BATHROOM_WARM, *bathroom_warm),
                    (BATHROOM_COLD, *bathroom_cold),
                ],
            ),
            MeterReading::Heating { timestamp, rooms } => Reading::new(*timestamp, rooms.clone()),
            MeterReading::Electricity { timestamp, value } => {
                Reading::from_pairs(*timestamp, [(FieldId::single(), *value)])
            }
        }
    }
}

impl Timestamped for MeterReading {
    fn timestamp(&self) -> Timestamp {
        match self {
            MeterReading::Water { timestamp, .. }
            | MeterReading::Heating { timestamp, .. }
            | MeterReading::Electricity { timestamp, .. } => *timestamp,
        }
    }
}

/// Convert typed meter readings into the uniform view.
pub fn readings_from(readings: &[MeterReading]) -> Vec<Reading> {
    readings.iter().map(MeterReading::to_reading).collect()
}

/// Whether a series is in non-decreasing timestamp order.
pub fn is_ascending<T: Timestamped>(records: &[T]) -> bool {
    records
        .windows(2)
        .all(|pair| pair[0].timestamp() <= pair[1].timestamp())
}

/// Consumption attributed to the interval ending at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeltaRecord {
    pub timestamp: Timestamp,
    pub fields: FieldMap,
}

impl Timestamped for DeltaRecord {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// A delta rescaled to a per-day rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedRecord {
    pub timestamp: Timestamp,
    /// Per-day values, rounded.
    pub fields: FieldMap,
    /// The interval delta before scaling.
    pub raw: FieldMap,
    /// Elapsed days the delta was divided by.
    pub days_diff: f64,
}

impl Timestamped for NormalizedRecord {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Benchmark value(s) aligned with a normalized series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonPoint {
    pub timestamp: Timestamp,
    pub fields: FieldMap,
}

impl Timestamped for ComparisonPoint {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
