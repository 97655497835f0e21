//! Register and room identity types.
//!
//! Every value in a reading is keyed by a [`FieldId`]. Water meters use a
//! fixed set of four registers, electricity a single register, and heating
//! an open-ended set of room IDs chosen by the caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Kitchen hot-water register.
pub const KITCHEN_WARM: &str = "kitchen_warm";
/// Kitchen cold-water register.
pub const KITCHEN_COLD: &str = "kitchen_cold";
/// Bathroom hot-water register.
pub const BATHROOM_WARM: &str = "bathroom_warm";
/// Bathroom cold-water register.
pub const BATHROOM_COLD: &str = "bathroom_cold";
/// The only register of a single-field meter.
pub const SINGLE_VALUE: &str = "value";

/// The four water registers, in display order.
pub const WATER_FIELDS: [&str; 4] = [KITCHEN_WARM, KITCHEN_COLD, BATHROOM_WARM, BATHROOM_COLD];

/// Identifier of one meter register or heating room.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct FieldId(pub String);

impl FieldId {
    /// Create a field ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        FieldId(id.into())
    }

    /// The single-register field used by electricity meters.
    pub fn single() -> Self {
        FieldId::new(SINGLE_VALUE)
    }

    /// The fixed water registers as field IDs.
    pub fn water_fields() -> [FieldId; 4] {
        WATER_FIELDS.map(FieldId::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        FieldId(id.to_string())
    }
}

impl From<String> for FieldId {
    fn from(id: String) -> Self {
        FieldId(id)
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
