//! Country benchmark presets.
//!
//! Provides per-person reference consumption for the comparison series:
//! - Germany (default)
//! - Austria
//! - Switzerland
//! - EU average
//!
//! Figures are rounded household averages; callers with better local data
//! set `benchmarks` in engine.json directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::Benchmarks;

/// Available benchmark presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    Germany,
    Austria,
    Switzerland,
    EuAverage,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Germany,
        PresetName::Austria,
        PresetName::Switzerland,
        PresetName::EuAverage,
    ];

    /// Country code of the preset.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Germany => "de",
            PresetName::Austria => "at",
            PresetName::Switzerland => "ch",
            PresetName::EuAverage => "eu",
        }
    }

    /// Parse preset name from a country code or name.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "de" | "deu" | "germany" => Some(PresetName::Germany),
            "at" | "aut" | "austria" => Some(PresetName::Austria),
            "ch" | "che" | "switzerland" => Some(PresetName::Switzerland),
            "eu" | "europe" | "eu_average" => Some(PresetName::EuAverage),
            _ => None,
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = mc_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| mc_common::Error::UnknownPreset(s.to_string()))
    }
}

/// Benchmarks for a preset.
pub fn get_preset(name: PresetName) -> Benchmarks {
    let (water, electricity) = match name {
        PresetName::Germany => (125.0, 1500.0),
        PresetName::Austria => (130.0, 1700.0),
        PresetName::Switzerland => (142.0, 2000.0),
        PresetName::EuAverage => (144.0, 1600.0),
    };
    Benchmarks {
        country: name.as_str().to_string(),
        water_liters_per_person_per_day: water,
        electricity_kwh_per_person_per_year: electricity,
    }
}
