//! Meter correction engine configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for engine.json (detection thresholds, normalization,
//!   delta policy, benchmarks)
//! - Country benchmark presets
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for auditing a correction run

pub mod engine;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use engine::{Benchmarks, DeltaSettings, EngineConfig, NormalizationSettings, SpikeThresholds};
pub use preset::{get_preset, PresetName};
pub use resolve::{load_config, resolve_config, resolve_config_with, ConfigPath, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
