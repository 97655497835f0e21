//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::engine::{Benchmarks, EngineConfig, NormalizationSettings, SpikeThresholds};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for mc_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) | ValidationError::ParseError(msg) => {
                mc_common::Error::Config(msg)
            }
            ValidationError::InvalidValue { field, message } => {
                mc_common::Error::InvalidConfig { field, message }
            }
            ValidationError::VersionMismatch { expected, actual } => {
                mc_common::Error::VersionMismatch { expected, actual }
            }
        }
    }
}

/// Validate engine configuration semantically.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_thresholds(&config.detection)?;
    validate_normalization(&config.normalization)?;
    validate_benchmarks(&config.benchmarks)?;

    Ok(())
}

fn validate_thresholds(t: &SpikeThresholds) -> ValidationResult<()> {
    require_positive("detection.min_absolute", t.min_absolute)?;
    require_positive("detection.baseline_multiplier", t.baseline_multiplier)?;
    require_positive("detection.no_baseline_floor", t.no_baseline_floor)?;
    Ok(())
}

fn validate_normalization(n: &NormalizationSettings) -> ValidationResult<()> {
    if !n.min_interval_days.is_finite() || n.min_interval_days < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "normalization.min_interval_days".to_string(),
            message: format!("Must be >= 0, got {}", n.min_interval_days),
        });
    }
    // The fallback is a divisor.
    require_positive("normalization.fallback_days", n.fallback_days)
}

fn validate_benchmarks(b: &Benchmarks) -> ValidationResult<()> {
    require_non_negative(
        "benchmarks.water_liters_per_person_per_day",
        b.water_liters_per_person_per_day,
    )?;
    require_non_negative(
        "benchmarks.electricity_kwh_per_person_per_year",
        b.electricity_kwh_per_person_per_year,
    )
}

fn require_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be > 0, got {}", value),
        });
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be >= 0, got {}", value),
        });
    }
    Ok(())
}
