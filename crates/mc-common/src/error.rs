//! Error types for the meter correction engine.
//!
//! The engine stages themselves are total and never fail. Errors arise only
//! at the edges: loading, validating, and resolving configuration.
//!
//! Errors carry:
//! - Stable error codes for machine parsing
//! - A category for grouping
//! - A remediation hint for humans
//!
//! ```text
//! ✗ Invalid Configuration
//!   Reason: invalid value for detection.baseline_multiplier: must be > 0, got 0
//!   Fix: Correct the value in engine.json, or delete the file to use built-in defaults.
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for meter correction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors (thresholds, benchmarks, schema).
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for meter correction.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("unknown benchmark preset: {0}")]
    UnknownPreset(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::VersionMismatch { .. } => 12,
            Error::UnknownPreset(_) => 13,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::InvalidConfig { .. }
            | Error::VersionMismatch { .. }
            | Error::UnknownPreset(_) => ErrorCategory::Config,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig { .. } => "Invalid Configuration",
            Error::VersionMismatch { .. } => "Configuration Version Mismatch",
            Error::UnknownPreset(_) => "Unknown Benchmark Preset",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Check the syntax of engine.json.",
            Error::InvalidConfig { .. } => {
                "Correct the value in engine.json, or delete the file to use built-in defaults."
            }
            Error::VersionMismatch { .. } => {
                "Regenerate engine.json from the built-in defaults and reapply local changes."
            }
            Error::UnknownPreset(_) => "Use one of the preset names: de, at, ch, eu.",
            Error::Io(_) => "Check that the config file exists and is readable.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }
}

const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Three-line rendering for stderr: headline, reason, fix.
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let paint = |code: &'static str| if use_color { code } else { "" };
    let mut out = format!("{}✗{} {}\n", paint(RED), paint(RESET), err.headline());
    out.push_str(&format!("  Reason: {err}\n"));
    out.push_str(&format!(
        "  {}Fix:{} {}",
        paint(CYAN),
        paint(RESET),
        err.remediation()
    ));
    out
}
