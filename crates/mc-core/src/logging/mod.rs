//! Structured logging foundation for mc-core.
//!
//! Two output modes share one set of event targets: a console format for
//! people and one JSON object per line for log collectors.
//!
//! # Usage
//!
//! ```ignore
//! use mc_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//! ```
//!
//! The engine never installs a subscriber on its own; embedding
//! applications call [`init_logging`] once, or wire their own subscriber.
//! All output goes to stderr.

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Target prefixes emitted by the engine and its config loader.
const TARGET_PREFIXES: &[&str] = &[
    "mc_core",
    "mc_config",
    "pipeline",
    "detect",
    "correct",
    "normalize",
    "config",
];

/// Default filter directives for a level, one per engine target prefix.
pub fn default_directives(level: LogLevel) -> String {
    TARGET_PREFIXES
        .iter()
        .map(|prefix| format!("{prefix}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber described by `config`.
///
/// Call once at startup. `RUST_LOG` directives, when set, replace the
/// defaults entirely. A second call leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.level)));
    let ansi = std::io::stderr().is_terminal();

    // At most one of these is Some; a None layer is a no-op.
    let (timed, untimed, jsonl) = match config.format {
        LogFormat::Human if config.timestamps => (
            Some(fmt::layer().with_writer(std::io::stderr).with_ansi(ansi)),
            None,
            None,
        ),
        LogFormat::Human => (
            None,
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(ansi)
                    .without_time(),
            ),
            None,
        ),
        LogFormat::Jsonl => (None, None, Some(JsonlLayer::stderr())),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(timed)
        .with(untimed)
        .with(jsonl)
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}

/// [`init_logging`] with configuration taken from the environment only.
pub fn init_default_logging() {
    init_logging(&LogConfig::from_env(None, None));
}
