//! Locating and loading `engine.json`.
//!
//! Candidates are tried in order and the first existing file wins:
//! explicit path, `METER_CORRECTION_CONFIG`, `METER_CORRECTION_CONFIG_DIR`,
//! the user config directory, `/etc/meter-correction`. With no file the
//! built-in defaults apply.

use std::path::{Path, PathBuf};

use crate::engine::EngineConfig;
use crate::validate::validate_config;

/// Explicit path to an engine.json file.
pub const ENV_CONFIG_PATH: &str = "METER_CORRECTION_CONFIG";
/// Directory expected to hold an engine.json file.
pub const ENV_CONFIG_DIR: &str = "METER_CORRECTION_CONFIG_DIR";

pub const CONFIG_FILENAME: &str = "engine.json";

const APP_DIR: &str = "meter-correction";

/// Where the active configuration came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    CliArgument,
    Environment,
    XdgConfig,
    SystemConfig,
    #[default]
    BuiltinDefault,
}

impl ConfigSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::CliArgument => "CLI argument",
            ConfigSource::Environment => "environment variable",
            ConfigSource::XdgConfig => "XDG config",
            ConfigSource::SystemConfig => "system config",
            ConfigSource::BuiltinDefault => "builtin default",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved location of the configuration file, if any.
#[derive(Debug, Clone, Default)]
pub struct ConfigPath {
    /// `None` when running on built-in defaults.
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

impl ConfigPath {
    pub fn is_default(&self) -> bool {
        self.path.is_none()
    }
}

/// Resolve the configuration path from the process environment.
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPath {
    resolve_config_with(cli_path, |key| std::env::var(key).ok())
}

/// Resolve the configuration path with an arbitrary variable lookup.
pub fn resolve_config_with<F>(cli_path: Option<&Path>, lookup: F) -> ConfigPath
where
    F: Fn(&str) -> Option<String>,
{
    candidates(cli_path, &lookup)
        .into_iter()
        .find(|(path, _)| path.is_file())
        .map(|(path, source)| ConfigPath {
            path: Some(path),
            source,
        })
        .unwrap_or_default()
}

fn candidates<F>(cli_path: Option<&Path>, lookup: &F) -> Vec<(PathBuf, ConfigSource)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = Vec::with_capacity(5);
    if let Some(path) = cli_path {
        out.push((path.to_path_buf(), ConfigSource::CliArgument));
    }
    if let Some(path) = lookup(ENV_CONFIG_PATH) {
        out.push((PathBuf::from(path), ConfigSource::Environment));
    }
    if let Some(dir) = lookup(ENV_CONFIG_DIR) {
        out.push((
            PathBuf::from(dir).join(CONFIG_FILENAME),
            ConfigSource::Environment,
        ));
    }
    if let Some(dir) = xdg_config_dir() {
        out.push((dir.join(CONFIG_FILENAME), ConfigSource::XdgConfig));
    }
    out.push((
        system_config_dir().join(CONFIG_FILENAME),
        ConfigSource::SystemConfig,
    ));
    out
}

/// Resolve, parse, and validate the engine configuration.
///
/// A file that exists but fails to parse or validate is an error; it never
/// silently falls back to defaults.
pub fn load_config(cli_path: Option<&Path>) -> mc_common::Result<(EngineConfig, ConfigPath)> {
    let resolved = resolve_config(cli_path);

    let Some(path) = resolved.path.as_deref() else {
        tracing::debug!(target: "config.default_used", "no engine.json found, using defaults");
        return Ok((EngineConfig::default(), resolved));
    };

    let config = EngineConfig::from_file(path)?;
    validate_config(&config)?;
    tracing::info!(
        target: "config.loaded",
        path = %path.display(),
        source = %resolved.source,
        country = %config.benchmarks.country,
        "loaded engine configuration"
    );
    Ok((config, resolved))
}

/// Per-user config directory, e.g. `~/.config/meter-correction`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

pub fn system_config_dir() -> PathBuf {
    Path::new("/etc").join(APP_DIR)
}
