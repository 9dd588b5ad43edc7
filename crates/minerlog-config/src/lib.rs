//! Configuration for minerlog.
//!
//! TOML profiles (one per appliance), environment overrides, and
//! translation to `minerlog_core::StreamConfig`. The CLI layers its own
//! flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use minerlog_core::{ReconnectConfig, StreamConfig};

/// Prefix for environment overrides, e.g. `MINERLOG_DEFAULTS__BUFFER_CAPACITY`.
pub const ENV_PREFIX: &str = "MINERLOG_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("invalid device '{device}': {reason}")]
    InvalidDevice { device: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Directory log exports are written to.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            export_dir: default_export_dir(),
        }
    }
}

fn default_buffer_capacity() -> usize {
    minerlog_core::DEFAULT_CAPACITY
}
fn default_reconnect_delay_ms() -> u64 {
    3000
}
fn default_max_reconnect_attempts() -> u32 {
    ReconnectConfig::DEFAULT_MAX_ATTEMPTS
}
fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

/// A named appliance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Dashboard URL or bare host (e.g., "http://192.168.1.50").
    pub device: String,

    /// Override `defaults.buffer_capacity`.
    pub buffer_capacity: Option<usize>,

    /// Override `defaults.reconnect_delay_ms`.
    pub reconnect_delay_ms: Option<u64>,

    /// Override `defaults.max_reconnect_attempts`.
    pub max_reconnect_attempts: Option<u32>,

    /// Override `defaults.export_dir`.
    pub export_dir: Option<PathBuf>,
}

impl Profile {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            buffer_capacity: None,
            reconnect_delay_ms: None,
            max_reconnect_attempts: None,
            export_dir: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "minerlog", "minerlog").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("minerlog");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` (missing file is fine) + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

impl Config {
    /// Name of the profile to use: explicit choice, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned()
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }

    /// Export directory for a profile (or the global default).
    pub fn export_dir(&self, profile: Option<&Profile>) -> PathBuf {
        profile
            .and_then(|p| p.export_dir.clone())
            .unwrap_or_else(|| self.defaults.export_dir.clone())
    }
}

/// Build a `StreamConfig` for `device`, applying profile overrides on top
/// of the global defaults.
pub fn stream_config(
    device: &str,
    profile: Option<&Profile>,
    defaults: &Defaults,
) -> Result<StreamConfig, ConfigError> {
    let mut config =
        StreamConfig::for_address(device).map_err(|e| ConfigError::InvalidDevice {
            device: device.into(),
            reason: e.to_string(),
        })?;

    let buffer_capacity = profile
        .and_then(|p| p.buffer_capacity)
        .unwrap_or(defaults.buffer_capacity);
    if buffer_capacity == 0 {
        return Err(ConfigError::Validation {
            field: "buffer_capacity".into(),
            reason: "must be at least 1".into(),
        });
    }

    let delay_ms = profile
        .and_then(|p| p.reconnect_delay_ms)
        .unwrap_or(defaults.reconnect_delay_ms);
    let max_attempts = profile
        .and_then(|p| p.max_reconnect_attempts)
        .unwrap_or(defaults.max_reconnect_attempts);

    config.buffer_capacity = buffer_capacity;
    config.reconnect = ReconnectConfig {
        delay: Duration::from_millis(delay_ms),
        max_attempts,
    };
    Ok(config)
}

/// Build a `StreamConfig` from a named profile.
pub fn profile_to_stream_config(
    cfg: &Config,
    profile_name: &str,
) -> Result<StreamConfig, ConfigError> {
    let profile = cfg.profile(profile_name)?;
    stream_config(&profile.device, Some(profile), &cfg.defaults)
}
