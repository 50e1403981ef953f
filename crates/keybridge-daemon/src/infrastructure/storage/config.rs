//! TOML-based configuration persistence for the bridge daemon.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Linux:    `~/.config/keybridge/config.toml`
//! - macOS:    `~/Library/Application Support/KeyBridge/config.toml`
//! - Windows:  `%APPDATA%\KeyBridge\config.toml`
//!
//! Fields annotated with `#[serde(default = "…")]` take their default
//! when absent from the file, so the daemon runs correctly on first
//! start and after upgrades that introduce new fields.

use std::path::PathBuf;
use std::time::Duration;

use keybridge_core::osc::framing::OscFraming;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Where and how to reach the console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// Static console IP or hostname. Absent means discover by UDP
    /// broadcast at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// TCP port of the console's OSC server.
    #[serde(default = "default_osc_port")]
    pub port: u16,
    /// Stream framing: `"packet-length"` (OSC 1.0) or `"slip"` (OSC 1.1).
    #[serde(default)]
    pub framing: OscFraming,
    /// OSC address prefix prepended to every key command.
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,
    /// Seconds between reconnect attempts after the connection drops.
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,
}

/// Keyboard capture settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Explicit input device path (e.g. `/dev/input/event3`). Absent
    /// means auto-detect the first keyboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

/// General daemon behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Milliseconds between drain cycles of the pending key queue.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl ConsoleConfig {
    /// The reconnect interval as a [`Duration`].
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_secs)
    }
}

impl BridgeConfig {
    /// The drain tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_osc_port() -> u16 {
    3032
}
fn default_address_prefix() -> String {
    "/eos/key/".to_string()
}
fn default_reconnect_secs() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_tick_ms() -> u64 {
    5
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_osc_port(),
            framing: OscFraming::default(),
            address_prefix: default_address_prefix(),
            reconnect_secs: default_reconnect_secs(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tick_ms: default_tick_ms(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config
/// base directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory
/// cannot be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from disk, returning `AppConfig::default()` if the
/// file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk, creating the config directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KeyBridge"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keybridge"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KeyBridge")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
