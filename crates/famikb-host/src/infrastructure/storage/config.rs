//! TOML-based configuration for the host bridge.
//!
//! The config file lives at `$XDG_CONFIG_HOME/famikb/config.toml`, falling
//! back to `~/.config/famikb/config.toml`.  Every key is optional:
//!
//! ```toml
//! [bus]
//! bus = 1                  # /dev/i2c-1
//!
//! [display]
//! standard = "pal"         # "ntsc" (224 lines) or "pal" (240 lines)
//! width = 256
//!
//! [pointer]
//! mode = "relative"        # "absolute" or "relative"
//!
//! [keymap]
//! path = "/etc/famikb/us104.map"
//!
//! [devices]
//! keyboard = "/dev/input/by-id/usb-Dell_KB216-event-kbd"
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, and each
//! section falls back to its `Default` impl when the whole table is missing.
//! So an empty file, or no file at all, is a valid configuration.

use std::path::{Path, PathBuf};

use famikb_core::domain::state::DEFAULT_SCREEN_WIDTH;
use famikb_core::{DisplayStandard, PointerMode, ScreenBounds};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine config directory (neither XDG_CONFIG_HOME nor HOME is set)")]
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

    /// The values parsed but are out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
    #[serde(default)]
    pub devices: DevicesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which I2C bus the adapter is wired to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusConfig {
    /// Bus number `n` of `/dev/i2c-<n>`.
    #[serde(default = "default_bus")]
    pub bus: u8,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoStandard {
    #[default]
    Ntsc,
    Pal,
}

impl From<VideoStandard> for DisplayStandard {
    fn from(value: VideoStandard) -> Self {
        match value {
            VideoStandard::Ntsc => DisplayStandard::Ntsc,
            VideoStandard::Pal => DisplayStandard::Pal,
        }
    }
}

/// Geometry of the Famicom screen the pointer is clamped to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default)]
    pub standard: VideoStandard,
    /// Horizontal resolution; the pointer x range is `0..width`.
    #[serde(default = "default_width")]
    pub width: u16,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PointerSetting {
    #[default]
    Absolute,
    Relative,
}

impl From<PointerSetting> for PointerMode {
    fn from(value: PointerSetting) -> Self {
        match value {
            PointerSetting::Absolute => PointerMode::Absolute,
            PointerSetting::Relative => PointerMode::Relative,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PointerConfig {
    #[serde(default)]
    pub mode: PointerSetting,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeymapConfig {
    /// Keymap file; without one only the mouse is useful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Device nodes to use instead of auto-detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DevicesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// A bare word must be a level; `EnvFilter` would otherwise read a typo
    /// such as `"verbose"` as a target name and silently log nothing.
    fn validate(&self) -> Result<(), ConfigError> {
        for directive in self.level.split(',').map(str::trim) {
            if directive.is_empty() || directive.contains('=') {
                continue;
            }
            if directive.parse::<LevelFilter>().is_err() {
                return Err(ConfigError::Invalid(format!(
                    "unknown log level {directive:?}, expected off, error, warn, info, debug or trace"
                )));
            }
        }
        Ok(())
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bus() -> u8 {
    0
}
fn default_width() -> u16 {
    DEFAULT_SCREEN_WIDTH
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { bus: default_bus() }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            standard: VideoStandard::default(),
            width: default_width(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Rejects values the adapter cannot represent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if the display width is 0 or above 256, or if
    /// the log level is not a level name or `target=level` directive list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = self.display.width;
        if width == 0 || width > DEFAULT_SCREEN_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "display width must be between 1 and {DEFAULT_SCREEN_WIDTH}, got {width}"
            )));
        }
        self.logging.validate()
    }

    /// Pointer clamp box for the configured screen.
    pub fn screen_bounds(&self) -> ScreenBounds {
        ScreenBounds::new(self.display.width, self.display.standard.into())
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer.mode.into()
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if neither `XDG_CONFIG_HOME`
/// nor `HOME` is set.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration.
///
/// With `explicit` set, that file must exist.  Otherwise the default path is
/// used and a missing file yields `AppConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = match config_file_path() {
                Ok(path) => path,
                Err(ConfigError::NoPlatformConfigDir) => return Ok(AppConfig::default()),
                Err(e) => return Err(e),
            };
            match read_config(&path) {
                Err(ConfigError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    Ok(AppConfig::default())
                }
                other => other,
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// `$XDG_CONFIG_HOME/famikb` or `~/.config/famikb`.
fn platform_config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("famikb"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
