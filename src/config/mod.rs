// SPDX-License-Identifier: MPL-2.0
//! This module handles the player's configuration, loaded from a
//! `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[seek]` - Step sizes for the relative seek keys
//! - `[display]` - Framebuffer device, zoom and magnify
//! - `[audio]` - Audio output enablement and queue length
//!
//! Every field is optional; missing fields take the values in [`defaults`].
//! Command-line flags take precedence over anything read here.
//!
//! # Examples
//!
//! ```no_run
//! use fbplay::config;
//!
//! let (config, warning) = config::load_with_override(None);
//! if let Some(message) = warning {
//!     eprintln!("{message}");
//! }
//! assert!(config.seek.short_secs() > 0);
//! ```

pub mod defaults;
pub mod paths;

pub use defaults::*;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Seek step sizes, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SeekConfig {
    /// Step for `h`/`l`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_secs: Option<i64>,

    /// Step for `j`/`k`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_secs: Option<i64>,

    /// Step for `J`/`K`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_secs: Option<i64>,
}

impl SeekConfig {
    pub fn short_secs(&self) -> i64 {
        clamp_seek(self.short_secs.unwrap_or(DEFAULT_SHORT_SEEK_SECS))
    }

    pub fn normal_secs(&self) -> i64 {
        clamp_seek(self.normal_secs.unwrap_or(DEFAULT_NORMAL_SEEK_SECS))
    }

    pub fn long_secs(&self) -> i64 {
        clamp_seek(self.long_secs.unwrap_or(DEFAULT_LONG_SEEK_SECS))
    }
}

fn clamp_seek(secs: i64) -> i64 {
    secs.clamp(MIN_SEEK_SECS, MAX_SEEK_SECS)
}

/// Output surface settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DisplayConfig {
    /// Framebuffer device path (e.g. `/dev/fb1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framebuffer: Option<PathBuf>,

    /// Zoom multiplier applied at scale time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u32>,

    /// Magnify multiplier applied at blit time. Unset means auto.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnify: Option<u32>,
}

impl DisplayConfig {
    /// Resolves the framebuffer device: config, then `FRAMEBUFFER`, then
    /// [`DEFAULT_FRAMEBUFFER`].
    pub fn framebuffer_path(&self) -> PathBuf {
        if let Some(path) = &self.framebuffer {
            return path.clone();
        }
        match std::env::var(ENV_FRAMEBUFFER) {
            Ok(dev) if !dev.is_empty() => PathBuf::from(dev),
            _ => PathBuf::from(DEFAULT_FRAMEBUFFER),
        }
    }
}

/// Audio output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AudioConfig {
    /// Set to `false` to never open the audio device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Sink queue length in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_ms: Option<u32>,
}

impl AudioConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn buffer_ms(&self) -> u32 {
        self.buffer_ms
            .unwrap_or(DEFAULT_AUDIO_BUFFER_MS)
            .clamp(MIN_AUDIO_BUFFER_MS, MAX_AUDIO_BUFFER_MS)
    }
}

/// Player configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub seek: SeekConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub audio: AudioConfig,
}

// =============================================================================
// Load / Save
// =============================================================================

fn config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from `base_dir` or the default config directory.
///
/// Returns a tuple of (config, optional_warning). A missing file silently
/// yields the defaults; an unreadable or malformed one yields the defaults
/// plus a warning describing the problem.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = config_path_with_override(base_dir) {
        if path.exists() {
            return match load_from_path(&path) {
                Ok(config) => (config, None),
                Err(err) => (
                    Config::default(),
                    Some(format!("ignoring {}: {}", path.display(), err)),
                ),
            };
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
