// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Seek**: step sizes for the `h`/`l`, `j`/`k` and `J`/`K` key pairs
//! - **Display**: framebuffer device and presentation geometry
//! - **Audio**: output enablement and sink queue length

// ==========================================================================
// Seek Defaults
// ==========================================================================

/// Default short seek step (`h`/`l`), in seconds.
pub const DEFAULT_SHORT_SEEK_SECS: i64 = 10;

/// Default normal seek step (`j`/`k`), in seconds.
pub const DEFAULT_NORMAL_SEEK_SECS: i64 = 60;

/// Default long seek step (`J`/`K`), in seconds.
pub const DEFAULT_LONG_SEEK_SECS: i64 = 600;

/// Smallest accepted seek step, in seconds.
pub const MIN_SEEK_SECS: i64 = 1;

/// Largest accepted seek step (one day), in seconds.
pub const MAX_SEEK_SECS: i64 = 86_400;

// ==========================================================================
// Display Defaults
// ==========================================================================

/// Framebuffer device used when neither config nor `FRAMEBUFFER` names one.
pub const DEFAULT_FRAMEBUFFER: &str = "/dev/fb0";

/// Environment variable selecting the framebuffer device.
pub const ENV_FRAMEBUFFER: &str = "FRAMEBUFFER";

/// Default zoom multiplier applied when scaling decoded frames.
pub const DEFAULT_ZOOM: u32 = 1;

/// Largest accepted zoom multiplier.
pub const MAX_ZOOM: u32 = 16;

// ==========================================================================
// Audio Defaults
// ==========================================================================

/// Length of the audio sink queue in milliseconds.
pub const DEFAULT_AUDIO_BUFFER_MS: u32 = 500;

/// Minimum audio sink queue length in milliseconds.
pub const MIN_AUDIO_BUFFER_MS: u32 = 50;

/// Maximum audio sink queue length in milliseconds.
pub const MAX_AUDIO_BUFFER_MS: u32 = 5_000;
