// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Media(String),
    /// Bad command line.
    Usage(String),
    Playback(PlaybackError),
}

/// Failure conditions of the playback core.
///
/// Only [`PlaybackError::Startup`] ends the process; every other variant is
/// absorbed where it occurs and playback carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The media path could not be opened or probed, or a required output
    /// (terminal, framebuffer) could not be acquired.
    Startup(String),

    /// No decoder could be opened for a selected stream.
    UnsupportedStream { index: usize, reason: String },

    /// A single packet failed to decode.
    DecodeFailed(String),

    /// The audio sink ran dry or rejected a write; recoverable by reset.
    SinkUnderrun,

    /// A decoded audio block does not fit the scratch buffer.
    AudioBlockTooLarge { len: usize, capacity: usize },

    /// The key source is gone (terminal closed).
    InputClosed,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Startup(msg) => write!(f, "Cannot start playback: {}", msg),
            PlaybackError::UnsupportedStream { index, reason } => {
                write!(f, "Stream #{} is not supported: {}", index, reason)
            }
            PlaybackError::DecodeFailed(msg) => write!(f, "Decoding failed: {}", msg),
            PlaybackError::SinkUnderrun => write!(f, "Audio sink underrun"),
            PlaybackError::AudioBlockTooLarge { len, capacity } => write!(
                f,
                "Audio block of {} samples exceeds scratch capacity {}",
                len, capacity
            ),
            PlaybackError::InputClosed => write!(f, "Terminal input closed"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Media(e) => write!(f, "Media Error: {}", e),
            Error::Usage(e) => write!(f, "Usage Error: {}", e),
            Error::Playback(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<PlaybackError> for Error {
    fn from(err: PlaybackError) -> Self {
        Error::Playback(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<ffmpeg_next::Error> for Error {
    fn from(err: ffmpeg_next::Error) -> Self {
        Error::Media(err.to_string())
    }
}

impl From<pico_args::Error> for Error {
    fn from(err: pico_args::Error) -> Self {
        Error::Usage(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
