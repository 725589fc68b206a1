// SPDX-License-Identifier: MPL-2.0
//! Stream selection.
//!
//! The container's stream list is scanned once at startup. The **last**
//! video stream and the **last** audio stream win: a later stream of the same
//! type overwrites an earlier match. This is pinned behaviour, not a
//! preference for the final stream.

use crate::error::{PlaybackError, Result};
use crate::player::time_units::TimeBase;

/// Media type of a container stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
    Other,
}

/// A stream as reported by the demultiplexer.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub index: usize,
    pub kind: StreamKind,
    pub time_base: TimeBase,
    /// Codec name, for diagnostics.
    pub codec: String,
}

/// Stream indices chosen for each pipeline branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSelection {
    pub video: Option<usize>,
    pub audio: Option<usize>,
}

impl StreamSelection {
    /// Drops branches the user disabled on the command line.
    #[must_use]
    pub fn without(self, video: bool, audio: bool) -> Self {
        Self {
            video: if video { None } else { self.video },
            audio: if audio { None } else { self.audio },
        }
    }
}

/// Selects the last video and the last audio stream in `streams`.
pub fn select_streams(streams: &[StreamInfo]) -> StreamSelection {
    let mut selection = StreamSelection::default();
    for stream in streams {
        match stream.kind {
            StreamKind::Video => selection.video = Some(stream.index),
            StreamKind::Audio => selection.audio = Some(stream.index),
            StreamKind::Other => {}
        }
    }
    selection
}

/// A selected stream together with its opened decoder.
#[derive(Debug)]
pub struct StreamBinding<T> {
    pub index: usize,
    pub time_base: TimeBase,
    pub decoder: T,
}

/// Opens a decoder for the stream at `index`.
///
/// A missing stream or a failing `open` leaves the branch unbound: the
/// failure is logged and `None` is returned.
pub fn bind<T>(
    streams: &[StreamInfo],
    index: Option<usize>,
    open: impl FnOnce(&StreamInfo) -> Result<T>,
) -> Option<StreamBinding<T>> {
    let info = streams.iter().find(|s| Some(s.index) == index)?;
    match open(info) {
        Ok(decoder) => Some(StreamBinding {
            index: info.index,
            time_base: info.time_base,
            decoder,
        }),
        Err(err) => {
            let unsupported = PlaybackError::UnsupportedStream {
                index: info.index,
                reason: err.to_string(),
            };
            log::warn!("{unsupported}; {} stream left unbound", info.codec);
            None
        }
    }
}
