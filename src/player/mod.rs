// SPDX-License-Identifier: MPL-2.0
//! Playback core.
//!
//! Everything here is independent of FFmpeg and of the output devices: the
//! collaborators are reached through the traits in [`io`], so the loop can be
//! driven by in-memory fakes.

pub mod audio;
pub mod clock;
pub mod command;
pub mod geometry;
pub mod io;
pub mod playback;
pub mod render;
pub mod session;
pub mod streams;
pub mod time_units;

pub use audio::{AudioPipeline, SampleScratch};
pub use clock::PresentationClock;
pub use command::{Command, CommandInterpreter, PlaybackMode, SeekUnits};
pub use geometry::Geometry;
pub use playback::{LoopState, Player, StopReason, VideoOutput};
pub use render::FrameRenderer;
pub use session::PlaybackSession;
pub use streams::{select_streams, StreamInfo, StreamKind, StreamSelection};
