// SPDX-License-Identifier: MPL-2.0
//! Mutable playback state shared by the loop's components.

use crate::player::clock::PresentationClock;
use crate::player::command::{Command, CommandInterpreter};
use crate::player::io::Demuxer;
use std::io::Write;

/// Everything the playback loop mutates besides its collaborators.
///
/// The clock is absent when neither a video nor an audio stream is bound;
/// seeks and status reports are then ignored.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub clock: Option<PresentationClock>,
    pub commands: CommandInterpreter,
}

/// What executing a command did to the stream position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executed {
    /// The demuxer was repositioned to this many seconds.
    Seeked(i64),
    Nothing,
}

impl PlaybackSession {
    pub fn new(clock: Option<PresentationClock>, commands: CommandInterpreter) -> Self {
        Self { clock, commands }
    }

    /// Executes a non-control command.
    ///
    /// Seek failures are logged and otherwise ignored.
    pub fn execute<D: Demuxer + ?Sized>(
        &mut self,
        command: Command,
        demuxer: &mut D,
        status: &mut dyn Write,
    ) -> Executed {
        let Some(clock) = self.clock.as_mut() else {
            return Executed::Nothing;
        };
        let (seconds, relative) = match command {
            Command::Seek { seconds, relative } => (seconds, relative),
            Command::SeekPercent(percent) => (
                clock.duration_seconds().saturating_mul(i64::from(percent)) / 100,
                false,
            ),
            Command::Info => {
                write_status(clock, status);
                return Executed::Nothing;
            }
            Command::Pause | Command::Exit => return Executed::Nothing,
        };
        match clock.seek(demuxer, seconds, relative) {
            Ok(target) => Executed::Seeked(target),
            Err(err) => {
                log::debug!("seek to {seconds}s failed: {err}");
                Executed::Nothing
            }
        }
    }
}

/// Rewrites the status line in place: percentage and elapsed seconds.
pub fn write_status(clock: &PresentationClock, status: &mut dyn Write) {
    let line = status_line(clock);
    if let Err(err) = status.write_all(line.as_bytes()).and_then(|()| status.flush()) {
        log::debug!("status line not written: {err}");
    }
}

fn status_line(clock: &PresentationClock) -> String {
    format!("\r{:.1}%  {}s    ", clock.percent(), clock.position_seconds())
}
