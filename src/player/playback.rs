// SPDX-License-Identifier: MPL-2.0
//! The packet loop.
//!
//! Each iteration reads one packet, advances the clock, hands the packet to
//! the video or audio branch that owns its stream, then polls the keyboard.
//! Decode and render failures only cost the current packet; the loop ends on
//! end of stream or on `q`. A key source that fails is dropped and playback
//! runs on without commands.

use crate::error::Error;
use crate::player::audio::AudioPipeline;
use crate::player::command::{Command, PlaybackMode};
use crate::player::io::{Demuxer, KeySource, MediaPacket, PixelSurface, VideoDecoder};
use crate::player::render::FrameRenderer;
use crate::player::session::{Executed, PlaybackSession};
use std::io::Write;

/// Loop state. `Running` is initial, `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    Stopped,
}

/// Why [`Player::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    Quit,
}

/// The bound video branch: decoder, renderer and the surface it draws on.
pub struct VideoOutput<P> {
    index: usize,
    decoder: Box<dyn VideoDecoder<P>>,
    renderer: FrameRenderer,
    surface: Box<dyn PixelSurface>,
    frames: u64,
}

impl<P> VideoOutput<P> {
    pub fn new(
        index: usize,
        decoder: Box<dyn VideoDecoder<P>>,
        renderer: FrameRenderer,
        surface: Box<dyn PixelSurface>,
    ) -> Self {
        Self {
            index,
            decoder,
            renderer,
            surface,
            frames: 0,
        }
    }

    pub fn stream_index(&self) -> usize {
        self.index
    }

    /// Frames decoded and blitted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn show(&mut self, packet: &P) {
        let frame = match self.decoder.decode(packet) {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(err) => {
                log::debug!("video packet skipped: {err}");
                return;
            }
        };
        match self.renderer.blit(&frame, self.surface.as_mut()) {
            Ok(()) => self.frames += 1,
            Err(err) => log::debug!("frame not drawn: {err}"),
        }
    }

    fn flush(&mut self) {
        self.decoder.flush();
    }
}

pub struct Player<D: Demuxer> {
    demuxer: D,
    session: PlaybackSession,
    video: Option<VideoOutput<D::Packet>>,
    audio: Option<AudioPipeline<D::Packet>>,
    keys: Box<dyn KeySource>,
    status: Box<dyn Write>,
    status_shown: bool,
    keys_lost: bool,
    state: LoopState,
}

impl<D: Demuxer> Player<D> {
    /// Creates a player with both branches unbound.
    pub fn new(
        demuxer: D,
        session: PlaybackSession,
        keys: Box<dyn KeySource>,
        status: Box<dyn Write>,
    ) -> Self {
        Self {
            demuxer,
            session,
            video: None,
            audio: None,
            keys,
            status,
            status_shown: false,
            keys_lost: false,
            state: LoopState::Running,
        }
    }

    #[must_use]
    pub fn with_video(mut self, video: VideoOutput<D::Packet>) -> Self {
        self.video = Some(video);
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: AudioPipeline<D::Packet>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn video(&self) -> Option<&VideoOutput<D::Packet>> {
        self.video.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioPipeline<D::Packet>> {
        self.audio.as_ref()
    }

    pub fn demuxer(&self) -> &D {
        &self.demuxer
    }

    /// Plays until end of stream or `q`.
    pub fn run(&mut self) -> StopReason {
        let reason = self.play();
        self.state = LoopState::Stopped;
        self.finish_status_line();
        reason
    }

    /// Whether the key source failed and was dropped.
    pub fn keys_lost(&self) -> bool {
        self.keys_lost
    }

    fn play(&mut self) -> StopReason {
        loop {
            let Some(packet) = self.demuxer.read_packet() else {
                return StopReason::EndOfStream;
            };
            self.dispatch(&packet);

            match self.poll_commands() {
                PlaybackMode::Play => {}
                PlaybackMode::Pause => {
                    self.state = LoopState::Paused;
                    self.wait_for_resume();
                    self.state = LoopState::Running;
                }
                PlaybackMode::Exit => return StopReason::Quit,
            }
        }
    }

    fn dispatch(&mut self, packet: &D::Packet) {
        let index = packet.stream_index();
        if let (Some(clock), Some(pts)) = (self.session.clock.as_mut(), packet.pts()) {
            // Only the reference stream feeds the clock, not every packet:
            // other streams tick in other time bases.
            if clock.stream_index() == index {
                clock.observe(pts);
            }
        }

        if let Some(video) = self.video.as_mut().filter(|v| v.index == index) {
            video.show(packet);
        } else if let Some(audio) = self.audio.as_mut().filter(|a| a.stream_index() == index) {
            audio.play_packet(packet);
        }
    }

    /// Drains pending keys and executes what they resolve to.
    ///
    /// Keys read before the source failed are still honoured.
    fn poll_commands(&mut self) -> PlaybackMode {
        let mut keys = Vec::new();
        while !self.keys_lost {
            match self.keys.read_key() {
                Ok(Some(key)) => keys.push(key),
                Ok(None) => break,
                Err(err) => self.lose_keys(err),
            }
        }
        if keys.is_empty() {
            return PlaybackMode::Play;
        }

        let mut pending = Vec::new();
        let mode = self.session.commands.run(keys, |command| pending.push(command));
        for command in pending {
            self.execute(command);
        }
        mode
    }

    fn lose_keys(&mut self, err: Error) {
        log::warn!("{err}; playing on without key commands");
        self.keys_lost = true;
    }

    fn execute(&mut self, command: Command) {
        if command == Command::Info && self.session.clock.is_some() {
            self.status_shown = true;
        }
        let executed = self
            .session
            .execute(command, &mut self.demuxer, self.status.as_mut());
        if let Executed::Seeked(target) = executed {
            log::debug!("seeked to {target}s");
            if let Some(video) = self.video.as_mut() {
                video.flush();
            }
            if let Some(audio) = self.audio.as_mut() {
                audio.flush();
            }
        }
    }

    /// Blocks until `p` is read. Every other key is discarded.
    ///
    /// Losing the key source resumes playback.
    fn wait_for_resume(&mut self) {
        while !self.keys_lost {
            if let Err(err) = self.keys.wait_for_input() {
                self.lose_keys(err);
                return;
            }
            loop {
                match self.keys.read_key() {
                    Ok(Some(b'p')) => return,
                    Ok(Some(_)) => {}
                    Ok(None) => break,
                    Err(err) => {
                        self.lose_keys(err);
                        return;
                    }
                }
            }
        }
    }

    fn finish_status_line(&mut self) {
        if !self.status_shown {
            return;
        }
        if let Err(err) = self.status.write_all(b"\r\n").and_then(|()| self.status.flush()) {
            log::debug!("status line not terminated: {err}");
        }
    }
}
