// SPDX-License-Identifier: MPL-2.0
//! Startup wiring: configuration, stream binding, device acquisition, then
//! the packet loop.
//!
//! Every acquired resource is owned by the [`Player`] (or by a local that
//! outlives it), so it is released by `Drop` on every exit path.

use crate::cli::Options;
use crate::config::{self, Config, DEFAULT_ZOOM, MAX_ZOOM};
use crate::error::{Error, PlaybackError, Result};
use crate::media::{
    CpalSink, FfmpegAudioDecoder, FfmpegDemuxer, FfmpegVideoDecoder, Framebuffer, RawTerminal,
};
use crate::player::geometry::{self, Geometry};
use crate::player::io::{AudioSink, Demuxer, PixelSurface};
use crate::player::streams::{self, StreamBinding, StreamInfo};
use crate::player::time_units::time_units_to_secs;
use crate::player::{
    AudioPipeline, CommandInterpreter, FrameRenderer, PlaybackSession, Player,
    PresentationClock, SeekUnits, StopReason, VideoOutput,
};
use std::io;
use std::path::Path;

/// Effective settings after merging the command line over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub zoom: u32,
    pub magnify: Option<u32>,
    pub video: bool,
    pub audio: bool,
    pub audio_buffer_ms: u32,
    pub seek_units: SeekUnits,
}

impl Settings {
    pub fn resolve(options: &Options, config: &Config) -> Self {
        Self {
            zoom: options
                .zoom
                .or(config.display.zoom)
                .unwrap_or(DEFAULT_ZOOM)
                .clamp(1, MAX_ZOOM),
            magnify: options.magnify.or(config.display.magnify),
            video: !options.no_video,
            audio: !options.no_audio && config.audio.is_enabled(),
            audio_buffer_ms: config.audio.buffer_ms(),
            seek_units: SeekUnits {
                short: config.seek.short_secs(),
                normal: config.seek.normal_secs(),
                long: config.seek.long_secs(),
            },
        }
    }
}

/// Plays `options.path` to the end or until the user quits.
pub fn run(options: &Options) -> Result<StopReason> {
    let (config, warning) = config::load_with_override(options.config_dir.clone());
    if let Some(warning) = warning {
        log::warn!("{warning}");
    }
    let settings = Settings::resolve(options, &config);

    let demuxer = FfmpegDemuxer::open(&options.path)?;
    let streams = demuxer.streams();
    let selection =
        streams::select_streams(&streams).without(!settings.video, !settings.audio);

    let video = streams::bind(&streams, selection.video, |info| {
        FfmpegVideoDecoder::open(&demuxer, info.index, settings.zoom)
    });
    let audio = streams::bind(&streams, selection.audio, |info| {
        let decoder = FfmpegAudioDecoder::open(&demuxer, info.index)?;
        let sink = CpalSink::open(decoder.requested_format(), settings.audio_buffer_ms)?;
        let decoder = decoder.with_output(sink.format())?;
        Ok((decoder, sink))
    });
    if video.is_none() && audio.is_none() {
        log::warn!("no playable video or audio stream");
    }

    // Video drives the clock when present.
    let clock = video
        .as_ref()
        .map(|b| (b.index, b.time_base))
        .or_else(|| audio.as_ref().map(|b| (b.index, b.time_base)))
        .map(|(index, time_base)| PresentationClock::new(index, time_base, demuxer.duration()));

    let framebuffer = config.display.framebuffer_path();
    let video = video
        .map(|binding| open_video_output(binding, &framebuffer, &settings))
        .transpose()?;
    log_summary(&demuxer, &streams, &video, &audio);

    let session = PlaybackSession::new(clock, CommandInterpreter::new(settings.seek_units));
    let keys = RawTerminal::enable()?;
    let mut player = Player::new(demuxer, session, Box::new(keys), Box::new(io::stdout()));
    if let Some((output, _)) = video {
        player = player.with_video(output);
    }
    if let Some(binding) = audio {
        let (decoder, sink) = binding.decoder;
        player = player.with_audio(AudioPipeline::new(
            binding.index,
            Box::new(decoder),
            Box::new(sink),
        ));
    }
    let reason = player.run();
    if let Some(audio) = player.audio() {
        if audio.underruns() > 0 {
            log::info!("{} audio underruns", audio.underruns());
        }
    }
    Ok(reason)
}

type BoundVideo = StreamBinding<FfmpegVideoDecoder>;

/// Opens the framebuffer and resolves the geometry for a bound video stream.
fn open_video_output(
    binding: BoundVideo,
    device: &Path,
    settings: &Settings,
) -> Result<(VideoOutput<ffmpeg_next::Packet>, Geometry)> {
    let surface = Framebuffer::open(device).map_err(|err| match err {
        Error::Playback(err) => err,
        other => PlaybackError::Startup(format!("framebuffer {}: {other}", device.display())),
    })?;
    let fb = surface.geometry();
    log::info!(
        "framebuffer {}: {}x{} at {} bpp",
        device.display(),
        fb.width,
        fb.height,
        fb.bits_per_pixel
    );
    let (width, height) = binding.decoder.native_size();
    let geometry = geometry::resolve(
        width,
        height,
        settings.zoom,
        settings.magnify,
        surface.cols() as u32,
        surface.rows() as u32,
    );
    let output = VideoOutput::new(
        binding.index,
        Box::new(binding.decoder),
        FrameRenderer::new(geometry),
        Box::new(surface),
    );
    Ok((output, geometry))
}

fn log_summary<A>(
    demuxer: &FfmpegDemuxer,
    streams: &[StreamInfo],
    video: &Option<(VideoOutput<ffmpeg_next::Packet>, Geometry)>,
    audio: &Option<StreamBinding<A>>,
) {
    log::info!(
        "duration {}s, {} streams",
        time_units_to_secs(demuxer.duration()).max(0),
        streams.len()
    );
    for stream in streams {
        log::info!("  #{} {:?} {}", stream.index, stream.kind, stream.codec);
    }
    if let Some((output, geometry)) = video {
        log::info!(
            "video #{}: {}x{} zoom {} magnify {}, drawing {}x{}",
            output.stream_index(),
            geometry.scaled_width,
            geometry.scaled_height,
            geometry.zoom,
            geometry.magnify,
            geometry.render_width,
            geometry.render_height
        );
    }
    if let Some(binding) = audio {
        log::info!("audio #{}", binding.index);
    }
}
