// SPDX-License-Identifier: MPL-2.0
//! FFmpeg-backed demuxer and decoders.

use crate::error::{Error, PlaybackError, Result};
use crate::player::audio::SampleScratch;
use crate::player::io::{AudioDecoder, AudioFormat, Demuxer, MediaPacket, RgbFrame, VideoDecoder};
use crate::player::streams::{StreamInfo, StreamKind};
use ffmpeg_next::codec::{self, decoder};
use ffmpeg_next::format::{sample, Pixel, Sample};
use ffmpeg_next::software::{resampling, scaling};
use ffmpeg_next::{format, frame, media, ChannelLayout, Packet};
use std::path::Path;
use std::sync::Once;

/// Static flag to ensure FFmpeg is initialized only once.
static FFMPEG_INIT: Once = Once::new();

/// Initialize FFmpeg and lower its log level to errors only.
///
/// Safe to call multiple times.
pub fn init_ffmpeg() -> Result<()> {
    let mut init_result: Result<()> = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            init_result = Err(Error::Media(format!("FFmpeg initialization failed: {e}")));
            return;
        }

        // SAFETY: av_log_set_level is thread-safe and only affects logging
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    init_result
}

impl MediaPacket for Packet {
    fn stream_index(&self) -> usize {
        self.stream()
    }

    fn pts(&self) -> Option<i64> {
        Packet::pts(self)
    }
}

/// An opened media container.
pub struct FfmpegDemuxer {
    input: format::context::Input,
}

impl FfmpegDemuxer {
    pub fn open(path: &Path) -> Result<Self> {
        init_ffmpeg()?;
        let input = format::input(path).map_err(|e| {
            PlaybackError::Startup(format!("cannot open {}: {e}", path.display()))
        })?;
        Ok(Self { input })
    }

    /// Lists the container's streams in index order.
    pub fn streams(&self) -> Vec<StreamInfo> {
        probe_streams(&self.input)
    }

    fn codec_context(&self, index: usize) -> Result<codec::context::Context> {
        let stream = self
            .input
            .stream(index)
            .ok_or_else(|| Error::Media(format!("no stream #{index}")))?;
        Ok(codec::context::Context::from_parameters(stream.parameters())?)
    }
}

/// Describes every stream of `input`.
pub fn probe_streams(input: &format::context::Input) -> Vec<StreamInfo> {
    input
        .streams()
        .map(|stream| {
            let parameters = stream.parameters();
            let kind = match parameters.medium() {
                media::Type::Video => StreamKind::Video,
                media::Type::Audio => StreamKind::Audio,
                _ => StreamKind::Other,
            };
            StreamInfo {
                index: stream.index(),
                kind,
                time_base: stream.time_base().into(),
                codec: parameters.id().name().to_string(),
            }
        })
        .collect()
}

impl Demuxer for FfmpegDemuxer {
    type Packet = Packet;

    fn read_packet(&mut self) -> Option<Packet> {
        let mut packet = Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => Some(packet),
            Err(ffmpeg_next::Error::Eof) => None,
            Err(err) => {
                log::warn!("demuxing stopped: {err}");
                None
            }
        }
    }

    fn seek(&mut self, timestamp: i64) -> Result<()> {
        // Full range: land on the nearest sync point on either side.
        self.input.seek(timestamp, i64::MIN..i64::MAX)?;
        Ok(())
    }

    fn duration(&self) -> i64 {
        self.input.duration()
    }
}

/// Video decoder with a scaler to packed RGB24 at `native × zoom`.
pub struct FfmpegVideoDecoder {
    decoder: decoder::Video,
    scaler: scaling::Context,
    decoded: frame::Video,
    rgb: frame::Video,
}

impl FfmpegVideoDecoder {
    pub fn open(demuxer: &FfmpegDemuxer, index: usize, zoom: u32) -> Result<Self> {
        let decoder = demuxer.codec_context(index)?.decoder().video()?;
        let zoom = zoom.max(1);
        let scaler = scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width().saturating_mul(zoom),
            decoder.height().saturating_mul(zoom),
            scaling::Flags::FAST_BILINEAR,
        )?;
        Ok(Self {
            decoder,
            scaler,
            decoded: frame::Video::empty(),
            rgb: frame::Video::empty(),
        })
    }

    /// Coded frame size before zoom.
    pub fn native_size(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }
}

impl VideoDecoder<Packet> for FfmpegVideoDecoder {
    fn decode(&mut self, packet: &Packet) -> Result<Option<RgbFrame<'_>>> {
        self.decoder
            .send_packet(packet)
            .map_err(|e| PlaybackError::DecodeFailed(e.to_string()))?;
        if self.decoder.receive_frame(&mut self.decoded).is_err() {
            return Ok(None);
        }
        self.scaler.run(&self.decoded, &mut self.rgb)?;
        Ok(Some(RgbFrame {
            data: self.rgb.data(0),
            stride: self.rgb.stride(0),
            width: self.rgb.width() as usize,
            height: self.rgb.height() as usize,
        }))
    }

    fn flush(&mut self) {
        self.decoder.flush();
    }
}

/// Audio decoder with a resampler to packed S16 in the sink's format.
pub struct FfmpegAudioDecoder {
    decoder: decoder::Audio,
    resampler: Option<(resampling::Context, AudioFormat)>,
    decoded: frame::Audio,
}

impl FfmpegAudioDecoder {
    pub fn open(demuxer: &FfmpegDemuxer, index: usize) -> Result<Self> {
        let decoder = demuxer.codec_context(index)?.decoder().audio()?;
        Ok(Self {
            decoder,
            resampler: None,
            decoded: frame::Audio::empty(),
        })
    }

    /// The format to ask the sink for: the source rate, mono or stereo.
    pub fn requested_format(&self) -> AudioFormat {
        AudioFormat {
            channels: if self.decoder.channels() == 1 { 1 } else { 2 },
            sample_rate: self.decoder.rate(),
        }
    }

    /// Resamples every decoded block to `format`.
    pub fn with_output(mut self, format: AudioFormat) -> Result<Self> {
        let layout = match format.channels {
            1 => ChannelLayout::MONO,
            _ => ChannelLayout::STEREO,
        };
        let resampler = resampling::Context::get(
            self.decoder.format(),
            self.decoder.channel_layout(),
            self.decoder.rate(),
            Sample::I16(sample::Type::Packed),
            layout,
            format.sample_rate,
        )?;
        self.resampler = Some((resampler, format));
        Ok(self)
    }
}

impl AudioDecoder<Packet> for FfmpegAudioDecoder {
    fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        self.decoder
            .send_packet(packet)
            .map_err(|e| PlaybackError::DecodeFailed(e.to_string()).into())
    }

    fn receive_block(&mut self, scratch: &mut SampleScratch) -> Result<bool> {
        let Some((resampler, format)) = self.resampler.as_mut() else {
            return Err(Error::Media("audio output format not set".into()));
        };
        if self.decoder.receive_frame(&mut self.decoded).is_err() {
            return Ok(false);
        }
        let mut resampled = frame::Audio::empty();
        resampler.run(&self.decoded, &mut resampled)?;

        let bytes = resampled.samples() * usize::from(format.channels) * 2;
        let data = resampled.data(0);
        scratch.fill_le_bytes(&data[..bytes.min(data.len())])?;
        Ok(true)
    }

    fn flush(&mut self) {
        self.decoder.flush();
    }
}
