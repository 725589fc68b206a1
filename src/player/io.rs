// SPDX-License-Identifier: MPL-2.0
//! Boundaries between the playback core and its collaborators.
//!
//! The core never touches FFmpeg, the audio device, the framebuffer or the
//! terminal directly; it talks to these traits. The adapters in
//! [`crate::media`] implement them for real hardware, and tests implement
//! them in memory.

use crate::error::Result;

/// What the core needs to know about a demuxed packet.
pub trait MediaPacket {
    /// Index of the stream this packet belongs to.
    fn stream_index(&self) -> usize;

    /// Presentation timestamp in the stream's time base, if any.
    fn pts(&self) -> Option<i64>;
}

/// A container demultiplexer.
pub trait Demuxer {
    type Packet: MediaPacket;

    /// Returns the next packet, or `None` at end of stream.
    fn read_packet(&mut self) -> Option<Self::Packet>;

    /// Seeks to `timestamp` (container time units), landing on the nearest
    /// sync point in either direction.
    fn seek(&mut self, timestamp: i64) -> Result<()>;

    /// Total duration in container time units.
    fn duration(&self) -> i64;
}

/// A decoded and rescaled frame in packed RGB24.
#[derive(Debug, Clone, Copy)]
pub struct RgbFrame<'a> {
    pub data: &'a [u8],
    /// Bytes per row, including padding.
    pub stride: usize,
    pub width: usize,
    pub height: usize,
}

impl<'a> RgbFrame<'a> {
    /// Returns the pixel bytes of row `y`, `width * 3` long.
    ///
    /// Returns `None` if the buffer is shorter than the advertised geometry.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width.checked_mul(3)?)?;
        self.data.get(start..end)
    }
}

/// Decodes video packets into frames rescaled to the target geometry.
pub trait VideoDecoder<P> {
    /// Feeds one packet; returns the frame it completed, if any.
    fn decode(&mut self, packet: &P) -> Result<Option<RgbFrame<'_>>>;

    /// Drops buffered decoder state after a seek.
    fn flush(&mut self) {}
}

/// Decodes audio packets into blocks of interleaved samples.
///
/// A single packet may produce several blocks, so decoding is split into
/// [`send_packet`](AudioDecoder::send_packet) followed by repeated
/// [`receive_block`](AudioDecoder::receive_block) calls.
pub trait AudioDecoder<P> {
    fn send_packet(&mut self, packet: &P) -> Result<()>;

    /// Decodes the next pending block into `scratch`.
    ///
    /// Returns `Ok(false)` once the current packet is exhausted.
    fn receive_block(&mut self, scratch: &mut crate::player::audio::SampleScratch)
        -> Result<bool>;

    fn flush(&mut self) {}
}

/// Interleaved signed 16-bit sample format negotiated with the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

/// An audio output device.
pub trait AudioSink {
    /// Queues interleaved samples, blocking while the device is busy.
    ///
    /// An error means the sink is in an underrun state; the caller must
    /// [`reset`](AudioSink::reset) it and may retry.
    fn write(&mut self, samples: &[i16]) -> Result<()>;

    /// Clears the underrun state and any queued samples.
    fn reset(&mut self);

    fn format(&self) -> AudioFormat;

    /// Largest block, in samples across all channels, the sink accepts.
    fn max_block_samples(&self) -> usize;
}

/// A raw pixel output surface addressed by row and column.
pub trait PixelSurface {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    /// Packs an RGB triple into the device's native pixel value.
    fn pack_color(&self, r: u8, g: u8, b: u8) -> u32;

    /// Writes a horizontal run of packed pixels starting at (`row`, `col`).
    /// Pixels beyond the right edge are dropped.
    fn write_row(&mut self, row: usize, col: usize, run: &[u32]) -> Result<()>;
}

/// Single-byte keyboard input from a raw terminal.
pub trait KeySource {
    /// Returns the next buffered key without blocking.
    fn read_key(&mut self) -> Result<Option<u8>>;

    /// Blocks until at least one key is available.
    fn wait_for_input(&mut self) -> Result<()>;
}
