// SPDX-License-Identifier: MPL-2.0
//! Audio branch: decode packets into a reusable scratch buffer and write the
//! blocks to the sink.

use crate::error::{Error, PlaybackError, Result};
use crate::player::io::{AudioDecoder, AudioSink};

/// Reusable buffer for one decoded block of interleaved samples.
///
/// The capacity is fixed at construction; filling beyond it fails with
/// [`PlaybackError::AudioBlockTooLarge`] and leaves the buffer empty.
#[derive(Debug, Clone)]
pub struct SampleScratch {
    samples: Vec<i16>,
    capacity: usize,
}

impl SampleScratch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    fn check(&mut self, len: usize) -> Result<()> {
        self.samples.clear();
        if len > self.capacity {
            return Err(PlaybackError::AudioBlockTooLarge {
                len,
                capacity: self.capacity,
            }
            .into());
        }
        Ok(())
    }

    /// Replaces the contents with `block`.
    pub fn fill(&mut self, block: &[i16]) -> Result<()> {
        self.check(block.len())?;
        self.samples.extend_from_slice(block);
        Ok(())
    }

    /// Replaces the contents with little-endian 16-bit samples from `bytes`.
    /// A trailing odd byte is ignored.
    pub fn fill_le_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.check(bytes.len() / 2)?;
        self.samples.extend(
            bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
        );
        Ok(())
    }
}

/// A bound audio stream: its decoder, the sink and the scratch buffer
/// between them.
pub struct AudioPipeline<P> {
    stream_index: usize,
    decoder: Box<dyn AudioDecoder<P>>,
    sink: Box<dyn AudioSink>,
    scratch: SampleScratch,
    underruns: u64,
}

impl<P> AudioPipeline<P> {
    /// The scratch buffer is sized to the sink's largest accepted block.
    pub fn new(
        stream_index: usize,
        decoder: Box<dyn AudioDecoder<P>>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        let scratch = SampleScratch::with_capacity(sink.max_block_samples());
        Self {
            stream_index,
            decoder,
            sink,
            scratch,
            underruns: 0,
        }
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /// Number of sink underruns recovered so far.
    pub fn underruns(&self) -> u64 {
        self.underruns
    }

    /// Decodes one packet and plays every block it yields.
    ///
    /// Decode failures end the packet early; oversized blocks are skipped.
    pub fn play_packet(&mut self, packet: &P) {
        if let Err(err) = self.decoder.send_packet(packet) {
            log::debug!("audio packet skipped: {err}");
            return;
        }
        loop {
            match self.decoder.receive_block(&mut self.scratch) {
                Ok(true) => self.write_block(),
                Ok(false) => break,
                Err(Error::Playback(err @ PlaybackError::AudioBlockTooLarge { .. })) => {
                    log::warn!("{err}; block dropped");
                }
                Err(err) => {
                    log::debug!("audio decode stopped: {err}");
                    break;
                }
            }
        }
    }

    fn write_block(&mut self) {
        if self.scratch.is_empty() {
            return;
        }
        if self.sink.write(self.scratch.samples()).is_ok() {
            return;
        }
        self.underruns += 1;
        log::warn!("{}; resetting sink", PlaybackError::SinkUnderrun);
        self.sink.reset();
        if let Err(err) = self.sink.write(self.scratch.samples()) {
            log::debug!("audio block dropped after reset: {err}");
        }
    }

    /// Drops decoder, scratch and sink state after a seek.
    pub fn flush(&mut self) {
        self.decoder.flush();
        self.scratch.clear();
        self.sink.reset();
    }
}
