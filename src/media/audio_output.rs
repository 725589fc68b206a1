// SPDX-License-Identifier: MPL-2.0
//! Audio output using cpal.
//!
//! cpal pulls samples from a callback thread while the player pushes them
//! from the packet loop. A bounded queue sits between the two: `write`
//! blocks while the queue is full, and the callback flags an underrun when
//! it finds the queue empty after playback started.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::error::{Error, PlaybackError, Result};
use crate::player::io::{AudioFormat, AudioSink};

/// Smallest queue, in samples. Large enough for one decoded block of any
/// common codec after resampling.
const MIN_QUEUE_SAMPLES: usize = 32_768;

/// How long `write` waits for room before declaring the device stalled.
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Queue length for `buffer_ms` milliseconds of `format`, at least
/// [`MIN_QUEUE_SAMPLES`].
fn queue_capacity(format: AudioFormat, buffer_ms: u32) -> usize {
    let per_second = format.sample_rate as usize * usize::from(format.channels);
    (per_second * buffer_ms as usize / 1000).max(MIN_QUEUE_SAMPLES)
}

/// State shared with the callback thread.
struct Shared {
    queue: Mutex<VecDeque<i16>>,
    space: Condvar,
    /// Interleaved channels per queued frame (1 or 2).
    source_channels: usize,
    started: AtomicBool,
    underrun: AtomicBool,
}

impl Shared {
    fn new(source_channels: usize, capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            space: Condvar::new(),
            source_channels: source_channels.clamp(1, 2),
            started: AtomicBool::new(false),
            underrun: AtomicBool::new(false),
        }
    }

    /// Fills one device buffer. Device channels beyond the source's repeat
    /// the source channels in order.
    fn fill<T: cpal::Sample + cpal::FromSample<i16>>(&self, data: &mut [T], device_channels: usize) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let mut dry = false;
        let mut frame = [0i16; 2];
        for out in data.chunks_mut(device_channels.max(1)) {
            if queue.len() < self.source_channels {
                dry = true;
                frame = [0; 2];
            } else {
                for slot in frame.iter_mut().take(self.source_channels) {
                    *slot = queue.pop_front().unwrap_or(0);
                }
            }
            for (c, sample) in out.iter_mut().enumerate() {
                *sample = T::from_sample(frame[c % self.source_channels]);
            }
        }
        drop(queue);
        self.space.notify_all();

        if dry && self.started.load(Ordering::Acquire) {
            self.underrun.store(true, Ordering::Release);
        }
    }
}

/// The default output device, fed interleaved `i16` samples.
pub struct CpalSink {
    shared: Arc<Shared>,
    format: AudioFormat,
    capacity: usize,

    /// The audio stream (kept alive to maintain playback).
    _stream: cpal::Stream,
}

impl CpalSink {
    /// Opens the default output device.
    ///
    /// The requested format is tried first; if the device refuses it, the
    /// device's default rate and channel count are used instead and
    /// [`AudioSink::format`] reports what was negotiated.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no output device or no stream can be
    /// started on it.
    pub fn open(requested: AudioFormat, buffer_ms: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Io("No audio output device found".to_string()))?;
        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::Io(format!("Failed to get audio config: {e}")))?;
        let sample_format = supported_config.sample_format();

        let wanted = cpal::StreamConfig {
            channels: requested.channels,
            sample_rate: cpal::SampleRate(requested.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let (shared, stream, format) =
            match Self::start(&device, &wanted, sample_format, buffer_ms) {
                Ok((shared, stream)) => (shared, stream, requested),
                Err(err) => {
                    log::debug!("requested audio format refused ({err}); using device default");
                    let config: cpal::StreamConfig = supported_config.into();
                    let (shared, stream) =
                        Self::start(&device, &config, sample_format, buffer_ms)?;
                    let format = AudioFormat {
                        channels: config.channels.clamp(1, 2),
                        sample_rate: config.sample_rate.0,
                    };
                    (shared, stream, format)
                }
            };

        stream
            .play()
            .map_err(|e| Error::Io(format!("Failed to start audio stream: {e}")))?;

        Ok(Self {
            capacity: queue_capacity(format, buffer_ms),
            shared,
            format,
            _stream: stream,
        })
    }

    fn start(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        sample_format: cpal::SampleFormat,
        buffer_ms: u32,
    ) -> Result<(Arc<Shared>, cpal::Stream)> {
        let source = AudioFormat {
            channels: config.channels.clamp(1, 2),
            sample_rate: config.sample_rate.0,
        };
        let shared = Arc::new(Shared::new(
            usize::from(source.channels),
            queue_capacity(source, buffer_ms),
        ));
        let stream = match sample_format {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(device, config, &shared)?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(device, config, &shared)?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(device, config, &shared)?,
            other => {
                return Err(Error::Io(format!(
                    "Unsupported audio sample format {other:?}"
                )))
            }
        };
        Ok((shared, stream))
    }

    /// Builds an audio output stream for a specific sample format.
    fn build_stream<T: cpal::SizedSample + cpal::FromSample<i16>>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        shared: &Arc<Shared>,
    ) -> Result<cpal::Stream> {
        let shared = Arc::clone(shared);
        let device_channels = usize::from(config.channels);
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    shared.fill(data, device_channels);
                },
                |err| {
                    log::warn!("Audio output error: {err}");
                },
                None,
            )
            .map_err(|e| Error::Io(format!("Failed to build audio stream: {e}")))
    }
}

impl AudioSink for CpalSink {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        if self.shared.underrun.load(Ordering::Acquire) {
            return Err(PlaybackError::SinkUnderrun.into());
        }

        let mut queue = self
            .shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut rest = samples;
        while !rest.is_empty() {
            let room = self.capacity.saturating_sub(queue.len());
            if room == 0 {
                let (guard, wait) = self
                    .shared
                    .space
                    .wait_timeout(queue, WRITE_TIMEOUT)
                    .unwrap_or_else(PoisonError::into_inner);
                queue = guard;
                if wait.timed_out() && queue.len() >= self.capacity {
                    return Err(Error::Io("audio device stalled".to_string()));
                }
                continue;
            }
            let take = room.min(rest.len());
            queue.extend(&rest[..take]);
            rest = &rest[take..];
        }
        self.shared.started.store(true, Ordering::Release);
        Ok(())
    }

    fn reset(&mut self) {
        let mut queue = self
            .shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        queue.clear();
        self.shared.started.store(false, Ordering::Release);
        self.shared.underrun.store(false, Ordering::Release);
        drop(queue);
        self.shared.space.notify_all();
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn max_block_samples(&self) -> usize {
        self.capacity
    }
}
