// SPDX-License-Identifier: MPL-2.0
//! In-memory collaborators for driving the player without FFmpeg or devices.
//!
//! Each fake records what happened to it in a shared log, so a test can keep
//! a handle after the fake is boxed and moved into the player.
#![allow(dead_code)]

use fbplay::error::{Error, PlaybackError, Result};
use fbplay::player::io::{
    AudioDecoder, AudioFormat, AudioSink, Demuxer, KeySource, MediaPacket, PixelSurface,
    RgbFrame, VideoDecoder,
};
use fbplay::player::SampleScratch;
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::io::{self, Write};
use std::rc::Rc;

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T: Default>() -> Shared<T> {
    Rc::new(RefCell::new(T::default()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pkt {
    pub stream: usize,
    pub pts: Option<i64>,
}

impl Pkt {
    pub fn new(stream: usize, pts: i64) -> Self {
        Self {
            stream,
            pts: Some(pts),
        }
    }
}

impl MediaPacket for Pkt {
    fn stream_index(&self) -> usize {
        self.stream
    }

    fn pts(&self) -> Option<i64> {
        self.pts
    }
}

/// `count` packets on `stream`, one every `step` ticks starting at `step`.
pub fn packets(stream: usize, count: usize, step: i64) -> Vec<Pkt> {
    (1..=count as i64).map(|i| Pkt::new(stream, i * step)).collect()
}

#[derive(Debug, Default)]
pub struct DemuxLog {
    pub reads: usize,
    pub seeks: Vec<i64>,
}

pub struct ScriptedDemuxer {
    packets: VecDeque<Pkt>,
    duration: i64,
    pub log: Shared<DemuxLog>,
}

impl ScriptedDemuxer {
    pub fn new(packets: Vec<Pkt>, duration: i64) -> Self {
        Self {
            packets: packets.into(),
            duration,
            log: shared(),
        }
    }
}

impl Demuxer for ScriptedDemuxer {
    type Packet = Pkt;

    fn read_packet(&mut self) -> Option<Pkt> {
        let packet = self.packets.pop_front()?;
        self.log.borrow_mut().reads += 1;
        Some(packet)
    }

    fn seek(&mut self, timestamp: i64) -> Result<()> {
        self.log.borrow_mut().seeks.push(timestamp);
        Ok(())
    }

    fn duration(&self) -> i64 {
        self.duration
    }
}

/// Delivers one batch of keys per poll of the player: the first batch on
/// the first poll, the second on the next, and so on. Once every batch is
/// spent, waiting for input fails as if the terminal had closed.
pub struct ScriptedKeys {
    current: VecDeque<u8>,
    batches: VecDeque<Vec<u8>>,
}

impl ScriptedKeys {
    pub fn new(batches: &[&[u8]]) -> Self {
        let mut batches: VecDeque<Vec<u8>> = batches.iter().map(|b| b.to_vec()).collect();
        let current = batches.pop_front().unwrap_or_default().into();
        Self { current, batches }
    }

    fn arm_next(&mut self) -> bool {
        match self.batches.pop_front() {
            Some(batch) => {
                self.current = batch.into();
                true
            }
            None => false,
        }
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> Result<Option<u8>> {
        if let Some(key) = self.current.pop_front() {
            return Ok(Some(key));
        }
        self.arm_next();
        Ok(None)
    }

    fn wait_for_input(&mut self) -> Result<()> {
        if !self.current.is_empty() || self.arm_next() {
            return Ok(());
        }
        Err(PlaybackError::InputClosed.into())
    }
}

#[derive(Debug, Default)]
pub struct VideoLog {
    pub decoded: usize,
    pub flushes: usize,
}

/// Turns every packet into the same frame, except packets whose timestamp is
/// listed as corrupt.
pub struct FakeVideoDecoder {
    frame: Vec<u8>,
    width: usize,
    height: usize,
    corrupt: HashSet<i64>,
    pub log: Shared<VideoLog>,
}

impl FakeVideoDecoder {
    /// `pixels` is packed RGB, row-major, `width * height` entries.
    pub fn new(width: usize, height: usize, pixels: &[[u8; 3]]) -> Self {
        assert_eq!(pixels.len(), width * height);
        Self {
            frame: pixels.iter().flatten().copied().collect(),
            width,
            height,
            corrupt: HashSet::new(),
            log: shared(),
        }
    }

    pub fn corrupt_at(mut self, pts: i64) -> Self {
        self.corrupt.insert(pts);
        self
    }
}

impl VideoDecoder<Pkt> for FakeVideoDecoder {
    fn decode(&mut self, packet: &Pkt) -> Result<Option<RgbFrame<'_>>> {
        if packet.pts.is_some_and(|pts| self.corrupt.contains(&pts)) {
            return Err(PlaybackError::DecodeFailed("corrupt packet".into()).into());
        }
        self.log.borrow_mut().decoded += 1;
        Ok(Some(RgbFrame {
            data: &self.frame,
            stride: self.width * 3,
            width: self.width,
            height: self.height,
        }))
    }

    fn flush(&mut self) {
        self.log.borrow_mut().flushes += 1;
    }
}

#[derive(Debug, Default)]
pub struct CanvasLog {
    pub pixels: Vec<u32>,
    pub row_writes: usize,
}

/// A `cols × rows` surface storing `0x00RRGGBB` pixels.
pub struct Canvas {
    rows: usize,
    cols: usize,
    pub log: Shared<CanvasLog>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        let log = shared::<CanvasLog>();
        log.borrow_mut().pixels = vec![0; rows * cols];
        Self { rows, cols, log }
    }
}

impl PixelSurface for Canvas {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn pack_color(&self, r: u8, g: u8, b: u8) -> u32 {
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    fn write_row(&mut self, row: usize, col: usize, run: &[u32]) -> Result<()> {
        if row >= self.rows {
            return Err(Error::Io(format!("row {row} outside surface")));
        }
        let mut log = self.log.borrow_mut();
        let end = (col + run.len()).min(self.cols);
        let start = row * self.cols;
        log.pixels[start + col..start + end].copy_from_slice(&run[..end - col]);
        log.row_writes += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct AudioDecodeLog {
    pub packets: usize,
    pub flushes: usize,
}

/// Yields `blocks_per_packet` blocks of `block` for every packet.
pub struct FakeAudioDecoder {
    block: Vec<i16>,
    blocks_per_packet: usize,
    pending: usize,
    pub log: Shared<AudioDecodeLog>,
}

impl FakeAudioDecoder {
    pub fn new(block: Vec<i16>, blocks_per_packet: usize) -> Self {
        Self {
            block,
            blocks_per_packet,
            pending: 0,
            log: shared(),
        }
    }
}

impl AudioDecoder<Pkt> for FakeAudioDecoder {
    fn send_packet(&mut self, _packet: &Pkt) -> Result<()> {
        self.log.borrow_mut().packets += 1;
        self.pending = self.blocks_per_packet;
        Ok(())
    }

    fn receive_block(&mut self, scratch: &mut SampleScratch) -> Result<bool> {
        if self.pending == 0 {
            return Ok(false);
        }
        self.pending -= 1;
        scratch.fill(&self.block)?;
        Ok(true)
    }

    fn flush(&mut self) {
        self.pending = 0;
        self.log.borrow_mut().flushes += 1;
    }
}

#[derive(Debug, Default)]
pub struct SinkLog {
    pub blocks: Vec<Vec<i16>>,
    pub resets: usize,
    /// Writes that will fail before the sink recovers.
    pub failures_left: usize,
}

pub struct FakeSink {
    max_block: usize,
    pub log: Shared<SinkLog>,
}

impl FakeSink {
    pub fn new(max_block: usize) -> Self {
        Self {
            max_block,
            log: shared(),
        }
    }

    pub fn failing(self, writes: usize) -> Self {
        self.log.borrow_mut().failures_left = writes;
        self
    }
}

impl AudioSink for FakeSink {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if log.failures_left > 0 {
            log.failures_left -= 1;
            return Err(PlaybackError::SinkUnderrun.into());
        }
        log.blocks.push(samples.to_vec());
        Ok(())
    }

    fn reset(&mut self) {
        self.log.borrow_mut().resets += 1;
    }

    fn format(&self) -> AudioFormat {
        AudioFormat {
            channels: 2,
            sample_rate: 48_000,
        }
    }

    fn max_block_samples(&self) -> usize {
        self.max_block
    }
}

/// A status line writer whose output stays readable after boxing.
#[derive(Clone, Default)]
pub struct StatusBuffer(pub Shared<Vec<u8>>);

impl StatusBuffer {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for StatusBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
