// SPDX-License-Identifier: MPL-2.0
//! Adapters between the playback core and real devices: FFmpeg for
//! demuxing and decoding, cpal for sound, the Linux framebuffer for pixels
//! and the terminal for keys.

pub mod audio_output;
pub mod ffmpeg;
pub mod framebuffer;
pub mod terminal;

pub use audio_output::CpalSink;
pub use ffmpeg::{init_ffmpeg, FfmpegAudioDecoder, FfmpegDemuxer, FfmpegVideoDecoder};
pub use framebuffer::Framebuffer;
pub use terminal::RawTerminal;
