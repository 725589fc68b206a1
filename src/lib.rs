// SPDX-License-Identifier: MPL-2.0
//! `fbplay` plays audio/video files straight to the Linux framebuffer and
//! the default sound device, driven by single keystrokes from a raw terminal.
//!
//! The [`player`] core owns the packet loop, the command interpreter and the
//! presentation clock; [`media`] adapts FFmpeg, cpal, the framebuffer and
//! the terminal to the core's traits.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod player;
