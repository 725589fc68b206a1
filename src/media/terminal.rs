// SPDX-License-Identifier: MPL-2.0
//! Raw-mode terminal keyboard input.

use crate::error::{PlaybackError, Result};
use crate::player::io::KeySource;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use std::io;
use std::time::Duration;

const KEY_ESCAPE: u8 = 27;

/// How often the resume wait wakes up to poll again.
const WAIT_INTERVAL: Duration = Duration::from_millis(250);

/// Puts the terminal in raw mode and hides the cursor until dropped.
pub struct RawTerminal {
    _raw: (),
}

impl RawTerminal {
    /// Fails with a startup error when there is no terminal to read keys
    /// from, e.g. when running detached from a controlling tty.
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| startup("cannot switch terminal to raw mode", e))?;
        // From here on, Drop restores the terminal.
        let guard = Self { _raw: () };
        event::poll(Duration::ZERO).map_err(|e| startup("cannot read keys from terminal", e))?;
        if let Err(err) = execute!(io::stdout(), cursor::Hide) {
            log::debug!("cursor not hidden: {err}");
        }
        Ok(guard)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

fn startup(what: &str, err: io::Error) -> crate::error::Error {
    PlaybackError::Startup(format!("{what}: {err}")).into()
}

/// Maps a key press to the byte the command interpreter understands.
fn key_byte(key: &KeyEvent) -> Option<u8> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(b'q'),
        KeyCode::Char(c) if c.is_ascii() => Some(c as u8),
        KeyCode::Esc => Some(KEY_ESCAPE),
        _ => None,
    }
}

fn closed(err: io::Error) -> crate::error::Error {
    log::debug!("terminal input failed: {err}");
    PlaybackError::InputClosed.into()
}

impl KeySource for RawTerminal {
    fn read_key(&mut self) -> Result<Option<u8>> {
        while event::poll(Duration::ZERO).map_err(closed)? {
            if let Event::Key(key) = event::read().map_err(closed)? {
                if let Some(byte) = key_byte(&key) {
                    return Ok(Some(byte));
                }
            }
        }
        Ok(None)
    }

    fn wait_for_input(&mut self) -> Result<()> {
        while !event::poll(WAIT_INTERVAL).map_err(closed)? {}
        Ok(())
    }
}
