// SPDX-License-Identifier: MPL-2.0
//! Keyboard command interpreter.
//!
//! Keys are fed one at a time. Digits accumulate a repeat count that the next
//! command consumes; every other key either resolves to a [`Command`] or is
//! ignored. The interpreter has no side effects of its own: executing seeks
//! and printing status is left to the playback loop.

use crate::config::{DEFAULT_LONG_SEEK_SECS, DEFAULT_NORMAL_SEEK_SECS, DEFAULT_SHORT_SEEK_SECS};

const KEY_ESCAPE: u8 = 27;

/// Control decision consumed by the playback loop once per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    Play,
    Pause,
    Exit,
}

/// A resolved keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Seek by or to `seconds`.
    Seek { seconds: i64, relative: bool },
    /// Seek to this percentage of the duration.
    SeekPercent(u32),
    /// Print the status line.
    Info,
    Pause,
    Exit,
}

impl Command {
    /// The control decision this command carries, if any.
    pub fn mode(self) -> Option<PlaybackMode> {
        match self {
            Command::Pause => Some(PlaybackMode::Pause),
            Command::Exit => Some(PlaybackMode::Exit),
            _ => None,
        }
    }
}

/// Seek step sizes in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekUnits {
    pub short: i64,
    pub normal: i64,
    pub long: i64,
}

impl Default for SeekUnits {
    fn default() -> Self {
        Self {
            short: DEFAULT_SHORT_SEEK_SECS,
            normal: DEFAULT_NORMAL_SEEK_SECS,
            long: DEFAULT_LONG_SEEK_SECS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandInterpreter {
    repeat: u32,
    units: SeekUnits,
}

impl CommandInterpreter {
    pub fn new(units: SeekUnits) -> Self {
        Self { repeat: 0, units }
    }

    /// The repeat count typed so far.
    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Consumes the repeat count, reading an untyped count as 1.
    fn take_count(&mut self) -> i64 {
        i64::from(std::mem::take(&mut self.repeat).max(1))
    }

    fn seek(&mut self, unit: i64, forward: bool) -> Command {
        let seconds = self.take_count().saturating_mul(unit);
        Command::Seek {
            seconds: if forward { seconds } else { -seconds },
            relative: true,
        }
    }

    /// Applies one keystroke.
    pub fn feed(&mut self, key: u8) -> Option<Command> {
        match key {
            b'0'..=b'9' => {
                self.repeat = self
                    .repeat
                    .saturating_mul(10)
                    .saturating_add(u32::from(key - b'0'));
                None
            }
            KEY_ESCAPE => {
                self.repeat = 0;
                None
            }
            b'q' => {
                self.repeat = 0;
                Some(Command::Exit)
            }
            b'l' => Some(self.seek(self.units.short, true)),
            b'h' => Some(self.seek(self.units.short, false)),
            b'j' => Some(self.seek(self.units.normal, true)),
            b'k' => Some(self.seek(self.units.normal, false)),
            b'J' => Some(self.seek(self.units.long, true)),
            b'K' => Some(self.seek(self.units.long, false)),
            b'%' => match std::mem::take(&mut self.repeat) {
                0 => None,
                percent => Some(Command::SeekPercent(percent)),
            },
            b'i' => {
                self.repeat = 0;
                Some(Command::Info)
            }
            b' ' | b'p' => {
                self.repeat = 0;
                Some(Command::Pause)
            }
            _ => None,
        }
    }

    /// Feeds every key in order, handing non-control commands to `execute`,
    /// and returns the last control decision (`Play` if none).
    pub fn run<I, F>(&mut self, keys: I, mut execute: F) -> PlaybackMode
    where
        I: IntoIterator<Item = u8>,
        F: FnMut(Command),
    {
        let mut mode = PlaybackMode::Play;
        for key in keys {
            if let Some(command) = self.feed(key) {
                match command.mode() {
                    Some(decision) => mode = decision,
                    None => execute(command),
                }
            }
        }
        mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(keys: &[u8]) -> (Vec<Command>, PlaybackMode) {
        let mut interpreter = CommandInterpreter::default();
        let mut commands = Vec::new();
        let mode = interpreter.run(keys.iter().copied(), |c| commands.push(c));
        (commands, mode)
    }

    fn relative(seconds: i64) -> Command {
        Command::Seek {
            seconds,
            relative: true,
        }
    }

    #[test]
    fn no_keys_means_play() {
        assert_eq!(interpret(b""), (vec![], PlaybackMode::Play));
    }

    #[test]
    fn motion_keys_default_to_one_step() {
        let units = SeekUnits::default();
        let (commands, _) = interpret(b"lhjkJK");
        assert_eq!(
            commands,
            vec![
                relative(units.short),
                relative(-units.short),
                relative(units.normal),
                relative(-units.normal),
                relative(units.long),
                relative(-units.long),
            ]
        );
    }

    #[test]
    fn digits_form_decimal_repeat_count() {
        let units = SeekUnits::default();
        for (keys, count) in [
            (&b"5l"[..], 5),
            (&b"12l"[..], 12),
            (&b"007l"[..], 7),
            (&b"305l"[..], 305),
        ] {
            let (commands, _) = interpret(keys);
            assert_eq!(commands, vec![relative(count * units.short)], "{keys:?}");
        }
    }

    #[test]
    fn repeat_count_is_consumed_by_next_command() {
        let units = SeekUnits::default();
        let (commands, _) = interpret(b"3jj");
        assert_eq!(
            commands,
            vec![relative(3 * units.normal), relative(units.normal)]
        );
    }

    #[test]
    fn five_l_then_q_seeks_then_exits() {
        let (commands, mode) = interpret(b"5lq");
        assert_eq!(commands, vec![relative(5 * SeekUnits::default().short)]);
        assert_eq!(mode, PlaybackMode::Exit);
    }

    #[test]
    fn percent_without_count_is_noop() {
        assert_eq!(interpret(b"%"), (vec![], PlaybackMode::Play));
    }

    #[test]
    fn percent_with_count_seeks_absolute() {
        let (commands, _) = interpret(b"50%");
        assert_eq!(commands, vec![Command::SeekPercent(50)]);
    }

    #[test]
    fn escape_clears_repeat_count() {
        let mut interpreter = CommandInterpreter::default();
        interpreter.feed(b'4');
        interpreter.feed(b'2');
        assert_eq!(interpreter.repeat(), 42);
        interpreter.feed(KEY_ESCAPE);
        assert_eq!(interpreter.repeat(), 0);
        assert_eq!(interpreter.feed(b'%'), None);
    }

    #[test]
    fn unknown_keys_are_ignored_and_keep_count() {
        let (commands, mode) = interpret(b"2x?l");
        assert_eq!(commands, vec![relative(2 * SeekUnits::default().short)]);
        assert_eq!(mode, PlaybackMode::Play);
    }

    #[test]
    fn pause_keys() {
        assert_eq!(interpret(b" ").1, PlaybackMode::Pause);
        assert_eq!(interpret(b"p").1, PlaybackMode::Pause);
    }

    #[test]
    fn last_control_decision_wins() {
        assert_eq!(interpret(b"qp").1, PlaybackMode::Pause);
        assert_eq!(interpret(b"pq").1, PlaybackMode::Exit);
    }

    #[test]
    fn every_command_consumes_the_count() {
        let mut interpreter = CommandInterpreter::default();
        for key in [b'i', b'p', b' ', b'q'] {
            interpreter.feed(b'9');
            assert!(interpreter.feed(key).is_some());
            assert_eq!(interpreter.repeat(), 0, "key {}", key as char);
        }
    }

    #[test]
    fn huge_counts_saturate() {
        let mut interpreter = CommandInterpreter::default();
        for _ in 0..30 {
            interpreter.feed(b'9');
        }
        assert_eq!(interpreter.repeat(), u32::MAX);
        match interpreter.feed(b'K') {
            Some(Command::Seek { seconds, .. }) => assert!(seconds < 0),
            other => panic!("expected seek, got {other:?}"),
        }
    }

    #[test]
    fn custom_units_are_used() {
        let mut interpreter = CommandInterpreter::new(SeekUnits {
            short: 1,
            normal: 2,
            long: 3,
        });
        assert_eq!(interpreter.feed(b'J'), Some(relative(3)));
    }
}
