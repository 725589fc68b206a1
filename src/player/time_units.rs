// SPDX-License-Identifier: MPL-2.0
//! Time unit conversion utilities.
//!
//! Two scales meet in the player:
//! - the container's internal unit, `TIME_UNIT` ticks per second, used for
//!   durations and seek requests;
//! - per-stream time bases (`num/den` seconds per tick), used for packet
//!   timestamps.

/// Container time unit ticks per second (FFmpeg's `AV_TIME_BASE`).
pub const TIME_UNIT: i64 = 1_000_000;

/// Converts whole seconds to container time units.
///
/// # Examples
///
/// ```
/// use fbplay::player::time_units::secs_to_time_units;
///
/// assert_eq!(secs_to_time_units(2), 2_000_000);
/// ```
#[inline]
pub fn secs_to_time_units(secs: i64) -> i64 {
    secs.saturating_mul(TIME_UNIT)
}

/// Converts container time units to whole seconds, truncating.
///
/// # Examples
///
/// ```
/// use fbplay::player::time_units::time_units_to_secs;
///
/// assert_eq!(time_units_to_secs(2_999_999), 2);
/// ```
#[inline]
pub fn time_units_to_secs(units: i64) -> i64 {
    units / TIME_UNIT
}

/// A stream time base: one tick lasts `num / den` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    pub num: i32,
    pub den: i32,
}

impl TimeBase {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Converts a timestamp in this time base to whole seconds, truncating.
    ///
    /// A zero denominator yields 0 rather than dividing by zero.
    pub fn ticks_to_secs(self, ticks: i64) -> i64 {
        if self.den == 0 {
            return 0;
        }
        let secs = i128::from(ticks) * i128::from(self.num) / i128::from(self.den);
        secs.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// Converts whole seconds to a timestamp in this time base.
    ///
    /// A zero numerator yields 0.
    pub fn secs_to_ticks(self, secs: i64) -> i64 {
        if self.num == 0 {
            return 0;
        }
        let ticks = i128::from(secs) * i128::from(self.den) / i128::from(self.num);
        ticks.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}

impl From<ffmpeg_next::Rational> for TimeBase {
    fn from(rational: ffmpeg_next::Rational) -> Self {
        Self::new(rational.numerator(), rational.denominator())
    }
}
