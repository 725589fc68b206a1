// SPDX-License-Identifier: MPL-2.0
//! Presentation clock.
//!
//! Tracks the largest timestamp seen on the reference stream (video if bound,
//! else audio) and converts it to whole seconds for position reports and
//! relative seeks.

use crate::error::Result;
use crate::player::io::Demuxer;
use crate::player::time_units::{secs_to_time_units, time_units_to_secs, TimeBase};

/// Timestamps at or above this value are treated as not-a-number.
pub const PTS_SENTINEL: i64 = 1 << 60;

#[derive(Debug, Clone)]
pub struct PresentationClock {
    stream_index: usize,
    time_base: TimeBase,
    duration: i64,
    pts: i64,
    /// Set by a seek; the next observed timestamp is taken as is.
    resync: bool,
}

impl PresentationClock {
    /// Creates a clock for the reference stream.
    ///
    /// `duration` is the container duration in container time units.
    pub fn new(stream_index: usize, time_base: TimeBase, duration: i64) -> Self {
        Self {
            stream_index,
            time_base,
            duration,
            pts: 0,
            resync: false,
        }
    }

    /// Index of the stream whose packets drive this clock.
    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /// Most recently accepted timestamp, in stream ticks.
    pub fn pts(&self) -> i64 {
        self.pts
    }

    /// Records a packet timestamp if it moves the clock forward and is below
    /// [`PTS_SENTINEL`]; anything else is ignored.
    ///
    /// The first non-negative timestamp after a seek is accepted in either
    /// direction.
    pub fn observe(&mut self, packet_pts: i64) {
        if packet_pts >= PTS_SENTINEL {
            return;
        }
        if self.resync && packet_pts >= 0 {
            self.pts = packet_pts;
            self.resync = false;
        } else if self.pts < packet_pts {
            self.pts = packet_pts;
        }
    }

    /// Current position in whole seconds.
    pub fn position_seconds(&self) -> i64 {
        self.time_base.ticks_to_secs(self.pts)
    }

    /// Container duration in whole seconds. Unknown durations read as 0.
    pub fn duration_seconds(&self) -> i64 {
        time_units_to_secs(self.duration).max(0)
    }

    /// Position as a percentage of the duration, 0 when the duration is
    /// unknown.
    pub fn percent(&self) -> f64 {
        let duration = self.duration_seconds();
        if duration == 0 {
            return 0.0;
        }
        self.position_seconds() as f64 * 100.0 / duration as f64
    }

    /// Computes a seek target in seconds, clamped to `[0, duration]`.
    pub fn seek_target(&self, target_seconds: i64, relative: bool) -> i64 {
        let target = if relative {
            self.position_seconds().saturating_add(target_seconds)
        } else {
            target_seconds
        };
        target.clamp(0, self.duration_seconds())
    }

    /// Seeks the demuxer and returns the clamped target in seconds.
    ///
    /// On success the clock reads the target until the next packet of the
    /// reference stream, which then sets the position in either direction.
    pub fn seek<D: Demuxer + ?Sized>(
        &mut self,
        demuxer: &mut D,
        target_seconds: i64,
        relative: bool,
    ) -> Result<i64> {
        let target = self.seek_target(target_seconds, relative);
        demuxer.seek(secs_to_time_units(target))?;
        self.pts = self.time_base.secs_to_ticks(target);
        self.resync = true;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::io::MediaPacket;
    use crate::player::time_units::TIME_UNIT;

    struct NoPacket;

    impl MediaPacket for NoPacket {
        fn stream_index(&self) -> usize {
            0
        }
        fn pts(&self) -> Option<i64> {
            None
        }
    }

    #[derive(Default)]
    struct RecordingDemuxer {
        seeks: Vec<i64>,
    }

    impl Demuxer for RecordingDemuxer {
        type Packet = NoPacket;

        fn read_packet(&mut self) -> Option<NoPacket> {
            None
        }

        fn seek(&mut self, timestamp: i64) -> Result<()> {
            self.seeks.push(timestamp);
            Ok(())
        }

        fn duration(&self) -> i64 {
            0
        }
    }

    fn clock() -> PresentationClock {
        // 1 ms ticks, 100 s container.
        PresentationClock::new(0, TimeBase::new(1, 1000), 100 * TIME_UNIT)
    }

    #[test]
    fn observe_rejects_backwards_and_sentinel_values() {
        let mut clock = clock();
        let mut stored = Vec::new();
        for pts in [5, 3, 9, 1 << 61, 7] {
            clock.observe(pts);
            stored.push(clock.pts());
        }
        assert_eq!(stored, vec![5, 5, 9, 9, 9]);
    }

    #[test]
    fn observe_rejects_exact_sentinel() {
        let mut clock = clock();
        clock.observe(PTS_SENTINEL);
        assert_eq!(clock.pts(), 0);
        clock.observe(PTS_SENTINEL - 1);
        assert_eq!(clock.pts(), PTS_SENTINEL - 1);
    }

    #[test]
    fn observe_ignores_negative_timestamps() {
        let mut clock = clock();
        clock.observe(i64::MIN);
        assert_eq!(clock.pts(), 0);
    }

    #[test]
    fn position_truncates_to_whole_seconds() {
        let mut clock = clock();
        clock.observe(12_999);
        assert_eq!(clock.position_seconds(), 12);
    }

    #[test]
    fn duration_is_constant_and_truncated() {
        let clock = PresentationClock::new(0, TimeBase::new(1, 1000), 95_500_000);
        assert_eq!(clock.duration_seconds(), 95);
    }

    #[test]
    fn unknown_duration_reads_as_zero() {
        let clock = PresentationClock::new(0, TimeBase::new(1, 1000), i64::MIN);
        assert_eq!(clock.duration_seconds(), 0);
        assert_eq!(clock.percent(), 0.0);
    }

    #[test]
    fn percent_reports_progress() {
        let mut clock = clock();
        clock.observe(25_000);
        assert!((clock.percent() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn seek_target_is_clamped() {
        let mut clock = clock();
        clock.observe(50_000);
        assert_eq!(clock.seek_target(10, true), 60);
        assert_eq!(clock.seek_target(-80, true), 0);
        assert_eq!(clock.seek_target(500, true), 100);
        assert_eq!(clock.seek_target(-5, false), 0);
        assert_eq!(clock.seek_target(1000, false), 100);
        assert_eq!(clock.seek_target(42, false), 42);
    }

    #[test]
    fn seek_issues_time_unit_timestamp_and_holds_target() {
        let mut clock = clock();
        let mut demuxer = RecordingDemuxer::default();
        clock.observe(70_000);

        let target = clock.seek(&mut demuxer, -60, true).unwrap();
        assert_eq!(target, 10);
        assert_eq!(demuxer.seeks, vec![10 * TIME_UNIT]);
        assert_eq!(clock.pts(), 10_000);
        assert_eq!(clock.position_seconds(), 10);

        // The first packet after the seek sets the position, even behind it.
        clock.observe(9_600);
        assert_eq!(clock.pts(), 9_600);
        clock.observe(9_000);
        assert_eq!(clock.pts(), 9_600);
    }

    #[test]
    fn relative_seeks_chain_before_any_packet_arrives() {
        let mut clock = clock();
        let mut demuxer = RecordingDemuxer::default();
        clock.observe(50_000);

        assert_eq!(clock.seek(&mut demuxer, 10, true).unwrap(), 60);
        assert_eq!(clock.seek(&mut demuxer, 10, true).unwrap(), 70);
        assert_eq!(demuxer.seeks, vec![60 * TIME_UNIT, 70 * TIME_UNIT]);
        assert!((clock.percent() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn sentinel_after_seek_does_not_resync() {
        let mut clock = clock();
        let mut demuxer = RecordingDemuxer::default();
        clock.seek(&mut demuxer, 40, false).unwrap();
        clock.observe(PTS_SENTINEL);
        clock.observe(-5);
        assert_eq!(clock.pts(), 40_000);
        clock.observe(38_000);
        assert_eq!(clock.pts(), 38_000);
    }

    #[test]
    fn absolute_seek_then_observe_reflects_target() {
        let mut clock = clock();
        let mut demuxer = RecordingDemuxer::default();
        let target = clock.seek(&mut demuxer, 33, false).unwrap();
        // Demuxer lands on a sync point shortly before the target.
        clock.observe(32_600);
        assert!((clock.position_seconds() - target).abs() <= 1);
    }
}
