use log::debug;

/// 120 BPM, the tempo a metrical MIDI file plays at until told otherwise.
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    start_tick: u64,
    start_seconds: f64,
    seconds_per_tick: f64,
}

/// Piecewise-linear mapping from MIDI ticks to seconds.
///
/// Metrical files change slope at every tempo event; timecode files have a
/// single fixed slope and ignore tempo events.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    ticks_per_beat: Option<u16>,
    segments: Vec<TempoSegment>,
    first_micros_per_beat: Option<u32>,
}

impl TempoMap {
    pub fn metrical(ticks_per_beat: u16) -> Self {
        let ticks_per_beat = ticks_per_beat.max(1);
        Self {
            ticks_per_beat: Some(ticks_per_beat),
            segments: vec![TempoSegment {
                start_tick: 0,
                start_seconds: 0.0,
                seconds_per_tick: Self::compute_seconds_per_tick(
                    DEFAULT_MICROS_PER_BEAT,
                    ticks_per_beat,
                ),
            }],
            first_micros_per_beat: None,
        }
    }

    pub fn timecode(frames_per_second: f64, ticks_per_frame: u8) -> Self {
        let ticks_per_second = frames_per_second * f64::from(ticks_per_frame.max(1));
        Self {
            ticks_per_beat: None,
            segments: vec![TempoSegment {
                start_tick: 0,
                start_seconds: 0.0,
                seconds_per_tick: 1.0 / ticks_per_second,
            }],
            first_micros_per_beat: None,
        }
    }

    fn compute_seconds_per_tick(micros_per_beat: u32, ticks_per_beat: u16) -> f64 {
        let seconds_per_beat = f64::from(micros_per_beat) / 1_000_000.0;
        seconds_per_beat / f64::from(ticks_per_beat)
    }

    /// Record a tempo event. Events must arrive in non-decreasing tick order.
    pub fn with_tempo_change(mut self, tick: u64, micros_per_beat: u32) -> Self {
        let Some(ticks_per_beat) = self.ticks_per_beat else {
            return self;
        };
        if self.first_micros_per_beat.is_none() {
            self.first_micros_per_beat = Some(micros_per_beat);
        }

        let start_seconds = self.seconds_at(tick);
        let seconds_per_tick = Self::compute_seconds_per_tick(micros_per_beat, ticks_per_beat);
        debug!("tempo change at tick {tick}: {micros_per_beat} us/beat");

        // a change on the same tick replaces the previous one
        match self.segments.last_mut() {
            Some(last) if last.start_tick == tick => {
                last.seconds_per_tick = seconds_per_tick;
                return self;
            }
            _ => {}
        }

        self.segments.push(TempoSegment {
            start_tick: tick,
            start_seconds,
            seconds_per_tick,
        });
        self
    }

    pub fn seconds_at(&self, tick: u64) -> f64 {
        let index = self
            .segments
            .partition_point(|segment| segment.start_tick <= tick)
            .saturating_sub(1);
        let segment = self.segments[index];
        segment.start_seconds + (tick - segment.start_tick) as f64 * segment.seconds_per_tick
    }

    /// BPM of the first tempo event, if the file has one.
    pub fn first_bpm(&self) -> Option<f64> {
        self.first_micros_per_beat
            .map(|micros| 60_000_000.0 / f64::from(micros))
    }
}

#[cfg(test)]
mod tempo_map_tests {
    use super::*;

    #[test]
    fn test_default_tempo_is_120_bpm() {
        let map = TempoMap::metrical(480);
        // one beat = 0.5 s
        assert!((map.seconds_at(480) - 0.5).abs() < 1e-12);
        assert!(map.first_bpm().is_none());
    }

    #[test]
    fn test_tempo_change_bends_the_curve() {
        let map = TempoMap::metrical(100).with_tempo_change(100, 1_000_000);
        assert!((map.seconds_at(100) - 0.5).abs() < 1e-12);
        assert!((map.seconds_at(200) - 1.5).abs() < 1e-12);
        assert!((map.first_bpm().unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_at_tick_zero_replaces_default() {
        let map = TempoMap::metrical(96).with_tempo_change(0, 250_000);
        assert!((map.seconds_at(96) - 0.25).abs() < 1e-12);
        assert!((map.first_bpm().unwrap() - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_timecode_ignores_tempo_events() {
        let map = TempoMap::timecode(25.0, 40).with_tempo_change(0, 1_000_000);
        // 25 fps * 40 ticks = 1000 ticks per second
        assert!((map.seconds_at(1000) - 1.0).abs() < 1e-12);
        assert!(map.first_bpm().is_none());
    }
}
