use log::warn;

use crate::{
    constants::{PIANO_HIGHEST, PIANO_LOWEST},
    grid::Grid,
};

/// Inclusive band of pitch lanes shown on screen, drawn high to low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneRange {
    low: u8,
    high: u8,
}

impl LaneRange {
    pub const PIANO: Self = Self {
        low: PIANO_LOWEST,
        high: PIANO_HIGHEST,
    };

    pub fn new(low: u8, high: u8) -> Self {
        Self {
            low: low.min(high),
            high: low.max(high),
        }
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn lane_count(&self) -> usize {
        usize::from(self.high - self.low) + 1
    }

    pub fn contains(&self, pitch: u8) -> bool {
        (self.low..=self.high).contains(&pitch)
    }

    /// Pitches from the top row down.
    pub fn pitches(&self) -> impl Iterator<Item = u8> {
        (self.low..=self.high).rev()
    }

    /// Lanes for `grid`: the 88 piano keys, widened to any note outside them.
    ///
    /// With `max_rows`, a range that does not fit collapses to the sounding
    /// notes, and if those still do not fit it is cut down around their
    /// middle with a warning.
    pub fn select(grid: &Grid, max_rows: Option<u16>) -> Self {
        let sounding = grid
            .pitch_range()
            .map(|(low, high)| Self::new(low, high));
        let full = match sounding {
            Some(sounding) => Self::new(
                sounding.low.min(PIANO_LOWEST),
                sounding.high.max(PIANO_HIGHEST),
            ),
            None => Self::PIANO,
        };

        let Some(max_rows) = max_rows.map(usize::from) else {
            return full;
        };
        if full.lane_count() <= max_rows {
            return full;
        }

        let focus = sounding.unwrap_or(Self::PIANO);
        if focus.lane_count() > max_rows {
            warn!(
                "terminal fits {max_rows} of {} sounding pitch lanes; notes outside are not shown",
                focus.lane_count()
            );
        }
        full.centered_on(focus, max_rows.max(1))
    }

    /// A `rows`-tall sub-range of `self` centered on `focus`.
    fn centered_on(self, focus: Self, rows: usize) -> Self {
        let rows = rows.min(self.lane_count()) as i32;
        let middle = (i32::from(focus.low) + i32::from(focus.high) + 1) / 2;
        let low = (middle - rows / 2)
            .max(i32::from(self.low))
            .min(i32::from(self.high) - rows + 1);
        let high = low + rows - 1;
        Self::new(low as u8, high as u8)
    }
}

#[cfg(test)]
mod lane_range_tests {
    use transport::{Note, Resolution};

    use super::*;
    use crate::grid::GridBuilder;

    fn grid(pitches: &[u8]) -> Grid {
        let notes: Vec<Note> = pitches
            .iter()
            .map(|&p| Note::new(p, 0.0, 1.0, 100).unwrap())
            .collect();
        GridBuilder::new(Resolution::DEFAULT).build(&notes, 1.0)
    }

    #[test]
    fn test_defaults_to_88_keys() {
        let lanes = LaneRange::select(&grid(&[60, 72]), None);
        assert_eq!(lanes, LaneRange::PIANO);
        assert_eq!(lanes.lane_count(), 88);
    }

    #[test]
    fn test_widens_for_notes_outside_the_piano() {
        let lanes = LaneRange::select(&grid(&[10, 60, 120]), None);
        assert_eq!((lanes.low(), lanes.high()), (10, 120));
    }

    #[test]
    fn test_short_terminal_collapses_to_sounding_range() {
        let lanes = LaneRange::select(&grid(&[60, 67]), Some(20));
        assert_eq!(lanes.lane_count(), 20);
        assert!(lanes.contains(60) && lanes.contains(67));
    }

    #[test]
    fn test_too_short_terminal_truncates_around_the_middle() {
        let lanes = LaneRange::select(&grid(&[40, 80]), Some(10));
        assert_eq!(lanes.lane_count(), 10);
        assert!(lanes.contains(60));
        assert!(!lanes.contains(40));
    }

    #[test]
    fn test_truncation_stays_inside_the_full_range() {
        let lanes = LaneRange::select(&grid(&[21, 22]), Some(10));
        assert_eq!((lanes.low(), lanes.high()), (21, 30));
    }

    #[test]
    fn test_pitches_run_top_down() {
        let pitches: Vec<u8> = LaneRange::new(60, 62).pitches().collect();
        assert_eq!(pitches, [62, 61, 60]);
    }
}
