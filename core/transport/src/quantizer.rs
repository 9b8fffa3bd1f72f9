use std::ops::Range;

use crate::resolution::Resolution;

/// Tolerance absorbing float error in `seconds * resolution` products,
/// e.g. `0.3 * 10.0 == 3.0000000000000004`.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct Quantizer;

impl Quantizer {
    /// Index of the time step containing `seconds`.
    pub fn step_at(seconds: f64, resolution: Resolution) -> u32 {
        let scaled = seconds.max(0.0) * resolution.as_f64();
        (scaled + STEP_EPSILON).floor() as u32
    }

    /// Number of steps needed to cover `[0, duration)`: `ceil(duration * resolution)`.
    pub fn step_count(duration: f64, resolution: Resolution) -> u32 {
        let scaled = duration.max(0.0) * resolution.as_f64();
        (scaled - STEP_EPSILON).ceil().max(0.0) as u32
    }

    /// Steps whose interval `[k/r, (k+1)/r)` overlaps `[start, end)`.
    ///
    /// Never empty: a note shorter than the tolerance still occupies the
    /// step it starts in.
    pub fn steps_spanning(start: f64, end: f64, resolution: Resolution) -> Range<u32> {
        let first = Self::step_at(start, resolution);
        let last = Self::step_count(end, resolution);
        first..last.max(first + 1)
    }

    /// Start of step `step` in seconds.
    pub fn seconds_at(step: u32, resolution: Resolution) -> f64 {
        f64::from(step) / resolution.as_f64()
    }
}

#[cfg(test)]
mod quantizer_tests {
    use super::*;

    fn res(value: i64) -> Resolution {
        Resolution::new(value).unwrap()
    }

    #[test]
    fn test_step_at_floors_into_containing_step() {
        assert_eq!(Quantizer::step_at(0.0, res(10)), 0);
        assert_eq!(Quantizer::step_at(0.09, res(10)), 0);
        assert_eq!(Quantizer::step_at(0.1, res(10)), 1);
        assert_eq!(Quantizer::step_at(1.26, res(4)), 5);
    }

    #[test]
    fn test_step_count_rounds_up_partial_steps() {
        assert_eq!(Quantizer::step_count(2.0, res(10)), 20);
        assert_eq!(Quantizer::step_count(2.01, res(10)), 21);
        assert_eq!(Quantizer::step_count(0.0, res(10)), 0);
    }

    #[test]
    fn test_float_noise_does_not_add_a_step() {
        // 0.3 * 10.0 is slightly above 3.0
        assert_eq!(Quantizer::step_count(0.3, res(10)), 3);
        assert_eq!(Quantizer::steps_spanning(0.1, 0.3, res(10)), 1..3);
    }

    #[test]
    fn test_spanning_covers_every_overlapping_step() {
        assert_eq!(Quantizer::steps_spanning(0.0, 1.0, res(10)), 0..10);
        assert_eq!(Quantizer::steps_spanning(0.05, 0.15, res(10)), 0..2);
    }

    #[test]
    fn test_spanning_short_note_inside_one_step() {
        assert_eq!(Quantizer::steps_spanning(0.21, 0.22, res(10)), 2..3);
    }

    #[test]
    fn test_spanning_is_never_empty() {
        assert_eq!(Quantizer::steps_spanning(0.2, 0.200_000_000_1, res(10)), 2..3);
    }

    #[test]
    fn test_seconds_at_inverts_step_at() {
        let resolution = res(8);
        for step in [0, 1, 7, 100] {
            let seconds = Quantizer::seconds_at(step, resolution);
            assert_eq!(Quantizer::step_at(seconds, resolution), step);
        }
    }
}
