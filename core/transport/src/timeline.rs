/// Logical playback position plus how far it trails the wall clock.
///
/// `drift` is `wall_elapsed - position`: zero when free running, positive
/// when the audio reference lags behind real time (buffering, stalls).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackCursor {
    pub position: f64,
    pub drift: f64,
}

impl PlaybackCursor {
    /// Move forward to `position`, never backwards.
    pub fn advance_to(&mut self, position: f64, wall_elapsed: f64) {
        self.position = self.position.max(position);
        self.drift = wall_elapsed - self.position;
    }
}

#[cfg(test)]
mod cursor_tests {
    use super::*;

    #[test]
    fn test_cursor_is_monotonic() {
        let mut cursor = PlaybackCursor::default();
        cursor.advance_to(1.0, 1.0);
        cursor.advance_to(0.5, 1.2);
        assert_eq!(cursor.position, 1.0);
        assert!((cursor.drift - 0.2).abs() < 1e-12);
    }
}
