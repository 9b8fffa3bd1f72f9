/// A sounding pitch with absolute start and end times in seconds.
///
/// Only constructible through [`Note::new`], which enforces
/// `0 <= start < end` and 7-bit pitch/velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pitch: u8,
    start: f64,
    end: f64,
    velocity: u8,
}

impl Note {
    pub const MAX_PITCH: u8 = 127;

    pub fn new(pitch: u8, start: f64, end: f64, velocity: u8) -> Option<Self> {
        let valid = pitch <= Self::MAX_PITCH
            && velocity <= 127
            && start.is_finite()
            && end.is_finite()
            && start >= 0.0
            && end > start;

        valid.then_some(Self {
            pitch,
            start,
            end,
            velocity,
        })
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Frequency of the pitch in Hz (A4 = 440).
    pub fn frequency(&self) -> f64 {
        440.0 * 2.0_f64.powf((f64::from(self.pitch) - 69.0) / 12.0)
    }

    /// Total order used to keep note lists sorted: start, then pitch, then end.
    pub fn timeline_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.start
            .total_cmp(&other.start)
            .then(self.pitch.cmp(&other.pitch))
            .then(self.end.total_cmp(&other.end))
            .then(self.velocity.cmp(&other.velocity))
    }
}
