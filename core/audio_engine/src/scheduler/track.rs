use crate::track::Track;

pub struct ScheduledTrack {
    /// Track to be scheduled
    pub track: Box<dyn Track>,
    /// the frame to start playing track
    pub start_frame: u64,
    /// insertion order, keeps simultaneous starts deterministic
    pub sequence: u64,
}

impl ScheduledTrack {
    fn key(&self) -> (u64, u64) {
        (self.start_frame, self.sequence)
    }
}

impl PartialEq for ScheduledTrack {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledTrack {}

impl PartialOrd for ScheduledTrack {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// reversed so BinaryHeap pops the earliest start first
impl Ord for ScheduledTrack {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.key().cmp(&self.key())
    }
}
