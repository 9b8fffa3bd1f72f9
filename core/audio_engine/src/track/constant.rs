#![cfg(test)]

use crate::track::Track;

/// Emits a fixed sample for a fixed number of frames.
pub struct ConstantTrack {
    sample: (f32, f32),
    remaining: usize,
}

impl ConstantTrack {
    pub fn new(left: f32, right: f32, frames: usize) -> Self {
        Self {
            sample: (left, right),
            remaining: frames,
        }
    }
}

impl Track for ConstantTrack {
    fn fill_next_samples(&mut self, next_samples: &mut [(f32, f32)]) {
        let count = self.remaining.min(next_samples.len());
        for sample in &mut next_samples[..count] {
            sample.0 += self.sample.0;
            sample.1 += self.sample.1;
        }
        self.remaining -= count;
    }

    fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}
