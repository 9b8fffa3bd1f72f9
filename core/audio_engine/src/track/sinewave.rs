use std::f32::consts::PI;

use transport::Note;

use crate::{
    constants::{ATTACK_SECONDS, RELEASE_SECONDS, VOICE_GAIN},
    track::Track,
};

/// One note rendered as a sine wave with a linear attack/release envelope.
#[derive(Debug, Clone, Copy)]
pub struct SineWaveTrack {
    freq: f32,
    sample_rate: f32,
    phase: f32,
    amplitude: f32,
    /// frames from note-on to note-off
    hold_frames: u64,
    attack_frames: u64,
    release_frames: u64,
    position: u64,
}

impl SineWaveTrack {
    pub fn new(freq: f32, sample_rate: f32, amplitude: f32, hold_frames: u64) -> Self {
        Self {
            freq,
            sample_rate,
            phase: 0.0,
            amplitude,
            hold_frames: hold_frames.max(1),
            attack_frames: (ATTACK_SECONDS * f64::from(sample_rate)).round() as u64,
            release_frames: (RELEASE_SECONDS * f64::from(sample_rate)).round() as u64,
            position: 0,
        }
    }

    pub fn from_note(note: &Note, sample_rate: u32) -> Self {
        let hold_frames = (note.duration() * f64::from(sample_rate)).round() as u64;
        let amplitude = VOICE_GAIN * f32::from(note.velocity()) / 127.0;
        Self::new(
            note.frequency() as f32,
            sample_rate as f32,
            amplitude,
            hold_frames,
        )
    }

    fn envelope(&self) -> f32 {
        let position = self.position;
        if position < self.hold_frames {
            if position < self.attack_frames {
                return position as f32 / self.attack_frames as f32;
            }
            return 1.0;
        }

        let released = position - self.hold_frames;
        if released >= self.release_frames {
            return 0.0;
        }
        // release starts from wherever the attack got to
        let start = if self.hold_frames < self.attack_frames {
            self.hold_frames as f32 / self.attack_frames as f32
        } else {
            1.0
        };
        start * (1.0 - released as f32 / self.release_frames as f32)
    }
}

impl Track for SineWaveTrack {
    fn fill_next_samples(&mut self, next_samples: &mut [(f32, f32)]) {
        let phase_increment = 2.0 * PI * self.freq / self.sample_rate;

        for (l, r) in next_samples {
            if self.is_finished() {
                break;
            }
            let sample = self.phase.sin() * self.amplitude * self.envelope();
            *l += sample;
            *r += sample;
            self.phase += phase_increment;
            if self.phase >= 2.0 * PI {
                self.phase -= 2.0 * PI;
            }
            self.position += 1;
        }
    }

    fn is_finished(&self) -> bool {
        self.position >= self.hold_frames + self.release_frames
    }
}

#[cfg(test)]
mod sine_wave_tests {
    use super::*;

    const SAMPLE_RATE: u32 = 1000;

    #[test]
    fn test_voice_finishes_after_hold_and_release() {
        // 0.1 s note at 1 kHz: 100 hold frames + 30 release frames
        let note = Note::new(69, 0.0, 0.1, 127).unwrap();
        let mut voice = SineWaveTrack::from_note(&note, SAMPLE_RATE);
        let mut buffer = vec![(0.0, 0.0); 129];
        voice.fill_next_samples(&mut buffer);
        assert!(!voice.is_finished());

        let mut tail = vec![(0.0, 0.0); 10];
        voice.fill_next_samples(&mut tail);
        assert!(voice.is_finished());
        assert!(tail[1..].iter().all(|&(l, r)| l == 0.0 && r == 0.0));
    }

    #[test]
    fn test_voice_mixes_into_existing_samples() {
        let mut voice = SineWaveTrack::new(250.0, SAMPLE_RATE as f32, 0.5, 100);
        let mut buffer = vec![(1.0, 1.0); 20];
        voice.fill_next_samples(&mut buffer);
        // silent at phase zero, then the wave adds on top of the 1.0 floor
        assert_eq!(buffer[0], (1.0, 1.0));
        assert!(buffer[10..].iter().any(|&(l, _)| (l - 1.0).abs() > 0.1));
    }

    #[test]
    fn test_louder_velocity_gives_larger_peak() {
        let soft = Note::new(60, 0.0, 0.5, 20).unwrap();
        let loud = Note::new(60, 0.0, 0.5, 120).unwrap();

        let peak = |note: &Note| {
            let mut voice = SineWaveTrack::from_note(note, SAMPLE_RATE);
            let mut buffer = vec![(0.0f32, 0.0f32); 200];
            voice.fill_next_samples(&mut buffer);
            buffer.iter().map(|(l, _)| l.abs()).fold(0.0, f32::max)
        };

        assert!(peak(&loud) > peak(&soft));
        assert!(peak(&loud) <= VOICE_GAIN + 1e-6);
    }
}
