use std::{
    collections::BinaryHeap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use cpal::Sample;
use transport::Note;

use crate::{
    constants::{MASTER_GAIN, MAX_POLYPHONY},
    device_manager::{AudioSource, AudioSourceBufferKind},
    scheduler::{
        command::{SchedulerCommand, SchedulerCommandConsumer},
        track::ScheduledTrack,
    },
    track::{Track, sinewave::SineWaveTrack},
};

pub mod command;
pub mod track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportState {
    Idle,
    Playing,
    Stopped,
}

/// Audio-thread side of playback: starts voices on time, mixes them and
/// publishes how many frames of the timeline have been rendered.
pub struct Scheduler {
    /// a queue of future tracks
    scheduled: BinaryHeap<ScheduledTrack>,
    /// currently playing tracks
    active_tracks: Vec<Box<dyn Track>>,
    /// the current timeline position (starts at 0)
    current_frame: u64,
    commands: SchedulerCommandConsumer,
    state: TransportState,
    /// shared with the UI thread, which turns it into a playback position
    frames_played: Arc<AtomicU64>,
    mix_buffer: Vec<(f32, f32)>,
    next_sequence: u64,
}

impl Scheduler {
    pub fn new(consumer: SchedulerCommandConsumer, frames_played: Arc<AtomicU64>) -> Self {
        Self {
            scheduled: BinaryHeap::new(),
            active_tracks: Vec::with_capacity(MAX_POLYPHONY),
            current_frame: 0,
            commands: consumer,
            state: TransportState::Idle,
            frames_played,
            mix_buffer: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Build a scheduler with one sine voice per note.
    pub fn for_notes(
        consumer: SchedulerCommandConsumer,
        frames_played: Arc<AtomicU64>,
        notes: &[Note],
        sample_rate: u32,
    ) -> Self {
        let mut scheduler = Self::new(consumer, frames_played);
        for note in notes {
            let start_frame = (note.start() * f64::from(sample_rate)).round() as u64;
            let voice = SineWaveTrack::from_note(note, sample_rate);
            scheduler.schedule(Box::new(voice), start_frame);
        }
        scheduler
    }

    pub fn process_command(&mut self, cmd: SchedulerCommand) {
        match cmd {
            SchedulerCommand::Play => {
                if self.state == TransportState::Idle {
                    self.state = TransportState::Playing;
                }
            }
            SchedulerCommand::Stop => {
                self.state = TransportState::Stopped;
                self.scheduled.clear();
                self.active_tracks.clear();
            }
        }
    }

    fn schedule(&mut self, track: Box<dyn Track>, start_frame: u64) {
        self.scheduled.push(ScheduledTrack {
            track,
            start_frame,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
    }

    /// Render the next `buffer.len()` frames of the timeline into `buffer`.
    pub fn next_samples(&mut self, buffer: &mut [(f32, f32)]) {
        buffer.fill((0.0, 0.0));

        while let Ok(cmd) = self.commands.pop() {
            self.process_command(cmd);
        }

        if self.state != TransportState::Playing {
            return;
        }

        for track in &mut self.active_tracks {
            track.fill_next_samples(buffer);
        }

        // tracks starting inside this buffer begin at their exact frame
        let buffer_end = self.current_frame + buffer.len() as u64;
        while self
            .scheduled
            .peek()
            .is_some_and(|top| top.start_frame < buffer_end)
        {
            let Some(ScheduledTrack {
                mut track,
                start_frame,
                ..
            }) = self.scheduled.pop()
            else {
                break;
            };
            let offset = start_frame.saturating_sub(self.current_frame) as usize;
            track.fill_next_samples(&mut buffer[offset..]);
            self.active_tracks.push(track);
        }

        self.active_tracks.retain(|track| !track.is_finished());

        for (l, r) in buffer.iter_mut() {
            *l = (*l * MASTER_GAIN).clamp(-1.0, 1.0);
            *r = (*r * MASTER_GAIN).clamp(-1.0, 1.0);
        }

        self.current_frame = buffer_end;
        self.frames_played
            .store(self.current_frame, Ordering::Release);
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    fn fill_sample<T>(data: &mut [T], samples: &[(f32, f32)], channels: usize)
    where
        T: cpal::FromSample<f32> + cpal::Sample,
    {
        for (frame, &(l, r)) in data.chunks_mut(channels).zip(samples) {
            if let [mono] = frame {
                *mono = ((l + r) * 0.5).to_sample::<T>();
                continue;
            }
            for (channel, sample) in frame.iter_mut().enumerate() {
                let raw_sample = match channel {
                    0 => l,
                    1 => r,
                    _ => (l + r) * 0.5,
                };
                *sample = raw_sample.to_sample::<T>();
            }
        }
    }
}

impl AudioSource for Scheduler {
    fn fill_buffer(&mut self, buffer: AudioSourceBufferKind<'_>, channels: usize) {
        let channels = channels.max(1);
        let frame_size = match &buffer {
            AudioSourceBufferKind::F32(data) => data.len(),
            AudioSourceBufferKind::I16(data) => data.len(),
            AudioSourceBufferKind::U16(data) => data.len(),
        } / channels;

        let mut mix_buffer = std::mem::take(&mut self.mix_buffer);
        mix_buffer.resize(frame_size, (0.0, 0.0));
        self.next_samples(&mut mix_buffer);

        match buffer {
            AudioSourceBufferKind::F32(data) => Self::fill_sample(data, &mix_buffer, channels),
            AudioSourceBufferKind::I16(data) => Self::fill_sample(data, &mix_buffer, channels),
            AudioSourceBufferKind::U16(data) => Self::fill_sample(data, &mix_buffer, channels),
        }
        self.mix_buffer = mix_buffer;
    }
}

#[cfg(test)]
mod scheduler_tests {
    use rtrb::{Producer, RingBuffer};

    use super::*;
    use crate::{constants::AUDIO_SAMPLE_EPSILON, track::constant::ConstantTrack};

    fn create_scheduler_with_channel() -> (Scheduler, Producer<SchedulerCommand>, Arc<AtomicU64>) {
        let (producer, consumer) = RingBuffer::new(32);
        let frames = Arc::new(AtomicU64::new(0));
        let scheduler = Scheduler::new(consumer, Arc::clone(&frames));
        (scheduler, producer, frames)
    }

    fn playing_scheduler() -> (Scheduler, Producer<SchedulerCommand>, Arc<AtomicU64>) {
        let (mut sched, producer, frames) = create_scheduler_with_channel();
        sched.process_command(SchedulerCommand::Play);
        (sched, producer, frames)
    }

    fn render(sched: &mut Scheduler, frames: usize) -> Vec<(f32, f32)> {
        let mut buffer = vec![(0.0, 0.0); frames];
        sched.next_samples(&mut buffer);
        buffer
    }

    fn sum_energy(buffer: &[(f32, f32)]) -> f32 {
        buffer.iter().map(|(l, r)| l.abs() + r.abs()).sum()
    }

    #[test]
    fn test_idle_scheduler_is_silent_and_does_not_advance() {
        let (mut sched, _, frames) = create_scheduler_with_channel();
        sched.schedule(Box::new(ConstantTrack::new(0.5, 0.5, 100)), 0);

        let output = render(&mut sched, 8);
        assert_eq!(sum_energy(&output), 0.0);
        assert_eq!(sched.current_frame(), 0);
        assert_eq!(frames.load(Ordering::Acquire), 0);
    }

    #[test]
    fn test_track_scheduled_at_zero_plays_immediately() {
        let (mut sched, _, _) = playing_scheduler();
        sched.schedule(Box::new(ConstantTrack::new(0.1, 0.1, 100)), 0);

        let output = render(&mut sched, 4);
        assert!(sum_energy(&output) > 0.0);
    }

    #[test]
    fn test_track_starts_at_exact_frame_inside_buffer() {
        let (mut sched, _, _) = playing_scheduler();
        sched.schedule(Box::new(ConstantTrack::new(0.5, 0.5, 100)), 3);

        let output = render(&mut sched, 6);
        assert!(sum_energy(&output[..3]) == 0.0);
        assert!((output[3].0 - 0.5 * MASTER_GAIN).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_track_scheduled_in_future_does_not_play_early() {
        let (mut sched, _, _) = playing_scheduler();
        sched.schedule(Box::new(ConstantTrack::new(1.0, 1.0, 100)), 100);

        assert!(sum_energy(&render(&mut sched, 10)) == 0.0);
        render(&mut sched, 90);
        assert!(sum_energy(&render(&mut sched, 1)) > 0.0);
    }

    #[test]
    fn test_multiple_tracks_mixed_properly() {
        let (mut sched, _, _) = playing_scheduler();
        sched.schedule(Box::new(ConstantTrack::new(0.3, 0.3, 10)), 0);
        sched.schedule(Box::new(ConstantTrack::new(0.5, 0.5, 10)), 0);

        let (l, r) = render(&mut sched, 1)[0];
        assert!((l - 0.8 * MASTER_GAIN).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((r - 0.8 * MASTER_GAIN).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_finished_tracks_are_dropped() {
        let (mut sched, _, _) = playing_scheduler();
        sched.schedule(Box::new(ConstantTrack::new(0.5, 0.5, 2)), 0);

        render(&mut sched, 4);
        assert!(sched.active_tracks.is_empty());
        assert_eq!(sum_energy(&render(&mut sched, 4)), 0.0);
    }

    #[test]
    fn test_play_command_via_ring_starts_timeline() {
        let (mut sched, mut producer, frames) = create_scheduler_with_channel();
        sched.schedule(Box::new(ConstantTrack::new(0.4, 0.4, 10)), 0);

        producer.push(SchedulerCommand::Play).unwrap();
        let output = render(&mut sched, 2);

        assert!((output[0].0 - 0.4 * MASTER_GAIN).abs() < 1e-6);
        assert_eq!(frames.load(Ordering::Acquire), 2);
    }

    #[test]
    fn test_stop_silences_and_freezes_position() {
        let (mut sched, mut producer, frames) = playing_scheduler();
        sched.schedule(Box::new(ConstantTrack::new(0.5, 0.5, 100)), 0);
        render(&mut sched, 5);

        producer.push(SchedulerCommand::Stop).unwrap();
        let output = render(&mut sched, 5);

        assert_eq!(sum_energy(&output), 0.0);
        assert_eq!(frames.load(Ordering::Acquire), 5);

        // a stopped scheduler does not restart
        producer.push(SchedulerCommand::Play).unwrap();
        render(&mut sched, 5);
        assert_eq!(frames.load(Ordering::Acquire), 5);
    }

    #[test]
    fn test_position_keeps_advancing_through_silence() {
        let (mut sched, _, frames) = playing_scheduler();
        render(&mut sched, 64);
        render(&mut sched, 64);
        assert_eq!(frames.load(Ordering::Acquire), 128);
    }

    #[test]
    fn test_notes_become_voices() {
        let (_, consumer) = RingBuffer::new(4);
        let frames = Arc::new(AtomicU64::new(0));
        let notes = [
            Note::new(60, 0.0, 0.01, 100).unwrap(),
            Note::new(64, 0.02, 0.03, 100).unwrap(),
        ];
        let mut sched = Scheduler::for_notes(consumer, frames, &notes, 1000);
        sched.process_command(SchedulerCommand::Play);

        assert_eq!(sched.scheduled.len(), 2);
        render(&mut sched, 10);
        assert_eq!(sched.scheduled.len(), 1);
    }

    #[test]
    fn test_fill_buffer_interleaves_stereo_and_mono() {
        let (mut sched, _, _) = playing_scheduler();
        sched.schedule(Box::new(ConstantTrack::new(0.5, 0.25, 100)), 0);

        let mut stereo = vec![0.0f32; 4];
        sched.fill_buffer(AudioSourceBufferKind::F32(&mut stereo), 2);
        assert!((stereo[0] - 0.5 * MASTER_GAIN).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((stereo[1] - 0.25 * MASTER_GAIN).abs() < AUDIO_SAMPLE_EPSILON);

        let mut mono = vec![0.0f32; 2];
        sched.fill_buffer(AudioSourceBufferKind::F32(&mut mono), 1);
        assert!((mono[0] - 0.375 * MASTER_GAIN).abs() < AUDIO_SAMPLE_EPSILON);
        assert_eq!(sched.current_frame(), 4);
    }
}
