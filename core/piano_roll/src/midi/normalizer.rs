use std::collections::{BTreeMap, VecDeque};

use log::{debug, warn};
use transport::{Note, TempoMap};

use super::{RawEventKind, RawSequence, Timing};

const DEFAULT_BPM: f64 = 120.0;

/// A normalized file: notes sorted by start time, plus its total length.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    notes: Vec<Note>,
    duration: f64,
    bpm: f64,
}

impl Song {
    /// `duration` is stretched to cover the last note end if needed.
    pub fn new(mut notes: Vec<Note>, duration: f64) -> Self {
        notes.sort_by(Note::timeline_cmp);
        let last_end = notes.iter().map(Note::end).fold(0.0, f64::max);
        Self {
            notes,
            duration: duration.max(last_end),
            bpm: DEFAULT_BPM,
        }
    }

    fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Seconds from the start of the file to its last event.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Tempo of the first tempo event, 120 if there is none.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }
}

/// Sounding notes waiting for their note-off, keyed by (channel, key).
///
/// Each key holds a FIFO so a re-struck key closes its oldest note first.
#[derive(Debug, Default)]
struct OpenNotes {
    queues: BTreeMap<(u8, u8), VecDeque<(u64, u8)>>,
}

impl OpenNotes {
    fn open(&mut self, channel: u8, key: u8, tick: u64, velocity: u8) {
        self.queues
            .entry((channel, key))
            .or_default()
            .push_back((tick, velocity));
    }

    fn close(&mut self, channel: u8, key: u8) -> Option<(u64, u8)> {
        self.queues.get_mut(&(channel, key))?.pop_front()
    }

    /// Everything still open, in (channel, key, start) order.
    fn drain(self) -> impl Iterator<Item = (u8, u8, u64, u8)> {
        self.queues.into_iter().flat_map(|((channel, key), queue)| {
            queue
                .into_iter()
                .map(move |(tick, velocity)| (channel, key, tick, velocity))
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventNormalizer;

impl EventNormalizer {
    /// Pair note-ons with note-offs and convert ticks to seconds.
    ///
    /// Notes never switched off are closed at the end of the file.
    pub fn normalize(sequence: &RawSequence) -> Song {
        let tempo = Self::tempo_map(sequence);
        let mut open = OpenNotes::default();
        let mut notes = Vec::new();

        let mut push_note = |key: u8, start: u64, end: u64, velocity: u8| {
            match Note::new(key, tempo.seconds_at(start), tempo.seconds_at(end), velocity) {
                Some(note) => notes.push(note),
                None => debug!("dropping zero-length note {key} at tick {start}"),
            }
        };

        for event in &sequence.events {
            match event.kind {
                RawEventKind::NoteOn {
                    channel,
                    key,
                    velocity,
                } => open.open(channel, key, event.tick, velocity),
                RawEventKind::NoteOff { channel, key } => match open.close(channel, key) {
                    Some((start, velocity)) => push_note(key, start, event.tick, velocity),
                    None => debug!(
                        "ignoring note-off without note-on: key {key} channel {channel} at tick {}",
                        event.tick
                    ),
                },
                RawEventKind::Tempo { .. } => {}
            }
        }

        for (channel, key, start, velocity) in open.drain() {
            warn!(
                "note {key} on channel {channel} starting at {:.3}s never ends; closing it at end of file",
                tempo.seconds_at(start)
            );
            push_note(key, start, sequence.end_tick, velocity);
        }

        let song = Song::new(notes, tempo.seconds_at(sequence.end_tick));
        match tempo.first_bpm() {
            Some(bpm) => song.with_bpm(bpm),
            None => song,
        }
    }

    fn tempo_map(sequence: &RawSequence) -> TempoMap {
        let map = match sequence.timing {
            Timing::Metrical { ticks_per_beat } => TempoMap::metrical(ticks_per_beat),
            Timing::Timecode {
                frames_per_second,
                ticks_per_frame,
            } => TempoMap::timecode(frames_per_second, ticks_per_frame),
        };

        sequence
            .events
            .iter()
            .fold(map, |map, event| match event.kind {
                RawEventKind::Tempo { micros_per_beat } => {
                    map.with_tempo_change(event.tick, micros_per_beat)
                }
                _ => map,
            })
    }
}

#[cfg(test)]
mod normalizer_tests {
    use super::*;
    use crate::midi::{decode, test_files::Step, test_files::smf_bytes};

    fn sequence(events: &[(u64, RawEventKind)], end_tick: u64) -> RawSequence {
        let mut sequence = RawSequence::new(Timing::Metrical {
            ticks_per_beat: 480,
        });
        for &(tick, kind) in events {
            sequence.push(tick, kind);
        }
        sequence.end_tick = sequence.end_tick.max(end_tick);
        sequence
    }

    fn on(key: u8) -> RawEventKind {
        RawEventKind::NoteOn {
            channel: 0,
            key,
            velocity: 100,
        }
    }

    fn off(key: u8) -> RawEventKind {
        RawEventKind::NoteOff { channel: 0, key }
    }

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pairs_note_on_with_note_off() {
        // 480 ticks = one beat = 0.5 s at the default tempo
        let song = EventNormalizer::normalize(&sequence(&[(0, on(60)), (480, off(60))], 960));

        assert_eq!(song.notes().len(), 1);
        let note = song.notes()[0];
        assert_eq!(note.pitch(), 60);
        assert_eq!(note.velocity(), 100);
        assert!(close_to(note.start(), 0.0));
        assert!(close_to(note.end(), 0.5));
        assert!(close_to(song.duration(), 1.0));
        assert!(close_to(song.bpm(), 120.0));
    }

    #[test]
    fn test_unmatched_note_on_is_closed_at_end_of_file() {
        let song = EventNormalizer::normalize(&sequence(&[(240, on(64))], 960));

        assert_eq!(song.notes().len(), 1);
        assert!(close_to(song.notes()[0].start(), 0.25));
        assert!(close_to(song.notes()[0].end(), 1.0));
    }

    #[test]
    fn test_same_key_on_different_channels_pair_independently() {
        let events = [
            (0, on(60)),
            (
                100,
                RawEventKind::NoteOn {
                    channel: 1,
                    key: 60,
                    velocity: 50,
                },
            ),
            (480, off(60)),
            (960, RawEventKind::NoteOff { channel: 1, key: 60 }),
        ];
        let song = EventNormalizer::normalize(&sequence(&events, 960));

        assert_eq!(song.notes().len(), 2);
        assert_eq!(song.notes()[0].velocity(), 100);
        assert!(close_to(song.notes()[0].end(), 0.5));
        assert_eq!(song.notes()[1].velocity(), 50);
        assert!(close_to(song.notes()[1].end(), 1.0));
    }

    #[test]
    fn test_restruck_key_closes_oldest_first() {
        let events = [(0, on(60)), (240, on(60)), (480, off(60)), (720, off(60))];
        let song = EventNormalizer::normalize(&sequence(&events, 720));

        let spans: Vec<(f64, f64)> = song.notes().iter().map(|n| (n.start(), n.end())).collect();
        assert_eq!(spans, [(0.0, 0.5), (0.25, 0.75)]);
    }

    #[test]
    fn test_stray_note_off_and_zero_length_notes_are_dropped() {
        let events = [(0, off(70)), (100, on(61)), (100, off(61))];
        let song = EventNormalizer::normalize(&sequence(&events, 480));
        assert!(song.notes().is_empty());
        assert!(close_to(song.duration(), 0.5));
    }

    #[test]
    fn test_output_is_sorted_by_start() {
        let events = [
            (0, on(72)),
            (240, on(48)),
            (480, off(48)),
            (960, off(72)),
            (120, on(60)),
            (360, off(60)),
        ];
        let mut raw = sequence(&events, 960);
        raw.sort();
        let song = EventNormalizer::normalize(&raw);

        let pitches: Vec<u8> = song.notes().iter().map(Note::pitch).collect();
        assert_eq!(pitches, [72, 60, 48]);
    }

    #[test]
    fn test_tempo_changes_apply_from_their_tick() {
        let bytes = smf_bytes(&[
            (0, Step::Tempo(1_000_000)),
            (0, Step::On(60, 90)),
            (480, Step::Off(60)),
            (0, Step::Tempo(250_000)),
            (0, Step::On(62, 90)),
            (480, Step::Off(62)),
        ]);
        let song = EventNormalizer::normalize(&decode(&bytes).unwrap());

        assert!(close_to(song.bpm(), 60.0));
        assert!(close_to(song.notes()[0].end(), 1.0));
        assert!(close_to(song.notes()[1].start(), 1.0));
        assert!(close_to(song.notes()[1].end(), 1.25));
        assert!(close_to(song.duration(), 1.25));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let events = [(0, on(60)), (10, on(61)), (20, on(62))];
        let first = EventNormalizer::normalize(&sequence(&events, 500));
        let second = EventNormalizer::normalize(&sequence(&events, 500));
        assert_eq!(first, second);
    }
}
