//! Reading standard MIDI files into a flat, tick-ordered event stream.
//!
//! [`decode`] is the only place that touches the `midly` container format;
//! everything downstream works on [`RawSequence`].

use std::path::Path;

use log::debug;
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

use crate::error::{Error, Result};

pub mod normalizer;

pub use normalizer::{EventNormalizer, Song};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    Metrical { ticks_per_beat: u16 },
    Timecode { frames_per_second: f64, ticks_per_frame: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventKind {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8 },
    Tempo { micros_per_beat: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// absolute tick from the start of the file
    pub tick: u64,
    pub kind: RawEventKind,
}

/// All tracks merged into one stream, stable-sorted by tick.
///
/// Events on the same tick keep track order, then file order, so a
/// note-off followed by a note-on on the same key stays in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSequence {
    pub timing: Timing,
    pub events: Vec<RawEvent>,
    /// tick of the last event of the longest track
    pub end_tick: u64,
}

impl RawSequence {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            events: Vec::new(),
            end_tick: 0,
        }
    }

    pub fn push(&mut self, tick: u64, kind: RawEventKind) {
        self.end_tick = self.end_tick.max(tick);
        self.events.push(RawEvent { tick, kind });
    }

    fn sort(&mut self) {
        self.events.sort_by_key(|event| event.tick);
    }
}

/// Parse a MIDI container into a [`RawSequence`].
pub fn decode(bytes: &[u8]) -> Result<RawSequence> {
    let smf = Smf::parse(bytes).map_err(|e| Error::MalformedFile(e.to_string()))?;

    let timing = match smf.header.timing {
        midly::Timing::Metrical(ticks_per_beat) => Timing::Metrical {
            ticks_per_beat: ticks_per_beat.as_int(),
        },
        midly::Timing::Timecode(fps, ticks_per_frame) => Timing::Timecode {
            frames_per_second: f64::from(fps.as_f32()),
            ticks_per_frame,
        },
    };

    let mut sequence = RawSequence::new(timing);
    for (index, track) in smf.tracks.iter().enumerate() {
        let mut tick = 0u64;
        for event in track {
            tick += u64::from(event.delta.as_int());
            let kind = match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            RawEventKind::NoteOn {
                                channel,
                                key: key.as_int(),
                                velocity: vel.as_int(),
                            }
                        }
                        // note-on with velocity 0 is a note-off
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            RawEventKind::NoteOff {
                                channel,
                                key: key.as_int(),
                            }
                        }
                        _ => continue,
                    }
                }
                TrackEventKind::Meta(MetaMessage::Tempo(micros_per_beat)) => RawEventKind::Tempo {
                    micros_per_beat: micros_per_beat.as_int(),
                },
                _ => continue,
            };
            sequence.push(tick, kind);
        }
        // end-of-track may sit past the last note
        sequence.end_tick = sequence.end_tick.max(tick);
        debug!("track {index}: {} events, ends at tick {tick}", track.len());
    }

    sequence.sort();
    Ok(sequence)
}

/// Read, decode and normalize the file at `path`.
pub fn load(path: &Path) -> Result<Song> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sequence = decode(&bytes)?;
    Ok(EventNormalizer::normalize(&sequence))
}
