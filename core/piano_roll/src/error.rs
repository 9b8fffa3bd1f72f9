use std::{io, path::PathBuf};

use audio_engine::AudioDeviceError;
use thiserror::Error;
use transport::{ClockError, ResolutionError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed MIDI file: {0}")]
    MalformedFile(String),

    #[error("invalid resolution: {0}")]
    InvalidResolution(#[from] ResolutionError),

    #[error("audio unavailable: {0}")]
    AudioUnavailable(#[from] AudioDeviceError),

    #[error("playback clock: {0}")]
    Clock(#[from] ClockError),

    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
