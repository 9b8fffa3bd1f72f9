use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

use crate::timeline::PlaybackCursor;

/// How long an audio reference may report no progress before the clock
/// treats it as stalled.
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_millis(250);

/// How far past the last reported position the clock may run between
/// reports. Roughly one output callback period.
pub const DEFAULT_MAX_EXTRAPOLATION: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("playback clock is already running")]
    AlreadyRunning,
    #[error("playback source was released and cannot be restarted")]
    SourceReleased,
}

/// A playback engine the clock can follow.
///
/// `position` must never block: it is sampled once per animation tick.
pub trait PlaybackPosition {
    /// Start producing sound. Fails once the source has been released.
    fn begin(&mut self) -> Result<(), ClockError>;
    /// Seconds of material played so far, `None` when unknown.
    fn position(&self) -> Option<f64>;
    /// Stop producing sound and free the output device. Final.
    fn release(&mut self);
}

/// Logical time source driving the animation loop.
pub trait Clock {
    fn start(&mut self) -> Result<(), ClockError>;
    /// Seconds since `start`. Monotonic.
    fn now(&mut self) -> f64;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

enum Reference {
    Wall,
    Audio {
        source: Box<dyn PlaybackPosition>,
        last_reported: f64,
        last_progress: Instant,
        stalled: bool,
    },
}

pub struct PlaybackClock {
    reference: Reference,
    started_at: Option<Instant>,
    cursor: PlaybackCursor,
    stall_timeout: Duration,
    max_extrapolation: Duration,
}

impl PlaybackClock {
    /// Wall-clock time since `start`, read from a monotonic timer.
    pub fn free_running() -> Self {
        Self {
            reference: Reference::Wall,
            started_at: None,
            cursor: PlaybackCursor::default(),
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            max_extrapolation: DEFAULT_MAX_EXTRAPOLATION,
        }
    }

    /// Follows the position reported by `source`.
    ///
    /// Between reports the clock extrapolates with the wall clock, for at
    /// most the extrapolation cap; past that it holds still until the
    /// source moves again. A source silent for longer than the stall
    /// timeout is reported as stalled.
    pub fn audio_synced(source: Box<dyn PlaybackPosition>) -> Self {
        Self {
            reference: Reference::Audio {
                source,
                last_reported: 0.0,
                last_progress: Instant::now(),
                stalled: false,
            },
            started_at: None,
            cursor: PlaybackCursor::default(),
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            max_extrapolation: DEFAULT_MAX_EXTRAPOLATION,
        }
    }

    pub fn with_stall_timeout(mut self, stall_timeout: Duration) -> Self {
        self.stall_timeout = stall_timeout;
        self
    }

    pub fn with_max_extrapolation(mut self, max_extrapolation: Duration) -> Self {
        self.max_extrapolation = max_extrapolation;
        self
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn is_audio_synced(&self) -> bool {
        matches!(self.reference, Reference::Audio { .. })
    }

    /// Whether the audio reference has gone quiet for longer than the
    /// stall timeout, as of the last `now`.
    pub fn is_stalled(&self) -> bool {
        matches!(self.reference, Reference::Audio { stalled: true, .. })
    }
}

impl Clock for PlaybackClock {
    fn start(&mut self) -> Result<(), ClockError> {
        if self.started_at.is_some() {
            return Err(ClockError::AlreadyRunning);
        }

        let now = Instant::now();
        if let Reference::Audio {
            source,
            last_reported,
            last_progress,
            stalled,
        } = &mut self.reference
        {
            source.begin()?;
            *last_reported = 0.0;
            *last_progress = now;
            *stalled = false;
        }
        self.cursor = PlaybackCursor::default();
        self.started_at = Some(now);
        debug!("playback clock started (audio synced: {})", self.is_audio_synced());
        Ok(())
    }

    fn now(&mut self) -> f64 {
        let Some(started_at) = self.started_at else {
            return self.cursor.position;
        };
        let now = Instant::now();
        let wall_elapsed = now.duration_since(started_at).as_secs_f64();

        let position = match &mut self.reference {
            Reference::Wall => wall_elapsed,
            Reference::Audio {
                source,
                last_reported,
                last_progress,
                stalled,
            } => {
                if let Some(reported) = source
                    .position()
                    .filter(|reported| *reported > *last_reported)
                {
                    if *stalled {
                        debug!("audio resumed at {reported:.3}s");
                    }
                    *last_reported = reported;
                    *last_progress = now;
                    *stalled = false;
                }
                let since_progress = now.duration_since(*last_progress);
                if !*stalled && since_progress > self.stall_timeout {
                    warn!("audio stalled at {:.3}s, holding the display", *last_reported);
                    *stalled = true;
                }
                *last_reported + since_progress.min(self.max_extrapolation).as_secs_f64()
            }
        };

        self.cursor.advance_to(position, wall_elapsed);
        self.cursor.position
    }

    fn stop(&mut self) {
        if self.started_at.take().is_none() {
            return;
        }
        if let Reference::Audio { source, .. } = &mut self.reference {
            source.release();
        }
        debug!(
            "playback clock stopped at {:.3}s (drift {:.3}s)",
            self.cursor.position, self.cursor.drift
        );
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.stop();
    }
}
