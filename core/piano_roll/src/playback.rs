//! Sound for a run: a clock that follows the player while animating, or the
//! player on its own under a static roll.

use audio_engine::{AudioDeviceError, MidiPlayer};
use log::{debug, warn};
use transport::{Note, PlaybackClock, PlaybackPosition};

use crate::{
    constants::MUSIC_POLL_INTERVAL,
    driver::{FrameSink, Outcome, Signal},
    error::{Error, Result},
    midi::Song,
};

/// Open a player for `song` with `open`. A missing device is not fatal: it
/// is logged and the run carries on without sound.
pub fn open_player<F>(song: &Song, open: F) -> Option<MidiPlayer>
where
    F: FnOnce(&[Note], f64) -> Result<MidiPlayer, AudioDeviceError>,
{
    match open(song.notes(), song.duration()) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("{}; continuing without sound", Error::from(e));
            None
        }
    }
}

/// The clock to animate against: the player when music is requested and a
/// device opens, otherwise the wall clock.
pub fn clock_for<F>(song: &Song, music: bool, open: F) -> PlaybackClock
where
    F: FnOnce(&[Note], f64) -> Result<MidiPlayer, AudioDeviceError>,
{
    if !music {
        return PlaybackClock::free_running();
    }
    open_player(song, open).map_or_else(PlaybackClock::free_running, |player| {
        PlaybackClock::audio_synced(Box::new(player))
    })
}

/// Play to the end of the song, or until `sink` reports an interrupt.
/// The player is released either way.
pub fn play_to_end(mut player: MidiPlayer, sink: &mut dyn FrameSink) -> Result<Outcome> {
    player.begin()?;
    debug!("music-only playback started");

    let outcome = loop {
        if player.is_finished() {
            break Outcome::Finished;
        }
        if sink.wait(MUSIC_POLL_INTERVAL).map_err(Error::Terminal)? == Signal::Interrupt {
            break Outcome::Cancelled;
        }
    };

    player.release();
    Ok(outcome)
}
