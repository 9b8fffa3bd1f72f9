use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use log::{debug, warn};
use rtrb::RingBuffer;
use transport::{ClockError, Note, PlaybackPosition};

use crate::{
    constants::COMMAND_QUEUE_SIZE,
    device_manager::{AudioDeviceError, AudioDeviceManager, cpal_dm::CpalAudioDeviceManager},
    scheduler::{
        Scheduler,
        command::{SchedulerCommand, SchedulerCommandProducer},
    },
};

/// Plays a note list on an output device and reports how far it got.
///
/// The stream is opened silent; [`PlaybackPosition::begin`] starts the
/// timeline and [`PlaybackPosition::release`] (or drop) closes the device.
/// A released player cannot begin again.
pub struct MidiPlayer {
    device: Box<dyn AudioDeviceManager>,
    commands: SchedulerCommandProducer,
    frames_played: Arc<AtomicU64>,
    sample_rate: u32,
    duration: f64,
    released: bool,
}

impl MidiPlayer {
    /// Open the default output device and prepare `notes` for playback.
    pub fn open(notes: &[Note], duration: f64) -> Result<Self, AudioDeviceError> {
        let device = CpalAudioDeviceManager::open_default()?;
        Self::with_device(Box::new(device), notes, duration)
    }

    pub fn with_device(
        mut device: Box<dyn AudioDeviceManager>,
        notes: &[Note],
        duration: f64,
    ) -> Result<Self, AudioDeviceError> {
        let sample_rate = device.sample_rate();
        let (commands, consumer) = RingBuffer::new(COMMAND_QUEUE_SIZE);
        let frames_played = Arc::new(AtomicU64::new(0));

        let scheduler =
            Scheduler::for_notes(consumer, Arc::clone(&frames_played), notes, sample_rate);
        device.start_output_stream(Box::new(scheduler))?;
        debug!("audio player ready: {} voices at {sample_rate} Hz", notes.len());

        Ok(Self {
            device,
            commands,
            frames_played,
            sample_rate,
            duration,
            released: false,
        })
    }

    fn send(&mut self, command: SchedulerCommand) {
        if self.commands.push(command).is_err() {
            warn!("audio command queue full, command dropped");
        }
    }

    pub fn position_seconds(&self) -> f64 {
        self.frames_played.load(Ordering::Acquire) as f64 / f64::from(self.sample_rate)
    }

    pub fn is_finished(&self) -> bool {
        self.released || self.position_seconds() >= self.duration
    }
}

impl PlaybackPosition for MidiPlayer {
    fn begin(&mut self) -> Result<(), ClockError> {
        if self.released {
            return Err(ClockError::SourceReleased);
        }
        self.send(SchedulerCommand::Play);
        Ok(())
    }

    fn position(&self) -> Option<f64> {
        (!self.released).then(|| self.position_seconds())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.send(SchedulerCommand::Stop);
        self.device.stop_output_stream();
        self.released = true;
        debug!("audio player released at {:.3}s", self.position_seconds());
    }
}

impl Drop for MidiPlayer {
    fn drop(&mut self) {
        self.release();
    }
}
