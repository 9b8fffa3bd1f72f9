use thiserror::Error;

pub mod cpal_dm;

#[derive(Clone, Debug, Error)]
pub enum AudioDeviceError {
    #[error("no audio output device found")]
    DeviceNotFound,
    #[error("audio output configuration unavailable: {0}")]
    ConfigUnavailable(String),
    #[error("failed to build audio stream: {0}")]
    StreamBuildFailed(String),
    #[error("failed to start audio stream: {0}")]
    StreamStartFailed(String),
    #[error("unsupported sample format '{0}'")]
    UnsupportedFormat(String),
}

/// Output buffer handed to an [`AudioSource`], one variant per sample format.
pub enum AudioSourceBufferKind<'a> {
    F32(&'a mut [f32]),
    I16(&'a mut [i16]),
    U16(&'a mut [u16]),
}

/// Something that fills interleaved device buffers from the audio thread.
pub trait AudioSource: Send {
    fn fill_buffer(&mut self, buffer: AudioSourceBufferKind<'_>, channels: usize);
}

pub trait AudioDeviceManager {
    /// Frames per second the device consumes.
    fn sample_rate(&self) -> u32;

    fn start_output_stream(
        &mut self,
        audio_source: Box<dyn AudioSource>,
    ) -> Result<(), AudioDeviceError>;

    /// Tear down the stream. The source is dropped with it.
    fn stop_output_stream(&mut self);
}
