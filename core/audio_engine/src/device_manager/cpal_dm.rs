use super::AudioDeviceManager;
use crate::device_manager::{AudioDeviceError, AudioSource, AudioSourceBufferKind};
use cpal::{
    OutputCallbackInfo,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use log::{debug, error};

pub struct CpalAudioDeviceManager {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
    stream: Option<cpal::Stream>,
}

impl CpalAudioDeviceManager {
    /// Pick the default output device of the default host.
    pub fn open_default() -> Result<Self, AudioDeviceError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioDeviceError::DeviceNotFound)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioDeviceError::ConfigUnavailable(e.to_string()))?;

        debug!(
            "audio output: {} ch @ {} Hz ({})",
            config.channels(),
            config.sample_rate().0,
            config.sample_format()
        );

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    fn build_output_stream<T, C>(&self, mut cb: C) -> Result<cpal::Stream, AudioDeviceError>
    where
        T: cpal::SizedSample,
        C: FnMut(&mut [T], usize) + Send + 'static,
    {
        let error_cb = move |err| {
            error!("audio stream error: {err}");
        };

        let channels = self.config.channels() as usize;
        let data_cb = move |data: &mut [T], _: &OutputCallbackInfo| {
            cb(data, channels);
        };

        let stream = self
            .device
            .build_output_stream(&self.config.config(), data_cb, error_cb, None)
            .map_err(|e| AudioDeviceError::StreamBuildFailed(e.to_string()))?;

        Ok(stream)
    }
}

impl AudioDeviceManager for CpalAudioDeviceManager {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    fn start_output_stream(
        &mut self,
        mut audio_source: Box<dyn AudioSource>,
    ) -> Result<(), AudioDeviceError> {
        let stream = match self.config.sample_format() {
            cpal::SampleFormat::F32 => self.build_output_stream(move |data, channels| {
                audio_source.fill_buffer(AudioSourceBufferKind::F32(data), channels);
            })?,
            cpal::SampleFormat::I16 => self.build_output_stream(move |data, channels| {
                audio_source.fill_buffer(AudioSourceBufferKind::I16(data), channels);
            })?,
            cpal::SampleFormat::U16 => self.build_output_stream(move |data, channels| {
                audio_source.fill_buffer(AudioSourceBufferKind::U16(data), channels);
            })?,
            format => {
                return Err(AudioDeviceError::UnsupportedFormat(format.to_string()));
            }
        };

        stream
            .play()
            .map_err(|e| AudioDeviceError::StreamStartFailed(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop_output_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("pausing audio stream failed: {e}");
            }
            drop(stream);
            debug!("audio stream closed");
        }
    }
}

impl Drop for CpalAudioDeviceManager {
    fn drop(&mut self) {
        self.stop_output_stream();
    }
}
