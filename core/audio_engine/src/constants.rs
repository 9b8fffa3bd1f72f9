/// Master volume applied to the whole mix.
pub const MASTER_GAIN: f32 = 0.8;

/// Per-voice peak amplitude at velocity 127, leaving headroom for chords.
pub const VOICE_GAIN: f32 = 0.15;

pub const ATTACK_SECONDS: f64 = 0.005;
pub const RELEASE_SECONDS: f64 = 0.03;

/// Capacity of the command ring between the UI thread and the audio callback.
pub const COMMAND_QUEUE_SIZE: usize = 16;

/// Voices preallocated so the audio callback rarely grows its buffers.
pub const MAX_POLYPHONY: usize = 128;

#[cfg(test)]
pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-6;
