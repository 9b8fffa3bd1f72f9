pub mod constants;
pub mod device_manager;
pub mod player;
pub mod scheduler;
pub mod track;

pub use device_manager::{AudioDeviceError, AudioDeviceManager};
pub use player::MidiPlayer;
