pub mod cli;
pub mod constants;
pub mod driver;
pub mod error;
pub mod grid;
pub mod midi;
pub mod options;
pub mod playback;
pub mod render;
pub mod terminal;

pub use error::{Error, Result};
