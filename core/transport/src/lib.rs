pub mod clock;
pub mod note;
pub mod quantizer;
pub mod resolution;
pub mod tempo;
pub mod timeline;

pub use clock::{Clock, ClockError, PlaybackClock, PlaybackPosition};
pub use note::Note;
pub use quantizer::Quantizer;
pub use resolution::{Resolution, ResolutionError};
pub use tempo::TempoMap;
pub use timeline::PlaybackCursor;
