/// A0, the lowest key of a standard piano.
pub const PIANO_LOWEST: u8 = 21;
/// C8, the highest key of a standard piano.
pub const PIANO_HIGHEST: u8 = 108;

/// Columns taken by the keyboard block: octave label, gap, key.
pub const KEYBOARD_WIDTH: u16 = 6;

/// Columns (and rows) the border takes on each side.
pub const BORDER_MARGIN: u16 = 1;

pub const ONSET_GLYPH: char = '█';
pub const SUSTAIN_GLYPH: char = '▒';
pub const SILENT_GLYPH: char = ' ';

pub const WHITE_KEY_GLYPH: char = '█';
pub const BLACK_KEY_GLYPH: char = '▓';

/// How often music-only playback checks for the end of the song or a key.
pub const MUSIC_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(50);
