use super::{CellRole, Frame, FrameTransform, Row, StyledCell};
use crate::constants::{BLACK_KEY_GLYPH, KEYBOARD_WIDTH, WHITE_KEY_GLYPH};

const KEY_COLUMNS: usize = 2;

pub fn is_white_key(pitch: u8) -> bool {
    matches!(pitch % 12, 0 | 2 | 4 | 5 | 7 | 9 | 11)
}

/// Octave label for C keys, `C4` being middle C.
fn label(pitch: u8) -> Option<String> {
    (pitch % 12 == 0).then(|| format!("C{}", i32::from(pitch / 12) - 1))
}

/// Prepends a keyboard column to every lane row, one key per lane.
#[derive(Debug, Clone, Copy)]
pub struct Keyboard;

impl Keyboard {
    fn block(pitch: Option<u8>) -> Vec<StyledCell> {
        let width = usize::from(KEYBOARD_WIDTH);
        let Some(pitch) = pitch else {
            return vec![StyledCell::new(' ', CellRole::Label); width];
        };

        let label_width = width - KEY_COLUMNS;
        let text = label(pitch).unwrap_or_default();
        let mut cells: Vec<StyledCell> = format!("{text:<label_width$}")
            .chars()
            .take(label_width)
            .map(|glyph| StyledCell::new(glyph, CellRole::Label))
            .collect();

        let glyph = if is_white_key(pitch) {
            WHITE_KEY_GLYPH
        } else {
            BLACK_KEY_GLYPH
        };
        cells.extend([StyledCell::new(glyph, CellRole::Key { pitch }); KEY_COLUMNS]);
        cells
    }
}

impl FrameTransform for Keyboard {
    fn apply(&self, frame: Frame) -> Frame {
        let rows = frame
            .into_rows()
            .into_iter()
            .map(|row| {
                let mut cells = Self::block(row.pitch);
                cells.extend(row.cells);
                Row {
                    pitch: row.pitch,
                    cells,
                }
            })
            .collect();
        Frame::new(rows)
    }
}
