use crossterm::style::Color;

use super::{CellRole, Frame, FrameTransform, Row};
use crate::{grid::Cell, render::keyboard::is_white_key};

/// One hue per pitch class, C through B, as 256-color palette indices.
const PALETTE: [u8; 12] = [196, 202, 208, 214, 220, 190, 46, 49, 51, 33, 93, 201];

pub fn pitch_class_color(pitch: u8) -> Color {
    Color::AnsiValue(PALETTE[usize::from(pitch % 12)])
}

/// Colors sounding cells by pitch class. Glyphs are left alone.
#[derive(Debug, Clone, Copy)]
pub struct PitchClassColors;

impl PitchClassColors {
    fn color_of(role: CellRole) -> Option<Color> {
        match role {
            CellRole::Note {
                cell: Cell::Silent, ..
            } => None,
            CellRole::Note { pitch, .. } => Some(pitch_class_color(pitch)),
            CellRole::Key { pitch } if is_white_key(pitch) => Some(Color::White),
            CellRole::Key { .. } | CellRole::Border => Some(Color::DarkGrey),
            CellRole::Label => Some(Color::Grey),
        }
    }
}

impl FrameTransform for PitchClassColors {
    fn apply(&self, frame: Frame) -> Frame {
        let rows = frame
            .into_rows()
            .into_iter()
            .map(|mut row: Row| {
                for cell in &mut row.cells {
                    cell.fg = Self::color_of(cell.role);
                }
                row
            })
            .collect();
        Frame::new(rows)
    }
}
