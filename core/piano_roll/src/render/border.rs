use super::{CellRole, Frame, FrameTransform, Row, StyledCell};

const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

/// Draws a one-cell box around the frame.
#[derive(Debug, Clone, Copy)]
pub struct Border;

fn edge(left: char, fill: char, right: char, inner_width: usize) -> Row {
    let mut cells = Vec::with_capacity(inner_width + 2);
    cells.push(StyledCell::new(left, CellRole::Border));
    cells.extend(std::iter::repeat_n(
        StyledCell::new(fill, CellRole::Border),
        inner_width,
    ));
    cells.push(StyledCell::new(right, CellRole::Border));
    Row { pitch: None, cells }
}

impl FrameTransform for Border {
    fn apply(&self, frame: Frame) -> Frame {
        let inner_width = frame.width();
        let side = StyledCell::new(VERTICAL, CellRole::Border);

        let mut rows = Vec::with_capacity(frame.height() + 2);
        rows.push(edge(TOP_LEFT, HORIZONTAL, TOP_RIGHT, inner_width));
        for row in frame.into_rows() {
            let mut cells = Vec::with_capacity(inner_width + 2);
            cells.push(side);
            cells.extend(row.cells);
            // ragged rows are padded so the right side lines up
            cells.resize(inner_width + 1, StyledCell::new(' ', CellRole::Label));
            cells.push(side);
            rows.push(Row {
                pitch: row.pitch,
                cells,
            });
        }
        rows.push(edge(BOTTOM_LEFT, HORIZONTAL, BOTTOM_RIGHT, inner_width));
        Frame::new(rows)
    }
}
