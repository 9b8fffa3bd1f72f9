//! Turning a window of the grid into a styled, terminal-independent frame.
//!
//! The note area is drawn first; each enabled display option is then a
//! [`FrameTransform`] applied in a fixed order (keyboard, border, color).

use crossterm::style::Color;

use crate::{
    constants::{BORDER_MARGIN, KEYBOARD_WIDTH, ONSET_GLYPH, SILENT_GLYPH, SUSTAIN_GLYPH},
    grid::{Cell, Grid},
    options::DisplayOptions,
};

pub mod border;
pub mod color;
pub mod keyboard;
pub mod lanes;

pub use lanes::LaneRange;

/// What a frame cell depicts, so later transforms can style it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellRole {
    Note { pitch: u8, cell: Cell },
    Key { pitch: u8 },
    Label,
    Border,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyledCell {
    pub glyph: char,
    pub role: CellRole,
    pub fg: Option<Color>,
}

impl StyledCell {
    pub fn new(glyph: char, role: CellRole) -> Self {
        Self {
            glyph,
            role,
            fg: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    /// the pitch lane this row shows, `None` for decoration rows
    pub pitch: Option<u8>,
    pub cells: Vec<StyledCell>,
}

/// One rendered snapshot. Rows run from the highest pitch down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    rows: Vec<Row>,
}

impl Frame {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }

    pub fn lane(&self, pitch: u8) -> Option<&Row> {
        self.rows.iter().find(|row| row.pitch == Some(pitch))
    }

    /// Glyphs only, one string per row.
    pub fn text_lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(|cell| cell.glyph).collect())
            .collect()
    }
}

/// Time steps `[start, start + width)` of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: u32,
    pub width: u32,
}

impl Window {
    pub fn new(start: u32, width: u32) -> Self {
        Self { start, width }
    }

    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.width)
    }
}

/// How much of the terminal the note area gets once decoration is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// time steps per frame
    pub window_width: u32,
    /// pitch lanes per frame
    pub lane_rows: u16,
}

impl Layout {
    pub fn fit(columns: u16, rows: u16, options: &DisplayOptions) -> Self {
        let mut columns = columns;
        let mut rows = rows;
        if options.keyboard {
            columns = columns.saturating_sub(KEYBOARD_WIDTH);
        }
        if options.border {
            columns = columns.saturating_sub(2 * BORDER_MARGIN);
            rows = rows.saturating_sub(2 * BORDER_MARGIN);
        }
        Self {
            window_width: u32::from(columns),
            lane_rows: rows,
        }
    }
}

/// A pure, composable step of frame decoration.
pub trait FrameTransform {
    fn apply(&self, frame: Frame) -> Frame;
}

pub struct FrameRenderer {
    lanes: LaneRange,
    pipeline: Vec<Box<dyn FrameTransform>>,
}

impl FrameRenderer {
    pub fn new(options: &DisplayOptions, lanes: LaneRange) -> Self {
        let mut pipeline: Vec<Box<dyn FrameTransform>> = Vec::new();
        if options.keyboard {
            pipeline.push(Box::new(keyboard::Keyboard));
        }
        if options.border {
            pipeline.push(Box::new(border::Border));
        }
        if options.color {
            pipeline.push(Box::new(color::PitchClassColors));
        }
        Self { lanes, pipeline }
    }

    pub fn lanes(&self) -> LaneRange {
        self.lanes
    }

    pub fn render(&self, grid: &Grid, window: Window) -> Frame {
        let frame = Self::note_area(grid, window, self.lanes);
        self.pipeline
            .iter()
            .fold(frame, |frame, transform| transform.apply(frame))
    }

    fn note_area(grid: &Grid, window: Window, lanes: LaneRange) -> Frame {
        let rows = lanes
            .pitches()
            .map(|pitch| {
                let mut cells = vec![
                    StyledCell::new(
                        SILENT_GLYPH,
                        CellRole::Note {
                            pitch,
                            cell: Cell::Silent,
                        }
                    );
                    window.width as usize
                ];
                for (step, cell) in grid.lane(pitch, window.start..window.end()) {
                    let glyph = match cell {
                        Cell::Onset => ONSET_GLYPH,
                        Cell::Sustain => SUSTAIN_GLYPH,
                        Cell::Silent => SILENT_GLYPH,
                    };
                    cells[(step - window.start) as usize] =
                        StyledCell::new(glyph, CellRole::Note { pitch, cell });
                }
                Row {
                    pitch: Some(pitch),
                    cells,
                }
            })
            .collect();
        Frame::new(rows)
    }
}
