use std::{collections::BTreeMap, ops::Range};

use transport::{Note, Quantizer, Resolution};

use crate::{error::Result, midi::Song};

/// What a grid cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Silent,
    /// a note continues through this step
    Sustain,
    /// a note starts in this step
    Onset,
}

/// Occupancy of (time step, pitch) cells, quantized at a fixed resolution.
///
/// Sparse and lane-major: only sounding cells are stored, ordered by pitch
/// then step, so a window of one lane is a contiguous range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    resolution: Resolution,
    width: u32,
    cells: BTreeMap<(u8, u32), Cell>,
}

impl Grid {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of time steps, `ceil(duration * resolution)`.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn cell(&self, step: u32, pitch: u8) -> Cell {
        self.cells
            .get(&(pitch, step))
            .copied()
            .unwrap_or(Cell::Silent)
    }

    /// Sounding cells of one lane inside `steps`, in step order.
    pub fn lane(&self, pitch: u8, steps: Range<u32>) -> impl Iterator<Item = (u32, Cell)> + '_ {
        self.cells
            .range((pitch, steps.start)..(pitch, steps.end.max(steps.start)))
            .map(|(&(_, step), &cell)| (step, cell))
    }

    /// Lowest and highest pitch that sound anywhere.
    pub fn pitch_range(&self) -> Option<(u8, u8)> {
        let (&(low, _), _) = self.cells.first_key_value()?;
        let (&(high, _), _) = self.cells.last_key_value()?;
        Some((low, high))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn mark(&mut self, step: u32, pitch: u8, cell: Cell) {
        let slot = self.cells.entry((pitch, step)).or_insert(cell);
        // an onset wins over a sustain from an overlapping note
        *slot = (*slot).max(cell);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GridBuilder {
    resolution: Resolution,
}

impl GridBuilder {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    /// Validate a raw resolution before any grid work.
    pub fn with_resolution(steps_per_second: i64) -> Result<Self> {
        Ok(Self::new(Resolution::new(steps_per_second)?))
    }

    pub fn build(&self, notes: &[Note], duration: f64) -> Grid {
        let last_end = notes.iter().map(Note::end).fold(0.0, f64::max);
        let mut grid = Grid {
            resolution: self.resolution,
            width: Quantizer::step_count(duration.max(last_end), self.resolution),
            cells: BTreeMap::new(),
        };

        for note in notes {
            let steps = Quantizer::steps_spanning(note.start(), note.end(), self.resolution);
            let onset = steps.start;
            for step in steps {
                let cell = if step == onset {
                    Cell::Onset
                } else {
                    Cell::Sustain
                };
                grid.mark(step, note.pitch(), cell);
            }
        }
        grid
    }

    pub fn build_song(&self, song: &Song) -> Grid {
        self.build(song.notes(), song.duration())
    }
}
