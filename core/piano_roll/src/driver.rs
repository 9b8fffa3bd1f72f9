//! The animation loop: clock → window → frame → terminal, once per step.

use std::{io, time::Duration};

use log::debug;
use transport::{Clock, ClockError, Quantizer};

use crate::{
    error::{Error, Result},
    grid::{Grid, GridBuilder},
    midi::Song,
    options::DisplayOptions,
    render::{Frame, FrameRenderer, LaneRange, Layout, Window},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

/// How a run draws the song, chosen once up front.
pub enum RenderMode {
    /// Scroll in real time, paced by `clock`.
    Animated { clock: Box<dyn Clock> },
    /// Draw the whole song once.
    Static,
}

/// What the sink saw while the loop was waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    /// user interrupt or terminal resize
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// the playhead reached the end of the grid
    Finished,
    Cancelled,
    /// a static render was written
    Rendered,
}

/// Where frames go. Implemented by the terminal and by test fakes.
pub trait FrameSink {
    /// Usable (columns, rows).
    fn size(&self) -> io::Result<(u16, u16)>;
    fn present(&mut self, frame: &Frame) -> io::Result<()>;
    /// Suspend for up to `timeout`, returning early on an interrupt.
    fn wait(&mut self, timeout: Duration) -> io::Result<Signal>;
}

/// Owns a started clock and stops it when dropped, whichever way the
/// loop exits.
struct RunningClock {
    clock: Box<dyn Clock>,
}

impl RunningClock {
    fn start(mut clock: Box<dyn Clock>) -> Result<Self, ClockError> {
        clock.start()?;
        Ok(Self { clock })
    }
}

impl Drop for RunningClock {
    fn drop(&mut self) {
        self.clock.stop();
    }
}

pub struct AnimationDriver {
    song: Song,
    options: DisplayOptions,
    grid: Option<Grid>,
    state: DriverState,
}

impl AnimationDriver {
    pub fn new(song: Song, options: DisplayOptions) -> Self {
        Self {
            song,
            options,
            grid: None,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// The grid for the song, built on first use.
    pub fn grid(&mut self) -> &Grid {
        let (song, resolution) = (&self.song, self.options.resolution);
        self.grid
            .get_or_insert_with(|| GridBuilder::new(resolution).build_song(song))
    }

    /// Run to completion. A driver runs once; a second call fails.
    pub fn run(&mut self, mode: RenderMode, sink: &mut dyn FrameSink) -> Result<Outcome> {
        if self.state != DriverState::Idle {
            return Err(Error::Clock(ClockError::AlreadyRunning));
        }
        let grid = match self.grid.take() {
            Some(grid) => grid,
            None => GridBuilder::new(self.options.resolution).build_song(&self.song),
        };
        self.transition(DriverState::Running);

        let result = match mode {
            RenderMode::Static => render_static(&grid, &self.options, sink),
            RenderMode::Animated { clock } => animate(&grid, &self.options, clock, sink),
        };

        self.grid = Some(grid);
        self.transition(DriverState::Stopped);
        result
    }

    fn transition(&mut self, next: DriverState) {
        debug!("driver {:?} -> {next:?}", self.state);
        self.state = next;
    }
}

fn render_static(
    grid: &Grid,
    options: &DisplayOptions,
    sink: &mut dyn FrameSink,
) -> Result<Outcome> {
    let renderer = FrameRenderer::new(options, LaneRange::select(grid, None));
    let frame = renderer.render(grid, Window::new(0, grid.width()));
    sink.present(&frame).map_err(Error::Terminal)?;
    Ok(Outcome::Rendered)
}

fn animate(
    grid: &Grid,
    options: &DisplayOptions,
    clock: Box<dyn Clock>,
    sink: &mut dyn FrameSink,
) -> Result<Outcome> {
    let (columns, rows) = sink.size().map_err(Error::Terminal)?;
    let layout = Layout::fit(columns, rows, options);
    let renderer = FrameRenderer::new(options, LaneRange::select(grid, Some(layout.lane_rows)));
    let resolution = options.resolution;

    let mut running = RunningClock::start(clock)?;
    loop {
        let now = running.clock.now();
        let start = Quantizer::step_at(now, resolution);
        if start >= grid.width() {
            return Ok(Outcome::Finished);
        }

        let frame = renderer.render(grid, Window::new(start, layout.window_width));
        sink.present(&frame).map_err(Error::Terminal)?;

        let next_tick = Quantizer::seconds_at(start + 1, resolution);
        let sleep = Duration::from_secs_f64((next_tick - running.clock.now()).max(0.0));
        if sink.wait(sleep).map_err(Error::Terminal)? == Signal::Interrupt {
            debug!("interrupted at step {start}");
            return Ok(Outcome::Cancelled);
        }
    }
}
