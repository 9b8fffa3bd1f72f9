use std::{
    io::{self, Stdout, Write},
    thread,
    time::{Duration, Instant},
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use log::debug;

use crate::{
    driver::{FrameSink, Signal},
    render::{Frame, StyledCell},
};

/// Raw mode for as long as it lives, so keys arrive as events.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        debug!("raw mode off");
    }
}

/// Alternate screen and hidden cursor on top of raw mode.
struct ScreenGuard {
    _raw: RawMode,
}

impl ScreenGuard {
    fn enter(out: &mut Stdout) -> io::Result<Self> {
        let raw = RawMode::enable()?;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self { _raw: raw })
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        debug!("terminal restored");
    }
}

enum Mode {
    Inline,
    /// inline output, keys read for interrupts
    Listening { _keys: RawMode },
    Fullscreen { _screen: ScreenGuard },
}

/// Standard output as a [`FrameSink`].
///
/// Inline terminals print a frame as plain lines; fullscreen terminals
/// redraw it in place on the alternate screen and read keys for interrupts.
pub struct Terminal {
    out: Stdout,
    mode: Mode,
}

impl Terminal {
    pub fn inline() -> Self {
        Self {
            out: io::stdout(),
            mode: Mode::Inline,
        }
    }

    pub fn fullscreen() -> io::Result<Self> {
        let mut out = io::stdout();
        let screen = ScreenGuard::enter(&mut out)?;
        Ok(Self {
            out,
            mode: Mode::Fullscreen { _screen: screen },
        })
    }

    /// Start reading keys on an inline terminal, so that `wait` can report
    /// an interrupt. Frames presented afterwards are not expected.
    pub fn listen_for_keys(&mut self) -> io::Result<()> {
        if matches!(self.mode, Mode::Inline) {
            self.mode = Mode::Listening {
                _keys: RawMode::enable()?,
            };
        }
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        matches!(self.mode, Mode::Fullscreen { .. })
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Write `cells`, switching color only where it changes.
fn write_cells(out: &mut impl Write, cells: &[StyledCell]) -> io::Result<()> {
    let mut current = None;
    for cell in cells {
        if cell.fg != current {
            match cell.fg {
                Some(color) => queue!(out, SetForegroundColor(color))?,
                None => queue!(out, ResetColor)?,
            }
            current = cell.fg;
        }
        queue!(out, Print(cell.glyph))?;
    }
    if current.is_some() {
        queue!(out, ResetColor)?;
    }
    Ok(())
}

/// Cells up to the last visible glyph.
fn trimmed(cells: &[StyledCell]) -> &[StyledCell] {
    let visible = cells
        .iter()
        .rposition(|cell| !cell.glyph.is_whitespace())
        .map_or(0, |last| last + 1);
    &cells[..visible]
}

fn write_lines(out: &mut impl Write, frame: &Frame) -> io::Result<()> {
    for row in frame.rows() {
        write_cells(out, trimmed(&row.cells))?;
        queue!(out, Print('\n'))?;
    }
    out.flush()
}

fn redraw(out: &mut impl Write, frame: &Frame) -> io::Result<()> {
    for (y, row) in (0u16..).zip(frame.rows()) {
        queue!(out, MoveTo(0, y))?;
        write_cells(out, &row.cells)?;
        queue!(out, Clear(ClearType::UntilNewLine))?;
    }
    queue!(out, Clear(ClearType::FromCursorDown))?;
    out.flush()
}

impl FrameSink for Terminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        let (columns, rows) = terminal::size()?;
        // writing the bottom-right cell scrolls some terminals
        Ok((columns, rows.saturating_sub(1)))
    }

    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        if self.is_fullscreen() {
            redraw(&mut self.out, frame)
        } else {
            write_lines(&mut self.out, frame)
        }
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<Signal> {
        if matches!(self.mode, Mode::Inline) {
            thread::sleep(timeout);
            return Ok(Signal::Continue);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(Signal::Continue);
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press && is_interrupt(&key) => {
                    debug!("interrupt key {:?}", key.code);
                    return Ok(Signal::Interrupt);
                }
                Event::Resize(columns, rows) if self.is_fullscreen() => {
                    debug!("terminal resized to {columns}x{rows}");
                    return Ok(Signal::Interrupt);
                }
                _ => {}
            }
        }
    }
}
