//! Terminal capability provider.
//!
//! Exposes exactly what the rest of the application needs from the terminal:
//! raw-mode enable/restore, the current viewport size, and (via [`Screen`])
//! primitive output operations. Platform differences are absorbed by
//! crossterm; no raw terminal configuration structs leak out of this crate.
//!
//! Every failure here is fatal to the caller. Errors are typed so the
//! top-level loop can report a clear diagnostic after restoring the terminal.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write, stdout};
use tracing::{debug, warn};

pub mod screen;
pub use screen::{Color, CursorPosition, Screen};

/// Terminal size in character cells. Both dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub rows: u16,
    pub cols: u16,
}

impl Viewport {
    /// Build a viewport, clamping each dimension to at least one cell.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    pub fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    pub fn cols(&self) -> usize {
        usize::from(self.cols)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("couldn't update terminal configuration")]
    RawMode(#[source] io::Error),
    #[error("couldn't restore terminal configuration")]
    Restore(#[source] io::Error),
    #[error("couldn't get window size")]
    ViewportSize(#[source] io::Error),
    #[error("terminal reported an empty window ({cols}x{rows})")]
    EmptyViewport { rows: u16, cols: u16 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type TerminalResult<T> = Result<T, TerminalError>;

pub trait TerminalBackend {
    /// Switch to raw input (no line buffering, no echo). The prior
    /// configuration is retained for [`TerminalBackend::restore_mode`].
    fn enable_raw_mode(&mut self) -> TerminalResult<()>;
    /// Reapply the configuration captured by `enable_raw_mode`.
    fn restore_mode(&mut self) -> TerminalResult<()>;
    /// Query the current window size.
    fn viewport_size(&self) -> TerminalResult<Viewport>;
}

pub struct CrosstermBackend {
    raw: bool,
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            raw: false,
            entered: false,
        }
    }

    /// Switch to raw mode, then to the alternate screen with the cursor hidden.
    pub fn enter(&mut self) -> TerminalResult<()> {
        if !self.entered {
            enter_screen(self, stdout())?;
            self.entered = true;
            debug!(target: "terminal", "entered");
        }
        Ok(())
    }

    /// Undo [`CrosstermBackend::enter`]: leave the alternate screen, show the
    /// cursor, restore the saved terminal mode.
    pub fn leave(&mut self) -> TerminalResult<()> {
        if self.entered {
            self.entered = false;
            leave_screen(self, stdout())?;
            debug!(target: "terminal", "left");
        }
        Ok(())
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> TerminalResult<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

/// Enable raw mode on `backend`, then write the alternate-screen switch to
/// `out`. Nothing is written when raw mode fails; a failed write rolls raw
/// mode back before the error is returned.
pub fn enter_screen<B, W>(backend: &mut B, out: W) -> TerminalResult<()>
where
    B: TerminalBackend + ?Sized,
    W: Write,
{
    backend.enable_raw_mode()?;
    let mut screen = Screen::new(out);
    let switched = screen
        .enter_alternate_screen()
        .and_then(|()| screen.hide_cursor())
        .and_then(|()| screen.flush());
    if let Err(err) = switched {
        let _ = screen
            .leave_alternate_screen()
            .and_then(|()| screen.show_cursor())
            .and_then(|()| screen.flush());
        if let Err(restore) = backend.restore_mode() {
            warn!(target: "terminal", ?restore, "rollback_failed");
        }
        return Err(err.into());
    }
    Ok(())
}

/// Undo [`enter_screen`]. Raw mode is restored even when the write fails.
pub fn leave_screen<B, W>(backend: &mut B, out: W) -> TerminalResult<()>
where
    B: TerminalBackend + ?Sized,
    W: Write,
{
    let mut screen = Screen::new(out);
    let shown = screen
        .leave_alternate_screen()
        .and_then(|()| screen.show_cursor())
        .and_then(|()| screen.flush());
    backend.restore_mode()?;
    shown.map_err(TerminalError::from)
}

impl TerminalBackend for CrosstermBackend {
    fn enable_raw_mode(&mut self) -> TerminalResult<()> {
        if !self.raw {
            enable_raw_mode().map_err(TerminalError::RawMode)?;
            self.raw = true;
        }
        Ok(())
    }

    fn restore_mode(&mut self) -> TerminalResult<()> {
        if self.raw {
            disable_raw_mode().map_err(TerminalError::Restore)?;
            self.raw = false;
        }
        Ok(())
    }

    fn viewport_size(&self) -> TerminalResult<Viewport> {
        let (cols, rows) = crossterm::terminal::size().map_err(TerminalError::ViewportSize)?;
        if rows == 0 || cols == 0 {
            return Err(TerminalError::EmptyViewport { rows, cols });
        }
        Ok(Viewport { rows, cols })
    }
}

impl TerminalGuard<'_> {
    pub fn viewport_size(&self) -> TerminalResult<Viewport> {
        self.backend.viewport_size()
    }

    /// Restore the terminal now rather than at drop time.
    pub fn release(&mut self) -> TerminalResult<()> {
        if self.active {
            self.active = false;
            self.backend.leave()?;
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            warn!(target: "terminal", ?err, "restore_on_drop_failed");
        }
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}
