//! Primitive output operations with cursor tracking.
//!
//! `Screen` wraps any `Write` sink and queues crossterm commands into it.
//! Nothing reaches the terminal until [`Screen::flush`]; callers flush once
//! per redraw so a frame is emitted as one write.
//!
//! Positions are 1-based (`row`, `col`) as on the wire (`ESC[{row};{col}H`).
//! The tracked cursor follows every `move_to` and advances by the codepoint
//! width of each `print`, letting renderers position follow-up output
//! relative to what they just wrote without querying the terminal.

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};

/// Foreground colours from the basic 16-colour palette. Emitted as
/// `ESC[{code}m`; crossterm's `SetForegroundColor` only writes the 256-colour
/// form `ESC[38;5;{n}m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    BrightRed,
}

impl Color {
    fn sgr(self) -> u8 {
        match self {
            Color::BrightRed => 91,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub row: usize,
    pub col: usize,
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self { row: 1, col: 1 }
    }
}

pub struct Screen<W: Write> {
    out: W,
    cursor: CursorPosition,
}

fn wire_coord(one_based: usize) -> u16 {
    u16::try_from(one_based.saturating_sub(1)).unwrap_or(u16::MAX)
}

impl<W: Write> Screen<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cursor: CursorPosition::default(),
        }
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn move_to(&mut self, row: usize, col: usize) -> io::Result<()> {
        let row = row.max(1);
        let col = col.max(1);
        queue!(self.out, MoveTo(wire_coord(col), wire_coord(row)))?;
        self.cursor = CursorPosition { row, col };
        Ok(())
    }

    /// Move `cols` columns right of the tracked cursor on the same row.
    pub fn advance(&mut self, cols: usize) -> io::Result<()> {
        let CursorPosition { row, col } = self.cursor;
        self.move_to(row, col + cols)
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        queue!(self.out, Print(text))?;
        self.cursor.col += core_text::codepoint_width(text);
        Ok(())
    }

    pub fn clear_display(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))
    }

    /// Clear the row the cursor is on. The cursor itself does not move.
    pub fn clear_line(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::CurrentLine))
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Hide)
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Show)
    }

    pub fn reverse_video(&mut self) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reverse))
    }

    pub fn foreground(&mut self, color: Color) -> io::Result<()> {
        queue!(self.out, Print(format!("\x1b[{}m", color.sgr())))
    }

    pub fn reset_attributes(&mut self) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))
    }

    pub fn enter_alternate_screen(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen)
    }

    pub fn leave_alternate_screen(&mut self) -> io::Result<()> {
        queue!(self.out, LeaveAlternateScreen)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
