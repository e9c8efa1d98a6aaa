//! Single-row line editor with horizontal scrolling.
//!
//! The editor draws `label + visible slice` on the bottom row of the viewport.
//! Only `visible_width = cols - width(label) - 1` codepoints of the buffer are
//! shown; the extra column keeps the cursor on screen at end-of-buffer.
//!
//! Scroll window invariant (holds after every redraw):
//! `start <= cursor <= start + visible_width`, and `start` never exceeds
//! `len - visible_width` so the window stays as full as the buffer allows.

use core_events::Key;
use core_input::{InputError, KeySource};
use core_terminal::{Screen, Viewport};
use core_text::{LineBuffer, codepoint_width};
use std::io::{self, Write};
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("prompt interrupted")]
    Interrupted,
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("couldn't draw prompt: {0}")]
    Io(#[from] io::Error),
}

/// Result of applying one key to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptStep {
    Continue,
    /// Enter pressed; carries the trimmed buffer content.
    Submit(String),
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct LineEditor {
    label: String,
    label_width: usize,
    line: LineBuffer,
    start: usize,
    viewport: Viewport,
}

impl LineEditor {
    pub fn new(label: impl Into<String>, viewport: Viewport) -> Self {
        Self::with_line(label, "", viewport)
    }

    /// Editor pre-filled with `initial`, cursor at its end and scrolled so the
    /// cursor is visible.
    pub fn with_line(label: impl Into<String>, initial: &str, viewport: Viewport) -> Self {
        let label = label.into();
        let label_width = codepoint_width(&label);
        let line = LineBuffer::with_text(initial);
        let mut editor = Self {
            label,
            label_width,
            line,
            start: 0,
            viewport,
        };
        editor.start = editor.line.len().saturating_sub(editor.visible_width());
        editor
    }

    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    pub fn cursor(&self) -> usize {
        self.line.cursor()
    }

    /// First buffer offset shown on screen.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Columns available for buffer content.
    pub fn visible_width(&self) -> usize {
        self.viewport
            .cols()
            .saturating_sub(self.label_width)
            .saturating_sub(1)
    }

    pub fn insert(&mut self, ch: char) {
        self.line.insert(ch);
    }

    pub fn move_left(&mut self) {
        self.line.move_left();
    }

    pub fn move_right(&mut self) {
        self.line.move_right();
    }

    pub fn move_home(&mut self) {
        self.line.move_home();
    }

    pub fn move_end(&mut self) {
        self.line.move_end();
    }

    pub fn backspace(&mut self) {
        self.line.backspace();
    }

    pub fn delete_prev_word(&mut self) {
        self.line.delete_prev_word();
    }

    /// Adopt a new viewport and redraw immediately.
    pub fn resize<W: Write>(&mut self, viewport: Viewport, screen: &mut Screen<W>) -> io::Result<()> {
        self.viewport = viewport;
        self.redraw(screen)
    }

    pub fn apply(&mut self, key: Key) -> PromptStep {
        match key {
            Key::Insert(ch) => self.insert(ch),
            Key::Backspace => self.backspace(),
            Key::Home => self.move_home(),
            Key::End => self.move_end(),
            Key::DeleteWord => self.delete_prev_word(),
            Key::CursorLeft => self.move_left(),
            Key::CursorRight => self.move_right(),
            Key::Enter => return PromptStep::Submit(self.line.trimmed()),
            Key::Interrupt => return PromptStep::Interrupted,
        }
        PromptStep::Continue
    }

    /// Recompute `start` so the cursor is inside the visible window.
    fn scroll_into_view(&mut self) {
        let width = self.visible_width();
        let cursor = self.line.cursor();
        if cursor < self.start {
            self.start = cursor;
        } else if cursor > self.start + width {
            self.start = cursor - width;
        }
        self.start = self.start.min(self.line.len().saturating_sub(width));
    }

    /// Codepoints currently visible, `[start, min(start + visible_width, len))`.
    pub fn visible_text(&self) -> String {
        self.line
            .slice(self.start, self.start + self.visible_width())
    }

    /// Draw the prompt on the bottom row. Renders nothing when the label alone
    /// does not fit.
    pub fn redraw<W: Write>(&mut self, screen: &mut Screen<W>) -> io::Result<()> {
        if self.label_width > self.viewport.cols() {
            trace!(target: "render.prompt", label_width = self.label_width, cols = self.viewport.cols, "prompt_skipped_narrow");
            return Ok(());
        }
        self.scroll_into_view();
        let row = self.viewport.rows();
        let visible = self.visible_text();

        screen.hide_cursor()?;
        screen.move_to(row, 1)?;
        screen.clear_line()?;
        screen.print(&self.label)?;
        screen.print(&visible)?;
        screen.move_to(row, self.label_width + (self.line.cursor() - self.start) + 1)?;
        screen.show_cursor()?;
        trace!(
            target: "render.prompt",
            len = self.line.len(),
            cursor = self.line.cursor(),
            start = self.start,
            "prompt_redraw"
        );
        screen.flush()
    }

    /// Blocking edit loop: redraw, read one key, apply it, until Enter.
    /// Returns the trimmed buffer content.
    pub fn read<K, W>(&mut self, keys: &mut K, screen: &mut Screen<W>) -> Result<String, PromptError>
    where
        K: KeySource,
        W: Write,
    {
        loop {
            self.redraw(screen)?;
            match self.apply(keys.next_key()?) {
                PromptStep::Continue => {}
                PromptStep::Submit(text) => return Ok(text),
                PromptStep::Interrupted => return Err(PromptError::Interrupted),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vp(rows: u16, cols: u16) -> Viewport {
        Viewport::new(rows, cols)
    }

    fn rendered(editor: &mut LineEditor) -> String {
        let mut screen = Screen::new(Vec::new());
        editor.redraw(&mut screen).unwrap();
        String::from_utf8(screen.into_inner()).unwrap()
    }

    #[test]
    fn initial_window_shows_tail_of_long_prefill() {
        // cols 12, label 2 => visible width 9
        let mut ed = LineEditor::with_line("> ", "abcdefghijklmno", vp(5, 12));
        assert_eq!(ed.visible_width(), 9);
        assert_eq!(ed.cursor(), 15);
        assert_eq!(ed.start(), 6);
        assert_eq!(ed.visible_text(), "ghijklmno");
        let out = rendered(&mut ed);
        assert_eq!(
            out,
            "\x1b[?25l\x1b[5;1H\x1b[2K> ghijklmno\x1b[5;12H\x1b[?25h"
        );
    }

    #[test]
    fn short_line_is_fully_visible() {
        let mut ed = LineEditor::with_line("Edit > ", "Write spec", vp(24, 80));
        assert_eq!(ed.start(), 0);
        let out = rendered(&mut ed);
        assert!(out.contains("Edit > Write spec"));
        assert!(out.ends_with("\x1b[24;18H\x1b[?25h"));
    }

    #[test]
    fn home_scrolls_window_back_to_start() {
        let mut ed = LineEditor::with_line("> ", "abcdefghijklmno", vp(5, 12));
        ed.move_home();
        let out = rendered(&mut ed);
        assert_eq!(ed.start(), 0);
        assert!(out.contains("> abcdefghi"));
        assert!(out.contains("\x1b[5;3H"));
    }

    #[test]
    fn typing_past_edge_scrolls_right() {
        let mut ed = LineEditor::new("> ", vp(3, 8)); // visible width 5
        for ch in "abcdefg".chars() {
            ed.insert(ch);
            ed.redraw(&mut Screen::new(Vec::new())).unwrap();
            assert!(ed.start() <= ed.cursor());
            assert!(ed.cursor() <= ed.start() + ed.visible_width());
        }
        assert_eq!(ed.start(), 2);
        assert_eq!(ed.visible_text(), "cdefg");
    }

    #[test]
    fn label_wider_than_viewport_renders_nothing() {
        let mut ed = LineEditor::with_line("A very long label > ", "x", vp(10, 5));
        assert_eq!(rendered(&mut ed), "");
    }

    #[test]
    fn label_exactly_fitting_shows_empty_window() {
        let mut ed = LineEditor::with_line("12345", "abc", vp(2, 5));
        assert_eq!(ed.visible_width(), 0);
        let out = rendered(&mut ed);
        assert_eq!(ed.start(), 3);
        assert!(out.contains("\x1b[2K12345\x1b[2;6H"));
    }

    #[test]
    fn multibyte_text_counts_codepoints() {
        let mut ed = LineEditor::with_line("» ", "ñandú", vp(1, 20));
        let out = rendered(&mut ed);
        assert!(out.contains("» ñandú\x1b[1;8H"));
    }

    #[test]
    fn resize_redraws_with_new_width() {
        let mut ed = LineEditor::with_line("> ", "abcdefghij", vp(5, 40));
        let mut screen = Screen::new(Vec::new());
        ed.resize(vp(6, 8), &mut screen).unwrap();
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert_eq!(ed.visible_width(), 5);
        assert!(out.contains("\x1b[6;1H\x1b[2K> fghij\x1b[6;8H"));
    }

    #[test]
    fn widening_pulls_window_left() {
        let mut ed = LineEditor::with_line("> ", "abcdefghij", vp(5, 8));
        assert_eq!(ed.start(), 5);
        let mut screen = Screen::new(Vec::new());
        ed.resize(vp(5, 40), &mut screen).unwrap();
        assert_eq!(ed.start(), 0);
    }

    #[test]
    fn apply_maps_keys_and_submits_trimmed() {
        let mut ed = LineEditor::new("Add > ", vp(24, 80));
        for key in [
            Key::Insert(' '),
            Key::Insert('b'),
            Key::Insert('c'),
            Key::Home,
            Key::CursorRight,
            Key::Insert('a'),
            Key::End,
            Key::Insert(' '),
            Key::Insert('x'),
            Key::Backspace,
        ] {
            assert_eq!(ed.apply(key), PromptStep::Continue);
        }
        assert_eq!(ed.line().to_string(), " abc ");
        assert_eq!(ed.apply(Key::Enter), PromptStep::Submit("abc".into()));
        assert_eq!(ed.apply(Key::Interrupt), PromptStep::Interrupted);
    }

    struct Scripted(std::vec::IntoIter<Key>);

    impl KeySource for Scripted {
        fn next_key(&mut self) -> Result<Key, InputError> {
            self.0.next().ok_or(InputError::StreamEnded)
        }
    }

    #[test]
    fn read_loops_until_enter() {
        let mut keys = Scripted(
            vec![
                Key::Insert('f'),
                Key::Insert('o'),
                Key::Insert('o'),
                Key::Insert(' '),
                Key::Insert('b'),
                Key::Insert('a'),
                Key::Insert('r'),
                Key::DeleteWord,
                Key::Enter,
            ]
            .into_iter(),
        );
        let mut ed = LineEditor::new("Add > ", vp(24, 80));
        let mut screen = Screen::new(Vec::new());
        let text = ed.read(&mut keys, &mut screen).unwrap();
        assert_eq!(text, "foo");
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert_eq!(out.matches("\x1b[24;1H").count(), 9, "one redraw per key");
    }

    #[test]
    fn read_surfaces_end_of_input() {
        let mut keys = Scripted(vec![Key::Insert('a')].into_iter());
        let mut ed = LineEditor::new("Add > ", vp(24, 80));
        let err = ed
            .read(&mut keys, &mut Screen::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, PromptError::Input(InputError::StreamEnded)));
    }
}
