//! Full-screen redraw of the task list, countdown and bottom row.
//!
//! Layout (1-based rows):
//! - `timer_top = max(1, (rows - tasks) / 2)` holds the countdown message.
//! - Task rows start at `timer_top + 2`, one per task, centered as a block.
//! - The bottom row belongs to the active prompt, or to the mode status text.
//!
//! Column budgets are shared by every task row so glyph and description
//! columns line up: `marker + max_progress + max_description <= cols`, with the
//! description column shrunk first when the total would overflow.

use crate::glyphs::{GlyphSet, format_remaining};
use crate::prompt::LineEditor;
use core_state::AppState;
use core_terminal::{Color, Screen, Viewport};
use core_text::{center_column, codepoint_width, truncate_with_ellipsis};
use std::io::{self, Write};
use tracing::trace;

pub const EMPTY_LIST_MESSAGE: &str = "No tasks added. Press 'a' to create a new task.";

/// Shared column budgets for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLayout {
    pub marker: usize,
    pub progress: usize,
    pub description: usize,
}

impl ListLayout {
    pub fn compute<'a>(
        marker: usize,
        progress_widths: impl IntoIterator<Item = usize>,
        descriptions: impl IntoIterator<Item = &'a str>,
        cols: usize,
    ) -> Self {
        let progress = progress_widths.into_iter().max().unwrap_or(0);
        let mut description = descriptions
            .into_iter()
            .map(codepoint_width)
            .max()
            .unwrap_or(0);
        if marker + progress + description > cols {
            description = cols.saturating_sub(marker + progress);
        }
        Self {
            marker,
            progress,
            description,
        }
    }

    pub fn width(&self) -> usize {
        self.marker + self.progress + self.description
    }
}

#[derive(Debug)]
pub struct Renderer {
    viewport: Viewport,
    glyphs: GlyphSet,
    prompt: Option<LineEditor>,
}

impl Renderer {
    pub fn new(viewport: Viewport, glyphs: GlyphSet) -> Self {
        Self {
            viewport,
            glyphs,
            prompt: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Record a new terminal size. The active prompt picks it up on the next
    /// redraw.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Start a prompt session on the bottom row, replacing any previous one.
    pub fn begin_prompt(&mut self, label: &str, initial: &str) {
        self.prompt = Some(LineEditor::with_line(label, initial, self.viewport));
    }

    pub fn prompt_mut(&mut self) -> Option<&mut LineEditor> {
        self.prompt.as_mut()
    }

    pub fn has_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn end_prompt(&mut self) -> Option<LineEditor> {
        self.prompt.take()
    }

    pub fn redraw<W: Write>(&mut self, state: &AppState, screen: &mut Screen<W>) -> io::Result<()> {
        let rows = self.viewport.rows();
        let cols = self.viewport.cols();
        screen.clear_display()?;
        screen.hide_cursor()?;

        if state.tasks().is_empty() {
            let message = truncate_with_ellipsis(EMPTY_LIST_MESSAGE, cols);
            screen.move_to((rows / 2).max(1), center_column(cols, codepoint_width(&message)))?;
            screen.print(&message)?;
        } else {
            self.draw_timer(state, screen)?;
            self.draw_tasks(state, screen)?;
        }

        self.draw_bottom_row(state, screen)?;
        trace!(target: "render.screen", rows, cols, tasks = state.tasks().len(), "redraw");
        screen.flush()
    }

    fn timer_top(&self, tasks: usize) -> usize {
        (self.viewport.rows().saturating_sub(tasks) / 2).max(1)
    }

    fn draw_timer<W: Write>(&self, state: &AppState, screen: &mut Screen<W>) -> io::Result<()> {
        let cols = self.viewport.cols();
        let timer = state.timer();
        let message = format!("Time remaining: {}", format_remaining(timer.remaining()));
        let message = truncate_with_ellipsis(&message, cols);
        screen.move_to(
            self.timer_top(state.tasks().len()),
            center_column(cols, codepoint_width(&message)),
        )?;
        if timer.is_running() {
            screen.reverse_video()?;
        }
        screen.print(&message)?;
        screen.reset_attributes()
    }

    fn draw_tasks<W: Write>(&self, state: &AppState, screen: &mut Screen<W>) -> io::Result<()> {
        let rows = self.viewport.rows();
        let cols = self.viewport.cols();
        let marker = codepoint_width(&self.glyphs.selection_marker);
        let progress: Vec<String> = state.tasks().iter().map(|t| self.glyphs.progress(t)).collect();
        let layout = ListLayout::compute(
            marker,
            progress.iter().map(|p| codepoint_width(p)),
            state.tasks().iter().map(|t| t.description.as_str()),
            cols,
        );
        let left = center_column(cols, layout.width());
        let progress_budget = cols.saturating_sub(marker);
        let list_top = self.timer_top(state.tasks().len()) + 2;

        for (index, (task, glyphs)) in state.tasks().iter().zip(&progress).enumerate() {
            let row = list_top + index;
            // The bottom row is reserved for the prompt/status line.
            if row >= rows {
                trace!(target: "render.screen", index, row, "task_row_clipped");
                continue;
            }
            screen.move_to(row, left)?;
            if index == state.selected() {
                screen.print(&self.glyphs.selection_marker)?;
            } else {
                screen.advance(marker)?;
            }

            let shown = truncate_with_ellipsis(glyphs, progress_budget);
            screen.foreground(Color::BrightRed)?;
            screen.print(&shown)?;
            screen.reset_attributes()?;

            // Pad short progress strings out to the shared description column.
            screen.advance(layout.progress.saturating_sub(codepoint_width(&shown)))?;
            if index == state.active() {
                screen.reverse_video()?;
            }
            screen.print(&truncate_with_ellipsis(&task.description, layout.description))?;
            screen.reset_attributes()?;
        }
        Ok(())
    }

    fn draw_bottom_row<W: Write>(&mut self, state: &AppState, screen: &mut Screen<W>) -> io::Result<()> {
        let viewport = self.viewport;
        match self.prompt.as_mut() {
            Some(prompt) if prompt.viewport() != viewport => prompt.resize(viewport, screen),
            Some(prompt) => prompt.redraw(screen),
            None => {
                screen.move_to(viewport.rows(), 1)?;
                screen.clear_line()?;
                screen.print(&truncate_with_ellipsis(state.status_line(), viewport.cols()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::{Mode, Task};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn frame(renderer: &mut Renderer, state: &AppState) -> String {
        let mut screen = Screen::new(Vec::new());
        renderer.redraw(state, &mut screen).unwrap();
        String::from_utf8(screen.into_inner()).unwrap()
    }

    fn with(tasks: Vec<Task>) -> AppState {
        AppState::with_tasks(Duration::from_secs(15 * 60), tasks)
    }

    #[test]
    fn layout_shrinks_description_to_fit() {
        let l = ListLayout::compute(2, [6, 4], ["A very long task name", "x"], 18);
        assert_eq!(l, ListLayout { marker: 2, progress: 6, description: 10 });
        assert_eq!(l.width(), 18);
    }

    #[test]
    fn layout_keeps_natural_width_when_it_fits() {
        let l = ListLayout::compute(2, [2], ["Write spec"], 80);
        assert_eq!(l.description, 10);
        assert_eq!(l.width(), 14);
    }

    #[test]
    fn layout_budget_never_underflows() {
        let l = ListLayout::compute(2, [30], ["abc"], 10);
        assert_eq!(l.description, 0);
    }

    #[test]
    fn long_description_truncated_to_budget() {
        // marker 2 + progress 2 + budget 10 = 14 columns
        let mut r = Renderer::new(Viewport::new(10, 14), GlyphSet::default());
        let out = frame(&mut r, &with(vec![Task::new("A very long task name")]));
        assert!(out.contains("A very ..."), "{out:?}");
        assert!(!out.contains("A very long"));
    }

    #[test]
    fn status_line_follows_mode() {
        let mut st = with(vec![Task::new("a")]);
        st.set_mode(Mode::ConfirmDelete);
        let mut r = Renderer::new(Viewport::new(24, 80), GlyphSet::default());
        let out = frame(&mut r, &st);
        assert!(out.ends_with("\x1b[24;1H\x1b[2KDelete selected task?"));
    }

    #[test]
    fn rows_past_bottom_are_skipped() {
        let tasks = (0..6).map(|i| Task::new(format!("t{i}"))).collect();
        let mut r = Renderer::new(Viewport::new(5, 40), GlyphSet::default());
        let out = frame(&mut r, &with(tasks));
        // timer_top = max(1, (5 - 6) / 2) = 1, list rows 3 and 4 only
        assert!(out.contains("t0"));
        assert!(out.contains("t1"));
        assert!(!out.contains("t2"));
    }

    #[test]
    fn selection_marker_only_on_selected_row() {
        let mut st = with(vec![Task::new("a"), Task::new("b")]);
        st.change_selection(1);
        let mut r = Renderer::new(Viewport::new(24, 80), GlyphSet::default());
        let out = frame(&mut r, &st);
        assert_eq!(out.matches("› ").count(), 1);
        // timer_top = 11, rows 13 and 14; block width 2 + 2 + 1 centered at col 38
        assert!(out.contains("\x1b[14;38H› "));
        assert!(out.contains("\x1b[13;38H\x1b[13;40H"));
    }

    #[test]
    fn descriptions_align_after_uneven_progress() {
        let mut long = Task::new("b");
        long.target = 3;
        let st = with(vec![Task::new("a"), long]);
        let mut r = Renderer::new(Viewport::new(24, 80), GlyphSet::default());
        let out = frame(&mut r, &st);
        // block width 2 + 6 + 1 = 9 centered at col 36; descriptions at col 44
        assert!(out.contains("\x1b[13;36H› \x1b[91m⬡ \x1b[0m\x1b[13;44H\x1b[7ma\x1b[0m"));
        assert!(out.contains("\x1b[14;36H\x1b[14;38H\x1b[91m⬡ ⬡ ⬡ \x1b[0m\x1b[14;44Hb"));
    }

    #[test]
    fn prompt_owns_bottom_row_and_follows_resize() {
        let st = with(vec![Task::new("a")]);
        let mut r = Renderer::new(Viewport::new(24, 80), GlyphSet::default());
        r.begin_prompt("Add > ", "draft");
        let out = frame(&mut r, &st);
        assert!(out.contains("\x1b[24;1H\x1b[2KAdd > draft\x1b[24;12H\x1b[?25h"));

        r.resize(Viewport::new(10, 9));
        let out = frame(&mut r, &st);
        let prompt = r.prompt_mut().unwrap();
        assert_eq!(prompt.viewport(), Viewport::new(10, 9));
        assert_eq!(prompt.visible_width(), 2);
        assert!(out.contains("\x1b[10;1H\x1b[2KAdd > ft\x1b[10;9H"));

        assert!(r.end_prompt().is_some());
        assert!(!r.has_prompt());
    }
}
