//! Screen rendering for the pomodoro task list.
//!
//! Exposed Components:
//! - `renderer`: full-frame redraw of the countdown, the task rows and the
//!   bottom row. Every frame is queued into a [`core_terminal::Screen`] and
//!   flushed once.
//! - `prompt`: the single-row [`LineEditor`] with a horizontal scroll window.
//!   While a session is active the renderer hands it the bottom row.
//! - `glyphs`: progress token strings and countdown formatting.
//!
//! Rendering never fails on geometry: budgets saturate at zero, rows clamp to
//! 1, and a prompt whose label does not fit renders nothing. The only errors
//! surfaced are I/O errors from the output sink.

pub mod glyphs;
pub mod prompt;
pub mod renderer;

pub use glyphs::{GlyphSet, format_remaining};
pub use prompt::{LineEditor, PromptError, PromptStep};
pub use renderer::{EMPTY_LIST_MESSAGE, ListLayout, Renderer};
