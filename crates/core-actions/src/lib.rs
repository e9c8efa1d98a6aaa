//! Key translation and action dispatch.
//!
//! Decoded [`Key`](core_events::Key)s become [`Action`]s through
//! [`translate`], which is a pure function of the current [`Mode`] and
//! whether any task exists. [`dispatch`] then applies an action to
//! [`AppState`](core_state::AppState). Actions that need free text (adding or
//! renaming a task) do not block: they return a [`PromptRequest`] and the
//! runtime feeds the finished text back through [`complete_prompt`].

use core_state::Mode;

pub mod dispatcher;
pub mod key_translator;

pub use dispatcher::{DispatchResult, complete_prompt, dispatch};
pub use key_translator::translate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Ask for a description and append a new task.
    AddTask,
    /// Ask for a replacement description of the selected task.
    EditDescription,
    ChangeMode(Mode),
    ChangeSelection(isize),
    StartStop,
    ResetTimer,
    ChangeTarget(i32),
    ChangeCompleted(i32),
    /// Remove the selected task and return to Normal.
    DeleteSelected,
    MoveSelected(isize),
}

/// What a finished prompt session should be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    AddTask,
    EditDescription { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub purpose: PromptPurpose,
    pub label: &'static str,
    pub initial: String,
}

pub const ADD_LABEL: &str = "Add > ";
pub const EDIT_LABEL: &str = "Edit > ";
