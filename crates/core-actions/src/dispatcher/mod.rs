//! Dispatcher applying `Action` to application state.

use crate::{ADD_LABEL, Action, EDIT_LABEL, PromptPurpose, PromptRequest};
use core_state::{AppState, Mode};
use tracing::debug;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// State visible on screen changed.
    pub dirty: bool,
    /// A prompt session must start before the action can finish.
    pub prompt: Option<PromptRequest>,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            prompt: None,
        }
    }

    pub fn clean() -> Self {
        Self::default()
    }

    pub fn prompt(request: PromptRequest) -> Self {
        Self {
            dirty: true,
            prompt: Some(request),
        }
    }
}

pub fn dispatch(action: Action, state: &mut AppState) -> DispatchResult {
    debug!(target: "actions.dispatch", ?action, "dispatch");
    match action {
        Action::AddTask => DispatchResult::prompt(PromptRequest {
            purpose: PromptPurpose::AddTask,
            label: ADD_LABEL,
            initial: String::new(),
        }),
        Action::EditDescription => match state.selected_task() {
            Some(task) => DispatchResult::prompt(PromptRequest {
                purpose: PromptPurpose::EditDescription {
                    index: state.selected(),
                },
                label: EDIT_LABEL,
                initial: task.description.clone(),
            }),
            None => DispatchResult::clean(),
        },
        Action::ChangeMode(mode) => {
            state.set_mode(mode);
            DispatchResult::dirty()
        }
        Action::ChangeSelection(delta) => {
            state.change_selection(delta);
            DispatchResult::dirty()
        }
        Action::StartStop => {
            state.start_stop();
            DispatchResult::dirty()
        }
        Action::ResetTimer => {
            state.reset_timer();
            DispatchResult::dirty()
        }
        Action::ChangeTarget(delta) => {
            state.change_target(delta);
            DispatchResult::dirty()
        }
        Action::ChangeCompleted(delta) => {
            state.change_completed(delta);
            DispatchResult::dirty()
        }
        Action::DeleteSelected => {
            state.delete_selected();
            state.set_mode(Mode::Normal);
            DispatchResult::dirty()
        }
        Action::MoveSelected(delta) => {
            state.move_selected(delta);
            DispatchResult::dirty()
        }
    }
}

/// Apply the trimmed text of a finished prompt. Empty text changes nothing.
pub fn complete_prompt(purpose: PromptPurpose, text: &str, state: &mut AppState) -> DispatchResult {
    if text.is_empty() {
        debug!(target: "actions.prompt", ?purpose, "prompt_empty_ignored");
        return DispatchResult::clean();
    }
    match purpose {
        PromptPurpose::AddTask => state.add_task(text),
        PromptPurpose::EditDescription { index } => state.set_description(index, text),
    }
    debug!(target: "actions.prompt", ?purpose, len = text.chars().count(), "prompt_applied");
    DispatchResult::dirty()
}
