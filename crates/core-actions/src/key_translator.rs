//! Per-mode key bindings.
//!
//! Normal: `a` add, `e` edit, `d` confirm delete, `m` reorder,
//! `E` edit completed count, `j`/`k` selection, `s` start/stop, `r` reset,
//! `+`/`-` planned count. With no tasks only `a` is live.
//! EditCompletedCount: `+`/`-`, Enter leaves.
//! ConfirmDelete: `d` or `y` deletes, anything else cancels.
//! Reorder: `j`/`k` move the selected task, Enter leaves.

use crate::Action;
use core_events::Key;
use core_state::Mode;

pub fn translate(mode: Mode, key: Key, has_tasks: bool) -> Option<Action> {
    match mode {
        Mode::Normal => normal(key, has_tasks),
        Mode::EditCompletedCount => match key {
            Key::Insert('+') => Some(Action::ChangeCompleted(1)),
            Key::Insert('-') => Some(Action::ChangeCompleted(-1)),
            Key::Enter => Some(Action::ChangeMode(Mode::Normal)),
            _ => None,
        },
        Mode::ConfirmDelete => match key {
            Key::Insert('d' | 'y') => Some(Action::DeleteSelected),
            _ => Some(Action::ChangeMode(Mode::Normal)),
        },
        Mode::Reorder => match key {
            Key::Insert('j') => Some(Action::MoveSelected(1)),
            Key::Insert('k') => Some(Action::MoveSelected(-1)),
            Key::Enter => Some(Action::ChangeMode(Mode::Normal)),
            _ => None,
        },
    }
}

fn normal(key: Key, has_tasks: bool) -> Option<Action> {
    let Key::Insert(ch) = key else {
        return None;
    };
    if !has_tasks && ch != 'a' {
        return None;
    }
    let action = match ch {
        'a' => Action::AddTask,
        'e' => Action::EditDescription,
        'd' => Action::ChangeMode(Mode::ConfirmDelete),
        'm' => Action::ChangeMode(Mode::Reorder),
        'E' => Action::ChangeMode(Mode::EditCompletedCount),
        'j' => Action::ChangeSelection(1),
        'k' => Action::ChangeSelection(-1),
        's' => Action::StartStop,
        'r' => Action::ResetTimer,
        '+' => Action::ChangeTarget(1),
        '-' => Action::ChangeTarget(-1),
        _ => return None,
    };
    Some(action)
}
