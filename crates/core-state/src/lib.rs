//! Application state: task list, selection, active task, interaction mode and
//! the pomodoro countdown.
//!
//! `AppState` is owned by exactly one actor (the runtime event loop). Every
//! mutation below keeps these invariants:
//! - `selected < tasks.len()` and `active < tasks.len()` whenever the list is
//!   non-empty; both are 0 when it is empty.
//! - `task.target >= 1` and `task.target >= task.completed`, except that a
//!   finished countdown may push `completed` past the target, in which case the
//!   target grows to match.
//! - The timer only runs while there is an active task.

use std::time::Duration;
use tracing::debug;

pub mod timer;
pub use timer::{TickOutcome, Timer};

/// Default pomodoro length.
pub const DEFAULT_POMODORO: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Planned number of pomodoros (>= 1).
    pub target: u32,
    /// Pomodoros finished so far.
    pub completed: u32,
    pub description: String,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            target: 1,
            completed: 0,
            description: description.into(),
        }
    }

    /// Units still to do; never negative even when over-completed.
    pub fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    EditCompletedCount,
    ConfirmDelete,
    Reorder,
}

impl Mode {
    /// Fixed status-line message shown while in this mode.
    pub fn status_text(self) -> &'static str {
        match self {
            Mode::Normal => "",
            Mode::EditCompletedCount => "Edit completed pomodoros with +/-",
            Mode::ConfirmDelete => "Delete selected task?",
            Mode::Reorder => "Moving selected task...",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    tasks: Vec<Task>,
    selected: usize,
    active: usize,
    mode: Mode,
    timer: Timer,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_POMODORO)
    }
}

fn offset(index: usize, delta: isize, len: usize) -> usize {
    let max = len.saturating_sub(1);
    index.saturating_add_signed(delta).min(max)
}

impl AppState {
    pub fn new(pomodoro: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            selected: 0,
            active: 0,
            mode: Mode::Normal,
            timer: Timer::new(pomodoro),
        }
    }

    pub fn with_tasks(pomodoro: Duration, tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::new(pomodoro)
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status_line(&self) -> &'static str {
        self.mode.status_text()
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(target: "state.mode", from = ?self.mode, to = ?mode, "mode_change");
        }
        self.mode = mode;
    }

    pub fn add_task(&mut self, description: impl Into<String>) {
        self.tasks.push(Task::new(description));
        debug!(target: "state.tasks", count = self.tasks.len(), "task_added");
    }

    /// Replace the description of the task at `index`. Out of range is ignored.
    pub fn set_description(&mut self, index: usize, description: impl Into<String>) {
        if let Some(task) = self.tasks.get_mut(index) {
            task.description = description.into();
        }
    }

    pub fn change_selection(&mut self, delta: isize) {
        self.selected = offset(self.selected, delta, self.tasks.len());
    }

    /// Toggle the countdown. Starting binds the timer to the selected task.
    pub fn start_stop(&mut self) {
        if self.timer.is_running() {
            self.timer.stop();
        } else if !self.tasks.is_empty() {
            self.active = self.selected;
            self.timer.start();
        }
        debug!(
            target: "state.timer",
            running = self.timer.is_running(),
            active = self.active,
            "start_stop"
        );
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
    }

    /// Adjust the planned count of the selected task, never below 1 or below
    /// what is already completed.
    pub fn change_target(&mut self, delta: i32) {
        if let Some(task) = self.tasks.get_mut(self.selected) {
            task.target = task
                .target
                .saturating_add_signed(delta)
                .max(1)
                .max(task.completed);
        }
    }

    /// Adjust the completed count of the selected task within `0..=target`.
    pub fn change_completed(&mut self, delta: i32) {
        if let Some(task) = self.tasks.get_mut(self.selected) {
            task.completed = task.completed.saturating_add_signed(delta).min(task.target);
        }
    }

    pub fn delete_selected(&mut self) {
        if self.selected >= self.tasks.len() {
            return;
        }
        self.tasks.remove(self.selected);
        if self.selected == self.active {
            self.timer.reset();
            self.active = self.active.saturating_sub(1);
        } else if self.selected < self.active {
            self.active -= 1;
        }
        self.selected = self.selected.saturating_sub(1);
        if self.tasks.is_empty() {
            self.timer.reset();
            self.active = 0;
        }
        debug!(target: "state.tasks", count = self.tasks.len(), "task_deleted");
    }

    /// Swap the selected task with its neighbour `delta` positions away. The
    /// selection and the active marker follow the tasks they point at.
    pub fn move_selected(&mut self, delta: isize) {
        let this = self.selected;
        let Some(other) = this.checked_add_signed(delta) else {
            return;
        };
        if other >= self.tasks.len() {
            return;
        }
        self.tasks.swap(this, other);
        self.selected = other;
        if self.active == this {
            self.active = other;
        } else if self.active == other {
            self.active = this;
        }
    }

    /// Advance the countdown by one second. Returns whether anything visible changed.
    ///
    /// A finished pomodoro is credited to the active task; over-completion
    /// widens the task's target to match.
    pub fn tick(&mut self) -> bool {
        match self.timer.tick() {
            TickOutcome::Idle => false,
            TickOutcome::Counting => true,
            TickOutcome::Finished => {
                if let Some(task) = self.tasks.get_mut(self.active) {
                    task.completed += 1;
                    task.target = task.target.max(task.completed);
                    debug!(
                        target: "state.timer",
                        active = self.active,
                        completed = task.completed,
                        "pomodoro_finished"
                    );
                }
                true
            }
        }
    }
}
