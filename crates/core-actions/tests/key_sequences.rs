//! Key sequences driven through translate + dispatch, as the runtime does.

use core_actions::{complete_prompt, dispatch, translate};
use core_events::Key;
use core_state::{AppState, Mode, Task};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn press(state: &mut AppState, keys: &str) {
    for ch in keys.chars() {
        let key = if ch == '\n' { Key::Enter } else { Key::Insert(ch) };
        if let Some(action) = translate(state.mode(), key, !state.tasks().is_empty()) {
            let res = dispatch(action, state);
            assert!(res.prompt.is_none(), "prompt actions are not scripted here");
        }
    }
}

fn names(state: &AppState) -> Vec<String> {
    state.tasks().iter().map(|t| t.description.clone()).collect()
}

fn seeded() -> AppState {
    AppState::with_tasks(
        Duration::from_secs(60),
        ["one", "two", "three"].into_iter().map(Task::new).collect(),
    )
}

#[test]
fn reorder_session_moves_task_down_twice() {
    let mut st = seeded();
    press(&mut st, "mjj\n");
    assert_eq!(names(&st), vec!["two", "three", "one"]);
    assert_eq!(st.selected(), 2);
    assert_eq!(st.mode(), Mode::Normal);
}

#[test]
fn edit_completed_session_clamps_to_target() {
    let mut st = seeded();
    press(&mut st, "++E+++\n");
    assert_eq!(st.tasks()[0].target, 3);
    assert_eq!(st.tasks()[0].completed, 3);
    press(&mut st, "---");
    assert_eq!(st.tasks()[0].target, 3, "target never drops below completed");
}

#[test]
fn confirm_delete_then_cancel() {
    let mut st = seeded();
    press(&mut st, "jdn");
    assert_eq!(names(&st), vec!["one", "two", "three"]);
    assert_eq!(st.mode(), Mode::Normal);
    press(&mut st, "dy");
    assert_eq!(names(&st), vec!["one", "three"]);
    assert_eq!(st.selected(), 0);
}

#[test]
fn start_on_second_task_then_delete_first_keeps_active() {
    let mut st = seeded();
    press(&mut st, "jskdd");
    assert_eq!(names(&st), vec!["two", "three"]);
    assert_eq!(st.tasks()[st.active()].description, "two");
    assert!(st.timer().is_running());
}

#[test]
fn add_flow_from_empty_list() {
    let mut st = AppState::default();
    press(&mut st, "jsd");
    assert!(st.tasks().is_empty());
    assert_eq!(st.mode(), Mode::Normal);

    let action = translate(st.mode(), Key::Insert('a'), false).unwrap();
    let req = dispatch(action, &mut st).prompt.unwrap();
    complete_prompt(req.purpose, "first", &mut st);
    assert_eq!(names(&st), vec!["first"]);
}
