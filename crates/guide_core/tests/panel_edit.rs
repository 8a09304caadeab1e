use std::sync::Once;

use guide_core::{
    update, AppState, CareerSnapshot, Effect, Msg, Screen, SnapshotField, SnapshotUpdate, Stage,
    UpdateSource, EMPTY_LIST_TEXT, EMPTY_VALUE_TEXT,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(guide_logging::initialize_for_tests);
}

fn send(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    let mut state = state;
    let mut effects = Vec::new();
    for msg in msgs {
        let (next, mut produced) = update(state, msg);
        state = next;
        effects.append(&mut produced);
    }
    (state, effects)
}

fn chat_state() -> AppState {
    let (state, _) = update(AppState::new(), Msg::QuizSkipClicked);
    state
}

fn edit(state: AppState, field: SnapshotField, text: &str) -> (AppState, Vec<Effect>) {
    send(
        state,
        vec![
            Msg::EditStarted(field),
            Msg::EditChanged(text.to_string()),
            Msg::EditSaved,
        ],
    )
}

fn row_editing(state: &AppState, field: SnapshotField) -> Option<String> {
    state
        .view()
        .snapshot
        .rows
        .into_iter()
        .find(|row| row.field == field)
        .and_then(|row| row.editing)
}

#[test]
fn gaps_edit_splits_on_commas() {
    init_logging();
    let (state, effects) = edit(chat_state(), SnapshotField::Gaps, "SQL, public speaking");

    let expected = vec!["SQL".to_string(), "public speaking".to_string()];
    assert_eq!(state.snapshot().gaps, expected);
    assert_eq!(
        effects,
        vec![Effect::SnapshotEdited(SnapshotUpdate {
            gaps: Some(expected),
            ..SnapshotUpdate::default()
        })]
    );
    assert!(state.panel_edit().is_none());
    assert_eq!(
        state.snapshot_cell().last_writer(SnapshotField::Gaps),
        Some(UpdateSource::Manual)
    );
}

#[test]
fn list_edit_drops_blank_entries_and_duplicates() {
    init_logging();
    let (state, _) = edit(chat_state(), SnapshotField::Skills, " rust , ,go, rust,");
    assert_eq!(state.snapshot().skills, vec!["rust".to_string(), "go".to_string()]);
}

#[test]
fn list_edit_can_clear_the_field() {
    init_logging();
    let (state, _) = edit(chat_state(), SnapshotField::Gaps, "SQL");
    let (state, effects) = edit(state, SnapshotField::Gaps, " , ");

    assert!(state.snapshot().gaps.is_empty());
    assert_eq!(effects.len(), 1);
}

#[test]
fn empty_scalar_save_is_a_noop() {
    init_logging();
    let (state, effects) = edit(chat_state(), SnapshotField::Goal, "   ");

    assert!(effects.is_empty());
    assert_eq!(*state.snapshot(), CareerSnapshot::default());
    assert!(state.panel_edit().is_none());
}

#[test]
fn stage_edit_parses_known_names_only() {
    init_logging();
    let (state, effects) = edit(chat_state(), SnapshotField::Stage, "applying");
    assert_eq!(state.snapshot().stage, Stage::Applying);
    assert_eq!(effects.len(), 1);

    let (state, effects) = edit(state, SnapshotField::Stage, "senior");
    assert_eq!(state.snapshot().stage, Stage::Applying);
    assert!(effects.is_empty());
    assert!(state.panel_edit().is_none());
}

#[test]
fn cancel_discards_staged_text() {
    init_logging();
    let (state, effects) = send(
        chat_state(),
        vec![
            Msg::EditStarted(SnapshotField::Education),
            Msg::EditChanged("PhD in Physics".to_string()),
            Msg::EditCancelled,
        ],
    );

    assert!(effects.is_empty());
    assert!(state.panel_edit().is_none());
    assert_eq!(*state.snapshot(), CareerSnapshot::default());
}

#[test]
fn edit_is_prefilled_with_current_value() {
    init_logging();
    let (state, _) = edit(chat_state(), SnapshotField::Skills, "Go, Rust");
    let (state, _) = update(state, Msg::EditStarted(SnapshotField::Skills));

    assert_eq!(
        row_editing(&state, SnapshotField::Skills).as_deref(),
        Some("Go, Rust")
    );
    assert_eq!(row_editing(&state, SnapshotField::Goal), None);
}

#[test]
fn later_extraction_overrides_manual_edit() {
    init_logging();
    let (state, _) = edit(chat_state(), SnapshotField::Goal, "teach");
    assert_eq!(state.snapshot().goal, "teach");

    let (state, _) = send(
        state,
        vec![
            Msg::InputChanged("I want to become a pilot".to_string()),
            Msg::MessageSubmitted,
        ],
    );
    assert_eq!(state.snapshot().goal, "pilot");
    assert_eq!(state.snapshot().stage, Stage::Exploration);
    assert_eq!(
        state.snapshot_cell().last_writer(SnapshotField::Goal),
        Some(UpdateSource::Extractor)
    );
}

#[test]
fn empty_fields_show_placeholders() {
    init_logging();
    let view = chat_state().view();
    let value = |field: SnapshotField| {
        view.snapshot
            .rows
            .iter()
            .find(|row| row.field == field)
            .map(|row| row.value.clone())
    };

    assert_eq!(value(SnapshotField::Gaps).as_deref(), Some(EMPTY_LIST_TEXT));
    assert_eq!(value(SnapshotField::Skills).as_deref(), Some(EMPTY_LIST_TEXT));
    assert_eq!(value(SnapshotField::Education).as_deref(), Some(EMPTY_VALUE_TEXT));
    assert_eq!(value(SnapshotField::Goal).as_deref(), Some("Undecided"));
    assert_eq!(view.snapshot.rows.len(), 5);
}

#[test]
fn edits_are_ignored_during_the_quiz() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::EditStarted(SnapshotField::Goal));

    assert!(matches!(state.screen(), Screen::Quiz(_)));
    assert!(state.panel_edit().is_none());
    assert!(effects.is_empty());
}

#[test]
fn edit_messages_without_an_open_edit_change_nothing() {
    init_logging();
    let mut state = chat_state();
    state.consume_dirty();
    let before = state.clone();

    let (state, effects) = send(
        state,
        vec![
            Msg::EditChanged("ignored".to_string()),
            Msg::EditSaved,
            Msg::EditCancelled,
        ],
    );

    assert!(effects.is_empty());
    assert_eq!(state, before);
}
