use guide_logging::{guide_debug, guide_error, guide_info, guide_warn};

use crate::chat::SUGGESTIONS;
use crate::compose::compose_seed_message;
use crate::extract;
use crate::panel::PanelEdit;
use crate::quiz::{NextOutcome, QuizConfig, QuizSession};
use crate::snapshot::{CareerSnapshot, SnapshotUpdate, UpdateSource};
use crate::{AppState, Effect, Msg, Screen};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::QuizTextChanged(text) => {
            edit_quiz(&mut state, |session, config| session.set_text(config, &text));
            Vec::new()
        }
        Msg::QuizOptionSelected(option) => {
            edit_quiz(&mut state, |session, config| session.select(config, &option));
            Vec::new()
        }
        Msg::QuizOptionToggled(option) => {
            edit_quiz(&mut state, |session, config| session.toggle(config, &option));
            Vec::new()
        }
        Msg::QuizBackClicked => {
            edit_quiz(&mut state, |session, _| session.back());
            Vec::new()
        }
        Msg::QuizNextClicked => {
            let (config, screen) = state.parts_mut();
            let outcome = match screen {
                Screen::Quiz(session) => Some(session.next(config)),
                Screen::Chat => None,
            };
            match outcome {
                None => Vec::new(),
                Some(NextOutcome::Blocked) => {
                    guide_debug!("Quiz next rejected: current answer is incomplete");
                    Vec::new()
                }
                Some(NextOutcome::Advanced { step }) => {
                    guide_debug!("Quiz advanced to step {}", step);
                    state.mark_dirty();
                    Vec::new()
                }
                Some(NextOutcome::Completed(snapshot)) => complete_quiz(&mut state, snapshot),
            }
        }
        Msg::QuizSkipClicked => {
            if matches!(state.screen(), Screen::Quiz(_)) {
                guide_info!("Quiz skipped");
                state.set_screen(Screen::Chat);
                vec![Effect::QuizSkipped]
            } else {
                Vec::new()
            }
        }
        Msg::InputChanged(text) => {
            if *state.screen() == Screen::Chat && state.input() != text {
                state.set_input(text);
            }
            Vec::new()
        }
        Msg::MessageSubmitted => {
            let text = state.input().trim().to_string();
            if *state.screen() != Screen::Chat || text.is_empty() || state.transcript().is_loading() {
                return (state, Vec::new());
            }
            state.set_input(String::new());
            vec![send_user_message(&mut state, text)]
        }
        Msg::SuggestionChosen(index) => {
            let transcript = state.transcript();
            let allowed = *state.screen() == Screen::Chat
                && transcript.is_empty()
                && !transcript.is_loading();
            match SUGGESTIONS.get(index) {
                Some(suggestion) if allowed => {
                    vec![send_user_message(&mut state, suggestion.to_string())]
                }
                _ => Vec::new(),
            }
        }
        Msg::ReplyDelta { reply_id, text } => {
            if state.transcript_mut().append_delta(reply_id, &text) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ReplyDone { reply_id } => {
            if let Some(content) = state.transcript_mut().finish_reply(reply_id) {
                state.mark_dirty();
                observe_message(&mut state, &content);
            }
            Vec::new()
        }
        Msg::ReplyFailed { reply_id, reason } => {
            if state.transcript_mut().fail_reply(reply_id) {
                guide_warn!("Reply {} failed: {}", reply_id, reason);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FeedbackGiven { index, feedback } => {
            if state.transcript_mut().set_feedback(index, feedback) {
                guide_info!("Feedback {:?} recorded for message {}", feedback, index);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TabSelected(tab) => {
            if *state.screen() == Screen::Chat && state.tab() != tab {
                state.set_tab(tab);
            }
            Vec::new()
        }
        Msg::EditStarted(field) => {
            if *state.screen() == Screen::Chat {
                let edit = PanelEdit::begin(field, state.snapshot());
                state.set_panel_edit(Some(edit));
            }
            Vec::new()
        }
        Msg::EditChanged(text) => {
            if let Some(edit) = state.panel_edit_mut() {
                edit.set_staged(text);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EditSaved => match state.take_panel_edit() {
            Some(edit) => save_edit(&mut state, edit),
            None => Vec::new(),
        },
        Msg::EditCancelled => {
            state.take_panel_edit();
            Vec::new()
        }
        Msg::NewChatClicked => {
            if *state.screen() == Screen::Chat {
                guide_info!("Starting a new chat");
                state.restart();
            }
            Vec::new()
        }
    };

    (state, effects)
}

/// Runs a quiz mutation if the quiz is showing; marks dirty when it reports a change.
fn edit_quiz<F>(state: &mut AppState, edit: F)
where
    F: FnOnce(&mut QuizSession, &QuizConfig) -> bool,
{
    let (config, screen) = state.parts_mut();
    let changed = match screen {
        Screen::Quiz(session) => edit(session, config),
        Screen::Chat => false,
    };
    if changed {
        state.mark_dirty();
    }
}

fn complete_quiz(state: &mut AppState, snapshot: CareerSnapshot) -> Vec<Effect> {
    let answers = match state.replace_screen(Screen::Chat) {
        Screen::Quiz(session) => session.into_answers(),
        Screen::Chat => return Vec::new(),
    };
    guide_info!("Quiz completed; stage {}", snapshot.stage);

    state
        .snapshot_cell_mut()
        .apply(SnapshotUpdate::replace_all(snapshot.clone()), UpdateSource::Quiz);
    let seed = compose_seed_message(&answers);
    let send = send_user_message(state, seed);

    vec![Effect::QuizCompleted { snapshot, answers }, send]
}

fn send_user_message(state: &mut AppState, text: String) -> Effect {
    let history = state.transcript().history();
    state.transcript_mut().push_user(text.clone());
    observe_message(state, &text);

    let reply_id = state.allocate_reply_id();
    state.transcript_mut().begin_reply(reply_id);
    state.mark_dirty();
    guide_debug!("Sending message for reply {} ({} chars)", reply_id, text.len());

    Effect::SendMessage {
        reply_id,
        text,
        history,
    }
}

/// Feeds one finished message through the extractor and merges the result.
fn observe_message(state: &mut AppState, text: &str) {
    let extractor = match extract::builtin() {
        Ok(extractor) => extractor,
        Err(err) => {
            guide_error!("Snapshot extraction unavailable: {}", err);
            return;
        }
    };
    let update = extractor.extract(text, state.snapshot());
    if update.is_empty() {
        return;
    }
    let changed = state
        .snapshot_cell_mut()
        .apply(update, UpdateSource::Extractor);
    if !changed.is_empty() {
        guide_debug!("Extractor updated {:?}", changed);
        state.mark_dirty();
    }
}

fn save_edit(state: &mut AppState, edit: PanelEdit) -> Vec<Effect> {
    let field = edit.field();
    match edit.commit() {
        Ok(update) => {
            state
                .snapshot_cell_mut()
                .apply(update.clone(), UpdateSource::Manual);
            guide_info!("Manual edit saved for {:?}", field);
            vec![Effect::SnapshotEdited(update)]
        }
        Err(reason) => {
            guide_info!("Manual edit ignored: {}", reason);
            Vec::new()
        }
    }
}
