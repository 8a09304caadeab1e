//! Turns one line of terminal input into core messages.

use guide_core::{
    AppViewModel, ChatView, Feedback, Msg, QuestionKind, QuizView, ScreenView, SnapshotField, Tab,
};

pub const HELP: &str = "\
Quiz:  type your answer, or an option number (several for multi-select, e.g. `1 3`).
       Empty line = Next, :back, :skip
Chat:  type a message and press Enter
       :suggest N   send starter prompt N
       :good N / :bad N   rate reply #N
       :tab  switch between conversation and snapshot
       :edit <education|skills|goal|stage|gaps>   change a snapshot value
       :new  start over with a fresh quiz
Any:   :help, :quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Help,
    Quit,
    /// Input that could not be understood; the text explains why.
    Invalid(String),
}

pub fn parse_line(line: &str, view: &AppViewModel) -> Command {
    let input = line.trim();
    match input {
        ":quit" | ":q" => return Command::Quit,
        ":help" | ":h" => return Command::Help,
        _ => {}
    }

    match &view.screen {
        ScreenView::Quiz(quiz) => parse_quiz(input, quiz),
        ScreenView::Chat(_) if is_editing(view) => parse_edit(input),
        ScreenView::Chat(chat) => parse_chat(input, chat),
    }
}

fn is_editing(view: &AppViewModel) -> bool {
    view.snapshot.rows.iter().any(|row| row.editing.is_some())
}

fn parse_quiz(input: &str, quiz: &QuizView) -> Command {
    match input {
        "" | ":next" => return Command::Dispatch(vec![Msg::QuizNextClicked]),
        ":back" => return Command::Dispatch(vec![Msg::QuizBackClicked]),
        ":skip" => return Command::Dispatch(vec![Msg::QuizSkipClicked]),
        _ if input.starts_with(':') => return unknown_command(input),
        _ => {}
    }

    match quiz.kind {
        QuestionKind::Text => Command::Dispatch(vec![
            Msg::QuizTextChanged(input.to_string()),
            Msg::QuizNextClicked,
        ]),
        QuestionKind::Select => match option_label(input, quiz) {
            Some(label) => Command::Dispatch(vec![
                Msg::QuizOptionSelected(label),
                Msg::QuizNextClicked,
            ]),
            None => Command::Invalid(option_hint(quiz)),
        },
        QuestionKind::Multiselect => {
            let mut msgs = Vec::new();
            for token in input
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
            {
                match option_label(token, quiz) {
                    Some(label) => msgs.push(Msg::QuizOptionToggled(label)),
                    None => return Command::Invalid(option_hint(quiz)),
                }
            }
            Command::Dispatch(msgs)
        }
    }
}

/// Resolves a 1-based option number or an option's exact label (any case).
fn option_label(token: &str, quiz: &QuizView) -> Option<String> {
    if let Some(index) = parse_position(Some(token)) {
        return quiz.options.get(index).map(|option| option.label.clone());
    }
    quiz.options
        .iter()
        .find(|option| option.label.eq_ignore_ascii_case(token))
        .map(|option| option.label.clone())
}

fn option_hint(quiz: &QuizView) -> String {
    format!("Choose an option number between 1 and {}.", quiz.options.len())
}

fn parse_edit(input: &str) -> Command {
    match input {
        ":cancel" => Command::Dispatch(vec![Msg::EditCancelled]),
        // An empty line keeps the pre-filled value.
        "" => Command::Dispatch(vec![Msg::EditSaved]),
        _ => Command::Dispatch(vec![
            Msg::EditChanged(input.to_string()),
            Msg::EditSaved,
        ]),
    }
}

fn parse_chat(input: &str, chat: &ChatView) -> Command {
    if input.is_empty() {
        return Command::Dispatch(Vec::new());
    }
    let Some(rest) = input.strip_prefix(':') else {
        return Command::Dispatch(vec![
            Msg::InputChanged(input.to_string()),
            Msg::MessageSubmitted,
        ]);
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match name {
        "tab" => {
            let next = match chat.tab {
                Tab::Conversation => Tab::Snapshot,
                Tab::Snapshot => Tab::Conversation,
            };
            Command::Dispatch(vec![Msg::TabSelected(next)])
        }
        "chat" => Command::Dispatch(vec![Msg::TabSelected(Tab::Conversation)]),
        "snapshot" => Command::Dispatch(vec![Msg::TabSelected(Tab::Snapshot)]),
        "new" => Command::Dispatch(vec![Msg::NewChatClicked]),
        "edit" => match arg.map(str::parse::<SnapshotField>) {
            Some(Ok(field)) => Command::Dispatch(vec![
                Msg::TabSelected(Tab::Snapshot),
                Msg::EditStarted(field),
            ]),
            Some(Err(reason)) => Command::Invalid(reason),
            None => Command::Invalid(
                "Usage: :edit <education|skills|goal|stage|gaps>".to_string(),
            ),
        },
        "good" | "bad" => {
            let feedback = if name == "good" {
                Feedback::Helpful
            } else {
                Feedback::NotHelpful
            };
            match parse_position(arg) {
                Some(index) => Command::Dispatch(vec![Msg::FeedbackGiven { index, feedback }]),
                None => Command::Invalid(format!("Usage: :{name} <reply number>")),
            }
        }
        "suggest" => match parse_position(arg) {
            Some(index) => Command::Dispatch(vec![Msg::SuggestionChosen(index)]),
            None => Command::Invalid("Usage: :suggest <number>".to_string()),
        },
        _ => unknown_command(input),
    }
}

/// Parses a 1-based number into a 0-based index.
fn parse_position(arg: Option<&str>) -> Option<usize> {
    arg?.parse::<usize>().ok()?.checked_sub(1)
}

fn unknown_command(input: &str) -> Command {
    Command::Invalid(format!("Unknown command '{input}'. Type :help for commands."))
}

#[cfg(test)]
mod tests {
    use guide_core::{update, AppState, Msg};
    use pretty_assertions::assert_eq;

    use super::*;

    fn chat_state() -> AppState {
        update(AppState::new(), Msg::QuizSkipClicked).0
    }

    fn parse(line: &str, state: &AppState) -> Command {
        parse_line(line, &state.view())
    }

    fn state_at_step(steps: &[Msg]) -> AppState {
        steps
            .iter()
            .cloned()
            .fold(AppState::new(), |state, msg| update(state, msg).0)
    }

    #[test]
    fn quiz_text_answer_submits_and_advances() {
        let state = AppState::new();
        assert_eq!(
            parse("  BCA final year ", &state),
            Command::Dispatch(vec![
                Msg::QuizTextChanged("BCA final year".to_string()),
                Msg::QuizNextClicked,
            ])
        );
        assert_eq!(
            parse("", &state),
            Command::Dispatch(vec![Msg::QuizNextClicked])
        );
        assert_eq!(
            parse(":skip", &state),
            Command::Dispatch(vec![Msg::QuizSkipClicked])
        );
    }

    #[test]
    fn quiz_select_accepts_number_or_label() {
        let state = state_at_step(&[
            Msg::QuizTextChanged("MCA".to_string()),
            Msg::QuizNextClicked,
        ]);
        assert_eq!(
            parse("4", &state),
            Command::Dispatch(vec![
                Msg::QuizOptionSelected("Civil Engineering".to_string()),
                Msg::QuizNextClicked,
            ])
        );
        assert_eq!(
            parse("other", &state),
            Command::Dispatch(vec![
                Msg::QuizOptionSelected("Other".to_string()),
                Msg::QuizNextClicked,
            ])
        );
        assert!(matches!(parse("42", &state), Command::Invalid(_)));
        assert!(matches!(parse("0", &state), Command::Invalid(_)));
    }

    #[test]
    fn quiz_multiselect_toggles_each_number() {
        let state = state_at_step(&[
            Msg::QuizTextChanged("MCA".to_string()),
            Msg::QuizNextClicked,
            Msg::QuizOptionSelected("Other".to_string()),
            Msg::QuizNextClicked,
        ]);
        assert_eq!(
            parse("1, 5", &state),
            Command::Dispatch(vec![
                Msg::QuizOptionToggled("Python".to_string()),
                Msg::QuizOptionToggled("SQL".to_string()),
            ])
        );
        assert!(matches!(parse("1 99", &state), Command::Invalid(_)));
    }

    #[test]
    fn chat_line_becomes_a_message() {
        let state = chat_state();
        assert_eq!(
            parse("How do I learn SQL?", &state),
            Command::Dispatch(vec![
                Msg::InputChanged("How do I learn SQL?".to_string()),
                Msg::MessageSubmitted,
            ])
        );
        assert_eq!(parse("   ", &state), Command::Dispatch(Vec::new()));
    }

    #[test]
    fn chat_commands_map_to_messages() {
        let state = chat_state();
        assert_eq!(
            parse(":tab", &state),
            Command::Dispatch(vec![Msg::TabSelected(Tab::Snapshot)])
        );
        assert_eq!(
            parse(":good 2", &state),
            Command::Dispatch(vec![Msg::FeedbackGiven {
                index: 1,
                feedback: Feedback::Helpful,
            }])
        );
        assert_eq!(
            parse(":suggest 1", &state),
            Command::Dispatch(vec![Msg::SuggestionChosen(0)])
        );
        assert_eq!(
            parse(":edit Gaps", &state),
            Command::Dispatch(vec![
                Msg::TabSelected(Tab::Snapshot),
                Msg::EditStarted(SnapshotField::Gaps),
            ])
        );
        assert!(matches!(parse(":edit hobbies", &state), Command::Invalid(_)));
        assert!(matches!(parse(":bad", &state), Command::Invalid(_)));
        assert!(matches!(parse(":dance", &state), Command::Invalid(_)));
        assert_eq!(parse(":quit", &state), Command::Quit);
    }

    #[test]
    fn lines_go_to_the_open_edit() {
        let state = update(chat_state(), Msg::EditStarted(SnapshotField::Skills)).0;
        assert_eq!(
            parse("Rust, Go", &state),
            Command::Dispatch(vec![
                Msg::EditChanged("Rust, Go".to_string()),
                Msg::EditSaved,
            ])
        );
        assert_eq!(parse("", &state), Command::Dispatch(vec![Msg::EditSaved]));
        assert_eq!(
            parse(":cancel", &state),
            Command::Dispatch(vec![Msg::EditCancelled])
        );
    }
}
