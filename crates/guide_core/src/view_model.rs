use crate::chat::{Feedback, Role, SUGGESTIONS};
use crate::panel::display_value;
use crate::quiz::{Answer, QuestionKind};
use crate::snapshot::{SnapshotField, Stage};
use crate::{AppState, Screen, Tab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub screen: ScreenView,
    pub snapshot: SnapshotView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenView {
    Quiz(QuizView),
    Chat(ChatView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
    /// One-based question number.
    pub position: usize,
    pub total: usize,
    pub percent: u8,
    pub question: String,
    pub kind: QuestionKind,
    pub placeholder: Option<String>,
    pub text_value: String,
    pub options: Vec<OptionView>,
    pub can_go_back: bool,
    pub can_proceed: bool,
    pub is_last_step: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub tab: Tab,
    pub messages: Vec<MessageView>,
    pub input: String,
    pub is_loading: bool,
    pub can_send: bool,
    /// Starter prompts; empty once the conversation has begun.
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub index: usize,
    pub role: Role,
    pub content: String,
    pub is_streaming: bool,
    pub feedback: Option<Feedback>,
    pub accepts_feedback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotView {
    pub rows: Vec<SnapshotRowView>,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRowView {
    pub field: SnapshotField,
    pub label: &'static str,
    pub value: String,
    /// Staged text when this row is being edited.
    pub editing: Option<String>,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let screen = match state.screen() {
        Screen::Quiz(session) => {
            let config = state.quiz();
            let (position, total, percent) = session.progress(config);
            let question = session.current(config);
            let answer = question.and_then(|q| session.answers().get(&q.id));
            let options: Vec<OptionView> = question
                .map(|q| {
                    q.options
                        .iter()
                        .map(|option| OptionView {
                            label: option.clone(),
                            selected: is_selected(answer, option),
                        })
                        .collect()
                })
                .unwrap_or_default();
            let text_value = match answer {
                Some(Answer::Text(value)) => value.clone(),
                _ => String::new(),
            };
            ScreenView::Quiz(QuizView {
                position,
                total,
                percent,
                question: question.map(|q| q.question.clone()).unwrap_or_default(),
                kind: question.map_or(QuestionKind::Text, |q| q.kind),
                placeholder: question.and_then(|q| q.placeholder.clone()),
                text_value,
                options,
                can_go_back: session.step() > 0,
                can_proceed: session.can_proceed(config),
                is_last_step: session.is_last_step(config),
            })
        }
        Screen::Chat => {
            let transcript = state.transcript();
            let messages: Vec<MessageView> = transcript
                .messages()
                .iter()
                .enumerate()
                .map(|(index, message)| MessageView {
                    index,
                    role: message.role,
                    content: message.content.clone(),
                    is_streaming: message.is_streaming,
                    feedback: message.feedback,
                    accepts_feedback: message.role == Role::Assistant && !message.is_streaming,
                })
                .collect();
            let suggestions: Vec<String> = if transcript.is_empty() {
                SUGGESTIONS.iter().map(|s| s.to_string()).collect()
            } else {
                Vec::new()
            };
            ScreenView::Chat(ChatView {
                tab: state.tab(),
                messages,
                input: state.input().to_string(),
                is_loading: transcript.is_loading(),
                can_send: !state.input().trim().is_empty() && !transcript.is_loading(),
                suggestions,
            })
        }
    };

    let snapshot = state.snapshot();
    let edit = state.panel_edit();
    let rows: Vec<SnapshotRowView> = SnapshotField::ALL
        .into_iter()
        .map(|field| SnapshotRowView {
            field,
            label: field.label(),
            value: display_value(snapshot, field),
            editing: edit
                .filter(|e| e.field() == field)
                .map(|e| e.staged().to_string()),
        })
        .collect();

    AppViewModel {
        screen,
        snapshot: SnapshotView {
            rows,
            stage: snapshot.stage,
        },
        dirty: state.is_dirty(),
    }
}

fn is_selected(answer: Option<&Answer>, option: &str) -> bool {
    match answer {
        Some(Answer::Text(value)) => value == option,
        Some(Answer::Choices(values)) => values.iter().any(|v| v == option),
        None => false,
    }
}
