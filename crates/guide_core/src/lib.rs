//! Career guide core: pure state machine, snapshot extraction and view-model helpers.
mod chat;
mod compose;
mod effect;
pub mod extract;
mod msg;
mod panel;
mod quiz;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use chat::{ChatMessage, Feedback, ReplyId, Role, Transcript, REPLY_FAILED_TEXT, SUGGESTIONS};
pub use compose::{compose_seed_message, CLOSING_REQUEST};
pub use effect::Effect;
pub use extract::{SnapshotExtractor, SKILL_KEYWORDS};
pub use msg::Msg;
pub use panel::{
    display_value, editable_value, split_list, EditRejected, PanelEdit, EMPTY_LIST_TEXT,
    EMPTY_VALUE_TEXT,
};
pub use quiz::{
    ids, snapshot_from_answers, Answer, NextOutcome, QuestionKind, QuizAnswers, QuizConfig,
    QuizConfigError, QuizQuestion, QuizSession, INTERNSHIPS_ONLY, NO_EXPERIENCE,
};
pub use snapshot::{
    merge, CareerSnapshot, SnapshotCell, SnapshotField, SnapshotUpdate, Stage, UnknownStage,
    UpdateSource, DEFAULT_EDUCATION, DEFAULT_GOAL,
};
pub use state::{AppState, Screen, Tab};
pub use update::update;
pub use view_model::{
    AppViewModel, ChatView, MessageView, OptionView, QuizView, ScreenView, SnapshotRowView,
    SnapshotView,
};
