use crate::{Feedback, ReplyId, SnapshotField, Tab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User typed into the current free-text question.
    QuizTextChanged(String),
    /// User picked an option on a single-select question.
    QuizOptionSelected(String),
    /// User clicked an option on a multi-select question.
    QuizOptionToggled(String),
    QuizNextClicked,
    QuizBackClicked,
    QuizSkipClicked,
    /// User edited the chat input box.
    InputChanged(String),
    /// User submitted the current chat input.
    MessageSubmitted,
    /// User picked one of the starter prompts.
    SuggestionChosen(usize),
    /// Streamed text for an assistant reply.
    ReplyDelta { reply_id: ReplyId, text: String },
    /// The assistant reply finished streaming.
    ReplyDone { reply_id: ReplyId },
    /// The assistant reply could not be completed.
    ReplyFailed { reply_id: ReplyId, reason: String },
    FeedbackGiven { index: usize, feedback: Feedback },
    TabSelected(Tab),
    /// User opened a snapshot field for manual editing.
    EditStarted(SnapshotField),
    EditChanged(String),
    EditSaved,
    EditCancelled,
    NewChatClicked,
}
