use crate::{CareerSnapshot, ChatMessage, QuizAnswers, ReplyId, SnapshotUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The quiz finished; the host receives the synthesized snapshot and raw answers.
    QuizCompleted {
        snapshot: CareerSnapshot,
        answers: QuizAnswers,
    },
    QuizSkipped,
    /// Ask the chat collaborator to answer `text`, given the earlier turns.
    SendMessage {
        reply_id: ReplyId,
        text: String,
        history: Vec<ChatMessage>,
    },
    /// A manual panel edit was applied.
    SnapshotEdited(SnapshotUpdate),
}
