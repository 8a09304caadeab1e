use std::io;
use std::sync::Arc;

use guide_core::{ChatMessage, Effect, Msg, Role, REPLY_FAILED_TEXT};
use guide_engine::{ChatBackend, ChatTurn, EngineEvent, EngineHandle};
use guide_logging::{guide_debug, guide_info, guide_warn};

/// Executes core effects against the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(backend: Arc<dyn ChatBackend>) -> io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(backend)?,
        })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendMessage {
                    reply_id,
                    text,
                    history,
                } => {
                    let turns = to_turns(&history, text);
                    guide_info!("SendMessage reply_id={} turns={}", reply_id, turns.len());
                    self.engine.send(reply_id, turns);
                }
                Effect::QuizCompleted { snapshot, answers } => {
                    guide_info!(
                        "Quiz completed: stage={} skills={} answers={:?}",
                        snapshot.stage,
                        snapshot.skills.len(),
                        answers
                    );
                }
                Effect::QuizSkipped => {
                    guide_info!("Quiz skipped; starting with an empty snapshot");
                }
                Effect::SnapshotEdited(update) => {
                    guide_info!("Snapshot edited: {:?}", update.fields());
                }
            }
        }
    }

    /// Drains pending engine events.
    pub fn poll(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            msgs.push(map_event(event));
        }
        msgs
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Delta { reply_id, text } => Msg::ReplyDelta { reply_id, text },
        EngineEvent::Completed { reply_id, result } => match result {
            Ok(outcome) => {
                guide_debug!("Reply {} finished ({} bytes)", reply_id, outcome.text.len());
                Msg::ReplyDone { reply_id }
            }
            Err(kind) => {
                guide_warn!("Reply {} failed: {}", reply_id, kind);
                Msg::ReplyFailed {
                    reply_id,
                    reason: kind.to_string(),
                }
            }
        },
    }
}

/// Finished history plus the new user text, as backend turns. Apology
/// placeholders from failed replies are not sent.
pub(crate) fn to_turns(history: &[ChatMessage], text: String) -> Vec<ChatTurn> {
    history
        .iter()
        .filter(|message| {
            !(message.role == Role::Assistant
                && (message.content.trim().is_empty() || message.content == REPLY_FAILED_TEXT))
        })
        .map(|message| match message.role {
            Role::User => ChatTurn::user(message.content.clone()),
            Role::Assistant => ChatTurn::assistant(message.content.clone()),
        })
        .chain(std::iter::once(ChatTurn::user(text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use guide_engine::{FailureKind, ReplyOutcome, TurnRole};
    use pretty_assertions::assert_eq;

    use super::*;

    fn assistant(content: &str) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: content.to_string(),
            is_streaming: false,
            feedback: None,
        }
    }

    #[test]
    fn history_becomes_turns_without_failed_replies() {
        let history = vec![
            ChatMessage::user("Hi"),
            assistant(REPLY_FAILED_TEXT),
            ChatMessage::user("Hi again"),
            assistant("Hello!"),
        ];
        let turns = to_turns(&history, "What next?".to_string());

        let roles: Vec<TurnRole> = turns.iter().map(|turn| turn.role).collect();
        assert_eq!(
            roles,
            vec![TurnRole::User, TurnRole::User, TurnRole::Assistant, TurnRole::User]
        );
        assert_eq!(turns[3].content, "What next?");
    }

    #[test]
    fn engine_events_map_to_reply_messages() {
        assert_eq!(
            map_event(EngineEvent::Delta {
                reply_id: 4,
                text: "Hi".to_string(),
            }),
            Msg::ReplyDelta {
                reply_id: 4,
                text: "Hi".to_string(),
            }
        );
        assert_eq!(
            map_event(EngineEvent::Completed {
                reply_id: 4,
                result: Ok(ReplyOutcome {
                    text: "Hi".to_string(),
                }),
            }),
            Msg::ReplyDone { reply_id: 4 }
        );
        assert_eq!(
            map_event(EngineEvent::Completed {
                reply_id: 5,
                result: Err(FailureKind::HttpStatus(503)),
            }),
            Msg::ReplyFailed {
                reply_id: 5,
                reason: "http status 503".to_string(),
            }
        );
    }
}
