//! Career guide engine: the chat backend and the background thread that runs it.
mod backend;
mod engine;
mod openai;
mod prompt;
mod scripted;
mod sse;
mod types;

pub use backend::{ChannelDeltaSink, ChatBackend, DeltaSink};
pub use engine::EngineHandle;
pub use openai::{BackendSettings, OpenAiCompatBackend, DEFAULT_MODEL};
pub use prompt::SYSTEM_PROMPT;
pub use scripted::ScriptedBackend;
pub use sse::{SseDecoder, SseFrame};
pub use types::{BackendError, ChatTurn, EngineEvent, FailureKind, ReplyId, ReplyOutcome, TurnRole};
