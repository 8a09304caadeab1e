use std::sync::mpsc;

use crate::{BackendError, ChatTurn, EngineEvent, ReplyId};

/// Receives reply text as it streams in.
pub trait DeltaSink: Send + Sync {
    fn emit(&self, text: &str);
}

/// Forwards deltas for one reply onto the engine event channel.
pub struct ChannelDeltaSink {
    reply_id: ReplyId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelDeltaSink {
    pub fn new(reply_id: ReplyId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { reply_id, tx }
    }
}

impl DeltaSink for ChannelDeltaSink {
    fn emit(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let _ = self.tx.send(EngineEvent::Delta {
            reply_id: self.reply_id,
            text: text.to_string(),
        });
    }
}

#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Streams the assistant's answer to the last user turn through `sink` and
    /// returns the full text once the stream ends.
    async fn stream_reply(
        &self,
        turns: &[ChatTurn],
        sink: &dyn DeltaSink,
    ) -> Result<String, BackendError>;
}
