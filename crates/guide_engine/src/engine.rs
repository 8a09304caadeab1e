use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use guide_logging::{guide_debug, guide_warn};

use crate::backend::{ChannelDeltaSink, ChatBackend};
use crate::{BackendError, ChatTurn, EngineEvent, FailureKind, ReplyId, ReplyOutcome};

enum EngineCommand {
    Reply { reply_id: ReplyId, turns: Vec<ChatTurn> },
}

/// Owns the background thread that talks to the chat backend.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn ChatBackend>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("guide-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let backend = backend.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(backend.as_ref(), command, event_tx).await;
                    });
                }
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    /// Starts streaming the reply to the last turn of `turns`.
    pub fn send(&self, reply_id: ReplyId, turns: Vec<ChatTurn>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Reply { reply_id, turns });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    backend: &dyn ChatBackend,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Reply { reply_id, turns } => {
            guide_debug!("Reply {} requested with {} turns", reply_id, turns.len());
            let sink = ChannelDeltaSink::new(reply_id, event_tx.clone());
            let result = backend
                .stream_reply(&turns, &sink)
                .await
                .and_then(non_empty)
                .map(|text| ReplyOutcome { text })
                .map_err(|err| {
                    guide_warn!("Reply {} failed: {}", reply_id, err);
                    err.kind
                });
            let _ = event_tx.send(EngineEvent::Completed { reply_id, result });
        }
    }
}

fn non_empty(text: String) -> Result<String, BackendError> {
    if text.trim().is_empty() {
        Err(BackendError::new(
            FailureKind::EmptyReply,
            "backend returned no text",
        ))
    } else {
        Ok(text)
    }
}
