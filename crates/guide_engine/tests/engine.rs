use std::sync::Arc;
use std::time::Duration;

use guide_engine::{
    BackendError, ChatBackend, ChatTurn, DeltaSink, EngineEvent, EngineHandle, FailureKind,
    ReplyOutcome, ScriptedBackend,
};
use pretty_assertions::assert_eq;

struct FailingBackend;

#[async_trait::async_trait]
impl ChatBackend for FailingBackend {
    async fn stream_reply(
        &self,
        _turns: &[ChatTurn],
        sink: &dyn DeltaSink,
    ) -> Result<String, BackendError> {
        sink.emit("Partial ");
        Err(BackendError::new(FailureKind::Network, "connection reset"))
    }
}

/// Collects events for one reply until it completes.
fn collect(engine: &EngineHandle) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Some(event) = engine.recv_timeout(Duration::from_secs(5)) {
        let done = matches!(event, EngineEvent::Completed { .. });
        events.push(event);
        if done {
            break;
        }
    }
    events
}

fn deltas(events: &[EngineEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Delta { text, .. } => Some(text.as_str()),
            EngineEvent::Completed { .. } => None,
        })
        .collect()
}

#[test]
fn scripted_reply_streams_then_completes() {
    let backend = ScriptedBackend::new(["Build a portfolio project.", "Second reply."]);
    let engine = EngineHandle::new(Arc::new(backend)).expect("engine");

    engine.send(7, vec![ChatTurn::user("Where do I start?")]);
    let events = collect(&engine);

    assert!(events.len() > 2);
    assert_eq!(deltas(&events), "Build a portfolio project.");
    assert!(events[..events.len() - 1]
        .iter()
        .all(|event| matches!(event, EngineEvent::Delta { reply_id: 7, .. })));
    assert_eq!(
        events.last(),
        Some(&EngineEvent::Completed {
            reply_id: 7,
            result: Ok(ReplyOutcome {
                text: "Build a portfolio project.".to_string()
            }),
        })
    );

    engine.send(8, vec![ChatTurn::user("And then?")]);
    assert_eq!(deltas(&collect(&engine)), "Second reply.");
}

#[test]
fn backend_failure_is_reported_with_its_kind() {
    let engine = EngineHandle::new(Arc::new(FailingBackend)).expect("engine");
    engine.send(3, vec![ChatTurn::user("Hello")]);

    let events = collect(&engine);
    assert_eq!(
        events,
        vec![
            EngineEvent::Delta {
                reply_id: 3,
                text: "Partial ".to_string(),
            },
            EngineEvent::Completed {
                reply_id: 3,
                result: Err(FailureKind::Network),
            },
        ]
    );
}

#[test]
fn blank_reply_is_an_empty_reply_failure() {
    let engine = EngineHandle::new(Arc::new(ScriptedBackend::new(["   "]))).expect("engine");
    engine.send(1, vec![ChatTurn::user("Hello")]);

    let events = collect(&engine);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::Completed {
            reply_id: 1,
            result: Err(FailureKind::EmptyReply),
        })
    );
}

#[test]
fn backend_without_replies_fails() {
    let engine =
        EngineHandle::new(Arc::new(ScriptedBackend::new(Vec::<String>::new()))).expect("engine");
    engine.send(2, Vec::new());

    assert_eq!(
        collect(&engine),
        vec![EngineEvent::Completed {
            reply_id: 2,
            result: Err(FailureKind::EmptyReply),
        }]
    );
}
