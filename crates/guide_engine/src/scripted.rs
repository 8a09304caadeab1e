use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::backend::{ChatBackend, DeltaSink};
use crate::{BackendError, ChatTurn, FailureKind};

const OFFLINE_REPLIES: [&str; 3] = [
    "Thanks for sharing your background! Start by listing the roles that excite you most, \
then compare the skills they ask for with the ones you already have. Pick one small project \
that closes the biggest difference and build it over the next few weeks.",
    "Good question. Keep your resume to one page, lead with projects that show results, \
and tailor the summary to each role you apply for. Numbers help: say what you built and \
who it helped.",
    "For interviews, practise explaining your projects out loud, review the fundamentals \
of your field, and prepare two or three stories about teamwork and solving problems. \
Mock interviews with friends are a great way to build confidence.",
];

/// Replays canned replies word by word. Used offline and in tests.
#[derive(Debug)]
pub struct ScriptedBackend {
    replies: Vec<String>,
    next: AtomicUsize,
    chunk_delay: Duration,
}

impl ScriptedBackend {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
            chunk_delay: Duration::ZERO,
        }
    }

    /// General career advice used when no remote endpoint is configured.
    pub fn offline() -> Self {
        Self::new(OFFLINE_REPLIES).with_chunk_delay(Duration::from_millis(30))
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    async fn stream_reply(
        &self,
        _turns: &[ChatTurn],
        sink: &dyn DeltaSink,
    ) -> Result<String, BackendError> {
        if self.replies.is_empty() {
            return Err(BackendError::new(
                FailureKind::EmptyReply,
                "no scripted replies configured",
            ));
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        let reply = &self.replies[index];
        for chunk in reply.split_inclusive(' ') {
            if !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
            sink.emit(chunk);
        }
        Ok(reply.clone())
    }
}
