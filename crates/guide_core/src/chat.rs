pub type ReplyId = u64;

/// Starter prompts offered while the conversation is empty.
pub const SUGGESTIONS: [&str; 4] = [
    "How do I find my dream career?",
    "Help me write a better resume",
    "How to prepare for interviews?",
    "Should I change my career?",
];

/// Shown in place of an assistant reply that failed before producing text.
pub const REPLY_FAILED_TEXT: &str =
    "Sorry, I couldn't reach the career guide just now. Please try sending your message again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Helpful,
    NotHelpful,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub is_streaming: bool,
    pub feedback: Option<Feedback>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_streaming: false,
            feedback: None,
        }
    }

    fn streaming_reply() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            is_streaming: true,
            feedback: None,
        }
    }
}

/// Ordered conversation plus the reply currently streaming in, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    pending: Option<ReplyId>,
}

impl Transcript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<ReplyId> {
        self.pending
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn begin_reply(&mut self, reply_id: ReplyId) {
        self.messages.push(ChatMessage::streaming_reply());
        self.pending = Some(reply_id);
    }

    /// Appends streamed text to the pending reply. Stale ids are ignored.
    pub fn append_delta(&mut self, reply_id: ReplyId, text: &str) -> bool {
        if self.pending != Some(reply_id) || text.is_empty() {
            return false;
        }
        match self.streaming_message() {
            Some(message) => {
                message.content.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Finalizes the pending reply and returns its text.
    pub fn finish_reply(&mut self, reply_id: ReplyId) -> Option<String> {
        if self.pending != Some(reply_id) {
            return None;
        }
        self.pending = None;
        let message = self.streaming_message()?;
        message.is_streaming = false;
        Some(message.content.clone())
    }

    /// Finalizes the pending reply after a failure, keeping any partial text.
    pub fn fail_reply(&mut self, reply_id: ReplyId) -> bool {
        if self.pending != Some(reply_id) {
            return false;
        }
        self.pending = None;
        match self.streaming_message() {
            Some(message) => {
                message.is_streaming = false;
                if message.content.trim().is_empty() {
                    message.content = REPLY_FAILED_TEXT.to_string();
                }
                true
            }
            None => false,
        }
    }

    /// Rates a finished assistant message.
    pub fn set_feedback(&mut self, index: usize, feedback: Feedback) -> bool {
        match self.messages.get_mut(index) {
            Some(message)
                if message.role == Role::Assistant
                    && !message.is_streaming
                    && message.feedback != Some(feedback) =>
            {
                message.feedback = Some(feedback);
                true
            }
            _ => false,
        }
    }

    /// Finished messages, oldest first.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|m| !m.is_streaming)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn streaming_message(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .last_mut()
            .filter(|m| m.role == Role::Assistant && m.is_streaming)
    }
}
