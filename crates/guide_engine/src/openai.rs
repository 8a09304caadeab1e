use std::time::Duration;

use futures_util::StreamExt;
use guide_logging::{guide_debug, guide_trace};
use serde::{Deserialize, Serialize};

use crate::backend::{ChatBackend, DeltaSink};
use crate::sse::{SseDecoder, SseFrame};
use crate::{BackendError, ChatTurn, FailureKind, TurnRole, SYSTEM_PROMPT};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    pub model: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    /// Upper bound for the whole request, streaming included.
    pub request_timeout: Duration,
    /// Prepended as a system turn; blank disables it.
    pub system_prompt: String,
}

impl BackendSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Streams replies from any server speaking the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiCompatBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn request_turns(&self, turns: &[ChatTurn]) -> Vec<ChatTurn> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        if !self.settings.system_prompt.trim().is_empty() {
            messages.push(ChatTurn::new(
                TurnRole::System,
                self.settings.system_prompt.clone(),
            ));
        }
        messages.extend(turns.iter().cloned());
        messages
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAiCompatBackend {
    async fn stream_reply(
        &self,
        turns: &[ChatTurn],
        sink: &dyn DeltaSink,
    ) -> Result<String, BackendError> {
        let messages = self.request_turns(turns);
        let body = CompletionRequest {
            model: &self.settings.model,
            messages: &messages,
            stream: true,
        };
        guide_debug!(
            "Requesting completion from {} ({} turns)",
            self.settings.completions_url(),
            messages.len()
        );

        let mut request = self.client.post(self.settings.completions_url()).json(&body);
        if let Some(key) = self.settings.api_key.as_deref() {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{status}: {}", detail.trim()),
            ));
        }

        let mut decoder = SseDecoder::new();
        let mut reply = String::new();
        let mut stream = response.bytes_stream();
        'body: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            for frame in decoder.push(&chunk) {
                if !apply_frame(frame, &mut reply, sink)? {
                    break 'body;
                }
            }
        }
        if let Some(frame) = decoder.finish() {
            apply_frame(frame, &mut reply, sink)?;
        }

        Ok(reply)
    }
}

/// Handles one frame; returns `false` once the stream signalled its end.
fn apply_frame(
    frame: SseFrame,
    reply: &mut String,
    sink: &dyn DeltaSink,
) -> Result<bool, BackendError> {
    let data = match frame {
        SseFrame::Done => return Ok(false),
        SseFrame::Data(data) => data,
    };
    let chunk: CompletionChunk = serde_json::from_str(&data).map_err(|err| {
        BackendError::new(FailureKind::Protocol, format!("invalid chunk: {err}"))
    })?;
    if let Some(error) = chunk.error {
        return Err(BackendError::new(FailureKind::Protocol, error.message));
    }
    for choice in chunk.choices {
        if let Some(text) = choice.delta.and_then(|delta| delta.content) {
            if !text.is_empty() {
                guide_trace!("Delta of {} bytes", text.len());
                reply.push_str(&text);
                sink.emit(&text);
            }
        }
    }
    Ok(true)
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
