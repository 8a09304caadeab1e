//! Line decoder for `text/event-stream` bodies.
//!
//! Bytes are buffered until a full line is available so multi-byte UTF-8
//! characters split across network chunks decode correctly.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Payload of one `data:` line.
    Data(String),
    /// The `[DONE]` sentinel that ends an OpenAI-style stream.
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `chunk` and returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            if let Some(frame) = parse_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Decodes whatever is left once the body ends without a final newline.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

fn parse_line(raw: &[u8]) -> Option<SseFrame> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\n', '\r']);
    // Comments, `event:` and `id:` lines carry nothing we use.
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    match data.trim() {
        "" => None,
        "[DONE]" => Some(SseFrame::Done),
        _ => Some(SseFrame::Data(data.to_string())),
    }
}
