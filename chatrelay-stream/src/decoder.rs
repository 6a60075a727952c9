//! Incremental decoder for chat reply streams.
//!
//! The webhook answers with either Server-Sent-Events or newline-delimited
//! JSON. Both carry the same records:
//! ```text
//! {"type":"item","content":"Hel"}
//! {"type":"item","content":"lo"}
//! {"type":"end","title":"Greetings"}
//! ```
//! In SSE framing each record sits on one or more `data:` lines and events
//! are separated by a blank line:
//! ```text
//! data: {"type":"item","content":"Hel"}
//!
//! data: {"type":"item","content":"lo"}
//!
//! ```
//! The framing is sniffed once from the first bytes of the body and kept for
//! the rest of the session.

use crate::types::{DecodedReply, FramingMode, ReplyEvent};
use crate::utf8::Utf8Carry;

/// Prefix marking a payload line in SSE framing.
const SSE_DATA_PREFIX: &str = "data:";

/// Separator between SSE event blocks.
const SSE_EVENT_SEPARATOR: &str = "\n\n";

/// Decoding state for one reply stream.
///
/// Feed it body chunks in arrival order with [`feed`](Self::feed), then call
/// [`finish`](Self::finish) once the body ends. Chunk boundaries may fall
/// anywhere, including inside a multi-byte character.
#[derive(Debug, Default)]
pub struct ReplyDecoder {
    utf8: Utf8Carry,
    /// Decoded text not yet consumed as a complete unit.
    buffer: String,
    mode: FramingMode,
    /// Running concatenation of `item` fragments. Append-only.
    text: String,
    title: Option<String>,
    /// Units dropped because they were not valid JSON.
    discarded: usize,
}

impl ReplyDecoder {
    /// Create a decoder for a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Framing detected so far.
    #[must_use]
    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Text accumulated so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Title recorded so far, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Number of units discarded because they failed to parse as JSON.
    #[must_use]
    pub fn discarded_units(&self) -> usize {
        self.discarded
    }

    /// Consume one body chunk and return the updates it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ReplyEvent> {
        self.utf8.decode_into(chunk, &mut self.buffer);
        self.detect_mode();

        let mut events = Vec::new();
        self.drain_units(&mut events);
        events
    }

    /// Flush the residual buffer at end of stream.
    ///
    /// Returns any updates produced by a trailing unit that arrived without a
    /// separator, followed by exactly one [`ReplyEvent::Complete`].
    #[must_use]
    pub fn finish(mut self) -> Vec<ReplyEvent> {
        let mut events = Vec::new();

        let truncated = self.utf8.has_pending();
        self.utf8.finish_into(&mut self.buffer);
        self.detect_mode();
        if self.mode == FramingMode::Unknown && !self.buffer.is_empty() {
            // Body ended while the sniff was still waiting on a partial `data:`.
            self.mode = FramingMode::Jsonl;
        }
        self.drain_units(&mut events);

        let rest = std::mem::take(&mut self.buffer);
        let rest = rest.trim();
        if !rest.is_empty() {
            match self.mode {
                FramingMode::Sse => self.handle_sse_block(rest, &mut events),
                FramingMode::Jsonl => self.handle_unit(rest, &mut events),
                FramingMode::Unknown => {}
            }
        }

        tracing::debug!(
            mode = ?self.mode,
            chars = self.text.chars().count(),
            discarded = self.discarded,
            truncated,
            "reply stream finished"
        );

        events.push(ReplyEvent::Complete(DecodedReply {
            text: self.text,
            title: self.title,
        }));
        events
    }

    /// Decide the framing from the first non-empty buffer content.
    fn detect_mode(&mut self) {
        if self.mode != FramingMode::Unknown || self.buffer.is_empty() {
            return;
        }

        let head = self.buffer.trim_start();
        self.mode = if head.starts_with(SSE_DATA_PREFIX) {
            FramingMode::Sse
        } else if !head.is_empty() && SSE_DATA_PREFIX.starts_with(head) {
            // Not enough bytes yet to tell `data:` apart from anything else.
            return;
        } else {
            FramingMode::Jsonl
        };

        tracing::debug!(mode = ?self.mode, "detected reply framing");
    }

    fn drain_units(&mut self, events: &mut Vec<ReplyEvent>) {
        match self.mode {
            FramingMode::Sse => self.drain_sse(events),
            FramingMode::Jsonl => self.drain_jsonl(events),
            FramingMode::Unknown => {}
        }
    }

    /// Extract every complete SSE event block from the buffer.
    fn drain_sse(&mut self, events: &mut Vec<ReplyEvent>) {
        while let Some(pos) = self.buffer.find(SSE_EVENT_SEPARATOR) {
            let block = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + SSE_EVENT_SEPARATOR.len());
            self.handle_sse_block(&block, events);
        }
    }

    /// Extract every complete line from the buffer; the unterminated tail stays.
    fn drain_jsonl(&mut self, events: &mut Vec<ReplyEvent>) {
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);

            if !line.is_empty() {
                self.handle_unit(&line, events);
            }
        }
    }

    /// Join the `data:` lines of one event block and handle the payload.
    fn handle_sse_block(&mut self, block: &str, events: &mut Vec<ReplyEvent>) {
        let data: Vec<&str> = block
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter_map(|line| line.strip_prefix(SSE_DATA_PREFIX))
            .map(|data| data.strip_prefix(' ').unwrap_or(data))
            .collect();

        // Comment-only or `event:`-only blocks carry nothing.
        if data.is_empty() {
            return;
        }

        let payload = data.join("\n");
        let payload = payload.trim();
        if !payload.is_empty() {
            self.handle_unit(payload, events);
        }
    }

    /// Apply one record to the session state.
    fn handle_unit(&mut self, unit: &str, events: &mut Vec<ReplyEvent>) {
        let record: serde_json::Value = match serde_json::from_str(unit) {
            Ok(v) => v,
            Err(e) => {
                self.discarded += 1;
                tracing::debug!(error = %e, len = unit.len(), "discarding malformed reply unit");
                return;
            }
        };

        match record["type"].as_str() {
            Some("item") => {
                if let Some(content) = record["content"].as_str() {
                    self.text.push_str(content);
                    events.push(ReplyEvent::Update(self.text.clone()));
                }
            }
            Some("end") => {
                if let Some(title) = truthy_title(&record["title"]) {
                    self.title = Some(title);
                }
            }
            _ => {}
        }
    }
}

/// Title of an `end` record, if it is set to anything truthy.
fn truthy_title(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
