//! Event and handle types emitted by the reply decoder.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

/// Framing detected for a reply stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramingMode {
    /// No content has been seen yet.
    #[default]
    Unknown,
    /// Server-Sent-Events: `data:` lines, events separated by a blank line.
    Sse,
    /// One JSON object per line.
    Jsonl,
}

/// The assembled reply at the end of a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedReply {
    /// Concatenation of every `item` fragment, in arrival order.
    pub text: String,
    /// Conversation title from the last `end` record that carried one.
    pub title: Option<String>,
}

impl DecodedReply {
    /// True when no `item` fragment was ever decoded.
    ///
    /// Callers substitute a fallback message instead of showing an empty reply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Events produced while decoding a reply stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEvent {
    /// The full running text after a new fragment arrived (not just the delta).
    Update(String),
    /// End of stream. Always the last event of a successful session.
    Complete(DecodedReply),
    /// The transport failed mid-stream. Terminal; no `Complete` follows.
    Error(StreamError),
}

/// A transport failure observed while reading the reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    /// Human-readable description.
    pub message: String,
}

impl StreamError {
    /// Create a new stream error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StreamError {}

/// Handle to a decoding reply stream.
pub struct ReplyStream {
    /// The stream of events. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = ReplyEvent> + Send>>,
}

impl std::fmt::Debug for ReplyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyStream").finish_non_exhaustive()
    }
}
