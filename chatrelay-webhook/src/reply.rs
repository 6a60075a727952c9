//! What the chat page shows once a send finishes.

use chatrelay_stream::DecodedReply;

use crate::error::RelayError;

/// Shown when the stream ended without any reply text.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "Sorry, I couldn't generate a response. Please try again.";

/// Shown when the send failed.
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Sorry, something went wrong while contacting the assistant. Please try again.";

/// Fixed messages substituted for empty or failed replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPolicy {
    /// Substituted when the reply text is empty.
    pub fallback_message: String,
    /// Substituted when the send failed.
    pub error_message: String,
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self {
            fallback_message: DEFAULT_FALLBACK_MESSAGE.into(),
            error_message: DEFAULT_ERROR_MESSAGE.into(),
        }
    }
}

impl ReplyPolicy {
    /// Override the empty-reply message.
    #[must_use]
    pub fn fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    /// Override the failure message.
    #[must_use]
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Text to display for the outcome of a send.
    pub fn render(&self, outcome: &Result<DecodedReply, RelayError>) -> String {
        match outcome {
            Ok(reply) if reply.is_empty() => self.fallback_message.clone(),
            Ok(reply) => reply.text.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "chat send failed");
                self.error_message.clone()
            }
        }
    }
}
