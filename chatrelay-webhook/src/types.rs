//! Webhook request payload.

use serde::{Deserialize, Serialize};

/// Action name the chat webhook expects for a user message.
pub const SEND_MESSAGE_ACTION: &str = "sendMessage";

/// One user message relayed to the chat webhook.
///
/// Serialized as:
/// ```json
/// {"action":"sendMessage","sessionId":"…","chatInput":"Hello","agent":"niko"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Always [`SEND_MESSAGE_ACTION`].
    pub action: String,
    /// Conversation identifier; the webhook keys its memory on it.
    pub session_id: String,
    /// The user's message text.
    pub chat_input: String,
    /// Agent (dashboard page) the message is addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl ChatRequest {
    /// Create a request for `session_id` carrying `text`.
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            action: SEND_MESSAGE_ACTION.into(),
            session_id: session_id.into(),
            chat_input: text.into(),
            agent: None,
        }
    }

    /// Address the request to a specific agent.
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }
}

/// Generate a fresh conversation identifier.
#[must_use]
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
