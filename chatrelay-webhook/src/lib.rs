#![deny(missing_docs)]
//! Chat webhook client.
//!
//! Relays a user message to a chat webhook, decodes the streamed reply with
//! [`chatrelay_stream`], and applies the fixed fallback/error messages a chat
//! page shows when a send produces nothing usable.

pub mod client;
pub(crate) mod error;
pub mod reply;
pub mod types;

pub use client::WebhookClient;
pub use error::{ConfigError, RelayError};
pub use reply::ReplyPolicy;
pub use types::{ChatRequest, new_session_id};

// Re-export the decoder types callers match on
pub use chatrelay_stream::{DecodedReply, ReplyEvent, ReplyStream};
