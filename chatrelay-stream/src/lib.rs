#![deny(missing_docs)]
//! Incremental decoder for streamed chat replies.
//!
//! A chat webhook answers a user message with a streamed body framed either
//! as Server-Sent-Events or as newline-delimited JSON. [`ReplyDecoder`]
//! reassembles `item` fragments into a running reply text as chunks arrive,
//! and [`decode_stream`] drives it from any async byte stream.
//!
//! ```
//! use chatrelay_stream::{ReplyDecoder, ReplyEvent};
//!
//! let mut decoder = ReplyDecoder::new();
//! let events = decoder.feed(b"{\"type\":\"item\",\"content\":\"Hi\"}\n");
//! assert_eq!(events, vec![ReplyEvent::Update("Hi".into())]);
//! ```

mod decoder;
mod streaming;
mod types;
mod utf8;

pub use decoder::ReplyDecoder;
pub use streaming::decode_stream;
pub use types::{DecodedReply, FramingMode, ReplyEvent, ReplyStream, StreamError};
