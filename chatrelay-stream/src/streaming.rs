//! Async adapter: drive a [`ReplyDecoder`] from an HTTP body byte stream.

use futures::{Stream, StreamExt};

use crate::decoder::ReplyDecoder;
use crate::types::{ReplyEvent, ReplyStream, StreamError};

impl ReplyStream {
    /// Wrap a response body byte stream into a [`ReplyStream`].
    pub fn from_bytes_stream<S, B, E>(byte_stream: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        Self {
            receiver: Box::pin(decode_stream(byte_stream)),
        }
    }
}

/// Decode a raw byte stream into a stream of [`ReplyEvent`]s.
///
/// Each chunk is processed to completion before the next one is awaited. The
/// stream ends with [`ReplyEvent::Complete`] when the body ends, or with
/// [`ReplyEvent::Error`] if the transport fails, in which case any partially
/// received unit is dropped.
pub fn decode_stream<S, B, E>(byte_stream: S) -> impl Stream<Item = ReplyEvent> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let mut decoder = ReplyDecoder::new();
        let mut bytes_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(error = %e, "reply stream read failed");
                    yield ReplyEvent::Error(StreamError::new(format!("stream read error: {e}")));
                    return;
                }
            };

            for event in decoder.feed(chunk.as_ref()) {
                yield event;
            }
        }

        for event in decoder.finish() {
            yield event;
        }
    }
}
