#![deny(missing_docs)]
//! Document ingestion for chat retrieval.
//!
//! Splits uploaded text into overlapping chunks, embeds them through an
//! OpenAI-compatible embeddings API and upserts the vectors into a vector
//! index, so the chat agents can search the documents later.

pub mod chunk;
pub mod embeddings;
pub(crate) mod error;
pub mod index;
pub mod pipeline;

pub use chunk::{ChunkConfig, ChunkRecord, Document, chunk_documents, chunk_text};
pub use embeddings::EmbeddingsClient;
pub use error::{ConfigError, IngestError};
pub use index::{Vector, VectorIndex};
pub use pipeline::{IngestPipeline, IngestReport};
