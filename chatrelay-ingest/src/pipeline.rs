//! Chunk -> embed -> upsert.

use serde_json::Value;

use crate::chunk::{ChunkConfig, ChunkRecord, Document, chunk_documents};
use crate::embeddings::EmbeddingsClient;
use crate::error::IngestError;
use crate::index::{Vector, VectorIndex};

/// Default number of chunks per embeddings request and per upsert.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Counts from one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents submitted.
    pub documents: usize,
    /// Chunks produced from them.
    pub chunks: usize,
    /// Vectors the index reported as written.
    pub upserted: usize,
}

/// Batch ingestion of documents into a vector index.
///
/// The first failing request aborts the run; nothing is retried.
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    chunking: ChunkConfig,
    embeddings: EmbeddingsClient,
    index: VectorIndex,
    batch_size: usize,
}

impl IngestPipeline {
    /// Create a pipeline with default chunking and batch size.
    #[must_use]
    pub fn new(embeddings: EmbeddingsClient, index: VectorIndex) -> Self {
        Self {
            chunking: ChunkConfig::default(),
            embeddings,
            index,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override chunk settings.
    #[must_use]
    pub fn chunking(mut self, config: ChunkConfig) -> Self {
        self.chunking = config;
        self
    }

    /// Override the batch size (at least 1).
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Chunk and embed `documents`, returning vectors ready to upsert.
    pub async fn embed_documents(&self, documents: &[Document]) -> Result<Vec<Vector>, IngestError> {
        let chunks = chunk_documents(documents, &self.chunking);
        let mut vectors = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.batch_size) {
            let inputs = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embeddings.embed(inputs).await?;
            vectors.extend(batch.iter().zip(embeddings).map(|(chunk, values)| to_vector(chunk, values)));
        }

        tracing::debug!(
            documents = documents.len(),
            chunks = vectors.len(),
            "embedded documents"
        );
        Ok(vectors)
    }

    /// Upsert `vectors` in batches, returning the total written count.
    pub async fn upsert_vectors(&self, vectors: Vec<Vector>) -> Result<usize, IngestError> {
        let mut upserted = 0;
        let mut remaining = vectors.into_iter().peekable();

        while remaining.peek().is_some() {
            let batch: Vec<Vector> = remaining.by_ref().take(self.batch_size).collect();
            upserted += self.index.upsert(batch).await?;
        }

        Ok(upserted)
    }

    /// Chunk, embed and upsert `documents`.
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestReport, IngestError> {
        let vectors = self.embed_documents(documents).await?;
        let chunks = vectors.len();
        let upserted = self.upsert_vectors(vectors).await?;

        let report = IngestReport {
            documents: documents.len(),
            chunks,
            upserted,
        };
        tracing::debug!(?report, "ingest finished");
        Ok(report)
    }
}

/// Build the index record for one embedded chunk.
fn to_vector(chunk: &ChunkRecord, values: Vec<f32>) -> Vector {
    let mut metadata = chunk.metadata.clone();
    metadata.insert("document_id".into(), Value::from(chunk.document_id.clone()));
    metadata.insert("chunk_index".into(), Value::from(chunk.index));
    metadata.insert("text".into(), Value::from(chunk.text.clone()));

    Vector {
        id: chunk.id.clone(),
        values,
        metadata,
    }
}
