//! Splitting documents into overlapping chunks for embedding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Default chunk length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Chunk window settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    size: usize,
    overlap: usize,
}

impl ChunkConfig {
    /// Validate and create chunk settings. `overlap` must be smaller than `size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::Invalid("chunk size must be positive".into()));
        }
        if overlap >= size {
            return Err(ConfigError::Invalid(format!(
                "chunk overlap {overlap} must be smaller than chunk size {size}"
            )));
        }
        Ok(Self { size, overlap })
    }

    /// Chunk length in characters.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Characters shared by consecutive chunks.
    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn step(&self) -> usize {
        self.size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Split `text` into windows of `config.size()` characters that advance by
/// `size - overlap`. Windows never split a character; whitespace-only windows
/// are dropped.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_count = bounds.len();
    bounds.push(text.len());

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < char_count {
        let end = (start + config.size).min(char_count);
        let piece = &text[bounds[start]..bounds[end]];
        if !piece.trim().is_empty() {
            chunks.push(piece.to_string());
        }
        if end == char_count {
            break;
        }
        start += config.step();
    }
    chunks
}

/// A document submitted for ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier; chunk ids derive from it.
    pub id: String,
    /// Full document text.
    pub text: String,
    /// Extra fields copied onto every chunk (file name, uploader, ...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Create a document without metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Map::new(),
        }
    }

    /// Attach one metadata field.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One chunk of a document, ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    /// `<document id>#<index>`.
    pub id: String,
    /// Source document id.
    pub document_id: String,
    /// Position of the chunk within its document.
    pub index: usize,
    /// Chunk text.
    pub text: String,
    /// Metadata inherited from the document.
    pub metadata: Map<String, Value>,
}

/// Chunk every document, keeping document order and chunk order.
pub fn chunk_documents(documents: &[Document], config: &ChunkConfig) -> Vec<ChunkRecord> {
    documents
        .iter()
        .flat_map(|doc| {
            chunk_text(&doc.text, config)
                .into_iter()
                .enumerate()
                .map(move |(index, text)| ChunkRecord {
                    id: format!("{}#{index}", doc.id),
                    document_id: doc.id.clone(),
                    index,
                    text,
                    metadata: doc.metadata.clone(),
                })
        })
        .collect()
}
