//! Chunk data contracts shared by every retriever.
//!
//! A [`ChunkRecord`] is the unit of indexed content: text or an encoded image
//! payload plus identity and metadata. A [`ChunkMatch`] is a record paired
//! with a retriever-assigned score; matches are value objects created fresh
//! per retrieval call and never persisted.

use crate::embedding::EmbeddingInput;
use crate::error::RetrievalError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata attached to a chunk: string keys to scalar JSON values
/// (e.g. `source_file`, `doc_title`).
pub type Metadata = HashMap<String, serde_json::Value>;

/// A retrievable unit of document content.
///
/// Immutable after creation. The `id` is unique within a corpus snapshot; the
/// `mime_type` prefix determines which embedding path applies and which
/// retriever types can act on the chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique, stable identifier within a corpus snapshot.
    pub id: String,
    /// Text payload; for images, an encoded binary payload string.
    pub content: String,
    /// Content classification (`text/*` or `image/*`).
    pub mime_type: String,
    /// Human label, may be empty.
    pub title: String,
    /// String keys to scalar values (e.g. `source_file`, `doc_title`).
    pub metadata: Metadata,
    /// Embedding vector; empty when not applicable (e.g. lexical-only).
    pub embedding: Vec<f32>,
}

impl ChunkRecord {
    /// Creates a text chunk with no title, metadata, or embedding.
    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            mime_type: "text/plain".to_string(),
            title: String::new(),
            metadata: Metadata::new(),
            embedding: Vec::new(),
        }
    }

    /// Classifies this chunk's content for embedding.
    ///
    /// `text/*` chunks embed as text, `image/*` chunks embed as an encoded
    /// image payload. Any other mime type is a hard error: callers must not
    /// feed unclassifiable content to an embedding provider.
    pub fn embedding_input(&self) -> Result<EmbeddingInput, RetrievalError> {
        if self.mime_type.starts_with("text/") {
            Ok(EmbeddingInput::Text(self.content.clone()))
        } else if self.mime_type.starts_with("image/") {
            Ok(EmbeddingInput::Image(self.content.clone()))
        } else {
            Err(RetrievalError::UnsupportedContentType(
                self.mime_type.clone(),
            ))
        }
    }
}

/// A chunk record paired with a retriever-assigned relevance score.
///
/// Scores are on the owning retriever's scale (raw BM25, cosine similarity,
/// RRF sum, ...) and are NOT comparable across retriever types without
/// fusion. Rank is implicit: list order, descending score.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMatch {
    /// The matched chunk.
    pub record: ChunkRecord,
    /// Retriever-defined relevance score, higher is better.
    pub score: f32,
}

impl ChunkMatch {
    /// Creates a match from a record and score.
    pub fn new(record: ChunkRecord, score: f32) -> Self {
        Self { record, score }
    }

    /// The matched chunk's identifier.
    pub fn id(&self) -> &str {
        &self.record.id
    }
}
