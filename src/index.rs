//! Vector index contract and in-memory reference implementation.
//!
//! Production vector databases are external collaborators: retrievers only
//! depend on the [`VectorIndex`] trait, a nearest-neighbor search with an
//! optional metadata filter plus a way to read back the stored documents
//! (used to seed a lexical index without a separate corpus).
//!
//! [`InMemoryVectorIndex`] is a brute-force cosine implementation of that
//! contract. It is exact rather than approximate and intended for small
//! corpora, tests, and notebook-scale experiments; an ANN-backed engine slots
//! in behind the same trait.

use crate::chunk::{ChunkMatch, ChunkRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{EmbeddingError, RetrievalError};
use crate::filter::FilterExpr;
use async_trait::async_trait;
use tracing::instrument;

/// Nearest-neighbor search over stored chunk records with optional metadata
/// filtering.
///
/// The index owns the authoritative corpus and its vectors. Read-only after
/// construction: arbitrarily many retrieval calls may run concurrently, and
/// no retriever mutates its backing index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the `top_k` chunks nearest to `embedding`, ranked by
    /// descending similarity, optionally restricted to chunks whose metadata
    /// satisfies `filters` before ranking.
    async fn get_chunks_by_embedding(
        &self,
        embedding: &[f32],
        top_k: usize,
        filters: Option<&FilterExpr>,
    ) -> Result<Vec<ChunkMatch>, RetrievalError>;

    /// Returns all stored chunk records, in insertion order.
    async fn documents(&self) -> Result<Vec<ChunkRecord>, RetrievalError>;
}

/// Cosine similarity between two equal-length vectors.
///
/// Defined as 0.0 when either vector has zero norm. An all-zero query vector
/// therefore scores every chunk equally, and the stable ranking degenerates
/// to insertion order (the behavior corpus sampling relies on).
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Exact in-memory vector index with brute-force cosine scoring.
pub struct InMemoryVectorIndex {
    records: Vec<ChunkRecord>,
    dimension: usize,
}

impl InMemoryVectorIndex {
    /// Creates an empty index for embeddings of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            records: Vec::new(),
            dimension,
        }
    }

    /// The embedding dimension this index accepts.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no chunks are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts a chunk record, upserting by id.
    ///
    /// The record must carry an embedding of the index dimension. Ids are
    /// unique within the index: inserting an existing id replaces the stored
    /// record in place, keeping its original position.
    pub fn insert(&mut self, record: ChunkRecord) -> Result<(), RetrievalError> {
        if record.embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: record.embedding.len(),
            }
            .into());
        }
        if let Some(existing) = self.records.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
        } else {
            self.records.push(record);
        }
        Ok(())
    }

    /// Embeds and inserts records through an embedding provider.
    ///
    /// Each record is classified by mime type (`text/*` vs `image/*`; anything
    /// else is [`RetrievalError::UnsupportedContentType`]), embedded in one
    /// batch, and stored with its vector.
    pub async fn index_records(
        &mut self,
        provider: &dyn EmbeddingProvider,
        records: Vec<ChunkRecord>,
    ) -> Result<(), RetrievalError> {
        if records.is_empty() {
            return Ok(());
        }
        let inputs = records
            .iter()
            .map(|r| r.embedding_input())
            .collect::<Result<Vec<_>, _>>()?;
        let vectors = provider.get_embeddings(&inputs).await?;
        if vectors.len() != records.len() {
            return Err(EmbeddingError::EmptyBatch {
                expected: records.len(),
                actual: vectors.len(),
            }
            .into());
        }
        for (mut record, vector) in records.into_iter().zip(vectors) {
            record.embedding = vector;
            self.insert(record)?;
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    #[instrument(skip_all, fields(top_k, corpus = self.records.len()))]
    async fn get_chunks_by_embedding(
        &self,
        embedding: &[f32],
        top_k: usize,
        filters: Option<&FilterExpr>,
    ) -> Result<Vec<ChunkMatch>, RetrievalError> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            }
            .into());
        }

        let mut scored: Vec<ChunkMatch> = self
            .records
            .iter()
            .filter(|record| match filters {
                Some(filter) => filter.matches(&record.metadata),
                None => true,
            })
            .map(|record| {
                let score = cosine_similarity(embedding, &record.embedding);
                ChunkMatch::new(record.clone(), score)
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn documents(&self) -> Result<Vec<ChunkRecord>, RetrievalError> {
        Ok(self.records.clone())
    }
}
