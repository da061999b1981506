//! Retriever abstractions: semantic, lexical, composite, and hybrid search.
//!
//! A retriever is the polymorphic capability `retrieve(query) -> ranked
//! matches`. Variants:
//!
//! - [`VectorRetriever`] - embeds the query and asks a vector index for
//!   nearest neighbors (optionally metadata-filtered)
//! - [`Bm25Retriever`] - lexical BM25 Okapi scoring over an in-memory corpus
//!   snapshot
//! - [`CompositeRetriever`] - union over several (provider, index) sources,
//!   no fusion
//! - [`HybridRetriever`] - fuses heterogeneous retrievers with Reciprocal
//!   Rank Fusion
//!
//! All retrieval calls are idempotent, side-effect-free reads: retrievers
//! never mutate their backing indices, so any number of calls may run
//! concurrently.

mod composite;
pub mod fusion;
mod hybrid;
mod lexical;
mod vector;

pub use composite::CompositeRetriever;
pub use fusion::{reciprocal_rank_fusion, RRF_K};
pub use hybrid::HybridRetriever;
pub use lexical::{Bm25Index, Bm25Retriever};
pub use vector::VectorRetriever;

use crate::chunk::ChunkMatch;
use crate::error::RetrievalError;
use async_trait::async_trait;

/// Polymorphic retrieval capability.
///
/// Implementations return at most `top_k()` matches ranked by descending
/// score. Score scales differ between implementations and are not mutually
/// comparable; use [`HybridRetriever`] to combine them.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieves the ranked matches for `query`.
    async fn retrieve(&self, query: &str) -> Result<Vec<ChunkMatch>, RetrievalError>;

    /// Maximum number of matches a single `retrieve` call returns.
    fn top_k(&self) -> usize;
}
