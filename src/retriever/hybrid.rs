//! Hybrid retrieval: concurrent sub-retrievals merged by rank fusion.

use super::fusion::{reciprocal_rank_fusion, RRF_K};
use super::Retriever;
use crate::chunk::ChunkMatch;
use crate::error::RetrievalError;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Retriever that runs several underlying retrievers against the same query
/// and merges their rankings with Reciprocal Rank Fusion.
///
/// The underlying retrievers come pre-configured with their own `top_k`;
/// fusion operates purely on chunk identity and rank position, so the
/// branches may mix score scales freely (BM25 next to cosine similarity is
/// the usual pairing). Sub-retrievals have no ordering dependency and are
/// issued concurrently.
pub struct HybridRetriever {
    retrievers: Vec<Arc<dyn Retriever>>,
    top_k: usize,
    rrf_k: f32,
}

impl HybridRetriever {
    /// Creates a hybrid retriever with the conventional fusion constant
    /// [`RRF_K`].
    ///
    /// # Arguments
    ///
    /// * `retrievers` - branches to fan out to, each with its own `top_k`
    /// * `top_k` - maximum size of the fused result
    pub fn new(retrievers: Vec<Arc<dyn Retriever>>, top_k: usize) -> Self {
        Self::with_rrf_k(retrievers, top_k, RRF_K)
    }

    /// Creates a hybrid retriever with an explicit fusion constant.
    pub fn with_rrf_k(retrievers: Vec<Arc<dyn Retriever>>, top_k: usize, rrf_k: f32) -> Self {
        Self {
            retrievers,
            top_k,
            rrf_k,
        }
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    #[instrument(skip_all, fields(query_len = query.len(), branches = self.retrievers.len(), top_k = self.top_k))]
    async fn retrieve(&self, query: &str) -> Result<Vec<ChunkMatch>, RetrievalError> {
        let rankings = try_join_all(
            self.retrievers
                .iter()
                .map(|retriever| retriever.retrieve(query)),
        )
        .await?;

        debug!(
            branch_sizes = ?rankings.iter().map(Vec::len).collect::<Vec<_>>(),
            "fusing branch rankings"
        );

        let mut fused = reciprocal_rank_fusion(&rankings, self.rrf_k);
        fused.truncate(self.top_k);
        Ok(fused)
    }

    fn top_k(&self) -> usize {
        self.top_k
    }
}
