//! Semantic retrieval via query embedding and nearest-neighbor search.

use super::Retriever;
use crate::chunk::ChunkMatch;
use crate::embedding::{embed_query, EmbeddingProvider};
use crate::error::RetrievalError;
use crate::filter::FilterExpr;
use crate::index::VectorIndex;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Retriever that embeds the query text and ranks chunks by vector
/// similarity, optionally restricted by a metadata filter.
///
/// Holds its provider and index behind `Arc` so several retrievers (for
/// example the branches of a hybrid setup) can share one loaded model and one
/// corpus without copying either.
pub struct VectorRetriever {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    filter: Option<FilterExpr>,
}

impl VectorRetriever {
    /// Creates an unfiltered retriever over `index`.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            index,
            top_k,
            filter: None,
        }
    }

    /// Restricts retrieval to chunks whose metadata satisfies `filter`.
    ///
    /// The filter applies before ranking, so the result is the top `top_k`
    /// of the filtered candidate set, not a filtered view of the unfiltered
    /// top `top_k`.
    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The metadata filter applied to every retrieval, if any.
    pub fn filter(&self) -> Option<&FilterExpr> {
        self.filter.as_ref()
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    #[instrument(skip_all, fields(query_len = query.len(), top_k = self.top_k, filtered = self.filter.is_some()))]
    async fn retrieve(&self, query: &str) -> Result<Vec<ChunkMatch>, RetrievalError> {
        let embedding = embed_query(self.provider.as_ref(), query).await?;
        self.index
            .get_chunks_by_embedding(&embedding, self.top_k, self.filter.as_ref())
            .await
    }

    fn top_k(&self) -> usize {
        self.top_k
    }
}
