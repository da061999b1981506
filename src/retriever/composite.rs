//! Union retrieval over several embedding-provider/vector-index pairs.

use super::Retriever;
use crate::chunk::ChunkMatch;
use crate::embedding::{embed_query, EmbeddingProvider};
use crate::error::RetrievalError;
use crate::index::VectorIndex;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// One (provider, index, top_k) source of a [`CompositeRetriever`].
struct Source {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

/// Retriever querying several vector sources and concatenating their results.
///
/// Sources may use different embedding providers (and thus different vector
/// spaces), so scores across sources are not comparable and no interleaving
/// or re-ranking happens: the output is source 1's matches in source 1's
/// native order, then source 2's, and so on, with no deduplication. Use
/// [`HybridRetriever`](super::HybridRetriever) when a single merged ranking
/// is wanted.
pub struct CompositeRetriever {
    sources: Vec<Source>,
    total_top_k: usize,
}

impl std::fmt::Debug for CompositeRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRetriever")
            .field("sources", &self.sources.len())
            .field("total_top_k", &self.total_top_k)
            .finish()
    }
}

impl CompositeRetriever {
    /// Builds a composite retriever from parallel lists of providers,
    /// indices, and per-source result counts.
    ///
    /// The three lists must have equal, nonzero length; anything else is a
    /// [`RetrievalError::Configuration`]. Source `i` retrieves with
    /// `providers[i]` against `indices[i]` and contributes up to `top_ks[i]`
    /// matches.
    pub fn try_new(
        providers: Vec<Arc<dyn EmbeddingProvider>>,
        indices: Vec<Arc<dyn VectorIndex>>,
        top_ks: Vec<usize>,
    ) -> Result<Self, RetrievalError> {
        if providers.len() != indices.len() || providers.len() != top_ks.len() {
            return Err(RetrievalError::Configuration(format!(
                "composite sources must align: {} providers, {} indices, {} top_k values",
                providers.len(),
                indices.len(),
                top_ks.len()
            )));
        }
        if providers.is_empty() {
            return Err(RetrievalError::Configuration(
                "composite retriever needs at least one source".to_string(),
            ));
        }
        let total_top_k = top_ks.iter().sum();
        let sources = providers
            .into_iter()
            .zip(indices)
            .zip(top_ks)
            .map(|((provider, index), top_k)| Source {
                provider,
                index,
                top_k,
            })
            .collect();
        Ok(Self {
            sources,
            total_top_k,
        })
    }

    /// Number of configured sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

#[async_trait]
impl Retriever for CompositeRetriever {
    #[instrument(skip_all, fields(query_len = query.len(), sources = self.sources.len()))]
    async fn retrieve(&self, query: &str) -> Result<Vec<ChunkMatch>, RetrievalError> {
        // Sources run sequentially: each may hold a different provider, and
        // output order must be source order regardless of completion order.
        let mut combined = Vec::with_capacity(self.total_top_k);
        for source in &self.sources {
            let embedding = embed_query(source.provider.as_ref(), query).await?;
            let matches = source
                .index
                .get_chunks_by_embedding(&embedding, source.top_k, None)
                .await?;
            combined.extend(matches);
        }
        combined.truncate(self.total_top_k);
        Ok(combined)
    }

    fn top_k(&self) -> usize {
        self.total_top_k
    }
}
