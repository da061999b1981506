//! Side-by-side comparison of retrieval strategies.
//!
//! Runs several retrieval approaches against the same query and packages the
//! results for inspection:
//!
//! 1. `baseline` - single-query semantic retrieval, the reference point
//! 2. `bm25` - pure keyword retrieval, no embedding
//! 3. `hybrid` - semantic + BM25 fused with Reciprocal Rank Fusion
//! 4. `metadata_filter` - semantic retrieval scoped to a document subset
//!
//! BM25 catches exact keyword matches (product IDs, certification numbers,
//! acronyms) that semantic search misses; hybrid combines both signals at no
//! extra LLM cost; metadata filtering scopes retrieval when the caller
//! already knows which documents matter.

use crate::chunk::{ChunkMatch, ChunkRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::RetrievalError;
use crate::filter::FilterExpr;
use crate::index::VectorIndex;
use crate::retriever::{Bm25Retriever, HybridRetriever, Retriever, VectorRetriever};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// One strategy's retrieval output, labeled for side-by-side inspection.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    /// Strategy label (`baseline`, `bm25`, `hybrid`, `metadata_filter`).
    pub strategy: String,
    /// The query string the strategy actually searched with.
    pub query_used: String,
    /// Ranked matches, best first.
    pub chunks: Vec<ChunkMatch>,
    /// The metadata filter applied, when the strategy used one.
    pub filters: Option<FilterExpr>,
}

impl RetrievalResult {
    pub fn new(strategy: impl Into<String>, query_used: impl Into<String>, chunks: Vec<ChunkMatch>) -> Self {
        Self {
            strategy: strategy.into(),
            query_used: query_used.into(),
            chunks,
            filters: None,
        }
    }

    /// Formats the top `n` matches as `source_file | title` lines.
    ///
    /// Chunks without a `source_file` metadata entry show `?`.
    pub fn top_sources(&self, n: usize) -> Vec<String> {
        self.chunks
            .iter()
            .take(n)
            .map(|matched| {
                let source = matched
                    .record
                    .metadata
                    .get("source_file")
                    .and_then(|value| value.as_str())
                    .unwrap_or("?");
                format!("{source:<50} | {:?}", matched.record.title)
            })
            .collect()
    }
}

impl fmt::Display for RetrievalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.strategy)?;
        for source in self.top_sources(5) {
            write!(f, "\n  {source}")?;
        }
        Ok(())
    }
}

/// Runs the retrieval strategies against one shared provider, vector index,
/// and lexical corpus snapshot.
pub struct StrategyComparator {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    corpus: Vec<ChunkRecord>,
    top_k: usize,
}

impl StrategyComparator {
    /// # Arguments
    ///
    /// * `provider` - embedding provider shared by the semantic strategies
    /// * `index` - vector index shared by the semantic strategies
    /// * `corpus` - corpus snapshot for the BM25 strategies; typically the
    ///   index's own documents, or a [`sample_corpus`] slice of them
    /// * `top_k` - result count for every strategy
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        corpus: Vec<ChunkRecord>,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            index,
            corpus,
            top_k,
        }
    }

    /// Single-query semantic retrieval.
    pub async fn baseline(&self, query: &str) -> Result<RetrievalResult, RetrievalError> {
        let retriever =
            VectorRetriever::new(self.provider.clone(), self.index.clone(), self.top_k);
        let chunks = retriever.retrieve(query).await?;
        Ok(RetrievalResult::new("baseline", query, chunks))
    }

    /// Pure BM25 keyword retrieval over the corpus snapshot.
    pub async fn bm25(&self, query: &str) -> Result<RetrievalResult, RetrievalError> {
        let retriever = Bm25Retriever::new(&self.corpus, self.top_k);
        let chunks = retriever.retrieve(query).await?;
        Ok(RetrievalResult::new("bm25", query, chunks))
    }

    /// Semantic + BM25 fused with Reciprocal Rank Fusion.
    pub async fn hybrid(&self, query: &str) -> Result<RetrievalResult, RetrievalError> {
        let semantic: Arc<dyn Retriever> = Arc::new(VectorRetriever::new(
            self.provider.clone(),
            self.index.clone(),
            self.top_k,
        ));
        let lexical: Arc<dyn Retriever> = Arc::new(Bm25Retriever::new(&self.corpus, self.top_k));
        let hybrid = HybridRetriever::new(vec![semantic, lexical], self.top_k);
        let chunks = hybrid.retrieve(query).await?;
        Ok(RetrievalResult::new("hybrid", query, chunks))
    }

    /// Semantic retrieval restricted to chunks matching `filter`.
    ///
    /// Useful when the caller already knows which document(s) are relevant,
    /// e.g. scoping "what are the transport emissions?" to one source file
    /// to avoid noise from other products.
    pub async fn metadata_filter(
        &self,
        query: &str,
        filter: FilterExpr,
    ) -> Result<RetrievalResult, RetrievalError> {
        let retriever =
            VectorRetriever::new(self.provider.clone(), self.index.clone(), self.top_k)
                .with_filter(filter.clone());
        let chunks = retriever.retrieve(query).await?;
        let mut result = RetrievalResult::new("metadata_filter", query, chunks);
        result.filters = Some(filter);
        Ok(result)
    }

    /// Runs every strategy against `query` and returns results keyed by
    /// strategy name.
    ///
    /// The `metadata_filter` strategy only runs when `filter` is given. The
    /// map iterates in stable name order, so comparison output is
    /// deterministic.
    #[instrument(skip_all, fields(query_len = query.len(), top_k = self.top_k))]
    pub async fn compare(
        &self,
        query: &str,
        filter: Option<FilterExpr>,
    ) -> Result<BTreeMap<String, RetrievalResult>, RetrievalError> {
        info!(query, "comparing retrieval strategies");

        let mut results = BTreeMap::new();
        results.insert("baseline".to_string(), self.baseline(query).await?);
        results.insert("bm25".to_string(), self.bm25(query).await?);
        results.insert("hybrid".to_string(), self.hybrid(query).await?);
        if let Some(filter) = filter {
            results.insert(
                "metadata_filter".to_string(),
                self.metadata_filter(query, filter).await?,
            );
        }
        Ok(results)
    }
}

/// Fetches `n` representative chunks from a vector index for lexical
/// indexing when no explicit corpus exists.
///
/// Queries with an all-zero vector of the provider's dimension: every chunk
/// scores equally, so the index returns its first `n` chunks in insertion
/// order.
pub async fn sample_corpus(
    index: &dyn VectorIndex,
    provider: &dyn EmbeddingProvider,
    n: usize,
) -> Result<Vec<ChunkRecord>, RetrievalError> {
    let zero_vector = vec![0.0; provider.dimension()];
    let matches = index.get_chunks_by_embedding(&zero_vector, n, None).await?;
    Ok(matches.into_iter().map(|matched| matched.record).collect())
}
