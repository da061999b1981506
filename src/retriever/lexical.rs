//! BM25 lexical retrieval over a fixed corpus snapshot.
//!
//! [`Bm25Index`] builds an inverted statistical index (term frequencies,
//! document frequencies, length normalization) over a corpus captured once at
//! construction time. The build is synchronous and CPU-bound, proportional to
//! corpus size; retrieval is a pure in-memory operation with no I/O cost per
//! query. The index does not observe later corpus changes - rebuilding means
//! constructing a new index.
//!
//! # Algorithm
//!
//! BM25 Okapi scores a document for a query as the sum over query terms of:
//!
//! ```text
//! IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl / avgdl))
//! ```
//!
//! with `IDF(t) = ln((N - df + 0.5) / (df + 0.5) + 1)` (Robertson's
//! non-negative variant), `tf` the term frequency in the document, `dl` the
//! document length, `avgdl` the average document length, `N` the corpus size,
//! and `df` the number of documents containing the term. `k1` controls term
//! frequency saturation and `b` the length normalization strength.
//!
//! BM25 scores are unbounded and NOT comparable to vector similarity scores;
//! combine the two with Reciprocal Rank Fusion, not score arithmetic.

use super::Retriever;
use crate::chunk::{ChunkMatch, ChunkRecord};
use crate::error::RetrievalError;
use crate::index::VectorIndex;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Term frequency saturation parameter (standard Okapi value).
const K1: f32 = 1.2;
/// Document length normalization parameter (standard Okapi value).
const B: f32 = 0.75;

/// Lowercase word-boundary tokenization.
///
/// Tokens are maximal runs of word characters (alphanumerics and underscore);
/// everything else is a delimiter. `"Hello, WORLD! foo_bar"` tokenizes to
/// `["hello", "world", "foo_bar"]`.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-document entry in the lexical corpus snapshot.
struct CorpusEntry {
    id: String,
    content: String,
    /// term -> frequency within this document
    term_freq: HashMap<String, f32>,
    /// token count
    length: f32,
}

/// In-memory BM25 Okapi index over a corpus snapshot.
///
/// Construction tokenizes every document and accumulates the statistics the
/// scoring formula needs. Read-only afterwards; safe to share across
/// concurrent retrieval calls.
pub struct Bm25Index {
    entries: Vec<CorpusEntry>,
    /// term -> number of documents containing it
    doc_freq: HashMap<String, usize>,
    avg_doc_length: f32,
}

impl Bm25Index {
    /// Builds an index from `(id, content)` pairs.
    ///
    /// An empty corpus yields an index whose searches return no matches.
    pub fn new<I>(corpus: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries: Vec<CorpusEntry> = corpus
            .into_iter()
            .map(|(id, content)| {
                let tokens = tokenize(&content);
                let length = tokens.len() as f32;
                let mut term_freq: HashMap<String, f32> = HashMap::new();
                for token in tokens {
                    *term_freq.entry(token).or_insert(0.0) += 1.0;
                }
                CorpusEntry {
                    id,
                    content,
                    term_freq,
                    length,
                }
            })
            .collect();

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for entry in &entries {
            for term in entry.term_freq.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let avg_doc_length = if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|e| e.length).sum::<f32>() / entries.len() as f32
        };

        Self {
            entries,
            doc_freq,
            avg_doc_length,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the corpus snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scores every corpus document against `query` and returns the `top_k`
    /// highest scoring as `(id, content, score)` triples.
    ///
    /// Ties break by original corpus order (stable sort on descending score).
    /// Documents sharing no term with the query score 0.0 and can still fill
    /// out the result when the corpus is smaller than `top_k`. An empty query
    /// token list returns no matches.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<(&str, &str, f32)> {
        let query_terms = tokenize(query);
        if self.entries.is_empty() || query_terms.is_empty() {
            return Vec::new();
        }

        let n = self.entries.len() as f32;
        let avgdl = if self.avg_doc_length > 0.0 {
            self.avg_doc_length
        } else {
            1.0
        };

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut score = 0.0;
                for term in &query_terms {
                    let Some(&tf) = entry.term_freq.get(term) else {
                        continue;
                    };
                    let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
                    let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                    let numerator = tf * (K1 + 1.0);
                    let denominator = tf + K1 * (1.0 - B + B * entry.length / avgdl);
                    score += idf * numerator / denominator;
                }
                (index, score)
            })
            .collect();

        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(index, score)| {
                let entry = &self.entries[index];
                (entry.id.as_str(), entry.content.as_str(), score)
            })
            .collect()
    }
}

/// Lexical retriever backed by a [`Bm25Index`] over a corpus snapshot.
///
/// Returned matches carry the raw BM25 score plus the corpus id and content;
/// embedding, title, and metadata are empty because the lexical index does
/// not retain those fields.
pub struct Bm25Retriever {
    index: Bm25Index,
    top_k: usize,
}

impl Bm25Retriever {
    /// Builds a retriever from an explicit list of chunk records.
    ///
    /// Only ids and content are retained; the records' embeddings, titles,
    /// and metadata play no part in lexical scoring.
    pub fn new(corpus: &[ChunkRecord], top_k: usize) -> Self {
        let index = Bm25Index::new(
            corpus
                .iter()
                .map(|record| (record.id.clone(), record.content.clone())),
        );
        debug!(documents = index.len(), top_k, "built BM25 index");
        Self { index, top_k }
    }

    /// Builds a retriever over the full document set of a vector index.
    ///
    /// Pulls the stored corpus wholesale so lexical and semantic retrieval
    /// share chunk identities, which is what lets RRF fusion merge their
    /// rankings.
    pub async fn from_vector_index(
        vector_index: &dyn VectorIndex,
        top_k: usize,
    ) -> Result<Self, RetrievalError> {
        let corpus = vector_index.documents().await?;
        Ok(Self::new(&corpus, top_k))
    }

    /// Number of documents in the corpus snapshot.
    pub fn corpus_len(&self) -> usize {
        self.index.len()
    }
}

#[async_trait]
impl Retriever for Bm25Retriever {
    #[instrument(skip_all, fields(query_len = query.len(), top_k = self.top_k))]
    async fn retrieve(&self, query: &str) -> Result<Vec<ChunkMatch>, RetrievalError> {
        let matches = self
            .index
            .search(query, self.top_k)
            .into_iter()
            .map(|(id, content, score)| ChunkMatch::new(ChunkRecord::text(id, content), score))
            .collect();
        Ok(matches)
    }

    fn top_k(&self) -> usize {
        self.top_k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<ChunkRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| ChunkRecord::text(i.to_string(), *text))
            .collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("Hello, WORLD! foo_bar"),
            vec!["hello", "world", "foo_bar"]
        );
    }

    #[test]
    fn test_tokenize_keeps_single_character_tokens() {
        assert_eq!(tokenize("a b2 c"), vec!["a", "b2", "c"]);
    }

    #[test]
    fn test_tokenize_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!?., --").is_empty());
    }

    #[tokio::test]
    async fn test_banana_recipe_ranks_first() {
        let retriever = Bm25Retriever::new(
            &corpus(&[
                "apple pie recipe",
                "banana bread recipe",
                "database index structures",
            ]),
            1,
        );
        let results = retriever.retrieve("banana recipe").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.content, "banana bread recipe");
    }

    #[tokio::test]
    async fn test_retrieval_is_deterministic() {
        let retriever = Bm25Retriever::new(
            &corpus(&[
                "rust systems programming",
                "rust memory safety",
                "python scripting",
            ]),
            3,
        );
        let first = retriever.retrieve("rust programming").await.unwrap();
        let second = retriever.retrieve("rust programming").await.unwrap();
        let ids = |results: &[ChunkMatch]| -> Vec<String> {
            results.iter().map(|m| m.id().to_string()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
        let scores = |results: &[ChunkMatch]| -> Vec<f32> {
            results.iter().map(|m| m.score).collect()
        };
        assert_eq!(scores(&first), scores(&second));
    }

    #[tokio::test]
    async fn test_top_k_bound() {
        let texts: Vec<String> = (0..10).map(|i| format!("common term document {i}")).collect();
        let records: Vec<ChunkRecord> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ChunkRecord::text(i.to_string(), t.clone()))
            .collect();
        let retriever = Bm25Retriever::new(&records, 4);
        let results = retriever.retrieve("common").await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_corpus_returns_empty() {
        let retriever = Bm25Retriever::new(&[], 5);
        let results = retriever.retrieve("anything").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_returns_empty() {
        let retriever = Bm25Retriever::new(&corpus(&["some document"]), 5);
        assert!(retriever.retrieve("").await.unwrap().is_empty());
        assert!(retriever.retrieve("?!.").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ties_break_by_corpus_order() {
        // Two identical documents score identically; the earlier one wins.
        let retriever = Bm25Retriever::new(
            &corpus(&["same words here", "same words here", "other text"]),
            2,
        );
        let results = retriever.retrieve("same words").await.unwrap();
        assert_eq!(results[0].id(), "0");
        assert_eq!(results[1].id(), "1");
    }

    #[tokio::test]
    async fn test_zero_score_documents_fill_small_corpus() {
        // top_k exceeds corpus size: non-matching documents pad the result
        // with score 0.0, in corpus order.
        let retriever = Bm25Retriever::new(&corpus(&["banana bread", "unrelated text"]), 5);
        let results = retriever.retrieve("banana").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.content, "banana bread");
        assert!(results[0].score > 0.0);
        assert_eq!(results[1].score, 0.0);
    }

    #[tokio::test]
    async fn test_term_frequency_raises_score() {
        let retriever = Bm25Retriever::new(
            &corpus(&["rust once mentioned", "rust rust rust everywhere"]),
            2,
        );
        let results = retriever.retrieve("rust").await.unwrap();
        assert_eq!(results[0].id(), "1");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_matches_carry_no_title_or_metadata() {
        let mut record = ChunkRecord::text("c1", "banana bread recipe");
        record.title = "Recipes".to_string();
        record
            .metadata
            .insert("source_file".to_string(), "recipes.md".into());
        let retriever = Bm25Retriever::new(&[record], 1);

        let results = retriever.retrieve("banana").await.unwrap();
        assert_eq!(results[0].id(), "c1");
        assert!(results[0].record.title.is_empty());
        assert!(results[0].record.metadata.is_empty());
        assert!(results[0].record.embedding.is_empty());
    }
}
