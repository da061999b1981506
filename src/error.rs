//! Error types for the retrieval core.
//!
//! Failure domains get their own small enums (embedding, LLM) with conversions
//! into the retrieval-path [`RetrievalError`]. Retrieval failures are never
//! silently recovered: a failing embedding call or index call propagates to
//! the caller of `retrieve`. Retries, if desired, are layered on by callers.

use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// The provider itself failed (model error, backend unreachable, ...).
    #[error("Embedding provider failed: {0}")]
    ProviderFailed(String),
    /// The provider returned fewer vectors than inputs.
    ///
    /// Raised when a query embedding comes back empty: retrievers fail fast
    /// here rather than pass malformed input to the vector index.
    #[error("Embedding provider returned {actual} vectors for {expected} inputs")]
    EmptyBatch {
        /// Number of inputs submitted
        expected: usize,
        /// Number of vectors returned
        actual: usize,
    },
    /// Vector dimension does not match the provider/index dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension
        expected: usize,
        /// Actual embedding dimension received
        actual: usize,
    },
}

/// Errors raised by LLM collaborators during query transforms.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// The generation call failed (backend error, timeout, ...).
    ///
    /// Note that a malformed or empty response is NOT an error: query
    /// transforms pass LLM output through unvalidated by contract.
    #[error("LLM generation failed: {0}")]
    GenerationFailed(String),
}

/// Errors that can occur on the retrieval path.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// Malformed construction arguments (e.g. mismatched list lengths in a
    /// composite retriever, or an unparseable filter expression).
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Embedding provider failure while embedding a query or chunk.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    /// Backing vector or lexical index unreachable or failed.
    #[error("Index error: {0}")]
    Index(String),
    /// A chunk's mime type is neither `text/*` nor `image/*`.
    ///
    /// Raised synchronously when classifying a chunk for embedding and never
    /// swallowed; only the out-of-scope extraction layer may tolerate bad
    /// payloads.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    /// LLM collaborator failure during a query transform.
    #[error(transparent)]
    Llm(#[from] LlmError),
}
