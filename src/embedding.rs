//! Embedding provider contract.
//!
//! Embedding models are external collaborators: this crate only depends on
//! the `inputs -> vectors` contract, one fixed-length vector per input, with
//! stable dimensionality per provider instance. Providers are explicitly
//! constructed and passed in (load once, reuse across calls); there is no
//! ambient global model state.

use crate::error::EmbeddingError;
use async_trait::async_trait;

/// One item submitted to an embedding provider.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingInput {
    /// Plain text (queries, `text/*` chunk content).
    Text(String),
    /// Encoded image payload string (`image/*` chunk content).
    Image(String),
}

/// Turns text or image payloads into fixed-length numeric vectors.
///
/// # Contract
///
/// `get_embeddings` returns exactly one vector per input item, each of length
/// `dimension()`. Implementations must be `Send + Sync`: providers are shared
/// behind `Arc` across concurrent retrieval calls.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of inputs, one vector per item.
    async fn get_embeddings(
        &self,
        inputs: &[EmbeddingInput],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The fixed output dimension of this provider instance.
    fn dimension(&self) -> usize;
}

/// Embeds a single query string and returns its vector.
///
/// Uses the first vector of the provider's batch response. Fails fast with
/// [`EmbeddingError::EmptyBatch`] when the provider returns no vectors, rather
/// than passing malformed input downstream to a vector index.
pub async fn embed_query(
    provider: &dyn EmbeddingProvider,
    query: &str,
) -> Result<Vec<f32>, EmbeddingError> {
    let inputs = [EmbeddingInput::Text(query.to_string())];
    let mut vectors = provider.get_embeddings(&inputs).await?;
    if vectors.is_empty() {
        return Err(EmbeddingError::EmptyBatch {
            expected: 1,
            actual: 0,
        });
    }
    Ok(vectors.swap_remove(0))
}
