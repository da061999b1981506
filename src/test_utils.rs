//! Deterministic in-crate mocks for unit and integration tests.
//!
//! No network, no model weights: [`MockEmbeddings`] derives vectors from
//! keyword counts so semantic similarity is predictable from the text, and
//! [`MockLlm`] replays a canned response while recording the conversation it
//! was given.

use crate::embedding::{EmbeddingInput, EmbeddingProvider};
use crate::error::{EmbeddingError, LlmError};
use crate::llm::{ChatMessage, LanguageModel};
use async_trait::async_trait;
use std::sync::Mutex;

/// Embedding provider whose vector space has one axis per keyword.
///
/// Each input embeds to the count of each axis keyword among its lowercased
/// word tokens, so texts sharing keywords get high cosine similarity and
/// unrelated texts are orthogonal. Dimension equals the number of axes.
pub struct MockEmbeddings {
    axes: Vec<String>,
}

impl MockEmbeddings {
    pub fn new(axes: &[&str]) -> Self {
        Self {
            axes: axes.iter().map(|axis| axis.to_lowercase()).collect(),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let tokens: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        self.axes
            .iter()
            .map(|axis| tokens.iter().filter(|token| *token == axis).count() as f32)
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddings {
    async fn get_embeddings(
        &self,
        inputs: &[EmbeddingInput],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(inputs
            .iter()
            .map(|input| match input {
                EmbeddingInput::Text(text) => self.embed_text(text),
                EmbeddingInput::Image(payload) => self.embed_text(payload),
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.axes.len()
    }
}

/// Language model returning a fixed reply and recording the last
/// conversation it received, for prompt-shape assertions.
pub struct MockLlm {
    reply: String,
    last_conversation: Mutex<Vec<ChatMessage>>,
}

impl MockLlm {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            last_conversation: Mutex::new(Vec::new()),
        }
    }

    /// The conversation passed to the most recent `generate` call.
    pub fn last_conversation(&self) -> Vec<ChatMessage> {
        self.last_conversation
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }
}

#[async_trait]
impl LanguageModel for MockLlm {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<ChatMessage, LlmError> {
        *self.last_conversation.lock().expect("mock lock poisoned") = conversation.to_vec();
        Ok(ChatMessage::assistant(self.reply.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embeddings_count_axis_keywords() {
        let provider = MockEmbeddings::new(&["banana", "apple"]);
        let vectors = provider
            .get_embeddings(&[EmbeddingInput::Text("Banana banana apple!".to_string())])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![2.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_mock_llm_records_conversation() {
        let llm = MockLlm::new("canned");
        let reply = llm
            .generate(&[ChatMessage::user("hello")])
            .await
            .unwrap();
        assert_eq!(reply.content, "canned");
        assert_eq!(llm.last_conversation().len(), 1);
    }
}
