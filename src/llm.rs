//! Language model collaborator contract.
//!
//! Prompt execution is an external collaborator: this crate only depends on
//! `generate(conversation) -> message`. Query transforms build their
//! conversations here and hand the single response message back to the
//! retrieval flow; no retries, streaming, or tool use.

use crate::error::LlmError;
use async_trait::async_trait;
use std::fmt;

/// Speaker role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in an ordered conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Generates one response message for an ordered conversation.
///
/// Implementations must be `Send + Sync`; transforms share a model instance
/// behind `Arc` across concurrent calls.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<ChatMessage, LlmError>;
}
