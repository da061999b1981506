//! LLM-backed query transforms.
//!
//! Each helper is a single LLM round-trip that reshapes the query before it
//! reaches a retriever:
//!
//! - [`make_query_standalone`] rewrites a follow-up question so it stands
//!   alone without the conversation history
//! - [`expand_query`] fans one query out into several related search queries
//! - [`hyde_expansion`] fabricates a short hypothetical answer whose
//!   embedding often lands nearer the real answer than the question's does
//!
//! None of the helpers validate or retry the model's output; callers get the
//! response as-is. [`build_query_with_chunks`] sits at the other end of the
//! flow, packaging retrieved chunks for a downstream generation step.

use crate::chunk::ChunkRecord;
use crate::error::LlmError;
use crate::llm::{ChatMessage, LanguageModel};
use std::fmt::Write as _;
use tracing::debug;

const STANDALONE_SYSTEM_PROMPT: &str = "You are a helpful assistant that transforms a message \
from a user to be independent from the conversation history given.";

const EXPANSION_SYSTEM_PROMPT: &str = "You are a focused assistant designed to generate \
multiple, relevant search queries based solely on a single input query. Your task is to produce \
a list of these queries in English, without adding any further explanations or information.";

const HYDE_SYSTEM_PROMPT: &str = "You are a helpful assistant. Provide an example of answer to \
the provided query. Only output an hypothetical explanation to the query. Concise, only a few \
sentences, without any introduction or conclusion.";

/// Rewrites `query` so it can be understood without the conversation.
///
/// Follow-up questions lean on history ("How much does it cost?"); retrieval
/// needs the referent resolved ("How much does the new iPhone cost?"). The
/// history is rendered as `role: content` lines inside the prompt.
pub async fn make_query_standalone(
    llm: &dyn LanguageModel,
    history: &[ChatMessage],
    query: &str,
) -> Result<String, LlmError> {
    let chat_history = history
        .iter()
        .map(|message| format!("{}: {}", message.role, message.content))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Objective: Your task is to analyze the input query and the provided conversation \
history. When the user mentions something that was mentioned in the conversation, but not \
clearly said in the current query, rewrite it.\n\
\n\
Example:\n\
\n\
    User Query: How much does it cost?\n\
    Conversation History:\n\
        - User: Can you tell me about the price of the new iPhone?\n\
        - Assistant: The new iPhone costs around $999.\n\
    Reformulated Query: How much does the new iPhone cost?\n\
\n\
\n\
Input:\n\
\n\
    User Query: {query}\n\
    Conversation History:\n\
        {chat_history}\n\
\n\
Reformulated Query (ONLY the reformulated query, without any explanation):"
    );

    let conversation = [
        ChatMessage::system(STANDALONE_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    let reformulated = llm.generate(&conversation).await?.content;

    debug!(original = query, reformulated, "standalone query rewrite");
    Ok(reformulated)
}

/// Generates `n` search queries related to `query`, one per line of the
/// model's response.
///
/// The requested count is a prompt instruction only: the response is split on
/// newlines, blank lines are dropped, and whatever remains is returned
/// without padding, truncation, or error on a count mismatch.
pub async fn expand_query(
    llm: &dyn LanguageModel,
    query: &str,
    n: usize,
) -> Result<Vec<String>, LlmError> {
    let prompt = format!(
        "Generate multiple search queries related to: {query}, and translate them in english \
if they are not already in english. Only output {n} queries in english.\n\
OUTPUT ({n} queries):"
    );
    let conversation = [
        ChatMessage::system(EXPANSION_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    let response = llm.generate(&conversation).await?.content;

    let queries: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    debug!(original = query, expanded = ?queries, "query expansion");
    Ok(queries)
}

/// Generates a short hypothetical answer to `query` for use as a retrieval
/// query surrogate (HyDE).
pub async fn hyde_expansion(llm: &dyn LanguageModel, query: &str) -> Result<String, LlmError> {
    let conversation = [
        ChatMessage::system(HYDE_SYSTEM_PROMPT),
        ChatMessage::user(query),
    ];
    let hypothetical = llm.generate(&conversation).await?.content;

    debug!(original = query, hypothetical, "hyde expansion");
    Ok(hypothetical)
}

/// Packages retrieved chunks alongside the user query for a downstream
/// generation step.
///
/// Each chunk becomes a `<source id="...">` XML block; with no chunks the
/// sources section reads `No sources found.`
pub fn build_query_with_chunks(user_query: &str, chunks: &[ChunkRecord]) -> String {
    let sources_xml = if chunks.is_empty() {
        "No sources found.".to_string()
    } else {
        let mut xml = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                xml.push('\n');
            }
            // String formatting is infallible.
            let _ = write!(xml, "<source id=\"{}\">\n{}\n</source>", chunk.id, chunk.content);
        }
        xml
    };

    format!("User Query: {user_query}\n\nHere are the sources I found for you:\n{sources_xml}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLlm;

    #[tokio::test]
    async fn test_standalone_prompt_includes_history_and_query() {
        let llm = MockLlm::new("How much does the new iPhone cost?");
        let history = [
            ChatMessage::user("Can you tell me about the price of the new iPhone?"),
            ChatMessage::assistant("The new iPhone costs around $999."),
        ];

        let rewritten = make_query_standalone(&llm, &history, "How much does it cost?")
            .await
            .unwrap();
        assert_eq!(rewritten, "How much does the new iPhone cost?");

        let conversation = llm.last_conversation();
        assert_eq!(conversation.len(), 2);
        assert!(conversation[0].content.contains("independent from the conversation history"));
        assert!(conversation[1].content.contains("User Query: How much does it cost?"));
        assert!(conversation[1]
            .content
            .contains("user: Can you tell me about the price of the new iPhone?"));
        assert!(conversation[1]
            .content
            .contains("assistant: The new iPhone costs around $999."));
    }

    #[tokio::test]
    async fn test_expand_query_splits_lines() {
        let llm = MockLlm::new("best hiking trails in the alps\nalpine trekking routes");
        let queries = expand_query(&llm, "randonnées alpes", 2).await.unwrap();
        assert_eq!(
            queries,
            vec!["best hiking trails in the alps", "alpine trekking routes"]
        );
        assert!(llm.last_conversation()[1]
            .content
            .contains("Only output 2 queries"));
    }

    #[tokio::test]
    async fn test_expand_query_drops_blank_lines_and_keeps_count_mismatch() {
        // Three non-blank lines despite asking for two: passed through as-is.
        let llm = MockLlm::new("one\n\n  \ntwo\nthree");
        let queries = expand_query(&llm, "anything", 2).await.unwrap();
        assert_eq!(queries, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_hyde_sends_query_as_user_message() {
        let llm = MockLlm::new("Chunk overlap preserves context across boundaries.");
        let answer = hyde_expansion(&llm, "why overlap chunks?").await.unwrap();
        assert_eq!(answer, "Chunk overlap preserves context across boundaries.");

        let conversation = llm.last_conversation();
        assert_eq!(conversation[1].content, "why overlap chunks?");
        assert!(conversation[0].content.contains("hypothetical explanation"));
    }

    #[test]
    fn test_build_query_with_chunks_xml() {
        let chunks = [
            ChunkRecord::text("c1", "first source"),
            ChunkRecord::text("c2", "second source"),
        ];
        let prompt = build_query_with_chunks("what are the sources?", &chunks);
        assert!(prompt.starts_with("User Query: what are the sources?"));
        assert!(prompt.contains("<source id=\"c1\">\nfirst source\n</source>"));
        assert!(prompt.contains("<source id=\"c2\">\nsecond source\n</source>"));
    }

    #[test]
    fn test_build_query_without_chunks() {
        let prompt = build_query_with_chunks("anything", &[]);
        assert!(prompt.contains("No sources found."));
    }
}
