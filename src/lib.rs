//! # Loreseek
//!
//! Retrieval-fusion core for retrieval-augmented-generation (RAG) pipelines.
//!
//! This crate provides the retrieval layer that sits between a chunked document
//! corpus and a generation step: retriever abstractions over semantic (vector)
//! and lexical (BM25) search, Reciprocal Rank Fusion for combining them, LLM
//! driven query transforms, and a side-by-side strategy comparator. Embedding
//! models, vector databases, and LLMs are external collaborators consumed
//! through traits; this crate owns the data contracts, scoring, and fusion.
//!
//! ## Modules
//!
//! - [`chunk`] - Chunk record and match data contracts
//! - [`chunking`] - Markdown and plain-text chunkers producing chunk records
//! - [`compare`] - Retrieval strategy comparator and result packaging
//! - [`config`] - Default configuration constants
//! - [`embedding`] - Embedding provider contract
//! - [`error`] - Error types for retrieval, embedding, and LLM operations
//! - [`filter`] - Metadata filter predicate expression tree
//! - [`index`] - Vector index contract and in-memory reference implementation
//! - [`llm`] - LLM collaborator contract (role-tagged chat messages)
//! - [`retriever`] - Vector, BM25, composite, and hybrid (RRF) retrievers
//! - [`transform`] - Query rewriting helpers (standalone, expansion, HyDE)

pub mod chunk;
pub mod chunking;
pub mod compare;
pub mod config;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod index;
pub mod llm;
pub mod retriever;
pub mod transform;

#[cfg(test)]
pub mod test_utils;
