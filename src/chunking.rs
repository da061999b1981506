//! Document splitters producing chunk records for indexing.
//!
//! Wraps the `text-splitter` crate for semantic chunking with a character
//! budget. [`MarkdownChunker`] splits along Markdown structure (headings,
//! lists, code blocks); [`TextChunker`] falls back to paragraph/sentence/word
//! boundaries for plain text. Both emit [`ChunkRecord`]s with per-source
//! sequential ids and `source_file` / `doc_title` metadata, ready for
//! [`index_records`](crate::index::InMemoryVectorIndex::index_records).
//!
//! Byte-level extraction (PDF parsing, OCR) happens upstream; these chunkers
//! take already-extracted text.

use crate::chunk::ChunkRecord;
use crate::config::MAX_CHUNK_CHARS;
use text_splitter::{ChunkConfig, MarkdownSplitter, TextSplitter};
use tracing::debug;

fn record(source_file: &str, doc_title: &str, index: usize, content: &str, mime_type: &str) -> ChunkRecord {
    let mut record = ChunkRecord::text(format!("{source_file}#{index}"), content);
    record.mime_type = mime_type.to_string();
    record.title = doc_title.to_string();
    record
        .metadata
        .insert("source_file".to_string(), source_file.into());
    record
        .metadata
        .insert("doc_title".to_string(), doc_title.into());
    record
}

/// Structure-aware Markdown chunker.
///
/// Splits at the highest semantic level (heading, paragraph, list, code
/// block) where content still fits the character budget, merging neighboring
/// sections under that bound.
pub struct MarkdownChunker {
    max_chars: usize,
}

impl MarkdownChunker {
    /// Creates a chunker with an explicit per-chunk character budget.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Splits a Markdown document into chunk records.
    ///
    /// Ids are `{source_file}#{index}` with a zero-based running index.
    /// Empty or whitespace-only input yields no chunks.
    pub fn chunk(&self, source_file: &str, doc_title: &str, text: &str) -> Vec<ChunkRecord> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let splitter = MarkdownSplitter::new(ChunkConfig::new(self.max_chars).with_trim(true));
        let records: Vec<ChunkRecord> = splitter
            .chunks(text)
            .enumerate()
            .map(|(index, chunk)| record(source_file, doc_title, index, chunk, "text/markdown"))
            .collect();

        debug!(source_file, chunks = records.len(), "chunked markdown document");
        records
    }
}

impl Default for MarkdownChunker {
    fn default() -> Self {
        Self::new(MAX_CHUNK_CHARS)
    }
}

/// Plain-text chunker splitting at paragraph, sentence, and word boundaries.
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    /// Creates a chunker with an explicit per-chunk character budget.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Splits a plain-text document into chunk records.
    pub fn chunk(&self, source_file: &str, doc_title: &str, text: &str) -> Vec<ChunkRecord> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let splitter = TextSplitter::new(ChunkConfig::new(self.max_chars).with_trim(true));
        let records: Vec<ChunkRecord> = splitter
            .chunks(text)
            .enumerate()
            .map(|(index, chunk)| record(source_file, doc_title, index, chunk, "text/plain"))
            .collect();

        debug!(source_file, chunks = records.len(), "chunked text document");
        records
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(MAX_CHUNK_CHARS)
    }
}
