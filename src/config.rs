//! Default tuning constants.
//!
//! Callers pass explicit values everywhere; these are the defaults consumers
//! reach for when they have no opinion. Algorithm-specific constants live
//! with their algorithms (`RRF_K` in `retriever::fusion`, the BM25
//! parameters in `retriever::lexical`).

/// Default result count per retrieval call.
pub const DEFAULT_TOP_K: usize = 5;

/// Default number of queries requested from query expansion.
pub const DEFAULT_EXPANSION_COUNT: usize = 2;

/// Default per-chunk character budget for the document splitters.
pub const MAX_CHUNK_CHARS: usize = 2048;
