//! Reciprocal Rank Fusion of ranked result lists.
//!
//! RRF merges rankings from retrievers whose raw scores live on incompatible
//! scales (BM25 is unbounded, cosine similarity is [-1, 1]) by discarding the
//! scores entirely and combining rank positions instead: each appearance of a
//! chunk at 1-based rank `r` contributes `1 / (k + r)` to its fused score,
//! and contributions for the same chunk id sum across lists.
//!
//! The constant `k` dampens the dominance of top ranks; with the conventional
//! `k = 60`, rank 1 contributes ~0.0164 and rank 10 contributes ~0.0143, so a
//! chunk ranked moderately in several lists can outscore a chunk ranked first
//! in one.

use crate::chunk::ChunkMatch;
use std::collections::HashMap;
use tracing::debug;

/// Conventional rank dampening constant from the original RRF paper.
pub const RRF_K: f32 = 60.0;

/// Fuses ranked lists into a single ranking by Reciprocal Rank Fusion.
///
/// Chunk identity is the record id. When the same id appears in several
/// lists, the fused match keeps the record payload from its first appearance
/// (scanning lists in order, then by rank); payloads for the same id are
/// expected to agree apart from fields a lexical retriever leaves empty.
///
/// Ties in fused score break by first appearance, so the output is fully
/// deterministic for deterministic inputs. Input lists' own scores are
/// ignored; only positions matter.
///
/// # Arguments
///
/// * `rankings` - ranked result lists, best match first in each
/// * `k` - dampening constant, typically [`RRF_K`]
pub fn reciprocal_rank_fusion(rankings: &[Vec<ChunkMatch>], k: f32) -> Vec<ChunkMatch> {
    struct Fused {
        record: crate::chunk::ChunkRecord,
        score: f32,
        first_seen: usize,
    }

    let mut by_id: HashMap<String, Fused> = HashMap::new();
    let mut order = 0usize;

    for ranking in rankings {
        for (position, matched) in ranking.iter().enumerate() {
            let rank = (position + 1) as f32;
            let contribution = 1.0 / (k + rank);
            match by_id.get_mut(matched.id()) {
                Some(fused) => fused.score += contribution,
                None => {
                    by_id.insert(
                        matched.id().to_string(),
                        Fused {
                            record: matched.record.clone(),
                            score: contribution,
                            first_seen: order,
                        },
                    );
                }
            }
            order += 1;
        }
    }

    let mut fused: Vec<Fused> = by_id.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.first_seen.cmp(&b.first_seen))
    });

    debug!(
        lists = rankings.len(),
        fused = fused.len(),
        "reciprocal rank fusion"
    );

    fused
        .into_iter()
        .map(|f| ChunkMatch::new(f.record, f.score))
        .collect()
}
