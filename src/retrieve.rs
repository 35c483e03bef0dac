//! Cosine-ranked top-K retrieval over a cluster's embedding records.
//!
//! The retriever is stateless: each request embeds the query, scores every
//! stored vector in the target cluster, and returns the highest-scoring
//! chunk texts joined into a single grounding-context string. Nothing is
//! cached across requests.

use crate::embedding::{cosine_similarity, normalize_input, Embedder};
use crate::error::Result;
use crate::models::{EmbeddingRecord, ScoredChunk};
use crate::store::EmbeddingStore;

/// Cluster id meaning "no cluster selected"; retrieval short-circuits to an
/// empty result without touching the embedder or the store.
pub const NO_CLUSTER: &str = "none";

/// True when `cluster_id` is absent or the explicit sentinel.
pub fn is_unscoped(cluster_id: &str) -> bool {
    cluster_id.trim().is_empty() || cluster_id == NO_CLUSTER
}

/// Score `records` against `query_vec` and return the top `top_k` by cosine
/// similarity, descending.
///
/// Records whose vector width differs from the query's are skipped with a
/// warning rather than silently compared; a stored vector from an older
/// embedding model must never produce a meaningless score.
///
/// The sort is stable, so exact ties keep storage order.
pub fn rank_records(
    query_vec: &[f32],
    records: &[EmbeddingRecord],
    top_k: usize,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = Vec::with_capacity(records.len());

    for r in records {
        if r.embedding.len() != query_vec.len() {
            eprintln!(
                "Warning: skipping record {}: stored vector is {}-dim, query is {}-dim",
                r.id,
                r.embedding.len(),
                query_vec.len()
            );
            continue;
        }
        scored.push(ScoredChunk {
            text: r.text.clone(),
            similarity: cosine_similarity(query_vec, &r.embedding),
        });
    }

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}

/// Embed `query` and return the top `top_k` scored chunks from `cluster_id`.
///
/// Errors from the embedder or the store propagate; callers that need the
/// swallow-to-empty behavior use [`find_relevant_content`].
pub async fn retrieve(
    query: &str,
    cluster_id: &str,
    embedder: &dyn Embedder,
    store: &dyn EmbeddingStore,
    top_k: usize,
) -> Result<Vec<ScoredChunk>> {
    let query_vec = embedder.embed(&normalize_input(query)).await?;

    let records = store.query_by_cluster(cluster_id).await?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    Ok(rank_records(&query_vec, &records, top_k))
}

/// The upstream contract: the grounding context for a chat query.
///
/// Returns the top `top_k` chunk texts joined by a blank line, or an empty
/// string when the cluster is unscoped, has no records, or retrieval fails.
/// A failed retrieval must never block the chat flow (the LLM simply
/// answers ungrounded), so embedding and storage errors are logged and
/// swallowed here, never surfaced.
pub async fn find_relevant_content(
    query: &str,
    cluster_id: &str,
    embedder: &dyn Embedder,
    store: &dyn EmbeddingStore,
    top_k: usize,
) -> String {
    if is_unscoped(cluster_id) {
        return String::new();
    }

    match retrieve(query, cluster_id, embedder, store, top_k).await {
        Ok(scored) => scored
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
        Err(e) => {
            eprintln!("Warning: retrieval failed, answering ungrounded: {}", e);
            String::new()
        }
    }
}
