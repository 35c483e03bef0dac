//! Ingestion orchestration: chunk → embed → store, per document.
//!
//! Each document is ingested as a unit. Its chunks are embedded in
//! order-preserving batches and written through
//! [`EmbeddingStore::replace_document`], which deletes any prior records for
//! the same document in the same transaction, so re-running ingestion never
//! duplicates chunks. A SHA-256 fingerprint of the document body lets
//! unchanged documents skip the embedding call entirely.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::chunk::chunk_text;
use crate::config::{ChunkingConfig, EmbeddingConfig};
use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::models::{EmbeddingRecord, IngestReport};
use crate::store::EmbeddingStore;

/// Ingest one document's text into `cluster_id`.
///
/// All-or-nothing per document: if embedding or storage fails partway, no
/// records are committed and the error propagates to the caller, which may
/// retry the whole document. Pass `force` to re-embed even when the stored
/// fingerprint matches.
pub async fn ingest_document(
    cluster_id: &str,
    document_id: &str,
    text: &str,
    embedder: &dyn Embedder,
    store: &dyn EmbeddingStore,
    chunking: &ChunkingConfig,
    embedding: &EmbeddingConfig,
    force: bool,
) -> Result<IngestReport> {
    if cluster_id.trim().is_empty() {
        return Err(Error::InvalidCluster(
            "ingestion requires a cluster id".to_string(),
        ));
    }

    let content_hash = hash_text(text);

    if !force {
        if let Some(stored) = store.document_hash(cluster_id, document_id).await? {
            if stored == content_hash {
                return Ok(IngestReport {
                    cluster_id: cluster_id.to_string(),
                    document_id: document_id.to_string(),
                    chunks_written: 0,
                    skipped_unchanged: true,
                });
            }
        }
    }

    let chunks = chunk_text(text, chunking)?;

    // Empty document: still replace, clearing any prior records.
    if chunks.is_empty() {
        store
            .replace_document(cluster_id, document_id, &content_hash, &[])
            .await?;
        return Ok(IngestReport {
            cluster_id: cluster_id.to_string(),
            document_id: document_id.to_string(),
            chunks_written: 0,
            skipped_unchanged: false,
        });
    }

    // Embed in order-preserving batches, then zip chunks back to vectors.
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(embedding.batch_size.max(1)) {
        vectors.extend(embedder.embed_batch(batch).await?);
    }

    // A short response must never silently drop the trailing chunks.
    if vectors.len() != chunks.len() {
        return Err(Error::EmbeddingService(format!(
            "embedder returned {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        )));
    }

    let records: Vec<EmbeddingRecord> = chunks
        .iter()
        .zip(vectors)
        .map(|(text, embedding)| EmbeddingRecord {
            id: Uuid::new_v4().to_string(),
            cluster_id: cluster_id.to_string(),
            document_id: document_id.to_string(),
            text: text.clone(),
            embedding,
        })
        .collect();

    store
        .replace_document(cluster_id, document_id, &content_hash, &records)
        .await?;

    Ok(IngestReport {
        cluster_id: cluster_id.to_string(),
        document_id: document_id.to_string(),
        chunks_written: records.len(),
        skipped_unchanged: false,
    })
}

fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
