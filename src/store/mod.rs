//! Storage abstraction for embedding records.
//!
//! The [`EmbeddingStore`] trait defines the operations the ingestion and
//! retrieval pipeline needs, enabling pluggable backends (SQLite,
//! in-memory). Records are write-once: nothing updates a stored row in
//! place, so concurrent ingestion into the same cluster and concurrent
//! retrieval reads are safe without extra locking.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::EmbeddingRecord;

pub use sqlite::SqliteStore;

/// Abstract storage backend for (text, vector, cluster) records.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_many`](EmbeddingStore::insert_many) | Persist a batch, all-or-nothing |
/// | [`query_by_cluster`](EmbeddingStore::query_by_cluster) | All records for one cluster |
/// | [`replace_document`](EmbeddingStore::replace_document) | Delete-then-insert one document's records |
/// | [`delete_by_cluster`](EmbeddingStore::delete_by_cluster) | Cascading cluster delete |
/// | [`document_hash`](EmbeddingStore::document_hash) | Stored content fingerprint |
/// | [`cluster_counts`](EmbeddingStore::cluster_counts) | Record counts per cluster |
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Persist a batch of records in a single transaction.
    ///
    /// Either every record is written or none is; a rejected batch surfaces
    /// as [`Error::StorageWrite`](crate::error::Error::StorageWrite) and the
    /// caller may retry the whole batch. Records with mixed or zero vector
    /// dimensionality are rejected before any row is written.
    async fn insert_many(&self, cluster_id: &str, records: &[EmbeddingRecord]) -> Result<()>;

    /// All records for `cluster_id`, in insertion order.
    ///
    /// An unknown or empty cluster yields an empty Vec, never an error.
    async fn query_by_cluster(&self, cluster_id: &str) -> Result<Vec<EmbeddingRecord>>;

    /// Replace all records for one document within a cluster, atomically,
    /// and remember `content_hash` as the document's fingerprint.
    ///
    /// This is the re-ingestion path: prior records for the document are
    /// deleted in the same transaction that inserts the new batch, so
    /// repeated ingestion never duplicates chunks.
    async fn replace_document(
        &self,
        cluster_id: &str,
        document_id: &str,
        content_hash: &str,
        records: &[EmbeddingRecord],
    ) -> Result<()>;

    /// Delete every record and document fingerprint for `cluster_id`.
    ///
    /// Returns the number of embedding records removed. Must run as one
    /// transaction so a reused cluster id never sees orphaned vectors.
    async fn delete_by_cluster(&self, cluster_id: &str) -> Result<u64>;

    /// The stored content fingerprint for a document, if any.
    async fn document_hash(&self, cluster_id: &str, document_id: &str) -> Result<Option<String>>;

    /// (cluster_id, record count) pairs for every known cluster.
    async fn cluster_counts(&self) -> Result<Vec<(String, i64)>>;
}

/// Validate a batch before it touches the backend: every vector must carry
/// the same nonzero dimensionality.
pub(crate) fn check_batch_dims(records: &[EmbeddingRecord]) -> std::result::Result<(), String> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let dims = first.embedding.len();
    if dims == 0 {
        return Err("record has empty embedding vector".to_string());
    }
    for r in records {
        if r.embedding.len() != dims {
            return Err(format!(
                "mixed vector dimensionality in batch: {} vs {}",
                dims,
                r.embedding.len()
            ));
        }
    }
    Ok(())
}
