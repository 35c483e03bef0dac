//! In-memory [`EmbeddingStore`] implementation for tests.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`; insertion order is
//! query order, matching the SQLite backend's `ORDER BY rowid`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::EmbeddingRecord;

use super::{check_batch_dims, EmbeddingStore};

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<EmbeddingRecord>>,
    hashes: RwLock<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmbeddingStore for MemoryStore {
    async fn insert_many(&self, cluster_id: &str, records: &[EmbeddingRecord]) -> Result<()> {
        if cluster_id.is_empty() {
            return Err(Error::InvalidCluster("empty cluster id".to_string()));
        }
        check_batch_dims(records).map_err(Error::StorageWrite)?;
        let mut stored = self.records.write().unwrap();
        stored.extend(records.iter().cloned());
        Ok(())
    }

    async fn query_by_cluster(&self, cluster_id: &str) -> Result<Vec<EmbeddingRecord>> {
        let stored = self.records.read().unwrap();
        Ok(stored
            .iter()
            .filter(|r| r.cluster_id == cluster_id)
            .cloned()
            .collect())
    }

    async fn replace_document(
        &self,
        cluster_id: &str,
        document_id: &str,
        content_hash: &str,
        records: &[EmbeddingRecord],
    ) -> Result<()> {
        if cluster_id.is_empty() {
            return Err(Error::InvalidCluster("empty cluster id".to_string()));
        }
        check_batch_dims(records).map_err(Error::StorageWrite)?;
        {
            let mut stored = self.records.write().unwrap();
            stored.retain(|r| !(r.cluster_id == cluster_id && r.document_id == document_id));
            stored.extend(records.iter().cloned());
        }
        let mut hashes = self.hashes.write().unwrap();
        hashes.insert(
            (cluster_id.to_string(), document_id.to_string()),
            content_hash.to_string(),
        );
        Ok(())
    }

    async fn delete_by_cluster(&self, cluster_id: &str) -> Result<u64> {
        let deleted = {
            let mut stored = self.records.write().unwrap();
            let before = stored.len();
            stored.retain(|r| r.cluster_id != cluster_id);
            (before - stored.len()) as u64
        };
        let mut hashes = self.hashes.write().unwrap();
        hashes.retain(|(c, _), _| c != cluster_id);
        Ok(deleted)
    }

    async fn document_hash(&self, cluster_id: &str, document_id: &str) -> Result<Option<String>> {
        let hashes = self.hashes.read().unwrap();
        Ok(hashes
            .get(&(cluster_id.to_string(), document_id.to_string()))
            .cloned())
    }

    async fn cluster_counts(&self) -> Result<Vec<(String, i64)>> {
        let stored = self.records.read().unwrap();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for r in stored.iter() {
            *counts.entry(r.cluster_id.clone()).or_insert(0) += 1;
        }
        let mut out: Vec<(String, i64)> = counts.into_iter().collect();
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cluster: &str, doc: &str, text: &str, embedding: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            id: uuid::Uuid::new_v4().to_string(),
            cluster_id: cluster.to_string(),
            document_id: doc.to_string(),
            text: text.to_string(),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_insert_and_query_scoped_to_cluster() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "c1",
                &[
                    record("c1", "d1", "a", vec![1.0, 0.0]),
                    record("c1", "d1", "b", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();
        store
            .insert_many("c2", &[record("c2", "d2", "c", vec![1.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.query_by_cluster("c1").await.unwrap().len(), 2);
        assert_eq!(store.query_by_cluster("c2").await.unwrap().len(), 1);
        assert!(store.query_by_cluster("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_dims_batch_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert_many(
                "c1",
                &[
                    record("c1", "d1", "a", vec![1.0, 0.0]),
                    record("c1", "d1", "b", vec![1.0]),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageWrite(_)));
        assert!(store.query_by_cluster("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_document_removes_prior_records() {
        let store = MemoryStore::new();
        store
            .replace_document(
                "c1",
                "d1",
                "hash-v1",
                &[
                    record("c1", "d1", "old a", vec![1.0]),
                    record("c1", "d1", "old b", vec![2.0]),
                ],
            )
            .await
            .unwrap();
        store
            .replace_document("c1", "d1", "hash-v2", &[record("c1", "d1", "new", vec![3.0])])
            .await
            .unwrap();

        let records = store.query_by_cluster("c1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "new");
        assert_eq!(
            store.document_hash("c1", "d1").await.unwrap().as_deref(),
            Some("hash-v2")
        );
    }

    #[tokio::test]
    async fn test_delete_by_cluster_cascades() {
        let store = MemoryStore::new();
        store
            .replace_document("c1", "d1", "h", &[record("c1", "d1", "a", vec![1.0])])
            .await
            .unwrap();
        store
            .insert_many("c2", &[record("c2", "d2", "b", vec![1.0])])
            .await
            .unwrap();

        let deleted = store.delete_by_cluster("c1").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.query_by_cluster("c1").await.unwrap().is_empty());
        assert!(store.document_hash("c1", "d1").await.unwrap().is_none());
        // Other clusters untouched
        assert_eq!(store.query_by_cluster("c2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cluster_counts() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "c1",
                &[
                    record("c1", "d1", "a", vec![1.0]),
                    record("c1", "d1", "b", vec![1.0]),
                ],
            )
            .await
            .unwrap();
        store
            .insert_many("c2", &[record("c2", "d1", "c", vec![1.0])])
            .await
            .unwrap();

        let counts = store.cluster_counts().await.unwrap();
        assert_eq!(counts, vec![("c1".to_string(), 2), ("c2".to_string(), 1)]);
    }
}
