//! SQLite [`EmbeddingStore`] backend.
//!
//! [`SqliteStore::open`] owns pool construction (WAL journal, create if
//! missing, pool size from `[db]` config). Vectors are stored as
//! little-endian f32 BLOBs (see
//! [`vec_to_blob`](crate::embedding::vec_to_blob)). Batch inserts and the
//! delete-then-insert replace path each run in a single transaction.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::config::DbConfig;
use crate::embedding::{blob_to_vec, vec_to_blob};
use crate::error::{Error, Result};
use crate::models::EmbeddingRecord;

use super::{check_batch_dims, EmbeddingStore};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `db.path`, creating the file and any missing
    /// parent directories, and wrap the pool. WAL mode keeps retrieval reads
    /// cheap while a document is being ingested.
    pub async fn open(db: &DbConfig) -> Result<Self> {
        if let Some(parent) = db.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::StorageWrite(format!("create {}: {}", parent.display(), e))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db.path.display()))
            .map_err(|e| Error::StorageWrite(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(db.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert_records_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        records: &[EmbeddingRecord],
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        for r in records {
            sqlx::query(
                r#"
                INSERT INTO embeddings (id, cluster_id, document_id, text, embedding, dims, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&r.id)
            .bind(&r.cluster_id)
            .bind(&r.document_id)
            .bind(&r.text)
            .bind(vec_to_blob(&r.embedding))
            .bind(r.embedding.len() as i64)
            .bind(now)
            .execute(&mut **tx)
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingStore for SqliteStore {
    async fn insert_many(&self, cluster_id: &str, records: &[EmbeddingRecord]) -> Result<()> {
        if cluster_id.is_empty() {
            return Err(Error::InvalidCluster("empty cluster id".to_string()));
        }
        check_batch_dims(records).map_err(Error::StorageWrite)?;
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        Self::insert_records_tx(&mut tx, records).await?;
        tx.commit()
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        Ok(())
    }

    async fn query_by_cluster(&self, cluster_id: &str) -> Result<Vec<EmbeddingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, cluster_id, document_id, text, embedding
            FROM embeddings
            WHERE cluster_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(cluster_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::StorageRead(e.to_string()))?;

        let records = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                EmbeddingRecord {
                    id: row.get("id"),
                    cluster_id: row.get("cluster_id"),
                    document_id: row.get("document_id"),
                    text: row.get("text"),
                    embedding: blob_to_vec(&blob),
                }
            })
            .collect();

        Ok(records)
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

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;

        sqlx::query("DELETE FROM embeddings WHERE cluster_id = ? AND document_id = ?")
            .bind(cluster_id)
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;

        Self::insert_records_tx(&mut tx, records).await?;

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO documents (cluster_id, document_id, content_hash, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(cluster_id, document_id) DO UPDATE SET
                content_hash = excluded.content_hash,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(cluster_id)
        .bind(document_id)
        .bind(content_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::StorageWrite(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        Ok(())
    }

    async fn delete_by_cluster(&self, cluster_id: &str) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;

        let deleted = sqlx::query("DELETE FROM embeddings WHERE cluster_id = ?")
            .bind(cluster_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?
            .rows_affected();

        sqlx::query("DELETE FROM documents WHERE cluster_id = ?")
            .bind(cluster_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        Ok(deleted)
    }

    async fn document_hash(&self, cluster_id: &str, document_id: &str) -> Result<Option<String>> {
        let hash: Option<String> = sqlx::query_scalar(
            "SELECT content_hash FROM documents WHERE cluster_id = ? AND document_id = ?",
        )
        .bind(cluster_id)
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::StorageRead(e.to_string()))?;

        Ok(hash)
    }

    async fn cluster_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT cluster_id, COUNT(*) AS n FROM embeddings GROUP BY cluster_id ORDER BY cluster_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::StorageRead(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| (row.get("cluster_id"), row.get("n")))
            .collect())
    }
}
