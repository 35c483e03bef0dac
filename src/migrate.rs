use anyhow::Result;
use sqlx::SqlitePool;

/// Create the schema. Idempotent; safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Embedding records: one row per chunk, vector as little-endian f32 BLOB.
    // Rows are never updated in place; a document's rows are replaced as a
    // unit and a cluster's rows are deleted as a unit.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS embeddings (
            id TEXT PRIMARY KEY,
            cluster_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            dims INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Document fingerprints for unchanged-document skip.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            cluster_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (cluster_id, document_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_embeddings_cluster ON embeddings(cluster_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_embeddings_document ON embeddings(cluster_id, document_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
