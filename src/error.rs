//! Error types for the grounding pipeline.
//!
//! Each variant corresponds to one failure class a caller may need to
//! distinguish: embedding-service failures are retried or reported upward by
//! the ingestion orchestrator, storage read failures degrade retrieval to an
//! empty grounding context, and write failures abort the current document.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the chunk → embed → store → retrieve pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The external embedding model call failed (network, auth, quota,
    /// malformed response). Never retried below the orchestrator.
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// The persistence layer rejected a write. The enclosing batch is never
    /// partially applied.
    #[error("storage write error: {0}")]
    StorageWrite(String),

    /// The persistence layer failed a read.
    #[error("storage read error: {0}")]
    StorageRead(String),

    /// A cluster id was absent or unusable where one is required.
    #[error("invalid cluster reference: {0}")]
    InvalidCluster(String),

    /// Chunker configuration cannot produce valid chunks.
    #[error("invalid chunking config: {0}")]
    ChunkConfig(String),
}
