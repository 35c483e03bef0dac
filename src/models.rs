//! Core data models for the grounding pipeline.
//!
//! These types represent the chunks, embedding records, and scored results
//! that flow through ingestion and retrieval.

/// The persisted unit: one chunk's text plus its embedding vector, scoped
/// to a cluster with document provenance.
///
/// Records are immutable once stored; they are only ever removed when their
/// owning document is re-ingested or their cluster is deleted.
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
    pub id: String,
    pub cluster_id: String,
    pub document_id: String,
    pub text: String,
    /// Fixed-dimension vector from the embedding model. Every record in a
    /// batch must share the same width.
    pub embedding: Vec<f32>,
}

/// A request-scoped (chunk text, similarity) pair produced by the retriever.
/// Never persisted.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    /// Cosine similarity against the query vector, in `[-1.0, 1.0]`.
    pub similarity: f32,
}

/// Outcome of ingesting a single document.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub cluster_id: String,
    pub document_id: String,
    pub chunks_written: usize,
    /// True when the document body was unchanged and embedding was skipped.
    pub skipped_unchanged: bool,
}
