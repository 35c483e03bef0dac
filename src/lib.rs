//! # Grounding
//!
//! A cluster-scoped RAG grounding pipeline for workspace documents.
//!
//! Grounding ingests uploaded document text by chunking it, embedding every
//! chunk through an external model, and persisting (text, vector, cluster)
//! records in SQLite. At query time it retrieves the top-K most similar
//! chunks to ground an LLM prompt.
//!
//! ## Architecture
//!
//! ```text
//! document text ──▶ Chunker ──▶ Embedder ──▶ Store (write)
//!
//! query text ──▶ Embedder ──▶ Retriever ──▶ ranked chunks ──▶ prompt
//!                                  ▲
//!                            Store (read)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! grd init                          # create database
//! grd ingest course-42 notes.txt    # chunk + embed + store
//! grd query "what is photosynthesis" --cluster course-42
//! grd stats
//! grd delete course-42
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Core data types |
//! | [`chunk`] | Separator-priority text chunking with overlap |
//! | [`embedding`] | Embedder trait, OpenAI provider, vector utilities |
//! | [`store`] | Storage trait with SQLite and in-memory backends |
//! | [`retrieve`] | Cosine-ranked top-K retrieval |
//! | [`ingest`] | Per-document ingestion orchestration |
//! | [`migrate`] | Schema migrations |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod retrieve;
pub mod store;
