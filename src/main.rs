//! # Grounding CLI (`grd`)
//!
//! The `grd` binary drives the grounding pipeline: database initialization,
//! document ingestion, grounding-context retrieval, cluster deletion, and
//! stats.
//!
//! ## Usage
//!
//! ```bash
//! grd --config ./config/grounding.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `grd init` | Create the SQLite database and run schema migrations |
//! | `grd ingest <cluster> <file>` | Chunk, embed, and store a document |
//! | `grd query "<text>" --cluster <id>` | Print the grounding context for a query |
//! | `grd delete <cluster>` | Delete a cluster and all its records |
//! | `grd stats` | Show record counts per cluster |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use grounding::config::{self, Config};
use grounding::embedding::create_embedder;
use grounding::ingest::ingest_document;
use grounding::migrate;
use grounding::retrieve::{find_relevant_content, is_unscoped, NO_CLUSTER};
use grounding::store::{EmbeddingStore, SqliteStore};

/// Grounding CLI: a cluster-scoped RAG pipeline for workspace documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/grounding.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "grd",
    about = "Grounding: chunk, embed, store, and retrieve document context for LLM prompts",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/grounding.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables. Idempotent;
    /// running it multiple times is safe.
    Init,

    /// Ingest a document into a cluster.
    ///
    /// Chunks the file's text, embeds every chunk in batched calls, and
    /// replaces the document's records in a single transaction. Re-running
    /// on an unchanged file is a no-op unless `--force` is given.
    Ingest {
        /// Cluster (document collection) the document belongs to.
        cluster: String,

        /// Path to the document text file.
        file: PathBuf,

        /// Document identifier within the cluster. Defaults to the file name.
        #[arg(long)]
        document_id: Option<String>,

        /// Re-embed even if the document body is unchanged.
        #[arg(long)]
        force: bool,
    },

    /// Retrieve the grounding context for a query.
    ///
    /// Embeds the query, ranks the cluster's stored chunks by cosine
    /// similarity, and prints the top-K joined by a blank line. Without
    /// `--cluster` the query is unscoped and no embedding call is made.
    Query {
        /// The query text.
        query: String,

        /// Cluster to retrieve from. Omit (or pass `none`) for an
        /// ungrounded query.
        #[arg(long, default_value = NO_CLUSTER)]
        cluster: String,

        /// Number of top-ranked chunks to return.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Delete a cluster and every record belonging to it.
    ///
    /// Removes embeddings and document fingerprints in one transaction so a
    /// reused cluster id never sees stale vectors.
    Delete {
        /// Cluster to delete.
        cluster: String,
    },

    /// Show record counts per cluster.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = SqliteStore::open(&cfg.db).await?;
            migrate::run_migrations(store.pool()).await?;
            store.pool().close().await;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            cluster,
            file,
            document_id,
            force,
        } => {
            run_ingest(&cfg, &cluster, &file, document_id, force).await?;
        }
        Commands::Query {
            query,
            cluster,
            top_k,
        } => {
            run_query(&cfg, &query, &cluster, top_k).await?;
        }
        Commands::Delete { cluster } => {
            let store = SqliteStore::open(&cfg.db).await?;
            let deleted = store.delete_by_cluster(&cluster).await?;
            store.pool().close().await;
            println!("delete {}", cluster);
            println!("  records removed: {}", deleted);
            println!("ok");
        }
        Commands::Stats => {
            let store = SqliteStore::open(&cfg.db).await?;
            let counts = store.cluster_counts().await?;
            println!("stats");
            if counts.is_empty() {
                println!("  no clusters");
            }
            for (cluster, n) in &counts {
                println!("  {}: {} records", cluster, n);
            }
            store.pool().close().await;
        }
    }

    Ok(())
}

async fn run_ingest(
    cfg: &Config,
    cluster: &str,
    file: &std::path::Path,
    document_id: Option<String>,
    force: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", file.display(), e))?;

    let document_id = document_id.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string())
    });

    let embedder = create_embedder(&cfg.embedding)?;
    let store = SqliteStore::open(&cfg.db).await?;

    let report = ingest_document(
        cluster,
        &document_id,
        &text,
        embedder.as_ref(),
        &store,
        &cfg.chunking,
        &cfg.embedding,
        force,
    )
    .await?;

    store.pool().close().await;

    println!("ingest {} / {}", report.cluster_id, report.document_id);
    if report.skipped_unchanged {
        println!("  unchanged, skipped");
    } else {
        println!("  chunks written: {}", report.chunks_written);
    }
    println!("ok");
    Ok(())
}

async fn run_query(cfg: &Config, query: &str, cluster: &str, top_k: Option<usize>) -> Result<()> {
    let top_k = top_k.unwrap_or(cfg.retrieval.top_k);

    // Unscoped queries short-circuit before any provider or database work.
    if is_unscoped(cluster) {
        println!("(no grounding context)");
        return Ok(());
    }

    let embedder = create_embedder(&cfg.embedding)?;
    let store = SqliteStore::open(&cfg.db).await?;

    let context = find_relevant_content(query, cluster, embedder.as_ref(), &store, top_k).await;
    store.pool().close().await;

    if context.is_empty() {
        println!("(no grounding context)");
    } else {
        println!("{}", context);
    }
    Ok(())
}
