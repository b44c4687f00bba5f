//! # Paperrag Retrieval
//!
//! Ingestion and retrieval orchestration over the chunker, embedding
//! gateway, flat index, and metadata ledger.
//!
//! ## Data flow
//!
//! ```text
//! Ingest: text ──> chunker ──> embed batch ──> FlatIndex.add
//!                                   │              └─ paired ─ MetadataLedger.append
//!                                   │                               │
//!                                   └───────── persist::save ◄──────┘
//!
//! Query:  query ──> embed ──> FlatIndex.search ──> ledger lookup ──> ranked ChunkRecords
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use paperrag_retrieval::{RagConfig, RagEngine};
//! use paperrag_vector_store::EmbeddingModel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RagConfig::from_env();
//!     let embedder = EmbeddingModel::new(&config.model_id);
//!     let mut engine = RagEngine::open(config, embedder).await?;
//!
//!     engine.ingest(1, "Attention is all you need. …").await?;
//!
//!     for record in engine.retrieve("what is attention?", 5).await? {
//!         println!("[doc {}] {}", record.document_id, record.chunk);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod engine;
mod error;

pub use config::{RagConfig, DEFAULT_INDEX_PATH, DEFAULT_METADATA_PATH};
pub use engine::RagEngine;
pub use error::{RetrievalError, Result};

// Re-export the record type callers get back from retrieval.
pub use paperrag_vector_store::ChunkRecord;
