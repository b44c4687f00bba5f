//! # Paperrag Vector Store
//!
//! Vector storage and similarity search for document chunk embeddings.
//!
//! ## Features
//!
//! - **Deterministic ranking** via brute-force squared-L2 search with
//!   insertion-order tie-breaks
//! - **Paired metadata** — one [`ChunkRecord`] per stored vector, positions
//!   always in lock-step
//! - **Durable storage** — binary index file + JSON ledger, best-effort
//!   saves, discard-on-mismatch loads
//! - **Pluggable embedding** behind the [`EncodeBackend`] seam, with a
//!   lazily-initialized gateway handle
//!
//! ## Architecture
//!
//! ```text
//! Chunk text[]
//!     │
//!     ├──> EmbeddingModel (EncodeBackend, lazy init)
//!     │      └─> Vec<f32> × dimension
//!     │
//!     ├──> FlatIndex.add ──── paired ──── MetadataLedger.append
//!     │      └─> squared-L2 search               └─> position lookup
//!     │
//!     └──> persist::save / persist::open_or_create
//!            └─> binary index file + JSON ledger
//! ```
//!
//! ## Example
//!
//! ```rust
//! use paperrag_vector_store::{ChunkRecord, FlatIndex, MetadataLedger};
//!
//! let mut index = FlatIndex::new(2);
//! let mut ledger = MetadataLedger::new();
//!
//! index.add(vec![vec![1.0, 0.0], vec![0.0, 1.0]])?;
//! ledger.append(vec![
//!     ChunkRecord::new(1, "first chunk"),
//!     ChunkRecord::new(1, "second chunk"),
//! ]);
//!
//! let hits = index.search(&[0.9, 0.1], 1)?;
//! assert_eq!(hits[0].0, 0);
//! assert_eq!(ledger.get(hits[0].0).unwrap().document_id, 1);
//! # Ok::<(), paperrag_vector_store::VectorStoreError>(())
//! ```

mod embeddings;
mod error;
mod flat_index;
mod ledger;
pub mod persist;
mod types;

pub use embeddings::{hash_embed, EmbeddingModel, EncodeBackend, HashBackend, DEFAULT_MODEL_ID};
pub use error::{Result, VectorStoreError};
pub use flat_index::FlatIndex;
pub use ledger::MetadataLedger;
pub use types::ChunkRecord;
