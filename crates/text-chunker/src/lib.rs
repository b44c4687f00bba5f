//! # Paperrag Text Chunker
//!
//! Fixed-window text chunking for embedding and retrieval.
//!
//! ## Philosophy
//!
//! Chunks are the unit of embedding: each one must be small enough for the
//! embedding model, non-empty, and reconstructable in order. The chunker is
//! deliberately a pure function — no configuration state, no I/O, no error
//! conditions — so the ingestion pipeline can call it without ceremony.
//!
//! ## Architecture
//!
//! ```text
//! Raw Text
//!     │
//!     ├──> Character Windows (at most `size` scalar values each)
//!     │
//!     ├──> Whitespace Trim (per window)
//!     │
//!     └──> Drop Empty Windows
//!          └─> Vec<String>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use paperrag_text_chunker::chunk_text;
//!
//! let chunks = chunk_text("attention is all you need", 10);
//! assert_eq!(chunks, vec!["attention", "is all you", "need"]);
//! ```

mod chunker;

pub use chunker::{chunk_text, TextChunker, DEFAULT_CHUNK_SIZE};
