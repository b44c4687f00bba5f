use crate::config::RagConfig;
use crate::error::Result;
use paperrag_text_chunker::TextChunker;
use paperrag_vector_store::{
    persist, ChunkRecord, EmbeddingModel, FlatIndex, MetadataLedger,
};
use std::path::PathBuf;

/// The ingestion and retrieval pipeline: chunker, embedding gateway, flat
/// index, and metadata ledger behind one owner.
///
/// An engine is the single logical owner of its index and ledger; methods
/// take `&self`/`&mut self` and there is no internal locking. Hosts that
/// want concurrent ingestion serialize calls externally.
pub struct RagEngine {
    chunker: TextChunker,
    embedder: EmbeddingModel,
    index: FlatIndex,
    ledger: MetadataLedger,
    index_path: PathBuf,
    metadata_path: PathBuf,
}

impl RagEngine {
    /// Open an engine: resolve the gateway dimension, then load the
    /// persisted index/ledger pair or start empty.
    pub async fn open(config: RagConfig, embedder: EmbeddingModel) -> Result<Self> {
        let dimension = embedder.dimension()?;
        let (index, ledger) =
            persist::open_or_create(dimension, &config.index_path, &config.metadata_path).await;

        log::info!(
            "Opened engine: model '{}', dim {dimension}, {} chunks indexed",
            embedder.model_id(),
            index.len()
        );

        Ok(Self {
            chunker: TextChunker::new(config.chunk_size),
            embedder,
            index,
            ledger,
            index_path: config.index_path,
            metadata_path: config.metadata_path,
        })
    }

    /// Convenience: environment-driven config and embedder.
    pub async fn from_env() -> Result<Self> {
        let config = RagConfig::from_env();
        let embedder = EmbeddingModel::new(&config.model_id);
        Self::open(config, embedder).await
    }

    /// Ingest one document's text: chunk, embed, append vectors and records
    /// in lock-step, then persist best-effort. Returns the number of chunks
    /// stored.
    ///
    /// `document_id` is an opaque caller-owned identifier; it is stored and
    /// echoed, never validated or dereferenced here.
    pub async fn ingest(&mut self, document_id: i64, text: &str) -> Result<usize> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            log::debug!("Document {document_id} produced no chunks, nothing to ingest");
            return Ok(0);
        }

        log::info!(
            "Ingesting document {document_id}: {} chunks of ≤{} chars",
            chunks.len(),
            self.chunker.size()
        );

        let contents: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(contents).await?;

        // The index validates the whole batch before mutating, so a failure
        // here leaves both structures exactly as they were.
        self.index.add(vectors)?;

        let stored = chunks.len();
        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .map(|chunk| ChunkRecord::new(document_id, chunk))
            .collect();
        self.ledger.append(records);
        debug_assert_eq!(self.index.len(), self.ledger.len());

        persist::save(&self.index, &self.ledger, &self.index_path, &self.metadata_path).await;

        log::info!("Document {document_id} ingested, total {} chunks", self.index.len());
        Ok(stored)
    }

    /// Retrieve the `min(top_k, count)` chunks nearest to `query`, ranked by
    /// ascending distance.
    ///
    /// An empty index returns immediately without touching the embedding
    /// gateway. Positions the ledger cannot resolve are skipped.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<ChunkRecord>> {
        if self.index.is_empty() {
            log::debug!("Index is empty, returning no results for '{query}'");
            return Ok(Vec::new());
        }

        log::debug!("Retrieving top {top_k} for '{query}'");
        let query_vector = self.embedder.embed(query).await?;

        let k = top_k.min(self.index.len());
        let hits = self.index.search(&query_vector, k)?;

        let results: Vec<ChunkRecord> = hits
            .into_iter()
            .filter_map(|(position, _distance)| self.ledger.get(position).cloned())
            .collect();

        log::debug!("Found {} results", results.len());
        Ok(results)
    }

    /// Number of chunks currently indexed.
    #[must_use]
    pub fn count(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.index.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperrag_vector_store::{EncodeBackend, VectorStoreError};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, chunk_size: usize) -> RagConfig {
        RagConfig {
            model_id: "hash-16".to_string(),
            index_path: dir.path().join("paperrag.index"),
            metadata_path: dir.path().join("metadata.json"),
            chunk_size,
        }
    }

    #[tokio::test]
    async fn ingest_keeps_index_and_ledger_in_lock_step() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 10);
        let mut engine = RagEngine::open(config.clone(), EmbeddingModel::new("hash-16"))
            .await
            .unwrap();

        let stored = engine.ingest(42, "the quick brown fox jumps over").await.unwrap();
        assert!(stored > 0);
        assert_eq!(engine.count(), stored);

        let results = engine.retrieve("quick fox", stored).await.unwrap();
        assert_eq!(results.len(), stored);
        assert!(results.iter().all(|r| r.document_id == 42));
    }

    #[tokio::test]
    async fn empty_text_ingests_nothing() {
        let dir = TempDir::new().unwrap();
        let mut engine = RagEngine::open(test_config(&dir, 100), EmbeddingModel::new("hash-16"))
            .await
            .unwrap();

        assert_eq!(engine.ingest(1, "   \n\t ").await.unwrap(), 0);
        assert_eq!(engine.count(), 0);
        assert!(!dir.path().join("paperrag.index").exists());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 12);

        let mut engine = RagEngine::open(config.clone(), EmbeddingModel::new("hash-16"))
            .await
            .unwrap();
        engine.ingest(7, "persistent text worth keeping").await.unwrap();
        let count = engine.count();
        drop(engine);

        let reopened = RagEngine::open(config, EmbeddingModel::new("hash-16"))
            .await
            .unwrap();
        assert_eq!(reopened.count(), count);
        let results = reopened.retrieve("persistent", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, 7);
    }

    /// Backend that reports one dimension but emits vectors of another,
    /// modeling an embedder that disagrees with the index it feeds.
    struct MisbehavingBackend;

    impl EncodeBackend for MisbehavingBackend {
        fn dimension(&self) -> usize {
            4
        }

        fn encode_batch(
            &self,
            texts: &[String],
        ) -> paperrag_vector_store::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0; 3]).collect())
        }
    }

    #[tokio::test]
    async fn dimension_mismatch_leaves_no_partial_state() {
        let dir = TempDir::new().unwrap();
        let embedder = EmbeddingModel::with_backend(Arc::new(MisbehavingBackend));
        let mut engine = RagEngine::open(test_config(&dir, 50), embedder).await.unwrap();

        let err = engine.ingest(1, "some text to ingest").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::RetrievalError::Store(VectorStoreError::DimensionMismatch { .. })
        ));
        assert_eq!(engine.count(), 0);
        assert!(engine.retrieve("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn top_k_zero_returns_nothing() {
        let dir = TempDir::new().unwrap();
        let mut engine = RagEngine::open(test_config(&dir, 100), EmbeddingModel::new("hash-16"))
            .await
            .unwrap();
        engine.ingest(1, "some indexed content").await.unwrap();

        assert!(engine.retrieve("content", 0).await.unwrap().is_empty());
    }
}
