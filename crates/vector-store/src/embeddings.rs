use crate::error::{Result, VectorStoreError};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::task::spawn_blocking;

/// Encoder seam between the pipeline and the external embedding capability.
///
/// Implementations must be deterministic per input and report a fixed
/// dimension for the lifetime of the instance. `encode_batch` is
/// order-preserving: output `i` embeds input `i`.
pub trait EncodeBackend: Send + Sync {
    fn dimension(&self) -> usize;
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Handle to the embedding capability.
///
/// The backend is materialized lazily on first use and reused for the life
/// of this handle. Construction itself never fails; an unusable model id
/// surfaces as `EmbeddingUnavailable` from the first call that needs the
/// backend, and is not retried internally.
pub struct EmbeddingModel {
    model_id: String,
    backend: OnceCell<Arc<dyn EncodeBackend>>,
}

impl EmbeddingModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: normalize_model_id(&model_id.into()),
            backend: OnceCell::new(),
        }
    }

    /// Build a gateway around an already-constructed backend. This is the
    /// injection point for hosts with a real encoder and for test doubles.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn EncodeBackend>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(backend);
        Self {
            model_id: "injected".to_string(),
            backend: cell,
        }
    }

    fn backend(&self) -> Result<&Arc<dyn EncodeBackend>> {
        self.backend.get_or_try_init(|| {
            let backend = build_backend(&self.model_id)?;
            log::info!(
                "Initialized embedding backend '{}' (dim {})",
                self.model_id,
                backend.dimension()
            );
            Ok(backend)
        })
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Embedding dimension. Materializes the backend on first call.
    pub fn dimension(&self) -> Result<usize> {
        Ok(self.backend()?.dimension())
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(vec![text]).await?;
        embeddings.pop().ok_or_else(|| {
            VectorStoreError::EmbeddingUnavailable("Empty embedding result".to_string())
        })
    }

    /// Embed a batch of texts, order-preserving. Encoding runs on a blocking
    /// task so CPU-bound work stays off the async scheduler.
    pub async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let backend = self.backend()?.clone();
        let owned: Vec<String> = texts.into_iter().map(ToString::to_string).collect();
        spawn_blocking(move || backend.encode_batch(&owned))
            .await
            .map_err(|e| VectorStoreError::EmbeddingUnavailable(format!("Join error: {e}")))?
    }
}

pub const DEFAULT_MODEL_ID: &str = "hash-384";

fn normalize_model_id(raw: &str) -> String {
    let model_id = raw.trim().to_ascii_lowercase();
    match model_id.as_str() {
        // Historical deployments named the sentence-transformers model; its
        // local stand-in has the same dimension.
        "sentence-transformers/all-minilm-l6-v2" | "all-minilm-l6-v2" => "hash-384".to_string(),
        other => other.to_string(),
    }
}

fn build_backend(model_id: &str) -> Result<Arc<dyn EncodeBackend>> {
    if let Some(dim) = model_id.strip_prefix("hash-") {
        let dimension: usize = dim.parse().map_err(|_| {
            VectorStoreError::EmbeddingUnavailable(format!(
                "Invalid hash embedding dimension in model id '{model_id}'"
            ))
        })?;
        if dimension == 0 {
            return Err(VectorStoreError::EmbeddingUnavailable(format!(
                "Embedding dimension must be positive (model id '{model_id}')"
            )));
        }
        return Ok(Arc::new(HashBackend::new(dimension)));
    }

    Err(VectorStoreError::EmbeddingUnavailable(format!(
        "Unknown embedding model id '{model_id}' (expected 'hash-<dimension>')"
    )))
}

/// Deterministic local embedder: hashes each text into a unit vector.
///
/// Not a semantic model — it exists so the pipeline runs hermetically (and
/// deterministically, which the ranking tests rely on) without the external
/// capability. Hosts plug a real encoder through `EncodeBackend`.
pub struct HashBackend {
    dimension: usize,
}

impl HashBackend {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EncodeBackend for HashBackend {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| hash_embed(text, self.dimension))
            .collect())
    }
}

/// Expand a text into a normalized pseudo-random vector seeded by its hash.
#[must_use]
pub fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        dimension: usize,
        calls: AtomicUsize,
    }

    impl EncodeBackend for CountingBackend {
        fn dimension(&self) -> usize {
            self.dimension
        }

        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(texts.iter().map(|t| hash_embed(t, self.dimension)).collect())
        }
    }

    #[tokio::test]
    async fn embed_batch_preserves_order() {
        let model = EmbeddingModel::new("hash-16");
        let texts = vec!["alpha", "beta", "gamma"];
        let embeddings = model.embed_batch(texts.clone()).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for (text, embedding) in texts.iter().zip(&embeddings) {
            assert_eq!(embedding, &hash_embed(text, 16));
        }
    }

    #[tokio::test]
    async fn embed_is_deterministic_per_input() {
        let model = EmbeddingModel::new("hash-32");
        let first = model.embed("attention is all you need").await.unwrap();
        let second = model.embed("attention is all you need").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
    }

    #[tokio::test]
    async fn empty_batch_short_circuits_without_backend_calls() {
        let backend = Arc::new(CountingBackend {
            dimension: 8,
            calls: AtomicUsize::new(0),
        });
        let model = EmbeddingModel::with_backend(backend.clone());

        let embeddings = model.embed_batch(Vec::new()).await.unwrap();
        assert!(embeddings.is_empty());
        assert_eq!(backend.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn unknown_model_id_is_embedding_unavailable() {
        let model = EmbeddingModel::new("bge-small");
        let err = model.dimension().unwrap_err();
        assert!(matches!(err, VectorStoreError::EmbeddingUnavailable(_)));
    }

    #[test]
    fn zero_dimension_model_id_is_rejected() {
        let model = EmbeddingModel::new("hash-0");
        assert!(model.dimension().is_err());
    }

    #[test]
    fn model_id_aliases_normalize() {
        let model = EmbeddingModel::new("sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(model.model_id(), "hash-384");
        assert_eq!(model.dimension().unwrap(), 384);
    }

    #[test]
    fn hash_embeddings_are_unit_vectors() {
        let embedding = hash_embed("hello world", 64);
        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
