use paperrag_text_chunker::DEFAULT_CHUNK_SIZE;
use paperrag_vector_store::DEFAULT_MODEL_ID;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_INDEX_PATH: &str = "paperrag.index";
pub const DEFAULT_METADATA_PATH: &str = "metadata.json";

/// Pipeline configuration. Every field has a default and can be set
/// directly; `from_env` fills it from the process environment.
#[derive(Debug, Clone)]
pub struct RagConfig {
    pub model_id: String,
    pub index_path: PathBuf,
    pub metadata_path: PathBuf,
    pub chunk_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            metadata_path: PathBuf::from(DEFAULT_METADATA_PATH),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl RagConfig {
    /// Read configuration from the environment. The `PAPERRAG_*` names are
    /// preferred; the bare legacy names are honored as fallbacks.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let model_id = env_or("PAPERRAG_EMBEDDING_MODEL", "EMBED_MODEL")
            .unwrap_or(defaults.model_id);
        let index_path = env_or("PAPERRAG_INDEX_PATH", "INDEX_PATH")
            .map_or(defaults.index_path, PathBuf::from);
        let metadata_path = env_or("PAPERRAG_METADATA_PATH", "METADATA_PATH")
            .map_or(defaults.metadata_path, PathBuf::from);

        let chunk_size = match env::var("PAPERRAG_CHUNK_SIZE") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    log::warn!(
                        "Ignoring invalid PAPERRAG_CHUNK_SIZE '{raw}', using {}",
                        defaults.chunk_size
                    );
                    defaults.chunk_size
                }
            },
            Err(_) => defaults.chunk_size,
        };

        Self {
            model_id,
            index_path,
            metadata_path,
            chunk_size,
        }
    }
}

fn env_or(primary: &str, legacy: &str) -> Option<String> {
    env::var(primary).or_else(|_| env::var(legacy)).ok()
}
