use serde::{Deserialize, Serialize};

/// Metadata for one stored vector: the owning document and the chunk text.
///
/// The shape is fixed at construction; the serialized field name `paper_id`
/// keeps metadata files readable by earlier deployments of this pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    #[serde(rename = "paper_id")]
    pub document_id: i64,
    pub chunk: String,
}

impl ChunkRecord {
    #[must_use]
    pub fn new(document_id: i64, chunk: impl Into<String>) -> Self {
        Self {
            document_id,
            chunk: chunk.into(),
        }
    }
}
