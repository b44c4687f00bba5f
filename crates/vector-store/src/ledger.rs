use crate::types::ChunkRecord;

/// Ordered metadata records, one per stored vector.
///
/// Position `p` here corresponds to position `p` in the flat index; appends
/// are paired with index appends by the caller and nothing is ever removed
/// or reordered.
#[derive(Debug, Clone, Default)]
pub struct MetadataLedger {
    records: Vec<ChunkRecord>,
}

impl MetadataLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_records(records: Vec<ChunkRecord>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, records: Vec<ChunkRecord>) {
        self.records.extend(records);
    }

    /// Record at `position`, or `None` when out of range. Out-of-range reads
    /// are a skip condition on the retrieval path, never a failure.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&ChunkRecord> {
        self.records.get(position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }
}
