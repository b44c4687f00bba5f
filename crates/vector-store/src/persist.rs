//! Durable storage for the flat index and metadata ledger.
//!
//! The index file is a little-endian binary layout (magic, format version,
//! dimension, count, then the vectors in insertion order) and round-trips
//! exactly. The ledger is a JSON array of records in insertion order. Saves
//! are best-effort: a durability failure must never unwind the in-memory
//! mutation that triggered it, so every failure on the save path is logged
//! and swallowed. Loads that fail for any reason fall back to empty
//! structures.

use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIndex;
use crate::ledger::MetadataLedger;
use crate::types::ChunkRecord;
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;

const INDEX_MAGIC: [u8; 4] = *b"PRIX";
const INDEX_FORMAT_VERSION: u32 = 1;

/// Persist both structures, best-effort. In-memory state stays authoritative
/// whether or not the on-disk copy was refreshed.
pub async fn save(
    index: &FlatIndex,
    ledger: &MetadataLedger,
    index_path: impl AsRef<Path>,
    ledger_path: impl AsRef<Path>,
) {
    let index_path = index_path.as_ref();
    if let Err(e) = write_index(index, index_path).await {
        log::warn!(
            "Failed to persist vector index to {} (in-memory state unaffected): {e}",
            index_path.display()
        );
    }

    let ledger_path = ledger_path.as_ref();
    if let Err(e) = write_ledger(ledger, ledger_path).await {
        log::warn!(
            "Failed to persist metadata ledger to {} (in-memory state unaffected): {e}",
            ledger_path.display()
        );
    }
}

/// Load the persisted pair, or start empty.
///
/// Any load failure — missing file, corrupt bytes, a persisted dimension
/// different from `dimension`, or an index/ledger length disagreement —
/// discards the stale data and returns empty structures of the requested
/// dimension. Stale-data discards are logged at `warn` so operators can see
/// them; they are not errors.
pub async fn open_or_create(
    dimension: usize,
    index_path: impl AsRef<Path>,
    ledger_path: impl AsRef<Path>,
) -> (FlatIndex, MetadataLedger) {
    let index_path = index_path.as_ref();
    let ledger_path = ledger_path.as_ref();

    let index = match read_index(index_path).await {
        Ok(index) => index,
        Err(VectorStoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            log::info!(
                "No persisted index at {}, starting empty (dim {dimension})",
                index_path.display()
            );
            return (FlatIndex::new(dimension), MetadataLedger::new());
        }
        Err(e) => {
            log::warn!(
                "Discarding unreadable index at {}: {e}",
                index_path.display()
            );
            return (FlatIndex::new(dimension), MetadataLedger::new());
        }
    };

    if index.dimension() != dimension {
        log::warn!(
            "Persisted index at {} has dim {}, embedder reports dim {dimension}; discarding stale index",
            index_path.display(),
            index.dimension()
        );
        return (FlatIndex::new(dimension), MetadataLedger::new());
    }

    let ledger = match read_ledger(ledger_path).await {
        Ok(ledger) => ledger,
        Err(e) => {
            log::warn!(
                "Discarding index at {}: metadata ledger at {} is unreadable ({e})",
                index_path.display(),
                ledger_path.display()
            );
            return (FlatIndex::new(dimension), MetadataLedger::new());
        }
    };

    if ledger.len() != index.len() {
        log::warn!(
            "Persisted index holds {} vectors but ledger holds {} records; discarding both",
            index.len(),
            ledger.len()
        );
        return (FlatIndex::new(dimension), MetadataLedger::new());
    }

    log::info!(
        "Loaded {} vectors (dim {dimension}) from {}",
        index.len(),
        index_path.display()
    );
    (index, ledger)
}

pub async fn write_index(index: &FlatIndex, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = encode_index(index);
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

pub async fn read_index(path: impl AsRef<Path>) -> Result<FlatIndex> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    decode_index(&bytes)
}

pub async fn write_ledger(ledger: &MetadataLedger, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(ledger.records())?;
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

pub async fn read_ledger(path: impl AsRef<Path>) -> Result<MetadataLedger> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let records: Vec<ChunkRecord> = serde_json::from_slice(&bytes)?;
    Ok(MetadataLedger::from_records(records))
}

fn tmp_path(path: &Path) -> std::path::PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    std::path::PathBuf::from(os)
}

fn encode_index(index: &FlatIndex) -> Vec<u8> {
    let dimension = index.dimension();
    let count = index.len();
    let mut bytes = Vec::with_capacity(20 + count * dimension * 4);

    bytes.extend_from_slice(&INDEX_MAGIC);
    bytes.extend_from_slice(&INDEX_FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(dimension as u32).to_le_bytes());
    bytes.extend_from_slice(&(count as u64).to_le_bytes());
    for vector in index.vectors() {
        for value in vector {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    bytes
}

fn decode_index(bytes: &[u8]) -> Result<FlatIndex> {
    let mut cursor = Cursor { bytes, offset: 0 };

    let magic = cursor.take::<4>()?;
    if magic != INDEX_MAGIC {
        return Err(corrupt("bad magic"));
    }
    let version = u32::from_le_bytes(cursor.take::<4>()?);
    if version != INDEX_FORMAT_VERSION {
        return Err(corrupt(&format!("unsupported format version {version}")));
    }

    let dimension = u32::from_le_bytes(cursor.take::<4>()?) as usize;
    if dimension == 0 {
        return Err(corrupt("zero dimension"));
    }
    let count = u64::from_le_bytes(cursor.take::<8>()?) as usize;

    let expected_len = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| corrupt("vector payload overflows"))?;
    if cursor.remaining() != expected_len {
        return Err(corrupt(&format!(
            "expected {expected_len} payload bytes, found {}",
            cursor.remaining()
        )));
    }

    let mut vectors = Vec::with_capacity(count);
    for _ in 0..count {
        let mut vector = Vec::with_capacity(dimension);
        for _ in 0..dimension {
            vector.push(f32::from_le_bytes(cursor.take::<4>()?));
        }
        vectors.push(vector);
    }

    FlatIndex::from_vectors(dimension, vectors)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Cursor<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self
            .offset
            .checked_add(N)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| corrupt("truncated index file"))?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.offset..end]);
        self.offset = end;
        Ok(out)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

fn corrupt(detail: &str) -> VectorStoreError {
    VectorStoreError::Io(IoError::new(
        ErrorKind::InvalidData,
        format!("corrupt index file: {detail}"),
    ))
}
