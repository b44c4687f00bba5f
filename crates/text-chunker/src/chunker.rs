/// Default chunk window, in Unicode scalar values.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split `text` into consecutive, non-overlapping windows of at most `size`
/// characters (Unicode scalar values, not bytes, so the boundaries are the
/// same regardless of the input's byte encoding).
///
/// Each window is trimmed of leading/trailing whitespace; windows that end up
/// empty are dropped, so the output can be shorter than `text.len() / size`.
/// Empty or whitespace-only input yields an empty vec, as does `size == 0`.
#[must_use]
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|window| window.iter().collect::<String>().trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Chunker carrying a configured window size.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    size: usize,
}

impl TextChunker {
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Chunk `text` with this chunker's window size.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.size)
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}
