//! Fixed-width character chunking.
//!
//! The simplest chunking strategy: cut every N characters, no overlap, no
//! regard for word boundaries.
//!
//! ## How It Works
//!
//! ```text
//! size = 4
//!
//! Document: "abcdefghij"
//!
//! Chunk 0: "abcd"
//! Chunk 1: "efgh"
//! Chunk 2: "ij"      <- final chunk may be shorter
//! ```
//!
//! Width is counted in Unicode scalar values, not bytes, so a window never
//! splits a multibyte character. Each window is trimmed afterwards; a window
//! that was nothing but whitespace disappears. Internal whitespace is kept
//! as-is.
//!
//! **When to use**: extracted text with unreliable punctuation (scanned PDFs,
//! tables flattened to text), or when prompt size must be tightly bounded.
//! **Weakness**: happily cuts a word or a number in half.

use std::num::NonZeroUsize;

use crate::strategy::positive;
use crate::{push_trimmed, Chunker, Result};

/// Fixed-width character chunker.
///
/// ## Example
///
/// ```rust
/// use morsels::{CharacterChunker, Chunker};
///
/// let chunker = CharacterChunker::new(4).unwrap();
/// let chunks = chunker.chunk("abcdefghij").unwrap();
/// assert_eq!(chunks, ["abcd", "efgh", "ij"]);
/// ```
#[derive(Debug, Clone)]
pub struct CharacterChunker {
    size: NonZeroUsize,
}

impl CharacterChunker {
    /// Create a chunker producing windows of `size` characters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if `size == 0`.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self::with_size(positive("chunk_size", size)?))
    }

    /// Create a chunker from an already-validated size.
    pub const fn with_size(size: NonZeroUsize) -> Self {
        Self { size }
    }
}

impl Chunker for CharacterChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let size = self.size.get();
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut count = 0;

        for (idx, _) in text.char_indices() {
            if count == size {
                push_trimmed(&mut chunks, &text[start..idx]);
                start = idx;
                count = 0;
            }
            count += 1;
        }

        // Final (possibly short) window
        if start < text.len() {
            push_trimmed(&mut chunks, &text[start..]);
        }

        Ok(chunks)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        text_len.div_ceil(self.size.get())
    }
}
