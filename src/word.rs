//! Word-count chunking.
//!
//! Splits on whitespace and groups N words per chunk. Runs of spaces, tabs,
//! and newlines all collapse to a single space in the output, so a chunk is
//! exactly its words joined by `' '`.
//!
//! ```text
//! words_per_chunk = 2
//!
//! "one two   three\nfour five"
//!   -> ["one two", "three four", "five"]
//! ```

use std::num::NonZeroUsize;

use crate::strategy::positive;
use crate::{Chunker, Result};

/// Word-count chunker.
///
/// ## Example
///
/// ```rust
/// use morsels::{Chunker, WordChunker};
///
/// let chunker = WordChunker::new(2).unwrap();
/// let chunks = chunker.chunk("one two three four five").unwrap();
/// assert_eq!(chunks, ["one two", "three four", "five"]);
/// ```
#[derive(Debug, Clone)]
pub struct WordChunker {
    words_per_chunk: NonZeroUsize,
}

impl WordChunker {
    /// Create a chunker grouping `words_per_chunk` words.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if `words_per_chunk == 0`.
    pub fn new(words_per_chunk: usize) -> Result<Self> {
        Ok(Self::with_count(positive("words_per_chunk", words_per_chunk)?))
    }

    /// Create a chunker from an already-validated count.
    pub const fn with_count(words_per_chunk: NonZeroUsize) -> Self {
        Self { words_per_chunk }
    }
}

impl Chunker for WordChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        Ok(group_units(text.split_whitespace(), self.words_per_chunk))
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        // ~6 bytes per English word including the space
        (text_len / 6 / self.words_per_chunk.get()).max(1)
    }
}

/// Group consecutive units `per_chunk` at a time, joining each group with a
/// single space. Units must already be trimmed and non-empty.
pub(crate) fn group_units<'a>(
    units: impl IntoIterator<Item = &'a str>,
    per_chunk: NonZeroUsize,
) -> Vec<String> {
    let units: Vec<&str> = units.into_iter().collect();
    units
        .chunks(per_chunk.get())
        .map(|group| group.join(" "))
        .collect()
}
