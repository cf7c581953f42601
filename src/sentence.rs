//! Sentence-based chunking.
//!
//! Splits text on sentence boundaries, grouping N sentences per chunk.
//!
//! ## Finding Sentences
//!
//! The default splitter is deliberately simple: a sentence ends at `.`, `!`,
//! or `?` when the next character is whitespace or the end of the text.
//!
//! ```text
//! "It costs 3.50 now. Really? Yes!"
//!            ^        ^       ^   ^
//!            |        boundaries (followed by space / end)
//!            not a boundary (followed by '5')
//! ```
//!
//! It knows nothing about abbreviations:
//!
//! ```text
//! "Dr. Smith arrived."  ->  ["Dr.", "Smith arrived."]
//! ```
//!
//! [`SentenceSplitter::Unicode`] switches to Unicode Standard Annex #29
//! segmentation, which copes better with quotes and closing brackets. It is
//! opt-in.
//!
//! ## Why Group Sentences?
//!
//! Single sentences are often too short to ask a good question about.
//! Typical settings:
//! - `sentences_per_chunk = 3-5` for dense technical content
//! - `sentences_per_chunk = 5-10` for narrative prose

use std::num::NonZeroUsize;

use unicode_segmentation::UnicodeSegmentation;

use crate::strategy::positive;
use crate::word::group_units;
use crate::{Chunker, Result};

/// How sentence boundaries are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SentenceSplitter {
    /// `.`, `!`, or `?` followed by whitespace or end of text.
    #[default]
    Punctuation,
    /// Unicode sentence boundaries (UAX #29).
    Unicode,
}

/// Split `text` into trimmed, non-empty sentences.
///
/// Each sentence keeps its terminal punctuation. Text after the last
/// terminator becomes a final sentence of its own.
///
/// ```rust
/// use morsels::{split_sentences, SentenceSplitter};
///
/// let sentences = split_sentences("Hi there. How are you? fine", SentenceSplitter::Punctuation);
/// assert_eq!(sentences, ["Hi there.", "How are you?", "fine"]);
/// ```
pub fn split_sentences(text: &str, splitter: SentenceSplitter) -> Vec<&str> {
    match splitter {
        SentenceSplitter::Punctuation => split_on_terminators(text),
        SentenceSplitter::Unicode => text
            .split_sentence_bounds()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
    }
}

fn split_on_terminators(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            let end = idx + c.len_utf8();
            push_sentence(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

/// Sentence-based chunker.
///
/// Groups consecutive sentences into chunks, joined by a single space.
///
/// ## Example
///
/// ```rust
/// use morsels::{Chunker, SentenceChunker};
///
/// let chunker = SentenceChunker::new(2).unwrap();
/// let text = "First sentence. Second sentence. Third sentence.";
/// let chunks = chunker.chunk(text).unwrap();
///
/// assert_eq!(chunks, ["First sentence. Second sentence.", "Third sentence."]);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    sentences_per_chunk: NonZeroUsize,
    splitter: SentenceSplitter,
}

impl SentenceChunker {
    /// Create a new sentence chunker.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if
    /// `sentences_per_chunk == 0`.
    pub fn new(sentences_per_chunk: usize) -> Result<Self> {
        Ok(Self::with_count(positive(
            "sentences_per_chunk",
            sentences_per_chunk,
        )?))
    }

    /// Create a chunker from an already-validated count.
    pub const fn with_count(sentences_per_chunk: NonZeroUsize) -> Self {
        Self {
            sentences_per_chunk,
            splitter: SentenceSplitter::Punctuation,
        }
    }

    /// Create a chunker that outputs one sentence per chunk.
    pub const fn single() -> Self {
        Self::with_count(NonZeroUsize::MIN)
    }

    /// Use a different sentence boundary detector.
    #[must_use]
    pub const fn with_splitter(mut self, splitter: SentenceSplitter) -> Self {
        self.splitter = splitter;
        self
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let sentences = split_sentences(text, self.splitter);
        Ok(group_units(sentences, self.sentences_per_chunk))
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        // Rough estimate: ~100 chars per sentence
        let estimated_sentences = text_len / 100;
        (estimated_sentences / self.sentences_per_chunk.get()).max(1)
    }
}
