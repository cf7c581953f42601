//! # morsels
//!
//! Text chunking for question/answer dataset labeling.
//!
//! ## The Problem
//!
//! A labeling pipeline asks a language model to write question/answer pairs
//! about a piece of context. Whole documents don't fit in a prompt, and even
//! when they do, one giant context produces a handful of vague questions. The
//! document has to be cut into pieces ("chunks") small enough to prompt on,
//! but coherent enough that a question about one chunk has an answer inside
//! it.
//!
//! How to cut depends on the material. A scanned PDF with no punctuation
//! wants fixed windows; prose wants sentences or paragraphs; a corpus of
//! `---`-separated records wants a delimiter; a long survey wants its
//! sentences grouped by topic.
//!
//! ## Chunking Strategies
//!
//! | Method | Unit | Rule |
//! |--------|------|------|
//! | character | characters | windows of exactly N characters, last may be shorter |
//! | word | whitespace words | N words per chunk, rejoined with single spaces |
//! | sentence | `.` `!` `?` + whitespace | N sentences per chunk |
//! | paragraph | blank lines | one paragraph per chunk |
//! | delimiter | a literal string | one segment per chunk |
//! | tokens | tokenizer units | N tokens per chunk |
//! | semantic | sentence embeddings | K clusters of similar sentences |
//!
//! Every strategy trims its chunks and drops the ones left empty, so
//! whitespace-only input yields no chunks at all.
//!
//! ### Semantic (Embedding-Based)
//!
//! Embed every sentence, cluster the vectors into K groups with k-means, and
//! emit one chunk per cluster:
//!
//! ```text
//! Sentences:  [S0, S1, S2, S3, S4, S5]
//! Clusters:   {S0, S1, S4} {S2, S3} {S5}
//!
//! Chunks (ordered by each cluster's first sentence):
//!   "S0 S1 S4" | "S2 S3" | "S5"
//! ```
//!
//! Unlike the other strategies, a semantic chunk can gather sentences from
//! far apart in the document. The clustering is deterministic: initial
//! centroids are picked by farthest-first traversal starting from sentence 0,
//! and every tie goes to the lowest index.
//!
//! ## Quick Start
//!
//! ```rust
//! use morsels::{chunk, ChunkConfig};
//!
//! let chunks = chunk("one two three four five", &ChunkConfig::word(2), None).unwrap();
//! assert_eq!(chunks, ["one two", "three four", "five"]);
//!
//! let chunks = chunk("abcdefghij", &ChunkConfig::character(4), None).unwrap();
//! assert_eq!(chunks, ["abcd", "efgh", "ij"]);
//! ```
//!
//! ## Semantic Chunking
//!
//! The embedder is injected, so any model (or a deterministic stub) can back
//! it:
//!
//! ```rust
//! use std::sync::Arc;
//! use morsels::{Chunker, DocumentChunker, FnEmbedder, Strategy};
//!
//! let embedder = FnEmbedder::new(|s: &str| -> Result<Vec<f32>, String> {
//!     Ok(if s.contains("cat") { vec![1.0, 0.0] } else { vec![0.0, 1.0] })
//! });
//! let chunker = DocumentChunker::new(Strategy::semantic(2).unwrap())
//!     .with_embedder(Arc::new(embedder));
//!
//! let chunks = chunker
//!     .chunk("The cat sat. Rain fell. A cat purred. Rain stopped.")
//!     .unwrap();
//! assert_eq!(chunks, ["The cat sat. A cat purred.", "Rain fell. Rain stopped."]);
//! ```
//!
//! With the `semantic` feature, [`FastEmbedder`] runs a local BGE-small-en
//! model through fastembed. With the `tiktoken` feature, `TiktokenTokenizer`
//! replaces the whitespace approximation of the `tokens` strategy with real
//! BPE token counts.
//!
//! ## Logging
//!
//! Chunking emits `tracing` events under the `morsels` target (`debug` for
//! dispatch and results, `trace` for clustering). The crate never installs a
//! subscriber.

mod character;
mod delimiter;
mod embed;
mod engine;
mod error;
mod kmeans;
mod paragraph;
mod semantic;
mod sentence;
mod strategy;
mod tokens;
mod word;

pub use character::CharacterChunker;
pub use delimiter::{Delimiter, DelimiterChunker};
pub use embed::{Embedder, FnEmbedder};
pub use engine::DocumentChunker;
pub use error::{Error, Result};
pub use kmeans::{kmeans, Clustering, Distance};
pub use paragraph::ParagraphChunker;
pub use semantic::SemanticChunker;
pub use sentence::{split_sentences, SentenceChunker, SentenceSplitter};
pub use strategy::{ChunkConfig, Method, Strategy, DEFAULT_MAX_ITERATIONS};
pub use tokens::{TokenChunker, Tokenizer, WhitespaceTokenizer};
pub use word::WordChunker;

#[cfg(feature = "semantic")]
pub use embed::FastEmbedder;

#[cfg(feature = "tiktoken")]
pub use tokens::TiktokenTokenizer;

use std::sync::Arc;

/// A text chunking strategy.
///
/// All chunkers implement this trait, enabling polymorphic usage:
///
/// ```rust
/// use morsels::{Chunker, SentenceChunker, WordChunker};
///
/// fn chunk_document(chunker: &dyn Chunker, text: &str) -> Vec<String> {
///     chunker.chunk(text).unwrap()
/// }
///
/// let words = WordChunker::new(3).unwrap();
/// let sentences = SentenceChunker::new(1).unwrap();
///
/// let text = "Hello world. This is a test.";
/// assert_eq!(chunk_document(&words, text), ["Hello world. This", "is a test."]);
/// assert_eq!(chunk_document(&sentences, text), ["Hello world.", "This is a test."]);
/// ```
pub trait Chunker: Send + Sync {
    /// Split text into an ordered sequence of non-empty, trimmed chunks.
    ///
    /// # Errors
    ///
    /// Only chunkers with injected collaborators fail: the semantic chunker
    /// with [`Error::EmbeddingFailure`], a BPE token chunker with
    /// [`Error::Tokenizer`], and [`DocumentChunker`] with
    /// [`Error::InvalidConfiguration`] when a collaborator is missing.
    fn chunk(&self, text: &str) -> Result<Vec<String>>;

    /// Estimate the number of chunks for a given text length in bytes.
    ///
    /// Useful for pre-allocation. May be approximate.
    fn estimate_chunks(&self, text_len: usize) -> usize {
        // Conservative default
        (text_len / 500).max(1)
    }
}

/// Chunk `text` according to a flat [`ChunkConfig`].
///
/// The configuration is validated before the text is looked at. `embedder`
/// is only consulted for `method = semantic`, where it is required.
///
/// # Errors
///
/// [`Error::InvalidConfiguration`] for a bad configuration (or a semantic
/// configuration without an embedder); [`Error::EmbeddingFailure`] when the
/// embedder fails.
pub fn chunk(
    text: &str,
    config: &ChunkConfig,
    embedder: Option<Arc<dyn Embedder>>,
) -> Result<Vec<String>> {
    let mut chunker = DocumentChunker::from_config(config)?;
    if let Some(embedder) = embedder {
        chunker = chunker.with_embedder(embedder);
    }
    chunker.chunk(text)
}

/// Trim `segment` and keep it if anything is left.
pub(crate) fn push_trimmed(chunks: &mut Vec<String>, segment: &str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_owned());
    }
}
