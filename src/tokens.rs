//! Token-count chunking.
//!
//! Groups N tokenizer units per chunk. Without a real tokenizer the units
//! are whitespace-separated words, a rough stand-in for model tokens (English
//! prose runs about 1.3 BPE tokens per word), so a chunk of N "tokens" may
//! cost the model somewhat more than N.
//!
//! Plug in a [`Tokenizer`] for exact counts. With the `tiktoken` feature,
//! `TiktokenTokenizer` groups real BPE token ids and decodes each group back
//! to text:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use morsels::{Chunker, TiktokenTokenizer, TokenChunker};
//!
//! let tokenizer = TiktokenTokenizer::for_model("gpt-4o-mini")?;
//! let chunker = TokenChunker::new(256)?.with_tokenizer(Arc::new(tokenizer));
//! let chunks = chunker.chunk(document)?;
//! ```

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::strategy::positive;
use crate::word::group_units;
use crate::{Chunker, Result};

/// Splits text into groups of at most N tokens.
///
/// Implementations must be deterministic and return trimmed, non-empty
/// chunks in source order.
pub trait Tokenizer: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;

    /// Split `text` into consecutive groups of `tokens_per_chunk` tokens;
    /// the final group may be shorter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Tokenizer`] if a group cannot be turned back
    /// into text.
    fn split(&self, text: &str, tokens_per_chunk: NonZeroUsize) -> Result<Vec<String>>;
}

/// Whitespace approximation: one token per whitespace-separated word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn split(&self, text: &str, tokens_per_chunk: NonZeroUsize) -> Result<Vec<String>> {
        Ok(group_units(text.split_whitespace(), tokens_per_chunk))
    }
}

/// Token-count chunker.
///
/// ## Example
///
/// ```rust
/// use morsels::{Chunker, TokenChunker};
///
/// let chunker = TokenChunker::new(3).unwrap();
/// let chunks = chunker.chunk("a b c d e f g").unwrap();
/// assert_eq!(chunks, ["a b c", "d e f", "g"]);
/// ```
#[derive(Clone)]
pub struct TokenChunker {
    tokens_per_chunk: NonZeroUsize,
    tokenizer: Arc<dyn Tokenizer>,
}

impl TokenChunker {
    /// Create a chunker of `tokens_per_chunk` whitespace tokens.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if
    /// `tokens_per_chunk == 0`.
    pub fn new(tokens_per_chunk: usize) -> Result<Self> {
        Ok(Self::with_count(positive("tokens_per_chunk", tokens_per_chunk)?))
    }

    /// Create a chunker from an already-validated count.
    pub fn with_count(tokens_per_chunk: NonZeroUsize) -> Self {
        Self {
            tokens_per_chunk,
            tokenizer: Arc::new(WhitespaceTokenizer),
        }
    }

    /// Count tokens with `tokenizer` instead of whitespace.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}

impl Chunker for TokenChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }
        self.tokenizer.split(text, self.tokens_per_chunk)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        // ~4 bytes per token
        (text_len / 4 / self.tokens_per_chunk.get()).max(1)
    }
}

impl std::fmt::Debug for TokenChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenChunker")
            .field("tokens_per_chunk", &self.tokens_per_chunk)
            .field("tokenizer", &self.tokenizer.name())
            .finish()
    }
}

#[cfg(feature = "tiktoken")]
mod bpe {
    use std::num::NonZeroUsize;

    use tiktoken_rs::{cl100k_base, o200k_base, p50k_base, r50k_base, CoreBPE};

    use super::Tokenizer;
    use crate::{push_trimmed, Error, Result};

    /// OpenAI BPE tokenizer via tiktoken.
    pub struct TiktokenTokenizer {
        model_name: String,
        encoder: CoreBPE,
    }

    impl TiktokenTokenizer {
        /// Pick the encoding used by `model_name`.
        ///
        /// Unknown models fall back to `cl100k_base`.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Tokenizer`] if the encoding tables fail to load.
        pub fn for_model(model_name: &str) -> Result<Self> {
            let encoder = match model_name {
                name if name.starts_with("gpt-4o") || name.starts_with("o1") => o200k_base(),
                name if name.starts_with("gpt-4") || name.starts_with("gpt-3.5") => cl100k_base(),
                name if name.starts_with("text-davinci") || name.starts_with("code-") => {
                    p50k_base()
                }
                name if name.starts_with("davinci") || name.starts_with("curie") => r50k_base(),
                _ => cl100k_base(),
            }
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

            Ok(Self {
                model_name: model_name.to_string(),
                encoder,
            })
        }
    }

    impl Tokenizer for TiktokenTokenizer {
        fn name(&self) -> &str {
            &self.model_name
        }

        fn count(&self, text: &str) -> usize {
            self.encoder.encode_ordinary(text).len()
        }

        fn split(&self, text: &str, tokens_per_chunk: NonZeroUsize) -> Result<Vec<String>> {
            let tokens = self.encoder.encode_ordinary(text);
            let mut chunks = Vec::with_capacity(tokens.len().div_ceil(tokens_per_chunk.get()));
            for group in tokens.chunks(tokens_per_chunk.get()) {
                let decoded = self
                    .encoder
                    .decode(group.to_vec())
                    .map_err(|e| Error::Tokenizer(e.to_string()))?;
                push_trimmed(&mut chunks, &decoded);
            }
            Ok(chunks)
        }
    }

    impl std::fmt::Debug for TiktokenTokenizer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TiktokenTokenizer")
                .field("model_name", &self.model_name)
                .finish_non_exhaustive()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_chunks_respect_token_budget() {
            let tokenizer = TiktokenTokenizer::for_model("gpt-4o-mini").unwrap();
            let text = "The transformer relies entirely on attention. ".repeat(20);
            let budget = NonZeroUsize::new(16).unwrap();
            let chunks = tokenizer.split(&text, budget).unwrap();

            let total = tokenizer.count(&text);
            assert!(chunks.len() > 1);
            assert_eq!(chunks.len(), total.div_ceil(16));
            assert!(chunks.iter().all(|c| !c.trim().is_empty()));
        }

        #[test]
        fn test_unknown_model_falls_back() {
            let tokenizer = TiktokenTokenizer::for_model("some-local-model").unwrap();
            assert_eq!(tokenizer.name(), "some-local-model");
            assert!(tokenizer.count("Hello, world!") > 0);
        }
    }
}

#[cfg(feature = "tiktoken")]
pub use bpe::TiktokenTokenizer;
