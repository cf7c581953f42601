//! Strategy dispatch.
//!
//! [`DocumentChunker`] turns a [`Strategy`] plus optional collaborators (an
//! embedder, a tokenizer) into chunks. It is what a pipeline holds on to: one
//! value, built once from configuration, applied to every flattened text.

use std::sync::Arc;

use tracing::debug;

use crate::{
    CharacterChunker, ChunkConfig, Chunker, DelimiterChunker, Embedder, Error, ParagraphChunker,
    Result, SemanticChunker, SentenceChunker, SentenceSplitter, Strategy, TokenChunker, Tokenizer,
    WordChunker,
};

/// Chunks text with a configured strategy.
///
/// Holds no per-call state; a single instance can chunk any number of texts,
/// from any number of threads.
///
/// ```rust
/// use morsels::{Chunker, ChunkConfig, DocumentChunker};
///
/// let chunker = DocumentChunker::from_config(&ChunkConfig::delimiter(";")).unwrap();
/// assert_eq!(chunker.chunk("a;b;c").unwrap(), ["a", "b", "c"]);
/// ```
#[derive(Clone)]
pub struct DocumentChunker {
    strategy: Strategy,
    embedder: Option<Arc<dyn Embedder>>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    splitter: SentenceSplitter,
}

impl DocumentChunker {
    /// Create a chunker for `strategy`.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            embedder: None,
            tokenizer: None,
            splitter: SentenceSplitter::default(),
        }
    }

    /// Validate `config` and create a chunker for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not describe
    /// a valid strategy.
    pub fn from_config(config: &ChunkConfig) -> Result<Self> {
        Ok(Self::new(config.strategy()?))
    }

    /// Supply the embedder used by the semantic strategy.
    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Supply the tokenizer used by the tokens strategy.
    ///
    /// Without one, tokens are whitespace-separated words.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Sentence boundary detector for the sentence and semantic strategies.
    #[must_use]
    pub const fn with_sentence_splitter(mut self, splitter: SentenceSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// The configured strategy.
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Build the concrete chunker for the configured strategy.
    fn resolve(&self) -> Result<Box<dyn Chunker>> {
        let chunker: Box<dyn Chunker> = match &self.strategy {
            Strategy::Character { chunk_size } => {
                Box::new(CharacterChunker::with_size(*chunk_size))
            }
            Strategy::Word { words_per_chunk } => {
                Box::new(WordChunker::with_count(*words_per_chunk))
            }
            Strategy::Sentence {
                sentences_per_chunk,
            } => Box::new(
                SentenceChunker::with_count(*sentences_per_chunk).with_splitter(self.splitter),
            ),
            Strategy::Paragraph => Box::new(ParagraphChunker),
            Strategy::Delimiter { delimiter } => {
                Box::new(DelimiterChunker::with_delimiter(delimiter.clone()))
            }
            Strategy::Tokens { tokens_per_chunk } => {
                let mut chunker = TokenChunker::with_count(*tokens_per_chunk);
                if let Some(tokenizer) = &self.tokenizer {
                    chunker = chunker.with_tokenizer(Arc::clone(tokenizer));
                }
                Box::new(chunker)
            }
            Strategy::Semantic {
                clusters,
                distance,
                max_iterations,
            } => {
                let embedder = self.embedder.as_ref().ok_or_else(|| {
                    Error::invalid("method `semantic` requires an embedder")
                })?;
                Box::new(
                    SemanticChunker::with_clusters(*clusters, Arc::clone(embedder))
                        .with_distance(*distance)
                        .with_max_iterations(*max_iterations)
                        .with_splitter(self.splitter),
                )
            }
        };
        Ok(chunker)
    }
}

impl Chunker for DocumentChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let chunker = self.resolve()?;
        debug!(
            target: "morsels",
            method = %self.strategy.method(),
            input_len = text.len(),
            "chunking text"
        );

        let chunks = chunker.chunk(text)?;
        debug!(
            target: "morsels",
            method = %self.strategy.method(),
            chunks = chunks.len(),
            "chunking finished"
        );
        Ok(chunks)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        self.resolve()
            .map(|chunker| chunker.estimate_chunks(text_len))
            .unwrap_or(1)
    }
}

impl std::fmt::Debug for DocumentChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentChunker")
            .field("strategy", &self.strategy)
            .field("has_embedder", &self.embedder.is_some())
            .field("tokenizer", &self.tokenizer.as_ref().map(|t| t.name()))
            .field("splitter", &self.splitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FnEmbedder, Method};

    fn config_for(method: Method) -> ChunkConfig {
        match method {
            Method::Character => ChunkConfig::character(10),
            Method::Word => ChunkConfig::word(3),
            Method::Sentence => ChunkConfig::sentence(2),
            Method::Paragraph => ChunkConfig::paragraph(),
            Method::Delimiter => ChunkConfig::delimiter(","),
            Method::Tokens => ChunkConfig::tokens(3),
            Method::Semantic => ChunkConfig::semantic(2),
        }
    }

    fn constant_embedder() -> Arc<dyn Embedder> {
        Arc::new(FnEmbedder::new(
            |_: &str| -> std::result::Result<Vec<f32>, String> { Ok(vec![1.0, 0.0]) },
        ))
    }

    #[test]
    fn test_dispatches_every_method() {
        let text = "Alpha beta, gamma. Delta epsilon!\n\nZeta eta, theta? Iota kappa.";
        for method in Method::ALL {
            let chunker = DocumentChunker::from_config(&config_for(method))
                .unwrap()
                .with_embedder(constant_embedder());
            assert_eq!(chunker.strategy().method(), method);

            let chunks = chunker.chunk(text).unwrap();
            assert!(!chunks.is_empty(), "{method} produced nothing");
            assert!(
                chunks.iter().all(|c| !c.is_empty() && c.trim() == c),
                "{method} produced an untrimmed chunk: {chunks:?}"
            );
        }
    }

    #[test]
    fn test_blank_input_yields_nothing_for_every_method() {
        for method in Method::ALL {
            let chunker = DocumentChunker::from_config(&config_for(method))
                .unwrap()
                .with_embedder(constant_embedder());
            assert!(chunker.chunk("").unwrap().is_empty(), "{method}");
            assert!(chunker.chunk(" \t\n\n ").unwrap().is_empty(), "{method}");
        }
    }

    #[test]
    fn test_semantic_without_embedder_is_invalid() {
        let chunker = DocumentChunker::new(Strategy::semantic(2).unwrap());
        let err = chunker.chunk("One. Two. Three.").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_sentence_splitter_is_forwarded() {
        let text = "He said \"Stop.\" Then he left.";
        let naive = DocumentChunker::new(Strategy::sentence(1).unwrap());
        let unicode = naive
            .clone()
            .with_sentence_splitter(SentenceSplitter::Unicode);

        assert_eq!(
            naive.chunk(text).unwrap(),
            ["He said \"Stop.\" Then he left."]
        );
        assert_eq!(
            unicode.chunk(text).unwrap(),
            ["He said \"Stop.\"", "Then he left."]
        );
    }

    #[test]
    fn test_tokenizer_is_forwarded() {
        struct Letters;
        impl Tokenizer for Letters {
            fn name(&self) -> &str {
                "letters"
            }
            fn count(&self, text: &str) -> usize {
                text.chars().filter(char::is_ascii_alphabetic).count()
            }
            fn split(
                &self,
                text: &str,
                tokens_per_chunk: std::num::NonZeroUsize,
            ) -> Result<Vec<String>> {
                let letters: Vec<char> = text.chars().filter(char::is_ascii_alphabetic).collect();
                Ok(letters
                    .chunks(tokens_per_chunk.get())
                    .map(|c| c.iter().collect())
                    .collect())
            }
        }

        let chunker = DocumentChunker::new(Strategy::tokens(2).unwrap())
            .with_tokenizer(Arc::new(Letters));
        assert_eq!(chunker.chunk("a b c").unwrap(), ["ab", "c"]);
    }

    #[test]
    fn test_estimate_is_positive() {
        let chunker = DocumentChunker::new(Strategy::character(100).unwrap());
        assert_eq!(chunker.estimate_chunks(1000), 10);
    }
}
