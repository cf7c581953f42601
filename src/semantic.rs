//! Semantic chunking by sentence clustering.
//!
//! Groups sentences that talk about the same thing, wherever they sit in the
//! document.
//!
//! ## The Idea
//!
//! Sentences about the same topic have nearby embeddings. Cluster the
//! embeddings into K groups and each group is a topic:
//!
//! ```text
//! Sentences:   S0    S1    S2    S3    S4    S5
//! Embeddings:  E0    E1    E2    E3    E4    E5
//! k-means:     A     A     B     B     A     C
//!
//! Chunks (ordered by first sentence): "S0 S1 S4" | "S2 S3" | "S5"
//! ```
//!
//! Within a chunk, sentences keep their original order and are joined by a
//! single space. Chunks are ordered by the position of their earliest
//! sentence, so the first chunk always starts with the document's first
//! sentence.
//!
//! ## Few Sentences
//!
//! With no more sentences than clusters, every sentence is its own chunk and
//! the embedder is never called.
//!
//! ## Performance
//!
//! One embedding per sentence, then k-means at O(n × k × d) per iteration
//! where n = sentences, d = embedding dimension. Embedding dominates.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{trace, warn};

use crate::strategy::{positive, DEFAULT_MAX_ITERATIONS};
use crate::{
    kmeans, split_sentences, Chunker, Distance, Embedder, Error, Result, SentenceSplitter,
};

/// Semantic chunker using embedding clusters.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use morsels::{Chunker, FnEmbedder, SemanticChunker};
///
/// // Two topics: vectors point along x for fruit, along y for weather.
/// let embedder = FnEmbedder::new(|s: &str| -> Result<Vec<f32>, String> {
///     Ok(if s.contains("apple") { vec![1.0, 0.1] } else { vec![0.1, 1.0] })
/// });
/// let chunker = SemanticChunker::new(2, Arc::new(embedder)).unwrap();
///
/// let text = "An apple fell. It rained today. The apple was red. Clouds rolled in.";
/// let chunks = chunker.chunk(text).unwrap();
/// assert_eq!(chunks, [
///     "An apple fell. The apple was red.",
///     "It rained today. Clouds rolled in.",
/// ]);
/// ```
#[derive(Clone)]
pub struct SemanticChunker {
    clusters: NonZeroUsize,
    embedder: Arc<dyn Embedder>,
    distance: Distance,
    max_iterations: NonZeroUsize,
    splitter: SentenceSplitter,
}

impl SemanticChunker {
    /// Create a chunker producing `clusters` chunks.
    ///
    /// Uses cosine distance and at most 100 k-means iterations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `clusters == 0`.
    pub fn new(clusters: usize, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Ok(Self::with_clusters(
            positive("semantic_clusters", clusters)?,
            embedder,
        ))
    }

    /// Create a chunker from an already-validated cluster count.
    pub fn with_clusters(clusters: NonZeroUsize, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            clusters,
            embedder,
            distance: Distance::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            splitter: SentenceSplitter::default(),
        }
    }

    /// Use a different k-means distance.
    #[must_use]
    pub const fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    /// Cap k-means at `max_iterations` Lloyd iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: NonZeroUsize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Use a different sentence boundary detector.
    #[must_use]
    pub const fn with_splitter(mut self, splitter: SentenceSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Embed every sentence and check the vectors are usable.
    fn embed_sentences(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.embed_batch(sentences).map_err(|e| match e {
            Error::EmbeddingFailure(_) => e,
            other => Error::embedding(other.to_string()),
        })?;

        if let Err(e) = validate_embeddings(&vectors, sentences.len()) {
            warn!(target: "morsels", error = %e, "embedder returned malformed vectors");
            return Err(e);
        }
        Ok(vectors)
    }
}

fn validate_embeddings(vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(Error::embedding(format!(
            "expected {expected} vectors, got {}",
            vectors.len()
        )));
    }
    let dim = vectors.first().map_or(0, Vec::len);
    if dim == 0 {
        return Err(Error::embedding("embedding vectors are empty"));
    }
    for (i, vector) in vectors.iter().enumerate() {
        if vector.len() != dim {
            return Err(Error::embedding(format!(
                "sentence {i} has dimension {}, expected {dim}",
                vector.len()
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::embedding(format!(
                "sentence {i} has a non-finite component"
            )));
        }
    }
    Ok(())
}

impl Chunker for SemanticChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let sentences = split_sentences(text, self.splitter);
        let k = self.clusters.get();

        if sentences.len() <= k {
            return Ok(sentences.into_iter().map(str::to_owned).collect());
        }

        let embeddings = self.embed_sentences(&sentences)?;
        let clustering = kmeans(&embeddings, k, self.distance, self.max_iterations.get());
        trace!(
            target: "morsels",
            sentences = sentences.len(),
            clusters = k,
            iterations = clustering.iterations,
            "k-means finished"
        );

        let mut groups: Vec<Vec<usize>> = clustering
            .members()
            .into_iter()
            .filter(|members| !members.is_empty())
            .collect();
        groups.sort_by_key(|members| members[0]);

        Ok(groups
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .map(|i| sentences[i])
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect())
    }

    fn estimate_chunks(&self, _text_len: usize) -> usize {
        self.clusters.get()
    }
}

impl std::fmt::Debug for SemanticChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticChunker")
            .field("clusters", &self.clusters)
            .field("distance", &self.distance)
            .field("max_iterations", &self.max_iterations)
            .field("splitter", &self.splitter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::FnEmbedder;

    struct Counting {
        calls: AtomicUsize,
    }

    impl Embedder for Counting {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    fn topic_embedder() -> Arc<dyn Embedder> {
        Arc::new(FnEmbedder::new(
            |s: &str| -> std::result::Result<Vec<f32>, String> {
                Ok(if s.contains("apple") {
                    vec![1.0, 0.0, 0.0]
                } else if s.contains("rain") {
                    vec![0.0, 1.0, 0.0]
                } else {
                    vec![0.0, 0.0, 1.0]
                })
            },
        ))
    }

    #[test]
    fn test_groups_by_topic() {
        let chunker = SemanticChunker::new(3, topic_embedder()).unwrap();
        let text = "The rain began. An apple dropped. Stocks rose. More rain fell. \
                    The apple rolled. Stocks fell.";
        let chunks = chunker.chunk(text).unwrap();
        assert_eq!(
            chunks,
            [
                "The rain began. More rain fell.",
                "An apple dropped. The apple rolled.",
                "Stocks rose. Stocks fell.",
            ]
        );
    }

    #[test]
    fn test_fewer_sentences_than_clusters_skips_embedding() {
        let counting = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let chunker = SemanticChunker::new(5, counting.clone()).unwrap();
        let chunks = chunker.chunk("One. Two. Three.").unwrap();
        assert_eq!(chunks, ["One.", "Two.", "Three."]);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_single_sentence() {
        let chunker = SemanticChunker::new(1, topic_embedder()).unwrap();
        assert_eq!(chunker.chunk("  Only one.  ").unwrap(), ["Only one."]);
    }

    #[test]
    fn test_identical_embeddings_still_yield_k_chunks() {
        let flat = Arc::new(FnEmbedder::new(
            |_: &str| -> std::result::Result<Vec<f32>, String> { Ok(vec![0.1; 8]) },
        ));
        let chunker = SemanticChunker::new(2, flat).unwrap();
        let chunks = chunker.chunk("A. B. C. D. E.").unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_embedder_error_propagates() {
        let failing = Arc::new(FnEmbedder::new(
            |_: &str| -> std::result::Result<Vec<f32>, String> { Err("boom".into()) },
        ));
        let chunker = SemanticChunker::new(1, failing).unwrap();
        let err = chunker.chunk("First. Second.").unwrap_err();
        assert!(matches!(err, Error::EmbeddingFailure(_)));
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let ragged = Arc::new(FnEmbedder::new(
            |s: &str| -> std::result::Result<Vec<f32>, String> { Ok(vec![1.0; s.len()]) },
        ));
        let chunker = SemanticChunker::new(1, ragged).unwrap();
        let err = chunker.chunk("Short. Much longer sentence.").unwrap_err();
        assert!(matches!(err, Error::EmbeddingFailure(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let nan = Arc::new(FnEmbedder::new(
            |_: &str| -> std::result::Result<Vec<f32>, String> { Ok(vec![f32::NAN, 1.0]) },
        ));
        let chunker = SemanticChunker::new(1, nan).unwrap();
        assert!(chunker.chunk("One. Two.").is_err());
    }

    #[test]
    fn test_empty_vectors_rejected() {
        let empty = Arc::new(FnEmbedder::new(
            |_: &str| -> std::result::Result<Vec<f32>, String> { Ok(vec![]) },
        ));
        let chunker = SemanticChunker::new(1, empty).unwrap();
        assert!(chunker.chunk("One. Two.").is_err());
    }

    #[test]
    fn test_wrong_vector_count_rejected() {
        struct Short;
        impl Embedder for Short {
            fn embed(&self, _: &str) -> Result<Vec<f32>> {
                Ok(vec![1.0])
            }
            fn embed_batch(&self, _: &[&str]) -> Result<Vec<Vec<f32>>> {
                Ok(vec![vec![1.0]])
            }
        }
        let chunker = SemanticChunker::new(1, Arc::new(Short)).unwrap();
        assert!(matches!(
            chunker.chunk("One. Two. Three."),
            Err(Error::EmbeddingFailure(_))
        ));
    }

    #[test]
    fn test_blank_text() {
        let chunker = SemanticChunker::new(2, topic_embedder()).unwrap();
        assert!(chunker.chunk(" \n ").unwrap().is_empty());
    }
}
