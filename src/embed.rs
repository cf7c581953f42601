//! Sentence embedding.
//!
//! The semantic chunker needs one vector per sentence and does not care where
//! it comes from. [`Embedder`] is that seam: a local model, a remote API, or a
//! hand-written stub for tests.
//!
//! Vectors within one call must share a dimension; the semantic chunker
//! rejects anything else as an [`Error::EmbeddingFailure`].

use std::fmt;
use std::marker::PhantomData;

use crate::{Error, Result};

/// Maps text to a fixed-length vector.
pub trait Embedder: Send + Sync {
    /// Embed one sentence.
    ///
    /// # Errors
    ///
    /// Implementations report failures as [`Error::EmbeddingFailure`].
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many sentences, one vector per input, in input order.
    ///
    /// Override when the backend batches more cheaply than one call per
    /// sentence.
    ///
    /// # Errors
    ///
    /// Fails on the first sentence that fails.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// An [`Embedder`] backed by a closure.
///
/// Closure errors are reported as [`Error::EmbeddingFailure`] with the
/// error's display text.
///
/// ```rust
/// use morsels::{Embedder, FnEmbedder};
///
/// let embedder = FnEmbedder::new(|s: &str| -> Result<Vec<f32>, String> {
///     Ok(vec![s.len() as f32, 1.0])
/// });
/// assert_eq!(embedder.embed("abc").unwrap(), vec![3.0, 1.0]);
/// ```
pub struct FnEmbedder<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> FnEmbedder<F, E>
where
    F: Fn(&str) -> std::result::Result<Vec<f32>, E> + Send + Sync,
    E: fmt::Display,
{
    /// Wrap `f`.
    pub const fn new(f: F) -> Self {
        Self {
            f,
            _error: PhantomData,
        }
    }
}

impl<F, E> Embedder for FnEmbedder<F, E>
where
    F: Fn(&str) -> std::result::Result<Vec<f32>, E> + Send + Sync,
    E: fmt::Display,
{
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (self.f)(text).map_err(|e| Error::embedding(e.to_string()))
    }
}

impl<F, E> fmt::Debug for FnEmbedder<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEmbedder").finish_non_exhaustive()
    }
}

#[cfg(feature = "semantic")]
mod fastembed_backend {
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

    use super::Embedder;
    use crate::{Error, Result};

    /// Local ONNX embedding model via fastembed.
    pub struct FastEmbedder {
        model: TextEmbedding,
    }

    impl FastEmbedder {
        /// Load fastembed's default model (BGE-small-en, 384 dimensions).
        ///
        /// # Errors
        ///
        /// Returns [`Error::EmbeddingFailure`] if the model fails to load.
        pub fn new() -> Result<Self> {
            let model = TextEmbedding::try_new(InitOptions::default())
                .map_err(|e| Error::embedding(e.to_string()))?;
            Ok(Self { model })
        }

        /// Load a specific fastembed model.
        ///
        /// # Errors
        ///
        /// Returns [`Error::EmbeddingFailure`] if the model fails to load.
        pub fn with_model(model: EmbeddingModel) -> Result<Self> {
            let model = TextEmbedding::try_new(InitOptions::new(model))
                .map_err(|e| Error::embedding(e.to_string()))?;
            Ok(Self { model })
        }
    }

    impl Embedder for FastEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.embed_batch(&[text])?
                .pop()
                .ok_or_else(|| Error::embedding("model returned no vector"))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            self.model
                .embed(texts.to_vec(), None)
                .map_err(|e| Error::embedding(e.to_string()))
        }
    }

    impl std::fmt::Debug for FastEmbedder {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FastEmbedder").finish_non_exhaustive()
        }
    }
}

#[cfg(feature = "semantic")]
pub use fastembed_backend::FastEmbedder;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_embedder() {
        let embedder = FnEmbedder::new(|s: &str| -> std::result::Result<Vec<f32>, String> {
            Ok(vec![s.len() as f32])
        });
        assert_eq!(embedder.embed("four").unwrap(), vec![4.0]);
    }

    #[test]
    fn test_closure_errors_become_embedding_failures() {
        let embedder = FnEmbedder::new(|_: &str| -> std::result::Result<Vec<f32>, String> {
            Err("model offline".to_string())
        });
        let err = embedder.embed("anything").unwrap_err();
        assert!(matches!(err, Error::EmbeddingFailure(ref msg) if msg == "model offline"));
    }

    #[test]
    fn test_default_batch_preserves_order() {
        let embedder = FnEmbedder::new(|s: &str| -> std::result::Result<Vec<f32>, String> {
            Ok(vec![s.len() as f32])
        });
        let vectors = embedder.embed_batch(&["a", "abc", "ab"]).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![3.0], vec![2.0]]);
    }

    #[test]
    fn test_default_batch_stops_on_failure() {
        let embedder = FnEmbedder::new(|s: &str| -> std::result::Result<Vec<f32>, String> {
            if s == "bad" {
                Err(format!("cannot embed {s}"))
            } else {
                Ok(vec![1.0])
            }
        });
        assert!(embedder.embed_batch(&["ok", "bad", "ok"]).is_err());
    }
}
