//! Error types for morsels.

/// Errors that can occur during chunking.
///
/// Every error aborts the whole call: no partial chunk sequence is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognized method, or a missing/zero/negative/empty parameter.
    ///
    /// Raised before any text is processed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The embedder failed or returned malformed vectors.
    #[error("embedding failure: {0}")]
    EmbeddingFailure(String),

    /// An injected tokenizer could not encode or decode a chunk.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingFailure(msg.into())
    }
}

/// Result type for morsels operations.
pub type Result<T> = std::result::Result<T, Error>;
