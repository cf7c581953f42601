//! Strategy selection and configuration.
//!
//! Two layers describe how a text is divided:
//!
//! - [`ChunkConfig`] is the flat, serde-friendly record a pipeline reads from
//!   its settings: a `method` name plus one optional field per parameter. It
//!   can hold nonsense (a zero `words_per_chunk`, a `method` nobody knows).
//! - [`Strategy`] is the validated form: one variant per method, each carrying
//!   only the parameters that method uses. A `Strategy` cannot be
//!   misconfigured once built.
//!
//! ```rust
//! use morsels::{ChunkConfig, Method, Strategy};
//!
//! let config: ChunkConfig = ChunkConfig::word(2);
//! let strategy = Strategy::try_from(&config).unwrap();
//! assert_eq!(strategy.method(), Method::Word);
//!
//! let broken = ChunkConfig::word(0);
//! assert!(Strategy::try_from(&broken).is_err());
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Delimiter, Distance, Error, Result};

/// Default cap on k-means iterations for the semantic strategy.
pub const DEFAULT_MAX_ITERATIONS: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(n) => n,
    None => unreachable!(),
};

/// The name of a chunking method.
///
/// Names are matched exactly: `"word"` is a method, `"Word"` and `" word"`
/// are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Fixed-width character windows.
    Character,
    /// Groups of whitespace-separated words.
    Word,
    /// Groups of sentences.
    Sentence,
    /// Blank-line separated paragraphs.
    Paragraph,
    /// Segments between occurrences of a literal delimiter.
    Delimiter,
    /// Groups of tokenizer units.
    Tokens,
    /// Clusters of sentences by embedding similarity.
    Semantic,
}

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Character,
        Self::Word,
        Self::Sentence,
        Self::Paragraph,
        Self::Delimiter,
        Self::Tokens,
        Self::Semantic,
    ];

    /// The lowercase name used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Word => "word",
            Self::Sentence => "sentence",
            Self::Paragraph => "paragraph",
            Self::Delimiter => "delimiter",
            Self::Tokens => "tokens",
            Self::Semantic => "semantic",
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                Error::invalid(format!(
                    "unknown method {s:?}; expected one of: character, word, sentence, \
                     paragraph, delimiter, tokens, semantic"
                ))
            })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated chunking strategy.
///
/// Each variant carries exactly the parameters its method reads, so an
/// invalid combination (say, a word strategy without a word count) cannot be
/// expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Windows of `chunk_size` characters.
    Character {
        /// Maximum characters per chunk.
        chunk_size: NonZeroUsize,
    },
    /// Groups of `words_per_chunk` words.
    Word {
        /// Words per chunk.
        words_per_chunk: NonZeroUsize,
    },
    /// Groups of `sentences_per_chunk` sentences.
    Sentence {
        /// Sentences per chunk.
        sentences_per_chunk: NonZeroUsize,
    },
    /// One chunk per paragraph.
    Paragraph,
    /// One chunk per delimiter-separated segment.
    Delimiter {
        /// The literal separator.
        delimiter: Delimiter,
    },
    /// Groups of `tokens_per_chunk` tokenizer units.
    Tokens {
        /// Tokens per chunk.
        tokens_per_chunk: NonZeroUsize,
    },
    /// `clusters` groups of sentences, clustered by embedding.
    Semantic {
        /// Target number of clusters.
        clusters: NonZeroUsize,
        /// Distance used by k-means.
        distance: Distance,
        /// Cap on Lloyd iterations.
        max_iterations: NonZeroUsize,
    },
}

impl Strategy {
    /// Character windows of `chunk_size` characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `chunk_size` is zero.
    pub fn character(chunk_size: usize) -> Result<Self> {
        Ok(Self::Character {
            chunk_size: positive("chunk_size", chunk_size)?,
        })
    }

    /// Groups of `words_per_chunk` words.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `words_per_chunk` is zero.
    pub fn word(words_per_chunk: usize) -> Result<Self> {
        Ok(Self::Word {
            words_per_chunk: positive("words_per_chunk", words_per_chunk)?,
        })
    }

    /// Groups of `sentences_per_chunk` sentences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `sentences_per_chunk` is zero.
    pub fn sentence(sentences_per_chunk: usize) -> Result<Self> {
        Ok(Self::Sentence {
            sentences_per_chunk: positive("sentences_per_chunk", sentences_per_chunk)?,
        })
    }

    /// Segments separated by `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `delimiter` is empty.
    pub fn delimiter(delimiter: impl Into<String>) -> Result<Self> {
        Ok(Self::Delimiter {
            delimiter: Delimiter::new(delimiter)?,
        })
    }

    /// Groups of `tokens_per_chunk` tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `tokens_per_chunk` is zero.
    pub fn tokens(tokens_per_chunk: usize) -> Result<Self> {
        Ok(Self::Tokens {
            tokens_per_chunk: positive("tokens_per_chunk", tokens_per_chunk)?,
        })
    }

    /// `clusters` semantic groups with cosine distance and the default
    /// iteration cap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `clusters` is zero.
    pub fn semantic(clusters: usize) -> Result<Self> {
        Ok(Self::Semantic {
            clusters: positive("semantic_clusters", clusters)?,
            distance: Distance::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    /// The method this strategy implements.
    pub const fn method(&self) -> Method {
        match self {
            Self::Character { .. } => Method::Character,
            Self::Word { .. } => Method::Word,
            Self::Sentence { .. } => Method::Sentence,
            Self::Paragraph => Method::Paragraph,
            Self::Delimiter { .. } => Method::Delimiter,
            Self::Tokens { .. } => Method::Tokens,
            Self::Semantic { .. } => Method::Semantic,
        }
    }
}

impl TryFrom<&ChunkConfig> for Strategy {
    type Error = Error;

    fn try_from(config: &ChunkConfig) -> Result<Self> {
        let method: Method = config.method.parse()?;
        match method {
            Method::Character => Ok(Self::Character {
                chunk_size: required(method, "chunk_size", config.chunk_size)?,
            }),
            Method::Word => Ok(Self::Word {
                words_per_chunk: required(method, "words_per_chunk", config.words_per_chunk)?,
            }),
            Method::Sentence => Ok(Self::Sentence {
                sentences_per_chunk: required(
                    method,
                    "sentences_per_chunk",
                    config.sentences_per_chunk,
                )?,
            }),
            Method::Paragraph => Ok(Self::Paragraph),
            Method::Delimiter => {
                let delimiter = config.delimiter.as_deref().ok_or_else(|| {
                    Error::invalid(format!("method `{method}` requires `delimiter`"))
                })?;
                Ok(Self::Delimiter {
                    delimiter: Delimiter::new(delimiter)?,
                })
            }
            Method::Tokens => Ok(Self::Tokens {
                tokens_per_chunk: required(method, "tokens_per_chunk", config.tokens_per_chunk)?,
            }),
            Method::Semantic => {
                let max_iterations = match config.max_iterations {
                    Some(value) => to_positive("max_iterations", value)?,
                    None => DEFAULT_MAX_ITERATIONS,
                };
                Ok(Self::Semantic {
                    clusters: required(method, "semantic_clusters", config.semantic_clusters)?,
                    distance: config.distance.unwrap_or_default(),
                    max_iterations,
                })
            }
        }
    }
}

impl TryFrom<ChunkConfig> for Strategy {
    type Error = Error;

    fn try_from(config: ChunkConfig) -> Result<Self> {
        Self::try_from(&config)
    }
}

/// Flat chunking configuration, as read from a settings file.
///
/// Only the parameter belonging to `method` is consulted; the others are
/// ignored. Integer parameters are signed so that a negative value in a
/// config file is reported as an invalid configuration rather than a parse
/// failure.
///
/// ```rust
/// use morsels::{ChunkConfig, Strategy};
///
/// let config: ChunkConfig = serde_json::from_str(
///     r#"{ "method": "sentence", "sentences_per_chunk": 3 }"#,
/// ).unwrap();
/// assert!(config.strategy().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// One of `character`, `word`, `sentence`, `paragraph`, `delimiter`,
    /// `tokens`, `semantic`.
    pub method: String,
    /// Max characters per chunk (`character`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<i64>,
    /// Words per chunk (`word`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words_per_chunk: Option<i64>,
    /// Sentences per chunk (`sentence`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentences_per_chunk: Option<i64>,
    /// Literal separator (`delimiter`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Tokens per chunk (`tokens`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_per_chunk: Option<i64>,
    /// Target cluster count (`semantic`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_clusters: Option<i64>,
    /// k-means distance (`semantic`); cosine when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    /// k-means iteration cap (`semantic`); 100 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<i64>,
}

impl ChunkConfig {
    /// An otherwise empty config naming `method`.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    /// `method = character` with the given `chunk_size`.
    pub fn character(chunk_size: i64) -> Self {
        Self {
            chunk_size: Some(chunk_size),
            ..Self::new(Method::Character.as_str())
        }
    }

    /// `method = word` with the given `words_per_chunk`.
    pub fn word(words_per_chunk: i64) -> Self {
        Self {
            words_per_chunk: Some(words_per_chunk),
            ..Self::new(Method::Word.as_str())
        }
    }

    /// `method = sentence` with the given `sentences_per_chunk`.
    pub fn sentence(sentences_per_chunk: i64) -> Self {
        Self {
            sentences_per_chunk: Some(sentences_per_chunk),
            ..Self::new(Method::Sentence.as_str())
        }
    }

    /// `method = paragraph`.
    pub fn paragraph() -> Self {
        Self::new(Method::Paragraph.as_str())
    }

    /// `method = delimiter` with the given `delimiter`.
    pub fn delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: Some(delimiter.into()),
            ..Self::new(Method::Delimiter.as_str())
        }
    }

    /// `method = tokens` with the given `tokens_per_chunk`.
    pub fn tokens(tokens_per_chunk: i64) -> Self {
        Self {
            tokens_per_chunk: Some(tokens_per_chunk),
            ..Self::new(Method::Tokens.as_str())
        }
    }

    /// `method = semantic` with the given `semantic_clusters`.
    pub fn semantic(semantic_clusters: i64) -> Self {
        Self {
            semantic_clusters: Some(semantic_clusters),
            ..Self::new(Method::Semantic.as_str())
        }
    }

    /// Validate into a [`Strategy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an unknown method or a
    /// missing, zero, negative, or empty required parameter.
    pub fn strategy(&self) -> Result<Strategy> {
        Strategy::try_from(self)
    }
}

pub(crate) fn positive(name: &str, value: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value)
        .ok_or_else(|| Error::invalid(format!("`{name}` must be greater than zero")))
}

fn to_positive(name: &str, value: i64) -> Result<NonZeroUsize> {
    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| Error::invalid(format!("`{name}` must be a positive integer, got {value}")))
}

fn required(method: Method, name: &str, value: Option<i64>) -> Result<NonZeroUsize> {
    let value =
        value.ok_or_else(|| Error::invalid(format!("method `{method}` requires `{name}`")))?;
    to_positive(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_round_trips_through_names() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn test_method_names_are_case_and_space_sensitive() {
        for name in ["Word", "WORD", " word ", "word\n", ""] {
            assert!(
                matches!(name.parse::<Method>(), Err(Error::InvalidConfiguration(_))),
                "{name:?} should be rejected"
            );
        }
        let config = ChunkConfig {
            method: "Word".into(),
            ..ChunkConfig::word(2)
        };
        assert!(matches!(config.strategy(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_unknown_method_is_invalid() {
        let err = ChunkConfig::new("bogus").strategy().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_words_is_invalid() {
        let err = ChunkConfig::word(0).strategy().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_negative_parameter_is_invalid() {
        for config in [
            ChunkConfig::character(-1),
            ChunkConfig::sentence(-3),
            ChunkConfig::tokens(-10),
            ChunkConfig::semantic(-2),
        ] {
            assert!(
                matches!(config.strategy(), Err(Error::InvalidConfiguration(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_missing_parameter_is_invalid() {
        for method in ["character", "word", "sentence", "delimiter", "tokens", "semantic"] {
            let err = ChunkConfig::new(method).strategy().unwrap_err();
            assert!(
                err.to_string().contains("requires"),
                "unexpected message for {method}: {err}"
            );
        }
    }

    #[test]
    fn test_empty_delimiter_is_invalid() {
        assert!(ChunkConfig::delimiter("").strategy().is_err());
        assert!(Strategy::delimiter("").is_err());
    }

    #[test]
    fn test_paragraph_needs_no_parameter() {
        assert_eq!(ChunkConfig::paragraph().strategy().unwrap(), Strategy::Paragraph);
    }

    #[test]
    fn test_unrelated_parameters_are_ignored() {
        let config = ChunkConfig {
            chunk_size: Some(-5),
            ..ChunkConfig::word(3)
        };
        assert_eq!(config.strategy().unwrap(), Strategy::word(3).unwrap());
    }

    #[test]
    fn test_semantic_defaults() {
        let strategy = ChunkConfig::semantic(4).strategy().unwrap();
        assert_eq!(strategy, Strategy::semantic(4).unwrap());
        match strategy {
            Strategy::Semantic {
                distance,
                max_iterations,
                ..
            } => {
                assert_eq!(distance, Distance::Cosine);
                assert_eq!(max_iterations, DEFAULT_MAX_ITERATIONS);
            }
            other => panic!("expected semantic, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_max_iterations_is_invalid() {
        let config = ChunkConfig {
            max_iterations: Some(0),
            ..ChunkConfig::semantic(2)
        };
        assert!(config.strategy().is_err());
    }

    #[test]
    fn test_typed_constructors_reject_zero() {
        assert!(Strategy::character(0).is_err());
        assert!(Strategy::word(0).is_err());
        assert!(Strategy::sentence(0).is_err());
        assert!(Strategy::tokens(0).is_err());
        assert!(Strategy::semantic(0).is_err());
    }
}
