//! Delimiter chunking.
//!
//! Splits on every occurrence of a literal string and keeps each non-empty,
//! trimmed segment. The delimiter itself is discarded.
//!
//! ```text
//! delimiter = "---"
//!
//! "record one\n---\nrecord two\n---\n---\nrecord three"
//!   -> ["record one", "record two", "record three"]
//! ```
//!
//! Matching is exact and case-sensitive; no regex, no escaping.

use std::fmt;

use crate::{push_trimmed, Chunker, Error, Result};

/// A non-empty literal separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiter(String);

impl Delimiter {
    /// Wrap `delimiter`, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `delimiter` is empty.
    pub fn new(delimiter: impl Into<String>) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(Error::invalid("`delimiter` must not be empty"));
        }
        Ok(Self(delimiter))
    }

    /// The separator text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Literal-delimiter chunker.
///
/// ## Example
///
/// ```rust
/// use morsels::{Chunker, DelimiterChunker};
///
/// let chunker = DelimiterChunker::new(";").unwrap();
/// assert_eq!(chunker.chunk("a;b;c").unwrap(), ["a", "b", "c"]);
/// ```
#[derive(Debug, Clone)]
pub struct DelimiterChunker {
    delimiter: Delimiter,
}

impl DelimiterChunker {
    /// Create a chunker splitting on `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `delimiter` is empty.
    pub fn new(delimiter: impl Into<String>) -> Result<Self> {
        Ok(Self::with_delimiter(Delimiter::new(delimiter)?))
    }

    /// Create a chunker from an already-validated delimiter.
    pub const fn with_delimiter(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }
}

impl Chunker for DelimiterChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let mut chunks = Vec::new();
        for segment in text.split(self.delimiter.as_str()) {
            push_trimmed(&mut chunks, segment);
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_delimiter() {
        let chunker = DelimiterChunker::new(";").unwrap();
        assert_eq!(chunker.chunk("a;b;c").unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_segments_dropped() {
        let chunker = DelimiterChunker::new("---").unwrap();
        let text = "record one\n---\nrecord two\n---\n---\nrecord three";
        let chunks = chunker.chunk(text).unwrap();
        assert_eq!(chunks, ["record one", "record two", "record three"]);
    }

    #[test]
    fn test_delimiter_not_found() {
        let chunker = DelimiterChunker::new("|").unwrap();
        assert_eq!(chunker.chunk("  no pipes here ").unwrap(), ["no pipes here"]);
    }

    #[test]
    fn test_multibyte_delimiter() {
        let chunker = DelimiterChunker::new("§").unwrap();
        assert_eq!(chunker.chunk("eins§zwei§drei").unwrap(), ["eins", "zwei", "drei"]);
    }

    #[test]
    fn test_only_delimiters() {
        let chunker = DelimiterChunker::new(",").unwrap();
        assert!(chunker.chunk(",, ,,").unwrap().is_empty());
    }

    #[test]
    fn test_empty_delimiter_is_rejected() {
        assert!(matches!(
            DelimiterChunker::new(""),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
