//! Paragraph chunking.
//!
//! A paragraph ends at two or more consecutive newlines. Each paragraph,
//! trimmed, becomes one chunk. Single newlines inside a paragraph are kept,
//! and so is a line of spaces between two newlines: it is not a break.
//!
//! ```text
//! "Intro line\ncontinues.\n\n\nSecond.\n  \nThird."
//!   -> ["Intro line\ncontinues.", "Second.\n  \nThird."]
//! ```
//!
//! Windows line endings are accepted: `"\r\n\r\n"` is a break.

use crate::{push_trimmed, Chunker, Result};

/// Blank-line paragraph chunker.
///
/// ## Example
///
/// ```rust
/// use morsels::{Chunker, ParagraphChunker};
///
/// let chunks = ParagraphChunker.chunk("First para.\n\nSecond para.").unwrap();
/// assert_eq!(chunks, ["First para.", "Second para."]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphChunker;

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>> {
        let mut chunks = Vec::new();
        let mut paragraph: Option<(usize, usize)> = None;
        let mut offset = 0;

        for line in text.split('\n') {
            let line_end = offset + line.len();
            if line.strip_suffix('\r').unwrap_or(line).is_empty() {
                if let Some((start, end)) = paragraph.take() {
                    push_trimmed(&mut chunks, &text[start..end]);
                }
            } else {
                let start = paragraph.map_or(offset, |(start, _)| start);
                paragraph = Some((start, line_end));
            }
            offset = line_end + 1;
        }

        if let Some((start, end)) = paragraph {
            push_trimmed(&mut chunks, &text[start..end]);
        }

        Ok(chunks)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        (text_len / 800).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_split() {
        let text = "Intro line\ncontinues.\n\n\nSecond.\n\nThird.";
        let chunks = ParagraphChunker.chunk(text).unwrap();
        assert_eq!(chunks, ["Intro line\ncontinues.", "Second.", "Third."]);
    }

    #[test]
    fn test_whitespace_line_is_not_a_break() {
        assert_eq!(ParagraphChunker.chunk("a\n  \nb").unwrap(), ["a\n  \nb"]);
        assert_eq!(ParagraphChunker.chunk("a\n\t\nb").unwrap(), ["a\n\t\nb"]);
        assert_eq!(ParagraphChunker.chunk("a\n \n\nb").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_crlf_paragraphs() {
        let chunks = ParagraphChunker.chunk("One\r\nstill one\r\n\r\nTwo\r\n").unwrap();
        assert_eq!(chunks, ["One\r\nstill one", "Two"]);
    }

    #[test]
    fn test_no_blank_lines_is_one_chunk() {
        let chunks = ParagraphChunker.chunk("  a single\nparagraph  ").unwrap();
        assert_eq!(chunks, ["a single\nparagraph"]);
    }

    #[test]
    fn test_leading_and_trailing_blank_lines() {
        let chunks = ParagraphChunker.chunk("\n\n\nBody.\n\n\n").unwrap();
        assert_eq!(chunks, ["Body."]);
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(ParagraphChunker.chunk("").unwrap().is_empty());
        assert!(ParagraphChunker.chunk("\n \n\t\n").unwrap().is_empty());
    }
}
