//! Data carried between pipeline stages: documents, chunks and token budgets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Text of one page, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed page number.
    pub number: usize,
    pub text: String,
}

/// A loaded document. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub source: PathBuf,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }

    /// A single-page document, e.g. the output of OCR on one image.
    pub fn single_page(source: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self::new(
            source,
            vec![Page {
                number: 1,
                text: text.into(),
            }],
        )
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Concatenated page text, pages separated by a newline.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A bounded slice of the indexed text; the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-indexed position in the split sequence.
    pub ordinal: usize,
    /// Character offset (not byte offset) where this chunk's fresh text starts.
    pub start: usize,
    pub text: String,
}

/// A retrieved chunk with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Rough token estimate: one token per four characters.
///
/// No correction for whitespace or multi-byte characters; only used to pick
/// a model tier.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_joins_pages_with_newline() {
        let doc = Document::new(
            "a.pdf",
            vec![
                Page { number: 1, text: "first".into() },
                Page { number: 2, text: "second".into() },
            ],
        );
        assert_eq!(doc.text(), "first\nsecond");
    }

    #[test]
    fn token_estimate_is_chars_over_four() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 0);
        assert_eq!(estimate_tokens("Hello World!"), 3);
        // counts characters, not bytes
        assert_eq!(estimate_tokens("éééé"), 1);
    }
}
