//! Fixed-size, overlapping, newline-preferring text splitter.
//!
//! The text is walked in segments of at most `chunk_size` characters. When
//! more text follows, a segment ends right after the last newline inside
//! its window, falling back to a hard cut at `chunk_size` when the window
//! has no newline. Every chunk after the first is prefixed with the last
//! `chunk_overlap` characters before its segment, so a chunk holds at most
//! `chunk_size + chunk_overlap` characters and neighbouring chunks share
//! exactly `chunk_overlap` characters.
//!
//! All sizes count `char`s, never bytes, so multi-byte text is never cut
//! inside a code point.

use crate::document::Chunk;
use crate::providers::TextSplitter;

/// Character splitter with the pipeline's default sizes (2000 / 50).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for CharacterSplitter {
    fn default() -> Self {
        Self::new(2000, 50)
    }
}

impl CharacterSplitter {
    /// `chunk_size` is clamped to ≥ 1 and `chunk_overlap` to below it.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// End (exclusive) of the segment starting at `start`.
    fn segment_end(&self, chars: &[char], start: usize) -> usize {
        let end = (start + self.chunk_size).min(chars.len());
        if end == chars.len() {
            return end;
        }
        match chars[start..end].iter().rposition(|&c| c == '\n') {
            Some(pos) if pos > 0 => start + pos + 1,
            _ => end,
        }
    }
}

impl TextSplitter for CharacterSplitter {
    fn split(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = self.segment_end(&chars, start);
            let fresh = &chars[start..end];

            // Whitespace-only segments carry nothing worth retrieving.
            if !fresh.iter().all(|c| c.is_whitespace()) {
                let from = start.saturating_sub(self.chunk_overlap);
                chunks.push(Chunk {
                    ordinal: chunks.len(),
                    start,
                    text: chars[from..end].iter().collect(),
                });
            }
            start = end;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(n: usize) -> String {
        (0..n)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn short_document_is_one_chunk() {
        let text = letters(1999);
        let chunks = CharacterSplitter::default().split(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn four_thousand_chars_make_two_overlapping_chunks() {
        let text = letters(4000);
        let chunks = CharacterSplitter::default().split(&text);
        assert_eq!(chunks.len(), 2);

        let first: Vec<char> = chunks[0].text.chars().collect();
        let second: Vec<char> = chunks[1].text.chars().collect();
        assert_eq!(first.len(), 2000);
        assert_eq!(second.len(), 2050);
        assert_eq!(&first[1950..], &second[..50]);
        assert_eq!(chunks[1].start, 2000);
        assert_eq!(chunks[1].ordinal, 1);
    }

    #[test]
    fn prefers_breaking_after_newline() {
        let text = format!("{}\n{}", "a".repeat(1500), "b".repeat(1000));
        let chunks = CharacterSplitter::default().split(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("{}\n", "a".repeat(1500)));
        assert_eq!(chunks[1].start, 1501);
        assert!(chunks[1].text.starts_with(&format!("{}\n", "a".repeat(49))));
        assert!(chunks[1].text.ends_with(&"b".repeat(1000)));
    }

    #[test]
    fn hard_cut_without_newline() {
        let chunks = CharacterSplitter::new(10, 2).split(&"x".repeat(25));
        let lens: Vec<usize> = chunks.iter().map(|c| c.text.chars().count()).collect();
        assert_eq!(lens, vec![10, 12, 7]);
    }

    #[test]
    fn empty_and_blank_text_yield_nothing() {
        let splitter = CharacterSplitter::default();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("\n\n   \n").is_empty());
    }

    #[test]
    fn multibyte_text_is_counted_in_chars() {
        let text = "é".repeat(15);
        let chunks = CharacterSplitter::new(10, 3).split(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text.chars().count(), 8);
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = (0..300)
            .map(|i| format!("Line {i} of the scanned handout.\n"))
            .collect::<String>();
        let splitter = CharacterSplitter::default();
        assert_eq!(splitter.split(&text), splitter.split(&text));
    }

    #[test]
    fn overlap_is_clamped_below_size() {
        let s = CharacterSplitter::new(5, 50);
        assert_eq!(s.chunk_overlap(), 4);
        assert_eq!(CharacterSplitter::new(0, 0).chunk_size(), 1);
    }
}
