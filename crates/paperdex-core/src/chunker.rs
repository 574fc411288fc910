//! Recursive separator chunking with overlap.
//!
//! Text is split on the coarsest separator that occurs in it; pieces that are
//! still too long are split again with the next finer separator, down to
//! single characters. Short pieces are merged back into windows of at most
//! `chunk_size` characters, and each new window starts with the tail of the
//! previous one (at most `chunk_overlap` characters).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sanitize::sanitize;
use crate::types::{Corpus, Document};

/// Paragraph, line, sentence, word, character.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200 }
    }
}

impl ChunkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    config: ChunkerConfig,
    separators: Vec<String>,
}

fn char_len(s: &str) -> usize { s.chars().count() }

impl RecursiveChunker {
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect() })
    }

    /// Use a custom separator list, coarse to fine. An empty separator splits
    /// into characters; if it is missing, oversized atomic pieces are kept whole.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn config(&self) -> ChunkerConfig { self.config }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Sanitize a document, split it, and sanitize each chunk again.
    pub fn chunk_document(&self, document: &Document) -> Vec<String> {
        let text = sanitize(&document.text);
        self.split(&text)
            .into_iter()
            .map(|c| sanitize(&c))
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Chunk every document in order into one corpus.
    pub fn build_corpus(&self, documents: &[Document]) -> Corpus {
        let mut corpus = Corpus::new();
        for document in documents {
            let chunks = self.chunk_document(document);
            tracing::debug!(arxiv_id = %document.metadata.arxiv_id, chunks = chunks.len(), "chunked document");
            corpus.push_document(document.source(), chunks);
        }
        corpus
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.config.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }
            if finer.is_empty() {
                let atomic = piece.trim();
                if !atomic.is_empty() {
                    chunks.push(atomic.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(&piece, finer));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }
        chunks
    }

    /// Merge pieces into windows of at most `chunk_size` characters, carrying
    /// up to `chunk_overlap` characters of trailing pieces into the next window.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let mut out = Vec::new();
        let mut window: std::collections::VecDeque<(&str, usize)> = std::collections::VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > size {
                if total > size {
                    tracing::warn!(window = total, chunk_size = size, "created a chunk longer than chunk_size");
                }
                if !window.is_empty() {
                    if let Some(chunk) = join_window(&window) {
                        out.push(chunk);
                    }
                    while total > overlap || (total > 0 && total + len > size) {
                        match window.pop_front() {
                            Some((_, front_len)) => total -= front_len,
                            None => break,
                        }
                    }
                }
            }
            window.push_back((piece.as_str(), len));
            total += len;
        }
        if let Some(chunk) = join_window(&window) {
            out.push(chunk);
        }
        out
    }
}

fn join_window(window: &std::collections::VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(s, _)| *s).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Split on `separator`, attaching each separator to the start of the piece
/// that follows it. The empty separator yields single characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }
    pieces.retain(|p| !p.is_empty());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunker(size: usize, overlap: usize) -> RecursiveChunker {
        RecursiveChunker::new(ChunkerConfig { chunk_size: size, chunk_overlap: overlap }).expect("valid config")
    }

    #[test]
    fn rejects_invalid_settings() {
        assert!(matches!(RecursiveChunker::new(ChunkerConfig { chunk_size: 0, chunk_overlap: 0 }), Err(Error::Configuration(_))));
        assert!(matches!(RecursiveChunker::new(ChunkerConfig { chunk_size: 10, chunk_overlap: 10 }), Err(Error::Configuration(_))));
    }

    #[test]
    fn separator_is_kept_on_following_piece() {
        assert_eq!(split_keeping_separator("a b c", " "), vec!["a", " b", " c"]);
        assert_eq!(split_keeping_separator(" a", " "), vec![" a"]);
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunker(100, 10).split("Short text here."), vec!["Short text here."]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunker(100, 10).split("").is_empty());
    }

    #[test]
    fn words_are_packed_with_overlap() {
        let chunks = chunker(10, 4).split("aaa bbb ccc ddd eee");
        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd", "ddd eee"]);
    }

    #[test]
    fn sentences_are_preferred_over_words() {
        let text = "First one here. Second one here. Third one.";
        let chunks = chunker(20, 0).split(text);
        assert_eq!(chunks, vec!["First one here", ". Second one here", ". Third one."]);
    }

    #[test]
    fn long_word_falls_back_to_characters() {
        let chunks = chunker(4, 0).split("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn atomic_piece_without_character_fallback_is_kept_whole() {
        let chunker = chunker(4, 0).with_separators([" "]);
        assert_eq!(chunker.split("ab abcdefgh"), vec!["ab", "abcdefgh"]);
    }

    fn stripped(s: &str) -> Vec<char> {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Whether `chunks` can be laid over `input` left to right, each starting
    /// no earlier than the previous chunk and no later than where it ended,
    /// together covering all of `input`.
    fn aligns(input: &[char], chunks: &[Vec<char>]) -> bool {
        fn place(
            input: &[char],
            chunks: &[Vec<char>],
            i: usize,
            prev_start: usize,
            end: usize,
            failed: &mut std::collections::HashSet<(usize, usize, usize)>,
        ) -> bool {
            if i == chunks.len() {
                return end == input.len();
            }
            if failed.contains(&(i, prev_start, end)) {
                return false;
            }
            let chunk = &chunks[i];
            for start in prev_start..=end {
                if input[start..].starts_with(chunk)
                    && place(input, chunks, i + 1, start, end.max(start + chunk.len()), failed)
                {
                    return true;
                }
            }
            failed.insert((i, prev_start, end));
            false
        }
        place(input, chunks, 0, 0, 0, &mut std::collections::HashSet::new())
    }

    #[test]
    fn alignment_accepts_overlap_and_rejects_gaps() {
        let input = stripped("ab cd ef");
        assert!(aligns(&input, &[stripped("ab cd"), stripped("cd ef")]));
        assert!(!aligns(&input, &[stripped("ab"), stripped("ef")]));
        assert!(!aligns(&input, &[stripped("cd ef"), stripped("ab cd")]));
    }

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,6}",
            "[a-z]{12,40}",
            Just(" ".to_string()),
            Just(". ".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            "[é字🙂]{1,3}",
            "\\PC{1,4}",
            any::<char>().prop_map(String::from),
        ]
    }

    fn text() -> impl Strategy<Value = String> {
        prop::collection::vec(fragment(), 0..40).prop_map(|parts| parts.concat())
    }

    fn settings() -> impl Strategy<Value = (usize, usize)> {
        (1usize..48).prop_flat_map(|size| (Just(size), 0..size))
    }

    proptest! {
        #[test]
        fn chunks_respect_size_and_cover_input(input in text(), (size, overlap) in settings()) {
            let chunks = chunker(size, overlap).split(&input);
            for c in &chunks {
                prop_assert!(c.chars().count() <= size, "chunk {:?} longer than {}", c, size);
            }
            let pieces: Vec<Vec<char>> = chunks.iter().map(|c| stripped(c)).collect();
            prop_assert!(aligns(&stripped(&input), &pieces), "chunks {:?} do not cover {:?}", chunks, input);
        }

        #[test]
        fn no_overlap_chunks_partition_input(input in text(), size in 1usize..48) {
            let chunks = chunker(size, 0).split(&input);
            prop_assert_eq!(stripped(&chunks.concat()), stripped(&input));
        }
    }

    #[test]
    fn no_overlap_chunks_reconstruct_text() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunker(12, 0).split(text);
        assert_eq!(chunks.join(" "), text);
    }
}
