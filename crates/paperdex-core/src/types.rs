//! Domain types shared by the chunker, the strategies and the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sanitize::{sanitize, sanitize_bytes};

/// Bibliographic record of a paper, as produced by the extraction step.
///
/// `published` (de)serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: String,
    pub arxiv_id: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub published: NaiveDate,
}

/// A whole extracted document: raw text plus its metadata.
///
/// Construct through [`Document::new`] or [`Document::from_bytes`]; both
/// validate the metadata once so chunks never have to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: PaperMetadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: PaperMetadata) -> Result<Self> {
        if metadata.arxiv_id.trim().is_empty() {
            return Err(Error::InvalidDocument("arxiv_id must not be empty".to_string()));
        }
        if metadata.title.trim().is_empty() {
            return Err(Error::InvalidDocument(format!("paper {} has an empty title", metadata.arxiv_id)));
        }
        Ok(Self { text: text.into(), metadata })
    }

    /// Build a document from raw extracted bytes whose encoding may be broken.
    /// Invalid sequences are dropped instead of failing the document.
    pub fn from_bytes(bytes: &[u8], metadata: PaperMetadata) -> Result<Self> {
        Self::new(sanitize_bytes(bytes), metadata)
    }

    /// The sanitized metadata subset carried by every chunk of this document.
    pub fn source(&self) -> ChunkSource {
        ChunkSource {
            title: sanitize(&self.metadata.title),
            arxiv_id: self.metadata.arxiv_id.clone(),
        }
    }
}

/// Metadata attached to chunks and results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSource {
    pub title: String,
    pub arxiv_id: String,
}

/// A bounded fragment of a document. `position` is the chunk's index in the
/// corpus and the id every strategy uses internally.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub position: usize,
    pub text: String,
    pub source: Arc<ChunkSource>,
}

/// Ordered chunks of one indexing run.
///
/// Positions are dense and follow insertion order: chunks of the first
/// document come first, in chunk order, then the next document, and so on.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    chunks: Vec<Chunk>,
}

impl Corpus {
    pub fn new() -> Self { Self::default() }

    /// Append one document's chunks; they all share one `ChunkSource`.
    pub fn push_document<I>(&mut self, source: ChunkSource, texts: I)
    where
        I: IntoIterator<Item = String>,
    {
        let source = Arc::new(source);
        for text in texts {
            let position = self.chunks.len();
            self.chunks.push(Chunk { position, text, source: Arc::clone(&source) });
        }
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn get(&self, position: usize) -> Option<&Chunk> { self.chunks.get(position) }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> { self.chunks.iter() }

    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    /// Materialize a result for the chunk at `position`.
    ///
    /// Panics if `position` is out of range; strategies only produce
    /// positions taken from the corpus they were built over.
    pub fn scored(&self, position: usize, score: f32) -> ScoredResult {
        let chunk = &self.chunks[position];
        ScoredResult {
            chunk_text: chunk.text.clone(),
            source: (*chunk.source).clone(),
            score,
            position,
        }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter { self.chunks.iter() }
}

/// One retrieval hit. `score` is strategy-specific and higher is better;
/// scores of different strategies are not comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub chunk_text: String,
    pub source: ChunkSource,
    pub score: f32,
    pub position: usize,
}

/// A search-result level paper description used by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperSummary {
    pub arxiv_id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub published: Option<NaiveDate>,
}

impl PaperSummary {
    /// Text embedded by the ranker for this paper.
    pub fn ranking_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPaper {
    pub paper: PaperSummary,
    pub similarity: f32,
}

/// One row written to a vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub source: ChunkSource,
}

/// A nearest-neighbour hit. `score` is cosine similarity, higher is better.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub source: ChunkSource,
}
