use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Corpus, ScoredResult, VectorHit, VectorRecord};

/// External embedding provider. Implementations may block on network I/O and
/// must return one vector per input, in input order.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model pair.
    fn model_id(&self) -> &str;
    fn embed_documents(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_documents(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("provider {} returned no vector for the query", self.model_id()))
    }
}

/// Nearest-neighbour store keyed by record id, grouped into named collections.
pub trait VectorStore: Send + Sync {
    /// Insert records, replacing any existing record with the same id.
    fn upsert(&self, collection: &str, records: &[VectorRecord]) -> anyhow::Result<()>;
    /// Up to `k` records closest to `vector` under cosine similarity, best first.
    fn query(&self, collection: &str, vector: &[f32], k: usize) -> anyhow::Result<Vec<VectorHit>>;
}

/// The four interchangeable indexing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Vector,
    Bm25,
    Tfidf,
    Inverted,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [Self::Vector, Self::Bm25, Self::Tfidf, Self::Inverted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Bm25 => "bm25",
            Self::Tfidf => "tfidf",
            Self::Inverted => "inverted",
        }
    }

    /// Whether `build` depends on an external provider.
    pub fn is_local(&self) -> bool { !matches!(self, Self::Vector) }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::config(format!("Unknown indexer type: {s}")))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Build-then-query contract shared by all strategies.
///
/// `build` replaces any previous index only once the new one is complete.
/// `retrieve` is read-only; calling it before a successful `build` returns
/// [`Error::NotIndexed`].
pub trait Retriever: Send + Sync {
    fn kind(&self) -> StrategyKind;
    fn build(&mut self, corpus: Arc<Corpus>) -> Result<()>;
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<ScoredResult>>;
}

/// Reject `top_k == 0` before doing any work.
pub fn check_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(Error::config("top_k must be greater than 0"));
    }
    Ok(())
}
