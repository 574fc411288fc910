use std::path::Path;
use std::sync::Arc;

use paperdex_core::chunker::RecursiveChunker;
use paperdex_core::config::EngineConfig;
use paperdex_core::traits::{Retriever, StrategyKind};
use paperdex_core::types::{Corpus, Document, ScoredResult};
use paperdex_core::Result;

use crate::strategy::{build_retriever, VectorDeps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
}

/// Chunks papers and answers queries with the configured strategy.
///
/// Holds at most one live index. Each call to [`Indexer::index`] rebuilds it
/// from scratch; a failed rebuild leaves the previous index in place.
pub struct Indexer {
    kind: StrategyKind,
    chunker: RecursiveChunker,
    retriever: Box<dyn Retriever>,
    corpus: Option<Arc<Corpus>>,
    default_top_k: usize,
}

impl Indexer {
    /// Fails on an unknown strategy or invalid settings, before any chunking.
    pub fn new(config: &EngineConfig, deps: VectorDeps) -> Result<Self> {
        Self::build(config, Some(deps))
    }

    /// For the inverted, tfidf and bm25 strategies, which need no external
    /// provider.
    pub fn local(config: &EngineConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Open whatever the config names, creating embedding provider and vector
    /// store only for the vector strategy.
    pub fn from_config(config: &EngineConfig, base: &Path) -> Result<Self> {
        if config.indexer.strategy()?.is_local() {
            Self::local(config)
        } else {
            Self::new(config, VectorDeps::from_config(config, base)?)
        }
    }

    fn build(config: &EngineConfig, deps: Option<VectorDeps>) -> Result<Self> {
        let kind = config.indexer.strategy()?;
        config.validate()?;
        let chunker = RecursiveChunker::new(config.indexer.chunker())?;
        let retriever = build_retriever(kind, config, deps)?;
        tracing::debug!(strategy = %kind, chunk_size = config.indexer.chunk_size, chunk_overlap = config.indexer.chunk_overlap, "created indexer");
        Ok(Self { kind, chunker, retriever, corpus: None, default_top_k: config.indexer.top_k })
    }

    pub fn kind(&self) -> StrategyKind { self.kind }

    pub fn index(&mut self, papers: &[Document]) -> Result<IndexStats> {
        let corpus = Arc::new(self.chunker.build_corpus(papers));
        self.retriever.build(Arc::clone(&corpus))?;
        let stats = IndexStats { documents: papers.len(), chunks: corpus.len() };
        tracing::info!(strategy = %self.kind, documents = stats.documents, chunks = stats.chunks, "indexed papers");
        self.corpus = Some(corpus);
        Ok(stats)
    }

    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<ScoredResult>> {
        self.retriever.retrieve(query, top_k)
    }

    /// Retrieve with the configured `indexer.top_k`.
    pub fn retrieve_default(&self, query: &str) -> Result<Vec<ScoredResult>> {
        self.retrieve(query, self.default_top_k)
    }

    /// Chunks of the current index, if any.
    pub fn corpus(&self) -> Option<&Corpus> { self.corpus.as_deref() }
}
