use std::path::Path;
use std::sync::Arc;

use paperdex_core::config::EngineConfig;
use paperdex_core::traits::{Embedder, Retriever, StrategyKind, VectorStore};
use paperdex_core::{Error, Result};
use paperdex_embed::embedder_from_config;
use paperdex_text::{Bm25Index, InvertedIndex, TfidfIndex};
use paperdex_vector::{vector_store_from_config, DenseRetriever};

/// External capabilities the dense strategy is built on.
#[derive(Clone)]
pub struct VectorDeps {
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
}

impl VectorDeps {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self { Self { embedder, store } }

    /// Provider and store named in the config; a relative store uri is
    /// resolved against `base`.
    pub fn from_config(config: &EngineConfig, base: &Path) -> Result<Self> {
        let embedder = embedder_from_config(&config.embedding)?;
        let store = vector_store_from_config(&config.indexer.vector, base)?;
        Ok(Self { embedder, store })
    }
}

/// Construct the strategy for `kind`. `deps` is only consulted for
/// [`StrategyKind::Vector`], which fails without it.
pub fn build_retriever(kind: StrategyKind, config: &EngineConfig, deps: Option<VectorDeps>) -> Result<Box<dyn Retriever>> {
    let indexer = &config.indexer;
    let retriever: Box<dyn Retriever> = match kind {
        StrategyKind::Inverted => Box::new(InvertedIndex::new()),
        StrategyKind::Tfidf => Box::new(TfidfIndex::new(indexer.tfidf.clone())),
        StrategyKind::Bm25 => Box::new(Bm25Index::new(indexer.bm25.clone())),
        StrategyKind::Vector => {
            let deps = deps.ok_or_else(|| Error::config("the vector strategy needs an embedder and a vector store"))?;
            Box::new(DenseRetriever::new(
                deps.embedder,
                deps.store,
                indexer.vector.collection_prefix.clone(),
                indexer.vector.embed_batch_size,
            ))
        }
    };
    Ok(retriever)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_local_kind_builds_without_deps() {
        let config = EngineConfig::default();
        for kind in StrategyKind::ALL.into_iter().filter(StrategyKind::is_local) {
            let retriever = build_retriever(kind, &config, None).expect("retriever");
            assert_eq!(retriever.kind(), kind);
        }
    }

    #[test]
    fn vector_without_deps_is_a_configuration_error() {
        let err = build_retriever(StrategyKind::Vector, &EngineConfig::default(), None);
        assert!(matches!(err, Err(Error::Configuration(_))));
    }
}
