use std::sync::Arc;

use paperdex_core::config::EngineConfig;
use paperdex_core::ranking::{cosine_similarity, top_k};
use paperdex_core::traits::{check_top_k, Embedder};
use paperdex_core::types::{PaperSummary, RankedPaper};
use paperdex_core::{Error, Result};

/// Orders candidate papers by embedding similarity to a topic.
pub struct Ranker {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Ranker {
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize) -> Self { Self { embedder, top_k } }

    pub fn from_config(config: &EngineConfig, embedder: Arc<dyn Embedder>) -> Self { Self::new(embedder, config.ranker.top_k) }

    /// Best `top_k` candidates by cosine similarity of `"{title} {summary}"`
    /// to `topic`. Ties keep candidate order.
    pub fn rank(&self, candidates: &[PaperSummary], topic: &str) -> Result<Vec<RankedPaper>> {
        check_top_k(self.top_k)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let topic_vector = self.embedder.embed_query(topic).map_err(|e| Error::embedding("embed_query topic", e))?;
        let texts: Vec<String> = candidates.iter().map(PaperSummary::ranking_text).collect();
        let operation = format!("embed_documents {} candidates", texts.len());
        let vectors = self.embedder.embed_documents(&texts).map_err(|e| Error::embedding(operation.clone(), e))?;
        if vectors.len() != candidates.len() {
            return Err(Error::embedding(
                operation,
                anyhow::anyhow!("provider returned {} vectors for {} candidates", vectors.len(), candidates.len()),
            ));
        }
        let scored = vectors.iter().enumerate().map(|(i, v)| (i, cosine_similarity(&topic_vector, v)));
        let ranked: Vec<RankedPaper> = top_k(scored, self.top_k)
            .into_iter()
            .map(|(i, similarity)| RankedPaper { paper: candidates[i].clone(), similarity })
            .collect();
        tracing::debug!(candidates = candidates.len(), kept = ranked.len(), "ranked papers");
        Ok(ranked)
    }
}
