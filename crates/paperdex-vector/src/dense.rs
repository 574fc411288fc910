//! Dense-vector retrieval: chunk embeddings in a [`VectorStore`], queried by
//! cosine similarity.

use std::collections::HashMap;
use std::sync::Arc;

use paperdex_core::ranking::top_k;
use paperdex_core::sanitize::sanitize;
use paperdex_core::traits::{check_top_k, Embedder, Retriever, StrategyKind, VectorStore};
use paperdex_core::types::{Corpus, ScoredResult, VectorRecord};
use paperdex_core::{Error, Result};

pub struct DenseRetriever {
	embedder: Arc<dyn Embedder>,
	store: Arc<dyn VectorStore>,
	collection_prefix: String,
	batch_size: usize,
	state: Option<DenseState>,
}

struct DenseState {
	corpus: Arc<Corpus>,
	collection: String,
	positions: HashMap<String, usize>,
}

fn record_id(arxiv_id: &str, position: usize) -> String { format!("{arxiv_id}#{position}") }

/// Collection name for a corpus embedded by `model_id`. Identical corpora map
/// to the same collection, so rebuilding reuses it instead of mixing rows.
pub fn collection_name(prefix: &str, model_id: &str, corpus: &Corpus) -> String {
	let mut hasher = blake3::Hasher::new();
	hasher.update(model_id.as_bytes());
	for chunk in corpus {
		hasher.update(&(chunk.position as u64).to_le_bytes());
		hasher.update(chunk.source.arxiv_id.as_bytes());
		hasher.update(&[0]);
		hasher.update(chunk.text.as_bytes());
		hasher.update(&[0]);
	}
	let hex = hasher.finalize().to_hex();
	format!("{prefix}_{}", &hex.as_str()[..16])
}

impl DenseRetriever {
	pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, collection_prefix: impl Into<String>, batch_size: usize) -> Self {
		Self { embedder, store, collection_prefix: collection_prefix.into(), batch_size: batch_size.max(1), state: None }
	}

	/// Collection of the current index, if built.
	pub fn collection(&self) -> Option<&str> { self.state.as_ref().map(|s| s.collection.as_str()) }
}

impl Retriever for DenseRetriever {
	fn kind(&self) -> StrategyKind { StrategyKind::Vector }

	fn build(&mut self, corpus: Arc<Corpus>) -> Result<()> {
		let collection = collection_name(&self.collection_prefix, self.embedder.model_id(), &corpus);
		let mut positions = HashMap::with_capacity(corpus.len());
		for (batch_no, batch) in corpus.chunks().chunks(self.batch_size).enumerate() {
			let start = batch_no * self.batch_size;
			let range = format!("chunks {start}..{}", start + batch.len());
			let texts: Vec<String> = batch.iter().map(|c| sanitize(&c.text)).collect();
			let vectors = self
				.embedder
				.embed_documents(&texts)
				.map_err(|e| Error::embedding(format!("embed_documents {range}"), e))?;
			if vectors.len() != texts.len() {
				return Err(Error::embedding(
					format!("embed_documents {range}"),
					anyhow::anyhow!("provider returned {} vectors for {} texts", vectors.len(), texts.len()),
				));
			}
			let records: Vec<VectorRecord> = batch
				.iter()
				.zip(vectors)
				.map(|(chunk, vector)| VectorRecord {
					id: record_id(&chunk.source.arxiv_id, chunk.position),
					vector,
					text: chunk.text.clone(),
					source: (*chunk.source).clone(),
				})
				.collect();
			self.store
				.upsert(&collection, &records)
				.map_err(|e| Error::vector_store(format!("upsert {range} into {collection}"), e))?;
			for (r, chunk) in records.iter().zip(batch) {
				positions.insert(r.id.clone(), chunk.position);
			}
			tracing::debug!(%collection, %range, "embedded batch");
		}
		tracing::info!(chunks = corpus.len(), %collection, model = self.embedder.model_id(), "built dense index");
		self.state = Some(DenseState { corpus, collection, positions });
		Ok(())
	}

	fn retrieve(&self, query: &str, top_k_results: usize) -> Result<Vec<ScoredResult>> {
		check_top_k(top_k_results)?;
		let state = self.state.as_ref().ok_or(Error::NotIndexed)?;
		if state.corpus.is_empty() {
			return Ok(Vec::new());
		}
		let vector = self.embedder.embed_query(&sanitize(query)).map_err(|e| Error::embedding("embed_query", e))?;
		let hits = self
			.store
			.query(&state.collection, &vector, top_k_results)
			.map_err(|e| Error::vector_store(format!("query {}", state.collection), e))?;
		let mut scored = Vec::with_capacity(hits.len());
		for hit in hits {
			match state.positions.get(&hit.id) {
				Some(&position) => scored.push((position, hit.score)),
				None => tracing::warn!(id = %hit.id, collection = %state.collection, "ignoring vector hit outside the current corpus"),
			}
		}
		Ok(top_k(scored, top_k_results).into_iter().map(|(p, s)| state.corpus.scored(p, s)).collect())
	}
}
