use std::collections::HashMap;
use std::sync::Arc;

use paperdex_core::config::Bm25Config;
use paperdex_core::ranking::top_k;
use paperdex_core::traits::{check_top_k, Retriever, StrategyKind};
use paperdex_core::types::{Corpus, ScoredResult};
use paperdex_core::{Error, Result};

use crate::tokenize::Tokenizer;

/// Okapi BM25. Every chunk is scored, including those sharing no term with
/// the query, so results always hold `min(top_k, N)` entries.
pub struct Bm25Index {
	config: Bm25Config,
	tokenizer: Tokenizer,
	state: Option<Bm25State>,
}

struct Bm25State {
	corpus: Arc<Corpus>,
	doc_freqs: Vec<HashMap<String, u32>>,
	doc_lens: Vec<f32>,
	avgdl: f32,
	idf: HashMap<String, f32>,
}

impl Bm25Index {
	pub fn new(config: Bm25Config) -> Self { Self { config, tokenizer: Tokenizer::new(), state: None } }
}

/// `ln(1 + (N - df + 0.5) / (df + 0.5))`, positive for any `df <= N`.
fn idf(n: f32, df: f32) -> f32 { (1.0 + (n - df + 0.5) / (df + 0.5)).ln() }

impl Bm25State {
	fn score(&self, query: &[String], position: usize, k1: f32, b: f32) -> f32 {
		let freqs = &self.doc_freqs[position];
		let norm = if self.avgdl > 0.0 { self.doc_lens[position] / self.avgdl } else { 0.0 };
		query
			.iter()
			.filter_map(|t| {
				let tf = *freqs.get(t)? as f32;
				let weight = self.idf.get(t).copied().unwrap_or(0.0);
				Some(weight * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * norm)))
			})
			.sum()
	}
}

impl Retriever for Bm25Index {
	fn kind(&self) -> StrategyKind { StrategyKind::Bm25 }

	#[allow(clippy::cast_precision_loss)]
	fn build(&mut self, corpus: Arc<Corpus>) -> Result<()> {
		let mut doc_freqs = Vec::with_capacity(corpus.len());
		let mut doc_lens = Vec::with_capacity(corpus.len());
		let mut df: HashMap<String, u32> = HashMap::new();
		for chunk in corpus.iter() {
			let tokens = self.tokenizer.tokens(&chunk.text);
			doc_lens.push(tokens.len() as f32);
			let mut freqs: HashMap<String, u32> = HashMap::new();
			for t in tokens {
				*freqs.entry(t).or_default() += 1;
			}
			for t in freqs.keys() {
				*df.entry(t.clone()).or_default() += 1;
			}
			doc_freqs.push(freqs);
		}
		let n = corpus.len() as f32;
		let avgdl = if doc_lens.is_empty() { 0.0 } else { doc_lens.iter().sum::<f32>() / n };
		let idf_by_term = df.into_iter().map(|(t, d)| (t, idf(n, d as f32))).collect();

		tracing::info!(chunks = corpus.len(), avgdl, "built bm25 index");
		self.state = Some(Bm25State { corpus, doc_freqs, doc_lens, avgdl, idf: idf_by_term });
		Ok(())
	}

	fn retrieve(&self, query: &str, top_k_results: usize) -> Result<Vec<ScoredResult>> {
		check_top_k(top_k_results)?;
		let state = self.state.as_ref().ok_or(Error::NotIndexed)?;
		let tokens = self.tokenizer.tokens(query);
		let (k1, b) = (self.config.k1, self.config.b);
		let scored = (0..state.corpus.len()).map(|p| (p, state.score(&tokens, p, k1, b)));
		Ok(top_k(scored, top_k_results).into_iter().map(|(p, s)| state.corpus.scored(p, s)).collect())
	}
}
