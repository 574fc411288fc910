//! TF-IDF vectors with smoothed idf and cosine scoring.
//!
//! `idf(t) = ln((1 + N) / (1 + df(t))) + 1`, weights are raw term counts times
//! idf, and rows are L2-normalized unless disabled. The vocabulary keeps the
//! `max_features` most frequent terms of the corpus.

use std::collections::HashMap;
use std::sync::Arc;

use paperdex_core::config::TfidfConfig;
use paperdex_core::ranking::{normalize, top_k};
use paperdex_core::traits::{check_top_k, Retriever, StrategyKind};
use paperdex_core::types::{Corpus, ScoredResult};
use paperdex_core::{Error, Result};

use crate::tokenize::Tokenizer;

pub struct TfidfIndex {
	config: TfidfConfig,
	tokenizer: Tokenizer,
	state: Option<TfidfState>,
}

struct TfidfState {
	corpus: Arc<Corpus>,
	/// Term to column.
	vocabulary: HashMap<String, usize>,
	idf: Vec<f32>,
	/// Sparse rows, one per chunk: (column, weight).
	rows: Vec<Vec<(usize, f32)>>,
}

impl TfidfIndex {
	pub fn new(config: TfidfConfig) -> Self { Self { config, tokenizer: Tokenizer::new(), state: None } }

	pub fn vocabulary_size(&self) -> usize { self.state.as_ref().map_or(0, |s| s.vocabulary.len()) }

	fn vectorize(&self, vocabulary: &HashMap<String, usize>, idf: &[f32], text: &str) -> Vec<(usize, f32)> {
		let mut counts: HashMap<usize, f32> = HashMap::new();
		for token in self.tokenizer.tokens(text) {
			if let Some(&col) = vocabulary.get(&token) {
				*counts.entry(col).or_default() += 1.0;
			}
		}
		let mut row: Vec<(usize, f32)> = counts.into_iter().map(|(col, tf)| (col, tf * idf[col])).collect();
		row.sort_unstable_by_key(|(col, _)| *col);
		if self.config.normalize {
			let mut weights: Vec<f32> = row.iter().map(|(_, w)| *w).collect();
			normalize(&mut weights);
			for ((_, w), n) in row.iter_mut().zip(weights) {
				*w = n;
			}
		}
		row
	}
}

/// Pick the vocabulary: highest total count first, ties by term text.
fn select_vocabulary(term_counts: HashMap<String, usize>, max_features: usize) -> HashMap<String, usize> {
	let mut terms: Vec<(String, usize)> = term_counts.into_iter().collect();
	terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	terms.truncate(max_features);
	let mut kept: Vec<String> = terms.into_iter().map(|(t, _)| t).collect();
	kept.sort();
	kept.into_iter().enumerate().map(|(col, t)| (t, col)).collect()
}

fn sparse_dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
	let (mut i, mut j, mut sum) = (0, 0, 0.0);
	while i < a.len() && j < b.len() {
		match a[i].0.cmp(&b[j].0) {
			std::cmp::Ordering::Less => i += 1,
			std::cmp::Ordering::Greater => j += 1,
			std::cmp::Ordering::Equal => {
				sum += a[i].1 * b[j].1;
				i += 1;
				j += 1;
			}
		}
	}
	sum
}

impl Retriever for TfidfIndex {
	fn kind(&self) -> StrategyKind { StrategyKind::Tfidf }

	#[allow(clippy::cast_precision_loss)]
	fn build(&mut self, corpus: Arc<Corpus>) -> Result<()> {
		let tokenized: Vec<Vec<String>> = corpus.iter().map(|c| self.tokenizer.tokens(&c.text)).collect();
		let mut term_counts: HashMap<String, usize> = HashMap::new();
		for tokens in &tokenized {
			for t in tokens {
				*term_counts.entry(t.clone()).or_default() += 1;
			}
		}
		let vocabulary = select_vocabulary(term_counts, self.config.max_features);

		let mut df = vec![0usize; vocabulary.len()];
		for tokens in &tokenized {
			let mut seen = std::collections::HashSet::new();
			for t in tokens {
				if let Some(&col) = vocabulary.get(t) {
					if seen.insert(col) {
						df[col] += 1;
					}
				}
			}
		}
		let n = corpus.len() as f32;
		let idf: Vec<f32> = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0).collect();
		let rows = corpus.iter().map(|c| self.vectorize(&vocabulary, &idf, &c.text)).collect();

		tracing::info!(chunks = corpus.len(), features = vocabulary.len(), "built tf-idf matrix");
		self.state = Some(TfidfState { corpus, vocabulary, idf, rows });
		Ok(())
	}

	fn retrieve(&self, query: &str, top_k_results: usize) -> Result<Vec<ScoredResult>> {
		check_top_k(top_k_results)?;
		let state = self.state.as_ref().ok_or(Error::NotIndexed)?;
		let q = self.vectorize(&state.vocabulary, &state.idf, query);
		let scored = state.rows.iter().enumerate().map(|(position, row)| (position, sparse_dot(row, &q)));
		Ok(top_k(scored, top_k_results).into_iter().map(|(p, s)| state.corpus.scored(p, s)).collect())
	}
}
