use std::collections::HashMap;
use std::sync::Arc;

use paperdex_core::ranking::top_k;
use paperdex_core::traits::{check_top_k, Retriever, StrategyKind};
use paperdex_core::types::{Corpus, ScoredResult};
use paperdex_core::{Error, Result};

use crate::tokenize::Tokenizer;

/// Term to postings map. Scores a chunk by how many distinct query terms it
/// contains; chunks matching none are left out of the results.
pub struct InvertedIndex {
	tokenizer: Tokenizer,
	state: Option<InvertedState>,
}

struct InvertedState {
	corpus: Arc<Corpus>,
	/// Ascending chunk positions per term.
	postings: HashMap<String, Vec<usize>>,
}

impl Default for InvertedIndex {
	fn default() -> Self { Self::new() }
}

impl InvertedIndex {
	pub fn new() -> Self { Self { tokenizer: Tokenizer::new(), state: None } }

	pub fn postings(&self, term: &str) -> Option<&[usize]> {
		self.state.as_ref()?.postings.get(term).map(Vec::as_slice)
	}

	pub fn vocabulary_size(&self) -> usize { self.state.as_ref().map_or(0, |s| s.postings.len()) }
}

impl Retriever for InvertedIndex {
	fn kind(&self) -> StrategyKind { StrategyKind::Inverted }

	fn build(&mut self, corpus: Arc<Corpus>) -> Result<()> {
		let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
		for chunk in corpus.iter() {
			for term in self.tokenizer.distinct_tokens(&chunk.text) {
				postings.entry(term).or_default().push(chunk.position);
			}
		}
		tracing::info!(chunks = corpus.len(), terms = postings.len(), "built inverted index");
		self.state = Some(InvertedState { corpus, postings });
		Ok(())
	}

	fn retrieve(&self, query: &str, top_k_results: usize) -> Result<Vec<ScoredResult>> {
		check_top_k(top_k_results)?;
		let state = self.state.as_ref().ok_or(Error::NotIndexed)?;
		let mut matches: HashMap<usize, usize> = HashMap::new();
		for term in self.tokenizer.distinct_tokens(query) {
			if let Some(positions) = state.postings.get(&term) {
				for &position in positions {
					*matches.entry(position).or_default() += 1;
				}
			}
		}
		tracing::debug!(query, matched = matches.len(), "inverted lookup");
		#[allow(clippy::cast_precision_loss)]
		let scored = matches.into_iter().map(|(position, count)| (position, count as f32));
		Ok(top_k(scored, top_k_results).into_iter().map(|(p, s)| state.corpus.scored(p, s)).collect())
	}
}
