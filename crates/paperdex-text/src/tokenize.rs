use tantivy::tokenizer::{LowerCaser, TextAnalyzer, Token, TokenStream, WhitespaceTokenizer};

use paperdex_core::sanitize::sanitize;

/// Whitespace tokenizer with lower-casing, shared by every lexical strategy.
#[derive(Clone)]
pub struct Tokenizer {
	analyzer: TextAnalyzer,
}

impl Default for Tokenizer {
	fn default() -> Self {
		let analyzer = TextAnalyzer::builder(WhitespaceTokenizer::default()).filter(LowerCaser).build();
		Self { analyzer }
	}
}

impl Tokenizer {
	pub fn new() -> Self { Self::default() }

	/// Tokens in order, duplicates kept. Input is sanitized first.
	pub fn tokens(&self, text: &str) -> Vec<String> {
		let clean = sanitize(text);
		let mut analyzer = self.analyzer.clone();
		let mut out = Vec::new();
		analyzer.token_stream(&clean).process(&mut |tok: &Token| out.push(tok.text.clone()));
		out
	}

	/// Distinct tokens in first-seen order.
	pub fn distinct_tokens(&self, text: &str) -> Vec<String> {
		let mut seen = std::collections::HashSet::new();
		self.tokens(text).into_iter().filter(|t| seen.insert(t.clone())).collect()
	}
}
