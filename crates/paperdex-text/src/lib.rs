//! paperdex-text
//!
//! Lexical retrieval strategies over a chunk corpus: an inverted index,
//! TF-IDF with cosine scoring, and Okapi BM25. All three share the tokenizer
//! in [`tokenize`].
pub mod bm25;
pub mod inverted;
pub mod tfidf;
pub mod tokenize;

pub use bm25::Bm25Index;
pub use inverted::InvertedIndex;
pub use tfidf::TfidfIndex;
pub use tokenize::Tokenizer;
