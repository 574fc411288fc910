//! paperdex-engine
//!
//! Ties chunking and the retrieval strategies together behind [`Indexer`],
//! and ranks search candidates against a topic with [`Ranker`].
pub mod indexer;
pub mod ranker;
pub mod strategy;

pub use indexer::{IndexStats, Indexer};
pub use ranker::Ranker;
pub use strategy::{build_retriever, VectorDeps};
