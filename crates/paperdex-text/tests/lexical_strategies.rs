use std::sync::Arc;

use paperdex_core::config::{Bm25Config, TfidfConfig};
use paperdex_core::traits::Retriever;
use paperdex_core::types::{ChunkSource, Corpus};
use paperdex_core::Error;
use paperdex_text::{Bm25Index, InvertedIndex, TfidfIndex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn source(id: &str) -> ChunkSource {
    ChunkSource { title: format!("Paper {id}"), arxiv_id: id.to_string() }
}

fn corpus_of(docs: &[(&str, &[&str])]) -> Arc<Corpus> {
    let mut corpus = Corpus::new();
    for (id, chunks) in docs {
        corpus.push_document(source(id), chunks.iter().map(|c| c.to_string()));
    }
    Arc::new(corpus)
}

fn sample() -> Arc<Corpus> {
    corpus_of(&[
        ("p1", &["deep learning for images", "convolutional networks and images"]),
        ("p2", &["graph neural networks", "quasicrystal lattice structure"]),
        ("p3", &["recurrent networks for sequences"]),
    ])
}

fn strategies() -> Vec<Box<dyn Retriever>> {
    vec![
        Box::new(InvertedIndex::new()),
        Box::new(TfidfIndex::new(TfidfConfig::default())),
        Box::new(Bm25Index::new(Bm25Config::default())),
    ]
}

#[test]
fn unique_term_chunk_comes_first() {
    init_tracing();
    for mut strategy in strategies() {
        strategy.build(sample()).expect("build");
        let results = strategy.retrieve("quasicrystal", 1).expect("retrieve");
        assert_eq!(results.len(), 1, "{}", strategy.kind());
        assert_eq!(results[0].position, 3, "{}", strategy.kind());
        assert_eq!(results[0].source.arxiv_id, "p2");
        assert_eq!(results[0].chunk_text, "quasicrystal lattice structure");
    }
}

#[test]
fn tfidf_returns_every_chunk_sorted() {
    let mut tfidf = TfidfIndex::new(TfidfConfig::default());
    tfidf.build(sample()).expect("build");
    let results = tfidf.retrieve("networks images", 50).expect("retrieve");
    assert_eq!(results.len(), 5);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn bm25_ranks_whole_corpus_and_inverted_only_matches() {
    let mut bm25 = Bm25Index::new(Bm25Config::default());
    bm25.build(sample()).expect("build");
    assert_eq!(bm25.retrieve("images", 10).expect("retrieve").len(), 5);

    let mut inverted = InvertedIndex::new();
    inverted.build(sample()).expect("build");
    let hits = inverted.retrieve("images", 10).expect("retrieve");
    assert_eq!(hits.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn rebuilding_on_the_same_corpus_is_idempotent() {
    for mut strategy in strategies() {
        strategy.build(sample()).expect("build");
        let first = strategy.retrieve("networks for images", 5).expect("retrieve");
        strategy.build(sample()).expect("rebuild");
        let second = strategy.retrieve("networks for images", 5).expect("retrieve");
        assert_eq!(first, second, "{}", strategy.kind());
    }
}

#[test]
fn equal_scores_keep_corpus_order() {
    let corpus = corpus_of(&[("a", &["shared term", "shared term"]), ("b", &["shared term"])]);
    for mut strategy in strategies() {
        strategy.build(Arc::clone(&corpus)).expect("build");
        let results = strategy.retrieve("shared", 3).expect("retrieve");
        assert_eq!(results.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0, 1, 2], "{}", strategy.kind());
    }
}

#[test]
fn attention_transformer_scenario() {
    let corpus = corpus_of(&[
        ("1706.03762", &["Attention in the Transformer", "memory networks"]),
        ("1810.04805", &["transformer encoders without recurrence"]),
    ]);
    let mut inverted = InvertedIndex::new();
    inverted.build(corpus).expect("build");
    let results = inverted.retrieve("attention transformer", 2).expect("retrieve");
    assert_eq!(results.len(), 2);
    assert_eq!((results[0].position, results[0].score), (0, 2.0));
    assert_eq!((results[1].position, results[1].score), (2, 1.0));
    assert_eq!(results[1].source.arxiv_id, "1810.04805");
    assert!(inverted.retrieve("attention transformer", 5).expect("retrieve").iter().all(|r| r.position != 1));
}

#[test]
fn empty_corpus_answers_nothing() {
    for mut strategy in strategies() {
        strategy.build(Arc::new(Corpus::new())).expect("build");
        assert!(strategy.retrieve("anything", 5).expect("retrieve").is_empty());
    }
}

#[test]
fn query_before_build_fails() {
    for strategy in strategies() {
        assert!(matches!(strategy.retrieve("x", 3), Err(Error::NotIndexed)));
    }
}
