use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use paperdex_core::chunker::{ChunkerConfig, RecursiveChunker};
use paperdex_core::config::Config;
use paperdex_core::types::{Document, PaperMetadata};
use paperdex_core::Error;

fn metadata(id: &str, title: &str) -> PaperMetadata {
    PaperMetadata {
        title: title.to_string(),
        arxiv_id: id.to_string(),
        authors: vec!["A. Author".to_string()],
        published: NaiveDate::from_ymd_opt(2017, 6, 12).expect("date"),
    }
}

#[test]
fn corpus_positions_follow_document_order() {
    let docs = vec![
        Document::new("alpha bravo charlie delta echo foxtrot", metadata("1706.03762", "Attention")).expect("doc"),
        Document::new("golf hotel", metadata("1810.04805", "BERT")).expect("doc"),
    ];
    let chunker = RecursiveChunker::new(ChunkerConfig { chunk_size: 12, chunk_overlap: 0 }).expect("chunker");
    let corpus = chunker.build_corpus(&docs);

    let texts: Vec<&str> = corpus.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["alpha bravo", "charlie", "delta echo", "foxtrot", "golf hotel"]);
    for (i, chunk) in corpus.iter().enumerate() {
        assert_eq!(chunk.position, i);
    }
    assert_eq!(corpus.get(0).map(|c| c.source.arxiv_id.as_str()), Some("1706.03762"));
    assert_eq!(corpus.get(4).map(|c| c.source.title.as_str()), Some("BERT"));
}

#[test]
fn chunks_are_sanitized_and_titles_cleaned() {
    let doc = Document::new("line one\n\n\tline\u{0} two", metadata("x1", "  Messy\n title ")).expect("doc");
    let chunker = RecursiveChunker::new(ChunkerConfig::default()).expect("chunker");
    let corpus = chunker.build_corpus(&[doc]);
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.chunks()[0].text, "line one line two");
    assert_eq!(corpus.chunks()[0].source.title, "Messy title");
}

#[test]
fn document_validation_rejects_missing_identity() {
    assert!(matches!(Document::new("text", metadata("", "Title")), Err(Error::InvalidDocument(_))));
    assert!(matches!(Document::new("text", metadata("id", "   ")), Err(Error::InvalidDocument(_))));
}

#[test]
fn document_from_malformed_bytes_is_salvaged() {
    let doc = Document::from_bytes(b"caf\xc3\xa9 \xff\xfeok", metadata("id", "T")).expect("doc");
    assert_eq!(doc.text, "café ok");
}

#[test]
fn metadata_round_trips_through_json() {
    let json = r#"{"title":"Attention Is All You Need","arxiv_id":"1706.03762","authors":["Vaswani"],"published":"2017-06-12"}"#;
    let meta: PaperMetadata = serde_json::from_str(json).expect("parse");
    assert_eq!(meta.published, NaiveDate::from_ymd_opt(2017, 6, 12).expect("date"));
}

#[test]
fn config_defaults_without_files() {
    let tmp = TempDir::new().expect("tmp");
    let config = Config::load_from(tmp.path(), "none").expect("load");
    let engine = config.engine().expect("engine");
    assert_eq!(engine.indexer.kind, "bm25");
    assert_eq!(engine.indexer.chunk_size, 1000);
    assert_eq!(engine.indexer.chunk_overlap, 200);
    assert_eq!(engine.indexer.tfidf.max_features, 5000);
    assert_eq!(engine.ranker.top_k, 5);
}

#[test]
fn config_env_file_overrides_base_file() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(
        tmp.path().join("config.toml"),
        "[indexer]\ntype = \"tfidf\"\nchunk_size = 500\nchunk_overlap = 50\n\n[indexer.bm25]\nk1 = 1.2\n",
    )
    .expect("write");
    fs::write(tmp.path().join("config.test.toml"), "[indexer]\ntop_k = 3\n").expect("write");

    let config = Config::load_from(tmp.path(), "test").expect("load");
    let engine = config.engine().expect("engine");
    assert_eq!(engine.indexer.kind, "tfidf");
    assert_eq!(engine.indexer.chunk_size, 500);
    assert_eq!(engine.indexer.top_k, 3);
    assert!((engine.indexer.bm25.k1 - 1.2).abs() < 1e-6);
    assert!((engine.indexer.bm25.b - 0.75).abs() < 1e-6);
    let size: usize = config.get("indexer.chunk_size").expect("get");
    assert_eq!(size, 500);
}

#[test]
fn config_rejects_overlap_not_smaller_than_size() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.toml"), "[indexer]\nchunk_size = 100\nchunk_overlap = 100\n").expect("write");
    let config = Config::load_from(tmp.path(), "none").expect("load");
    assert!(matches!(config.engine(), Err(Error::Configuration(_))));
}
