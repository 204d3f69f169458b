use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use topicrank_core::{CorpusPaths, DataLoadError, Engine, Vocabulary};

fn write_corpus(dir: &Path) {
    let paths = CorpusPaths::new(dir);
    fs::write(
        paths.titles(),
        json!({"articles": {"PMC1": "Microgravity induces bone loss", "PMC2": "Root growth on the ISS"}}).to_string(),
    )
    .unwrap();
    fs::write(paths.clusters(), json!({"clusters": {"0": ["PMC1"], "1": ["PMC2"]}}).to_string()).unwrap();
    fs::write(paths.unigrams(), json!({"0": ["Microgravity", "bone"], "1": ["root"]}).to_string()).unwrap();
    fs::write(paths.bigrams(), json!({"0": ["bone loss"], "1": ["root growth"]}).to_string()).unwrap();
}

#[test]
fn loads_engine_from_directory() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let engine = Engine::load(&CorpusPaths::new(dir.path())).unwrap();

    assert_eq!(engine.corpus().num_clusters(), 2);
    assert_eq!(engine.corpus().num_articles(), 2);
    assert_eq!(engine.index().len(), 5);

    let hits = engine.rank_articles(&["bone loss"], 5).hits;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].article_id, "PMC1");
    assert_eq!(hits[0].relevance_score, 1.0);
}

#[test]
fn missing_file_is_reported_by_path() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let paths = CorpusPaths::new(dir.path());
    fs::remove_file(paths.bigrams()).unwrap();

    let err = Engine::load(&paths).unwrap_err();
    assert!(matches!(err, DataLoadError::Missing { .. }));
    assert_eq!(err.path(), paths.bigrams());
}

#[test]
fn malformed_file_is_rejected() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let paths = CorpusPaths::new(dir.path());
    // clusters must be wrapped in {"clusters": ...}
    fs::write(paths.clusters(), json!({"0": ["PMC1"]}).to_string()).unwrap();

    let err = Engine::load(&paths).unwrap_err();
    assert!(matches!(err, DataLoadError::Malformed { .. }));
    assert!(err.to_string().contains("clustersPMC.json"));
}

#[test]
fn vocabulary_falls_back_to_index_terms() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let paths = CorpusPaths::new(dir.path());
    let engine = Engine::load(&paths).unwrap();

    let vocab = Vocabulary::load(&paths, engine.index()).unwrap();
    assert_eq!(vocab.len(), 5);
    assert!(vocab.contains("root growth"));
}

#[test]
fn vocabulary_file_accepts_both_shapes() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let paths = CorpusPaths::new(dir.path());
    let engine = Engine::load(&paths).unwrap();

    fs::write(paths.vocabulary(), json!({"keywords": ["DNA", "Metabolism"]}).to_string()).unwrap();
    let vocab = Vocabulary::load(&paths, engine.index()).unwrap();
    assert_eq!(vocab.validate(&["metabolism", "dna"]), vec!["metabolism", "dna"]);

    fs::write(paths.vocabulary(), json!(["bone"]).to_string()).unwrap();
    let vocab = Vocabulary::load(&paths, engine.index()).unwrap();
    assert_eq!(vocab.len(), 1);

    fs::write(paths.vocabulary(), "{not json").unwrap();
    assert!(Vocabulary::load(&paths, engine.index()).is_err());
}
