use std::fs;
use tempfile::tempdir;
use topicrank_core::persist::load_meta;
use topicrank_core::{Collection, Corpus, Document, Query, RankConfig};
use topicrank_ranker::Pipeline;

fn doc(id: &str, terms: &[(&str, u32)]) -> Document {
    let mut d = Document::new(id);
    for (t, c) in terms {
        d.terms.insert(t.to_string(), *c);
        d.doc_len += c;
    }
    d
}

fn tiny_corpus() -> Corpus {
    let mut corpus = Corpus::default();
    for topic in [101u32, 102] {
        let mut q = Query::new(topic);
        q.add_term("oil");
        q.add_term("spill");
        corpus.queries.add_query(q);

        let mut c = Collection::new();
        c.add_doc(doc("1", &[("oil", 4), ("spill", 3), ("tanker", 2)]));
        c.add_doc(doc("2", &[("oil", 3), ("spill", 2), ("coast", 1)]));
        for i in 3..=20 {
            c.add_doc(doc(&i.to_string(), &[("market", 2), ("price", (i % 4) as u32 + 1)]));
        }
        corpus.data.insert(topic, c);
    }
    corpus
}

#[test]
fn rank_writes_top_k_files_per_model() {
    let dir = tempdir().unwrap();
    let corpus = tiny_corpus();
    let pipeline = Pipeline::new(&corpus, RankConfig::default(), dir.path()).unwrap();
    let summary = pipeline.rank().unwrap();
    assert_eq!(summary.topics, vec![101, 102]);
    assert_eq!(summary.files_written, 4);

    let bm25 = fs::read_to_string(dir.path().join("BM25_Output/BM25_R101Ranking.dat")).unwrap();
    assert_eq!(bm25.lines().count(), 15);
    assert!(bm25.starts_with("1 "));
    let jm = fs::read_to_string(dir.path().join("JM_LM_Output/JM_LM_R102Ranking.dat")).unwrap();
    assert_eq!(jm.lines().count(), 15);
}

#[test]
fn prm_then_evaluate() {
    let dir = tempdir().unwrap();
    let corpus = tiny_corpus();
    let pipeline = Pipeline::new(&corpus, RankConfig::default(), dir.path()).unwrap();
    pipeline.rank().unwrap();
    let outcomes = pipeline.prm().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].judgments.relevant, vec!["1".to_string(), "2".to_string()]);
    assert!(outcomes[0].features.weight("oil").is_some());

    let prm_input = fs::read_to_string(dir.path().join("PRM_Output/PRM_Input/PRM_R101.dat")).unwrap();
    assert_eq!(prm_input.lines().count(), 20);
    let bench = fs::read_to_string(dir.path().join("PRM_Output/PRM_Training_benchmark/PRM_Training_Benchmark_R101.txt")).unwrap();
    assert!(bench.starts_with("R101 1 1\nR101 2 1\n"));
    assert!(dir.path().join("PRM_Output/PRM_W5/PRM_R102.dat").is_file());
    assert!(dir.path().join("PRM_Output/PRM_Ranking/PRM_R102Ranking.dat").is_file());

    let qrels = dir.path().join("qrels");
    fs::create_dir_all(&qrels).unwrap();
    fs::write(qrels.join("Dataset101.txt"), "R101 1 1\nR101 2 1\nR101 3 0\n").unwrap();
    fs::write(qrels.join("Dataset102.txt"), "R102 2 1\n").unwrap();
    let reports = pipeline.evaluate(&qrels).unwrap();
    assert_eq!(reports.len(), 3);
    let bm25 = &reports[0];
    assert_eq!(bm25.model, "BM25");
    assert_eq!(bm25.evaluated_topics, 2);
    // topic 101: both relevant at ranks 1-2; topic 102: relevant at rank 2
    assert!((bm25.map - (1.0 + 0.5) / 2.0).abs() < 1e-12);
    assert!(dir.path().join("evaluation.json").is_file());
}

#[test]
fn invalid_config_is_rejected() {
    let corpus = tiny_corpus();
    let mut cfg = RankConfig::default();
    cfg.top_k = 0;
    assert!(Pipeline::new(&corpus, cfg, "unused").is_err());
}

#[test]
fn query_without_collection_fails_fast() {
    let dir = tempdir().unwrap();
    let mut corpus = tiny_corpus();
    corpus.queries.add_query(Query::new(103));
    let pipeline = Pipeline::new(&corpus, RankConfig::default(), dir.path()).unwrap();
    let err = pipeline.rank().unwrap_err();
    assert!(err.to_string().contains("103"));
}

#[test]
fn evaluate_keeps_the_meta_of_the_ranking_run() {
    let dir = tempdir().unwrap();
    let corpus = tiny_corpus();
    let qrels = dir.path().join("qrels");
    fs::create_dir_all(&qrels).unwrap();
    fs::write(qrels.join("Dataset101.txt"), "R101 1 1\n").unwrap();

    let mut cfg = RankConfig::default();
    cfg.top_k = 10;
    let pipeline = Pipeline::new(&corpus, cfg, dir.path()).unwrap();
    pipeline.evaluate(&qrels).unwrap();
    assert!(!dir.path().join("meta.json").exists());

    pipeline.rank().unwrap();
    let meta = load_meta(&dir.path().join("meta.json")).unwrap();
    assert_eq!(meta.config.unwrap().top_k, 10);

    // a later evaluation under another config must not overwrite it
    let other = Pipeline::new(&corpus, RankConfig::default(), dir.path()).unwrap();
    other.evaluate(&qrels).unwrap();
    let meta = load_meta(&dir.path().join("meta.json")).unwrap();
    assert_eq!(meta.config.unwrap().top_k, 10);
}
