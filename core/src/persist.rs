use crate::config::RankConfig;
use crate::corpus::{Corpus, DocId, TopicId};
use crate::eval::{ModelReport, Qrels, RunRankings};
use crate::prm::{FeatureSet, TopicJudgments};
use crate::ranking::{RankingResult, ScoredDoc};
use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref RANKING_FILE: Regex = Regex::new(r"_R(\d+)Ranking\.dat$").expect("valid regex");
    static ref FIRST_NUMBER: Regex = Regex::new(r"\d+").expect("valid regex");
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_topics: usize,
    pub num_docs: usize,
    pub created_at: String,
    pub version: u32,
    #[serde(default)]
    pub config: Option<RankConfig>,
}

/// Where the indexer keeps its snapshot.
pub struct CorpusPaths {
    pub root: PathBuf,
}

impl CorpusPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn corpus(&self) -> PathBuf { self.root.join("corpus.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Every ranker output lives under one root chosen by the caller.
pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn bm25_dir(&self) -> PathBuf { self.root.join("BM25_Output") }
    pub fn jm_dir(&self) -> PathBuf { self.root.join("JM_LM_Output") }
    fn prm_root(&self) -> PathBuf { self.root.join("PRM_Output") }
    pub fn prm_input_dir(&self) -> PathBuf { self.prm_root().join("PRM_Input") }
    pub fn prm_benchmark_dir(&self) -> PathBuf { self.prm_root().join("PRM_Training_benchmark") }
    pub fn prm_w5_dir(&self) -> PathBuf { self.prm_root().join("PRM_W5") }
    pub fn prm_ranking_dir(&self) -> PathBuf { self.prm_root().join("PRM_Ranking") }
    pub fn evaluation(&self) -> PathBuf { self.root.join("evaluation.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    pub fn model_dir(&self, model: &str) -> PathBuf {
        match model {
            "BM25" => self.bm25_dir(),
            "JM_LM" => self.jm_dir(),
            "PRM" => self.prm_ranking_dir(),
            other => self.root.join(format!("{other}_Output")),
        }
    }

    pub fn ranking_file(&self, model: &str, topic: TopicId) -> PathBuf {
        self.model_dir(model).join(format!("{model}_R{topic}Ranking.dat"))
    }
    pub fn prm_input_file(&self, topic: TopicId) -> PathBuf { self.prm_input_dir().join(format!("PRM_R{topic}.dat")) }
    pub fn benchmark_file(&self, topic: TopicId) -> PathBuf {
        self.prm_benchmark_dir().join(format!("PRM_Training_Benchmark_R{topic}.txt"))
    }
    pub fn features_file(&self, topic: TopicId) -> PathBuf { self.prm_w5_dir().join(format!("PRM_R{topic}.dat")) }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(f))
}

pub fn save_corpus(paths: &CorpusPaths, corpus: &Corpus) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.corpus())?;
    let bytes = bincode::serialize(corpus)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_corpus(paths: &CorpusPaths) -> Result<Corpus> {
    let path = paths.corpus();
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let corpus = bincode::deserialize(&buf)?;
    Ok(corpus)
}

pub fn save_meta(path: &Path, meta: &MetaFile) -> Result<()> {
    let mut f = create_file(path)?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    f.flush()?;
    Ok(())
}

pub fn load_meta(path: &Path) -> Result<MetaFile> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// `<docid> <score>` per line.
pub fn write_scored(path: &Path, entries: &[ScoredDoc]) -> Result<()> {
    let mut out = create_file(path)?;
    for e in entries {
        writeln!(out, "{} {}", e.doc_id, e.score)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_ranking(paths: &OutputPaths, model: &str, ranking: &RankingResult, top_k: usize) -> Result<PathBuf> {
    let path = paths.ranking_file(model, ranking.topic);
    write_scored(&path, ranking.top_k(top_k))?;
    Ok(path)
}

pub fn write_prm_input(paths: &OutputPaths, ranking: &RankingResult) -> Result<PathBuf> {
    let path = paths.prm_input_file(ranking.topic);
    write_scored(&path, &ranking.entries)?;
    Ok(path)
}

/// `R<topic> <docid> <0|1>` per candidate, in ranking order.
pub fn write_benchmark(paths: &OutputPaths, topic: TopicId, judgments: &TopicJudgments) -> Result<PathBuf> {
    let path = paths.benchmark_file(topic);
    let mut out = create_file(&path)?;
    for doc_id in &judgments.all {
        let rel = u8::from(judgments.is_relevant(doc_id));
        writeln!(out, "R{topic} {doc_id} {rel}")?;
    }
    out.flush()?;
    Ok(path)
}

/// `<term>: <weight>` per selected feature; an empty set leaves an empty file.
pub fn write_features(paths: &OutputPaths, features: &FeatureSet) -> Result<PathBuf> {
    let path = paths.features_file(features.topic);
    let mut out = create_file(&path)?;
    for (term, w) in &features.features {
        writeln!(out, "{term}: {w}")?;
    }
    out.flush()?;
    Ok(path)
}

pub fn write_evaluation(paths: &OutputPaths, reports: &[ModelReport]) -> Result<PathBuf> {
    let path = paths.evaluation();
    let mut out = create_file(&path)?;
    serde_json::to_writer_pretty(&mut out, reports)?;
    out.flush()?;
    Ok(path)
}

/// Reads `<docid> <score>` lines back into docids, keeping file order.
pub fn read_ranked_ids(path: &Path) -> Result<Vec<DocId>> {
    let reader = BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
    let mut ids = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc_id = line
            .split_whitespace()
            .next()
            .ok_or_else(|| anyhow!("{}:{}: missing docid", path.display(), n + 1))?;
        ids.push(doc_id.to_string());
    }
    Ok(ids)
}

/// Loads every `*_R<topic>Ranking.dat` in `dir`; other files are skipped.
pub fn load_rankings(dir: &Path) -> Result<RunRankings> {
    let mut run = RunRankings::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else { continue };
        let Some(caps) = RANKING_FILE.captures(name) else {
            tracing::warn!(file = name, "not a ranking file, skipped");
            continue;
        };
        let topic: TopicId = caps[1].parse()?;
        run.insert(topic, read_ranked_ids(&path)?);
    }
    Ok(run)
}

/// Loads judgment files (`<topic> <docid> <rel>` lines). The topic is the first
/// number in the file name; malformed lines are skipped.
pub fn load_qrels(dir: &Path) -> Result<Qrels> {
    let mut qrels = Qrels::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("txt") { continue; }
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else { continue };
        let Some(m) = FIRST_NUMBER.find(name) else {
            tracing::warn!(file = name, "no topic number in judgment file name");
            continue;
        };
        let topic: TopicId = m.as_str().parse()?;
        let mut judged: HashMap<DocId, u32> = HashMap::new();
        let reader = BufReader::new(File::open(&path)?);
        for line in reader.lines() {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if let [_, doc_id, rel] = parts.as_slice() {
                if let Ok(rel) = rel.parse::<u32>() {
                    judged.insert(doc_id.to_string(), rel);
                }
            }
        }
        qrels.insert(topic, judged);
    }
    Ok(qrels)
}
