//! Ranking quality against ground-truth judgments: AP/MAP, Precision@10, DCG@10.

use crate::corpus::{DocId, TopicId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const CUTOFF: usize = 10;

/// topic -> docid -> relevance grade (0 or 1 in the judgment files).
pub type Qrels = BTreeMap<TopicId, HashMap<DocId, u32>>;

/// topic -> ranked docids, best first.
pub type RunRankings = BTreeMap<TopicId, Vec<DocId>>;

fn grade(judged: &HashMap<DocId, u32>, doc_id: &str) -> u32 { judged.get(doc_id).copied().unwrap_or(0) }

/// Mean of the precision values at each relevant rank; 0 when nothing relevant was retrieved.
pub fn average_precision(ranked: &[DocId], judged: &HashMap<DocId, u32>) -> f64 {
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, doc_id) in ranked.iter().enumerate() {
        if grade(judged, doc_id) == 1 {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    if hits == 0 { 0.0 } else { sum / hits as f64 }
}

pub fn precision_at_10(ranked: &[DocId], judged: &HashMap<DocId, u32>) -> f64 {
    let hits = ranked.iter().take(CUTOFF).filter(|d| grade(judged, d) == 1).count();
    hits as f64 / CUTOFF as f64
}

pub fn dcg_at_10(ranked: &[DocId], judged: &HashMap<DocId, u32>) -> f64 {
    ranked
        .iter()
        .take(CUTOFF)
        .enumerate()
        .map(|(i, d)| grade(judged, d) as f64 / ((i + 2) as f64).log2())
        .sum()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicMetrics {
    pub average_precision: f64,
    pub precision_at_10: f64,
    pub dcg_at_10: f64,
}

impl TopicMetrics {
    pub fn compute(ranked: &[DocId], judged: &HashMap<DocId, u32>) -> Self {
        Self {
            average_precision: average_precision(ranked, judged),
            precision_at_10: precision_at_10(ranked, judged),
            dcg_at_10: dcg_at_10(ranked, judged),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub model: String,
    /// `None` for judged topics the model produced no ranking for.
    pub per_topic: BTreeMap<TopicId, Option<TopicMetrics>>,
    pub map: f64,
    pub mean_precision_at_10: f64,
    pub mean_dcg_at_10: f64,
    pub evaluated_topics: usize,
}

/// Scores one model's run over every judged topic.
pub fn evaluate_model(model: &str, qrels: &Qrels, run: &RunRankings) -> ModelReport {
    let mut report = ModelReport { model: model.to_string(), ..ModelReport::default() };
    let (mut ap, mut p10, mut dcg) = (0.0, 0.0, 0.0);
    for (topic, judged) in qrels {
        let metrics = run.get(topic).map(|ranked| TopicMetrics::compute(ranked, judged));
        match &metrics {
            Some(m) => {
                ap += m.average_precision;
                p10 += m.precision_at_10;
                dcg += m.dcg_at_10;
                report.evaluated_topics += 1;
            }
            None => tracing::warn!(model, topic, "no ranking for judged topic"),
        }
        report.per_topic.insert(*topic, metrics);
    }
    if report.evaluated_topics > 0 {
        let n = report.evaluated_topics as f64;
        report.map = ap / n;
        report.mean_precision_at_10 = p10 / n;
        report.mean_dcg_at_10 = dcg / n;
    }
    report
}
