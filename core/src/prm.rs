//! Pseudo-relevance feedback: label the BM25 output, weight the terms of the
//! pseudo-relevant documents with the Robertson/Sparck-Jones odds ratio (w5),
//! keep the discriminative ones and re-rank with them.

use crate::config::PrmParams;
use crate::corpus::{Collection, DocId, Term, TopicId};
use crate::ranking::RankingResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicJudgments {
    /// Every candidate in BM25 ranking order.
    pub all: Vec<DocId>,
    pub relevant: Vec<DocId>,
    pub non_relevant: Vec<DocId>,
}

impl TopicJudgments {
    pub fn is_relevant(&self, doc_id: &str) -> bool { self.relevant.iter().any(|d| d == doc_id) }
}

pub type RelevanceBenchmark = BTreeMap<TopicId, TopicJudgments>;

/// Labels a ranking: relevant when the score is strictly above `threshold`.
pub fn judge_ranking(ranking: &RankingResult, threshold: f64) -> TopicJudgments {
    let mut j = TopicJudgments::default();
    for e in &ranking.entries {
        j.all.push(e.doc_id.clone());
        if e.score > threshold {
            j.relevant.push(e.doc_id.clone());
        } else {
            j.non_relevant.push(e.doc_id.clone());
        }
    }
    j
}

pub fn build_benchmark(rankings: &[RankingResult], threshold: f64) -> RelevanceBenchmark {
    rankings.iter().map(|r| (r.topic, judge_ranking(r, threshold))).collect()
}

/// w5 relevance weight. `None` when a denominator is not positive or the result is not finite.
///
/// * `r` relevant documents, `n` documents in the collection
/// * `rtk` relevant documents containing the term, `ntk` documents containing it
pub fn w5(rtk: u32, ntk: u32, r: u32, n: u32) -> Option<f64> {
    let (rtk, ntk, r, n) = (rtk as f64, ntk as f64, r as f64, n as f64);
    let rel_den = r - rtk + 0.5;
    let non_rel_num = ntk - rtk + 0.5;
    let non_rel_den = n - ntk - r + rtk + 0.5;
    if rel_den <= 0.0 || non_rel_num <= 0.0 || non_rel_den <= 0.0 {
        return None;
    }
    let w = ((rtk + 0.5) / rel_den) / (non_rel_num / non_rel_den);
    w.is_finite().then_some(w)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub topic: TopicId,
    /// Mean w5 over every weighted term; 0 when none were weighted.
    pub mean_weight: f64,
    /// Selected terms by descending weight, ties by term.
    pub features: Vec<(Term, f64)>,
}

impl FeatureSet {
    pub fn is_empty(&self) -> bool { self.features.is_empty() }

    pub fn weight(&self, term: &str) -> Option<f64> {
        self.features.iter().find(|(t, _)| t == term).map(|(_, w)| *w)
    }
}

/// Weights every term of the relevant documents and keeps those above `mean + theta`.
pub fn select_features(topic: TopicId, coll: &Collection, judgments: &TopicJudgments, theta: f64) -> FeatureSet {
    let relevant: BTreeSet<&str> = judgments.relevant.iter().map(String::as_str).collect();

    let mut rtk: BTreeMap<&str, u32> = BTreeMap::new();
    let mut r = 0u32;
    for doc_id in &relevant {
        let Some(doc) = coll.get(doc_id) else {
            tracing::warn!(topic, doc_id = *doc_id, "judged document missing from collection");
            continue;
        };
        r += 1;
        for term in doc.terms.keys() {
            *rtk.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let ntk: HashMap<Term, u32> = coll.document_freq();
    let n = coll.num_docs() as u32;

    let mut weights: Vec<(Term, f64)> = Vec::with_capacity(rtk.len());
    for (term, rt) in rtk {
        let nt = ntk.get(term).copied().unwrap_or(0);
        match w5(rt, nt, r, n) {
            Some(w) => weights.push((term.to_string(), w)),
            None => tracing::debug!(topic, term, "w5 undefined, term skipped"),
        }
    }

    let mean_weight = if weights.is_empty() { 0.0 } else { weights.iter().map(|(_, w)| w).sum::<f64>() / weights.len() as f64 };
    let cutoff = mean_weight + theta;
    let mut features: Vec<(Term, f64)> = weights.into_iter().filter(|(_, w)| *w > cutoff).collect();
    features.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    tracing::debug!(topic, relevant = r, mean_weight, selected = features.len(), "selected features");
    FeatureSet { topic, mean_weight, features }
}

/// Sum of the weights of the selected features present in each document.
pub fn rerank(coll: &Collection, features: &FeatureSet) -> RankingResult {
    let scores = coll.docs().map(|d| {
        let s: f64 = features.features.iter().filter(|(t, _)| d.contains(t)).map(|(_, w)| *w).sum();
        (d.doc_id.clone(), s)
    });
    RankingResult::from_scores(features.topic, scores)
}

/// Benchmark, features and re-ranking for one topic.
#[derive(Debug, Clone)]
pub struct PrmOutcome {
    pub judgments: TopicJudgments,
    pub features: FeatureSet,
    pub ranking: RankingResult,
}

pub fn run_topic(coll: &Collection, bm25: &RankingResult, params: &PrmParams) -> PrmOutcome {
    let judgments = judge_ranking(bm25, params.threshold);
    let features = select_features(bm25.topic, coll, &judgments, params.theta);
    let ranking = rerank(coll, &features);
    PrmOutcome { judgments, features, ranking }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    fn doc(id: &str, terms: &[&str]) -> Document {
        let mut d = Document::new(id);
        for t in terms {
            d.add_term(*t);
            d.doc_len += 1;
        }
        d
    }

    #[test]
    fn perfect_discriminator_weight() {
        // (5.5 / 0.5) / (0.5 / 15.5) = 11 * 31
        let w = w5(5, 5, 5, 20).unwrap();
        assert!((w - 341.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_strict() {
        let r = RankingResult::from_scores(7, vec![("a".into(), 1.0), ("b".into(), 1.5), ("c".into(), 0.2)]);
        let j = judge_ranking(&r, 1.0);
        assert_eq!(j.relevant, vec!["b".to_string()]);
        assert_eq!(j.non_relevant, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(j.all.len(), 3);
    }

    #[test]
    fn no_relevant_documents_gives_empty_features() {
        let mut c = Collection::new();
        c.add_doc(doc("1", &["cat"]));
        let f = select_features(3, &c, &TopicJudgments::default(), 0.5);
        assert!(f.is_empty());
        assert_eq!(f.mean_weight, 0.0);
        let r = rerank(&c, &f);
        assert_eq!(r.entries[0].score, 0.0);
    }

    #[test]
    fn selects_terms_concentrated_in_relevant_docs() {
        let mut c = Collection::new();
        c.add_doc(doc("1", &["oil", "spill", "ship"]));
        c.add_doc(doc("2", &["oil", "spill", "coast"]));
        c.add_doc(doc("3", &["ship", "market"]));
        c.add_doc(doc("4", &["market", "coast"]));
        c.add_doc(doc("5", &["market"]));
        let j = TopicJudgments {
            all: (1..=5).map(|i| i.to_string()).collect(),
            relevant: vec!["1".into(), "2".into()],
            non_relevant: vec!["3".into(), "4".into(), "5".into()],
        };
        let f = select_features(9, &c, &j, 0.5);
        let terms: Vec<&str> = f.features.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, vec!["oil", "spill"]);
        assert_eq!(f.weight("oil"), f.weight("spill"));

        let r = rerank(&c, &f);
        let ids: Vec<&str> = r.doc_ids().take(2).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
