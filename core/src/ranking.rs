use crate::corpus::{Collection, CollectionStats, Corpus, DocId, Document, Query, TopicId};
use crate::error::RankError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A per-document relevance model.
pub trait Scorer {
    fn score(&self, doc: &Document, query: &Query, stats: &CollectionStats) -> f64;

    /// Model label used in file names and logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Documents of one collection ordered by descending score, ties by ascending docid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub topic: TopicId,
    pub entries: Vec<ScoredDoc>,
}

impl RankingResult {
    /// Sorts arbitrary (docid, score) pairs into ranking order.
    pub fn from_scores(topic: TopicId, scores: impl IntoIterator<Item = (DocId, f64)>) -> Self {
        let mut entries: Vec<ScoredDoc> = scores.into_iter().map(|(doc_id, score)| ScoredDoc { doc_id, score }).collect();
        entries.sort_by(rank_order);
        Self { topic, entries }
    }

    /// First `k` entries (all of them when `k` exceeds the length).
    pub fn top_k(&self, k: usize) -> &[ScoredDoc] { &self.entries[..k.min(self.entries.len())] }

    pub fn doc_ids(&self) -> impl Iterator<Item = &str> { self.entries.iter().map(|e| e.doc_id.as_str()) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

fn rank_order(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id))
}

/// Scores every document of `coll` against `query`.
pub fn rank_collection<S: Scorer + ?Sized>(scorer: &S, query: &Query, coll: &Collection) -> RankingResult {
    let stats = coll.stats();
    rank_with_stats(scorer, query, coll, &stats)
}

pub fn rank_with_stats<S: Scorer + ?Sized>(scorer: &S, query: &Query, coll: &Collection, stats: &CollectionStats) -> RankingResult {
    let scores = coll.docs().map(|d| (d.doc_id.clone(), scorer.score(d, query, stats)));
    let result = RankingResult::from_scores(query.topic, scores);
    tracing::debug!(topic = query.topic, model = scorer.name(), docs = result.len(), "ranked collection");
    result
}

/// Ranks every query of the corpus against its own collection, in topic order.
/// Fails on the first query without a collection.
pub fn rank_all<S: Scorer + ?Sized>(scorer: &S, corpus: &Corpus) -> Result<Vec<RankingResult>, RankError> {
    let pairs = corpus.pairs()?;
    let rankings: Vec<RankingResult> = pairs.into_iter().map(|(q, c)| rank_collection(scorer, q, c)).collect();
    tracing::info!(model = scorer.name(), topics = rankings.len(), "ranking complete");
    Ok(rankings)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl Scorer for Constant {
        fn score(&self, _: &Document, _: &Query, _: &CollectionStats) -> f64 { 0.5 }
        fn name(&self) -> &'static str { "CONST" }
    }

    #[test]
    fn ties_break_by_docid() {
        let r = RankingResult::from_scores(1, vec![("b".into(), 1.0), ("c".into(), 2.0), ("a".into(), 1.0)]);
        let ids: Vec<&str> = r.doc_ids().collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(r.top_k(2).len(), 2);
        assert_eq!(r.top_k(10).len(), 3);
    }

    #[test]
    fn missing_collection_is_an_index_mismatch() {
        let mut corpus = Corpus::default();
        corpus.queries.add_query(Query::new(101));
        let err = rank_all(&Constant, &corpus).unwrap_err();
        assert!(matches!(err, RankError::IndexMismatch(101)));
    }
}
