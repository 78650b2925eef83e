//! Query-likelihood scoring with Jelinek-Mercer smoothing.
//!
//! Each query term contributes `lambda * P(t|d) + (1 - lambda) * P(t|C)` and the
//! contributions are multiplied. Terms that never occur in the collection are
//! skipped so they cannot zero out every document.

use crate::config::JmParams;
use crate::corpus::{CollectionStats, Document, Query};
use crate::ranking::Scorer;

#[derive(Debug, Clone, Copy, Default)]
pub struct JelinekMercer {
    pub params: JmParams,
}

impl JelinekMercer {
    pub fn new(params: JmParams) -> Self { Self { params } }

    /// Smoothed probability of `term`, or `None` when the collection has never seen it.
    pub fn term_prob(&self, term: &str, doc: &Document, stats: &CollectionStats) -> Option<f64> {
        let cf = stats.cf(term);
        if cf == 0 || stats.total_tokens == 0 {
            return None;
        }
        let p_col = cf as f64 / stats.total_tokens as f64;
        let p_doc = if doc.doc_len == 0 { 0.0 } else { doc.term_count(term) as f64 / doc.doc_len as f64 };
        let lambda = self.params.lambda;
        Some(lambda * p_doc + (1.0 - lambda) * p_col)
    }
}

impl Scorer for JelinekMercer {
    fn name(&self) -> &'static str { "JM_LM" }

    fn score(&self, doc: &Document, query: &Query, stats: &CollectionStats) -> f64 {
        let mut score = 1.0;
        for (term, _qf) in query.sorted_terms() {
            if let Some(p) = self.term_prob(term, doc, stats) {
                score *= p;
            }
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Collection;

    fn doc(id: &str, len: u32, terms: &[(&str, u32)]) -> Document {
        let mut d = Document::new(id);
        d.doc_len = len;
        for (t, c) in terms {
            d.terms.insert(t.to_string(), *c);
        }
        d
    }

    fn sample() -> Collection {
        let mut c = Collection::new();
        c.add_doc(doc("d1", 4, &[("cat", 2), ("dog", 1)]));
        c.add_doc(doc("d2", 3, &[("dog", 3)]));
        c.add_doc(doc("d3", 0, &[]));
        c
    }

    #[test]
    fn product_of_interpolated_probabilities() {
        let c = sample();
        let stats = c.stats();
        let mut q = Query::new(101);
        q.add_term("cat");
        q.add_term("dog");
        let jm = JelinekMercer::new(JmParams { lambda: 0.4 });
        let s = jm.score(c.get("d1").unwrap(), &q, &stats);
        // total_tokens = 6; cf(cat) = 2, cf(dog) = 4
        let cat = 0.4 * (2.0 / 4.0) + 0.6 * (2.0 / 6.0);
        let dog = 0.4 * (1.0 / 4.0) + 0.6 * (4.0 / 6.0);
        assert!((s - cat * dog).abs() < 1e-12);
    }

    #[test]
    fn unseen_terms_are_skipped() {
        let c = sample();
        let stats = c.stats();
        let jm = JelinekMercer::default();
        let mut only_cat = Query::new(1);
        only_cat.add_term("cat");
        let mut with_unseen = only_cat.clone();
        with_unseen.add_term("zebra");
        let d1 = c.get("d1").unwrap();
        assert_eq!(jm.score(d1, &only_cat, &stats), jm.score(d1, &with_unseen, &stats));
        assert_eq!(jm.score(d1, &Query::new(2), &stats), 1.0);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let c = sample();
        let stats = c.stats();
        let mut q = Query::new(1);
        q.add_term("cat");
        q.add_term("dog");
        q.add_term("dog");
        let jm = JelinekMercer::default();
        for d in c.docs() {
            let s = jm.score(d, &q, &stats);
            assert!(s > 0.0 && s <= 1.0, "{} scored {}", d.doc_id, s);
        }
    }
}
