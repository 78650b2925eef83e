//! Okapi BM25 with query-term saturation (the `k2` component).
//!
//! score(d, q) = sum over t in q ∩ d of
//!   idf(t) * ((k1 + 1) * f) / (K + f) * ((k2 + 1) * qf) / (k2 + qf)
//!
//! with K = k1 * ((1 - b) + b * dl / avgdl) and idf(t) = log10((N - n + 0.5) / (n + 0.5)).

use crate::config::Bm25Params;
use crate::corpus::{CollectionStats, Document, Query};
use crate::ranking::Scorer;

/// Document frequency used when a term has no recorded frequency.
pub const DF_FLOOR: f64 = 0.1;

pub fn idf(num_docs: usize, df: u32) -> f64 {
    let n = num_docs as f64;
    let ni = if df == 0 { DF_FLOOR } else { df as f64 };
    ((n - ni + 0.5) / (ni + 0.5)).log10()
}

/// Length normaliser K. Falls back to `k1` for empty documents or an all-empty collection.
pub fn length_norm(params: &Bm25Params, doc_len: u32, avg_doc_len: f64) -> f64 {
    if doc_len == 0 || avg_doc_len <= 0.0 {
        return params.k1;
    }
    params.k1 * ((1.0 - params.b) + params.b * (doc_len as f64 / avg_doc_len))
}

pub fn term_score(params: &Bm25Params, idf: f64, fi: u32, qf: u32, k: f64) -> f64 {
    let fi = fi as f64;
    let qf = qf as f64;
    let tf_part = ((params.k1 + 1.0) * fi) / (k + fi);
    let qf_part = ((params.k2 + 1.0) * qf) / (params.k2 + qf);
    idf * tf_part * qf_part
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25 {
    pub params: Bm25Params,
}

impl Bm25 {
    pub fn new(params: Bm25Params) -> Self { Self { params } }
}

impl Scorer for Bm25 {
    fn name(&self) -> &'static str { "BM25" }

    fn score(&self, doc: &Document, query: &Query, stats: &CollectionStats) -> f64 {
        let k = length_norm(&self.params, doc.doc_len, stats.avg_doc_len);
        let mut score = 0.0;
        for (term, qf) in query.sorted_terms() {
            // absent terms contribute nothing
            let fi = doc.term_count(term);
            if fi == 0 {
                continue;
            }
            let w = idf(stats.num_docs, stats.df(term));
            score += term_score(&self.params, w, fi, qf, k);
        }
        score
    }
}
