use anyhow::Result;
use std::path::Path;
use topicrank_core::eval::{evaluate_model, ModelReport};
use topicrank_core::persist::{
    load_qrels, load_rankings, save_meta, write_benchmark, write_evaluation, write_features, write_prm_input,
    write_ranking, MetaFile, OutputPaths,
};
use topicrank_core::prm::{self, PrmOutcome};
use topicrank_core::ranking::rank_with_stats;
use topicrank_core::{Bm25, Corpus, JelinekMercer, RankConfig, RankingResult, Scorer, TopicId};

pub const MODELS: [&str; 3] = ["BM25", "JM_LM", "PRM"];

#[derive(Debug, Default)]
pub struct RankSummary {
    pub topics: Vec<TopicId>,
    pub files_written: usize,
}

/// Batch runner over one corpus. All output goes under `paths`.
pub struct Pipeline<'a> {
    pub corpus: &'a Corpus,
    pub config: RankConfig,
    pub paths: OutputPaths,
}

impl<'a> Pipeline<'a> {
    pub fn new<P: AsRef<Path>>(corpus: &'a Corpus, config: RankConfig, output: P) -> Result<Self> {
        config.validate()?;
        Ok(Self { corpus, config, paths: OutputPaths::new(output) })
    }

    /// Writes the top-K BM25 and JM_LM ranking file of every topic, plus `meta.json`.
    pub fn rank(&self) -> Result<RankSummary> {
        self.write_meta()?;
        let bm25 = Bm25::new(self.config.bm25);
        let jm = JelinekMercer::new(self.config.jm);
        let scorers: [&dyn Scorer; 2] = [&bm25, &jm];

        let mut summary = RankSummary::default();
        for (query, coll) in self.corpus.pairs()? {
            let stats = coll.stats();
            for scorer in scorers {
                let ranking = rank_with_stats(scorer, query, coll, &stats);
                write_ranking(&self.paths, scorer.name(), &ranking, self.config.top_k)?;
                summary.files_written += 1;
            }
            summary.topics.push(query.topic);
        }
        tracing::info!(topics = summary.topics.len(), files = summary.files_written, "BM25 and JM_LM rankings written");
        Ok(summary)
    }

    /// Full BM25 rankings, pseudo-relevance benchmark, w5 features and the
    /// feature-weighted re-ranking for every topic. Also refreshes `meta.json`.
    pub fn prm(&self) -> Result<Vec<PrmOutcome>> {
        self.write_meta()?;
        let bm25 = Bm25::new(self.config.bm25);
        let mut outcomes = Vec::new();
        for (query, coll) in self.corpus.pairs()? {
            let ranking: RankingResult = rank_with_stats(&bm25, query, coll, &coll.stats());
            write_prm_input(&self.paths, &ranking)?;

            let outcome = prm::run_topic(coll, &ranking, &self.config.prm);
            write_benchmark(&self.paths, query.topic, &outcome.judgments)?;
            write_features(&self.paths, &outcome.features)?;
            write_ranking(&self.paths, "PRM", &outcome.ranking, self.config.top_k)?;
            if outcome.features.is_empty() {
                tracing::info!(topic = query.topic, relevant = outcome.judgments.relevant.len(), "no PRM features selected");
            }
            outcomes.push(outcome);
        }
        tracing::info!(topics = outcomes.len(), "PRM outputs written");
        Ok(outcomes)
    }

    /// Scores every model whose ranking directory exists against the judgments in `qrels_dir`.
    /// Leaves `meta.json` alone: it describes the run that produced the rankings.
    pub fn evaluate(&self, qrels_dir: &Path) -> Result<Vec<ModelReport>> {
        let qrels = load_qrels(qrels_dir)?;
        let mut reports = Vec::new();
        for model in MODELS {
            let dir = self.paths.model_dir(model);
            if !dir.is_dir() {
                tracing::warn!(model, dir = %dir.display(), "no rankings for model, skipped");
                continue;
            }
            let run = load_rankings(&dir)?;
            let report = evaluate_model(model, &qrels, &run);
            for (topic, m) in &report.per_topic {
                if let Some(m) = m {
                    tracing::info!(model, topic, ap = m.average_precision, p10 = m.precision_at_10, dcg10 = m.dcg_at_10, "topic metrics");
                }
            }
            tracing::info!(
                model,
                map = report.map,
                p10 = report.mean_precision_at_10,
                dcg10 = report.mean_dcg_at_10,
                topics = report.evaluated_topics,
                "model averages"
            );
            reports.push(report);
        }
        write_evaluation(&self.paths, &reports)?;
        Ok(reports)
    }

    pub fn write_meta(&self) -> Result<()> {
        let meta = MetaFile {
            num_topics: self.corpus.queries.len(),
            num_docs: self.corpus.data.iter().map(|(_, c)| c.num_docs()).sum(),
            created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
            version: 1,
            config: Some(self.config.clone()),
        };
        save_meta(&self.paths.meta(), &meta)
    }
}
