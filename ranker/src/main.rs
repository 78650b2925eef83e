use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use topicrank_ranker::Pipeline;
use std::path::PathBuf;
use topicrank_core::persist::{load_corpus, CorpusPaths};
use topicrank_core::RankConfig;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ranker")]
#[command(about = "Rank topic collections with BM25, JM_LM and PRM, then evaluate")]
struct Cli {
    /// Corpus snapshot directory written by `indexer build`
    #[arg(long, default_value = "./corpus")]
    corpus: PathBuf,
    /// Output root for ranking, PRM and evaluation files
    #[arg(long, default_value = "./Ranking_Output")]
    output: PathBuf,
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    overrides: Overrides,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Default)]
struct Overrides {
    #[arg(long)]
    k1: Option<f64>,
    #[arg(long)]
    b: Option<f64>,
    #[arg(long)]
    k2: Option<f64>,
    /// Jelinek-Mercer document weight
    #[arg(long)]
    lambda: Option<f64>,
    /// BM25 score above which a document counts as pseudo-relevant
    #[arg(long)]
    threshold: Option<f64>,
    /// Margin over the mean w5 weight for feature selection
    #[arg(long)]
    theta: Option<f64>,
    /// Results kept per ranking file
    #[arg(long)]
    top_k: Option<usize>,
}

impl Overrides {
    fn apply(&self, cfg: &mut RankConfig) {
        if let Some(v) = self.k1 { cfg.bm25.k1 = v; }
        if let Some(v) = self.b { cfg.bm25.b = v; }
        if let Some(v) = self.k2 { cfg.bm25.k2 = v; }
        if let Some(v) = self.lambda { cfg.jm.lambda = v; }
        if let Some(v) = self.threshold { cfg.prm.threshold = v; }
        if let Some(v) = self.theta { cfg.prm.theta = v; }
        if let Some(v) = self.top_k { cfg.top_k = v; }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Write BM25 and JM_LM ranking files
    Rank,
    /// Write PRM input, benchmark, w5 feature and re-ranking files
    Prm,
    /// Evaluate existing ranking files against relevance judgments
    Evaluate {
        #[arg(long)]
        qrels: PathBuf,
    },
    /// Rank, PRM, and evaluate when judgments are given
    All {
        #[arg(long)]
        qrels: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(p) => RankConfig::from_json_file(p)?,
        None => RankConfig::default(),
    };
    cli.overrides.apply(&mut config);

    let corpus = load_corpus(&CorpusPaths::new(&cli.corpus))?;
    if corpus.queries.is_empty() {
        bail!("corpus at {} has no queries", cli.corpus.display());
    }
    tracing::info!(topics = corpus.queries.len(), collections = corpus.data.len(), "corpus loaded");

    let pipeline = Pipeline::new(&corpus, config, &cli.output)?;
    match cli.command {
        Command::Rank => {
            pipeline.rank()?;
        }
        Command::Prm => {
            pipeline.prm()?;
        }
        Command::Evaluate { qrels } => {
            pipeline.evaluate(&qrels)?;
        }
        Command::All { qrels } => {
            pipeline.rank()?;
            pipeline.prm()?;
            if let Some(q) = qrels {
                pipeline.evaluate(&q)?;
            }
        }
    }
    Ok(())
}
