use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use topicrank_core::persist::{save_corpus, save_meta, CorpusPaths, MetaFile};
use topicrank_core::tokenizer::Tokenizer;
use topicrank_core::{Collection, Corpus, TopicId};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

mod parse;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Parse topic collections into a bag-of-words corpus snapshot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the snapshot from per-topic XML directories and a topic file
    Build {
        /// Root holding one directory of *.xml news items per topic (e.g. Data_C101)
        #[arg(long)]
        docs: String,
        /// Topic file with <Query> blocks
        #[arg(long)]
        topics: String,
        /// Comma-separated stopword file; the built-in list is used when omitted
        #[arg(long)]
        stopwords: Option<String>,
        /// Output snapshot directory
        #[arg(long)]
        output: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { docs, topics, stopwords, output } => {
            build_corpus(Path::new(&docs), Path::new(&topics), stopwords.as_deref().map(Path::new), Path::new(&output))
        }
    }
}

fn build_corpus(docs_root: &Path, topics_file: &Path, stopwords: Option<&Path>, output: &Path) -> Result<()> {
    let tok = match stopwords {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("reading stopwords {}", p.display()))?;
            Tokenizer::from_stopword_list(&text)
        }
        None => Tokenizer::default(),
    };
    tracing::info!(stopwords = tok.num_stopwords(), "tokenizer ready");

    let mut corpus = Corpus::default();
    let topic_text = fs::read_to_string(topics_file).with_context(|| format!("reading topics {}", topics_file.display()))?;
    for q in parse::parse_topics(&topic_text, &tok) {
        let topic = q.topic;
        if corpus.queries.add_query(q).is_some() {
            bail!("topic {topic} defined twice in {}", topics_file.display());
        }
    }

    for (topic, dir) in collection_dirs(docs_root)? {
        let coll = index_collection(&dir, &tok)?;
        tracing::info!(topic, docs = coll.num_docs(), dir = %dir.display(), "indexed collection");
        if corpus.data.insert(topic, coll).is_some() {
            bail!("two collection directories for topic {topic}");
        }
    }

    for topic in corpus.queries.topics() {
        if corpus.data.get(topic).is_none() {
            tracing::warn!(topic, "topic has no collection directory");
        }
    }

    let num_docs: usize = corpus.data.iter().map(|(_, c)| c.num_docs()).sum();
    let paths = CorpusPaths::new(output);
    save_corpus(&paths, &corpus)?;
    let meta = MetaFile {
        num_topics: corpus.queries.len(),
        num_docs,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: 1,
        config: None,
    };
    save_meta(&paths.meta(), &meta)?;

    tracing::info!(output = %output.display(), topics = meta.num_topics, num_docs, "corpus build complete");
    Ok(())
}

/// Immediate sub-directories of `root` whose name carries a topic number, sorted by topic.
fn collection_dirs(root: &Path) -> Result<Vec<(TopicId, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("listing {}", root.display()))? {
        let path = entry?.path();
        if !path.is_dir() { continue; }
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        match parse::topic_from_name(name) {
            Some(topic) => dirs.push((topic, path)),
            None => tracing::warn!(dir = name, "no topic number in directory name, skipped"),
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn index_collection(dir: &Path, tok: &Tokenizer) -> Result<Collection> {
    let mut coll = Collection::new();
    for entry in WalkDir::new(dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() || p.extension().and_then(|s| s.to_str()) != Some("xml") {
            continue;
        }
        let bytes = fs::read(p)?;
        let xml = parse::decode_news_item(&bytes);
        match parse::parse_news_item(&xml, tok) {
            Ok(doc) => {
                if let Some(old) = coll.add_doc(doc) {
                    tracing::warn!(doc_id = %old.doc_id, file = %p.display(), "duplicate itemid, later file wins");
                }
            }
            Err(e) => tracing::warn!(file = %p.display(), error = %e, "skipping unparsable news item"),
        }
    }
    Ok(coll)
}
