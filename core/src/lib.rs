pub mod bm25;
pub mod config;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod jm;
pub mod persist;
pub mod prm;
pub mod ranking;
pub mod tokenizer;

pub use bm25::Bm25;
pub use config::{Bm25Params, JmParams, PrmParams, RankConfig};
pub use corpus::{Collection, CollectionStats, Corpus, DataCollection, DocId, Document, Query, QuerySet, Term, TopicId};
pub use error::RankError;
pub use jm::JelinekMercer;
pub use ranking::{rank_all, rank_collection, RankingResult, ScoredDoc, Scorer};
