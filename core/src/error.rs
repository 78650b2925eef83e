use crate::corpus::TopicId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("no document collection for topic {0}")]
    IndexMismatch(TopicId),

    #[error("{topics} topics cannot be paired with {collections} collections")]
    PositionalMismatch { topics: usize, collections: usize },

    #[error("topic {0} appears more than once")]
    DuplicateTopic(TopicId),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
