//! Error types for the fulltext index.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FulltextError {
    #[error("docs[{index}]: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("query '{query}' does not have enough content")]
    InsufficientQuery { query: String },

    #[error("search cancelled")]
    Cancelled,

    #[error("index capacity exhausted: batch needs {requested} document ids, {available} remain")]
    CapacityExhausted { requested: usize, available: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FulltextError>;
