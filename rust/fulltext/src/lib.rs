//! `fulltext` — in-memory typeahead search over incrementally upserted documents.
//!
//! Every query word must match as a *prefix* of some word in a document, and
//! all query words must appear in the same document. Matching is
//! case-insensitive and ignores minor punctuation.
//!
//! Modules:
//! - `analyze` — text → lowercase ASCII word tokens
//! - `ngram`   — n-gram extraction and the inverted posting index
//! - `verify`  — per-document suffix array that removes n-gram false positives
//! - `service` — `IndexService`: upsert, search, reader/writer locking
//! - `config`  — tunables (n-gram width, prune threshold, word marker)
//! - `error`   — error types
//! - `types`   — documents, identities, diagnostics

pub mod analyze;
pub mod config;
pub mod error;
pub mod ngram;
pub mod service;
pub mod types;
pub mod verify;

pub use analyze::{Analyzer, DefaultAnalyzer};
pub use config::{parse_index_config, IndexConfig};
pub use error::{FulltextError, Result};
pub use service::IndexService;
pub use types::{Doc, DocId, IndexStats};

// Callers need the token type to drive `IndexService::search`.
pub use tokio_util::sync::CancellationToken;
