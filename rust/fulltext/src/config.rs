//! Index configuration.
//!
//! The defaults reproduce the classic typeahead setup: trigrams, `_` as the
//! start-of-word marker, and n-grams pruned once they appear in more than
//! 10% of the live documents.

use serde::Deserialize;

use crate::error::{FulltextError, Result};

pub const DEFAULT_NGRAM_WIDTH: usize = 3;
pub const DEFAULT_PRUNE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_WORD_MARKER: char = '_';

/// Tunables for an `IndexService`.
///
/// Changing `ngram_width` or `word_marker` changes which n-grams a text
/// produces. Updates re-derive the old n-grams from the caller's prior text,
/// so an index must keep the same values for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Characters per n-gram. Must be at least 2.
    pub ngram_width: usize,
    /// Fraction of live documents above which an n-gram's postings are
    /// dropped. Must be in `(0, 1]`; `1.0` never prunes.
    pub prune_threshold: f64,
    /// Prepended to every token so that n-grams touching it only match at the
    /// start of a word. Must not be alphanumeric or NUL.
    pub word_marker: char,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            ngram_width: DEFAULT_NGRAM_WIDTH,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            word_marker: DEFAULT_WORD_MARKER,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ngram_width < 2 {
            return Err(FulltextError::InvalidConfig(format!(
                "ngram_width must be at least 2, got {}",
                self.ngram_width
            )));
        }
        if !(self.prune_threshold > 0.0 && self.prune_threshold <= 1.0) {
            return Err(FulltextError::InvalidConfig(format!(
                "prune_threshold must be in (0, 1], got {}",
                self.prune_threshold
            )));
        }
        if self.word_marker.is_alphanumeric() || self.word_marker == '\0' {
            return Err(FulltextError::InvalidConfig(format!(
                "word_marker {:?} collides with token characters",
                self.word_marker
            )));
        }
        Ok(())
    }
}

/// Parse and validate an index config from a JSON string.
///
/// Missing fields take their defaults.
pub fn parse_index_config(json: &str) -> Result<IndexConfig> {
    let config: IndexConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}
