//! Domain types shared across fulltext modules.

/// Internal document identity, allocated by the posting index.
///
/// Fresh on every insertion (including the re-insertion half of an update)
/// and never reused.
pub type DocId = u32;

/// A document to be indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doc {
    /// External ID, not managed by the index. Must be non-zero; uniqueness is
    /// the caller's responsibility.
    pub id: u64,
    /// The text to index.
    pub text: String,
    /// The text most recently indexed under `id`. Required for updates so the
    /// old postings can be removed; leave empty for new documents.
    pub prior_text: String,
}

impl Doc {
    /// A document being indexed for the first time.
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            prior_text: String::new(),
        }
    }

    /// A replacement for a document already in the index.
    pub fn update(id: u64, text: impl Into<String>, prior_text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            prior_text: prior_text.into(),
        }
    }
}

/// Point-in-time diagnostics for an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Live documents (one per external ID currently indexed).
    pub documents: usize,
    /// Distinct n-grams with a posting set or a prune tombstone.
    pub ngrams: usize,
    /// N-grams dropped for being too common to discriminate.
    pub pruned_ngrams: usize,
}
