//! Index service — the single owner of the posting index, per-document
//! verifiers, and the external → internal identity map.
//!
//! Searches share the index through a read lock; an upsert batch holds the
//! write lock from validation until the last document is applied, so a search
//! never sees a document under both its old and new text, or under neither.

use ahash::AHashMap;
use parking_lot::RwLock;
use roaring::RoaringBitmap;
use tokio_util::sync::CancellationToken;

use crate::analyze::{Analyzer, DefaultAnalyzer};
use crate::config::IndexConfig;
use crate::error::{FulltextError, Result};
use crate::ngram::{NgramExtractor, PostingIndex};
use crate::types::{Doc, DocId, IndexStats};
use crate::verify::ExactMatchVerifier;

/// Metadata for one live internal document.
#[derive(Debug)]
struct DocMeta {
    /// External ID supplied by the caller.
    external_id: u64,
    /// Removes n-gram false positives.
    verifier: ExactMatchVerifier,
    /// The indexed text was `""`, so an empty prior text is the correct one.
    text_was_empty: bool,
}

/// State guarded by the service lock.
#[derive(Debug)]
struct IndexState {
    postings: PostingIndex,
    docs: AHashMap<DocId, DocMeta>,
    ext_ids: AHashMap<u64, DocId>,
}

/// Counters for one applied batch.
#[derive(Debug, Default)]
struct BatchSummary {
    inserted: usize,
    updated: usize,
}

/// Thread-safe typeahead index.
///
/// `Send + Sync`: share it behind an `Arc` and call `search` from any number
/// of threads while one thread at a time runs `upsert`.
pub struct IndexService {
    config: IndexConfig,
    analyzer: Box<dyn Analyzer>,
    extractor: NgramExtractor,
    state: RwLock<IndexState>,
}

impl IndexService {
    /// Empty index with the default configuration and analyzer.
    pub fn new() -> Self {
        Self::build(IndexConfig::default(), Box::new(DefaultAnalyzer))
    }

    /// Empty index with a validated custom configuration.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        Self::with_analyzer(config, DefaultAnalyzer)
    }

    /// Empty index with a custom configuration and analyzer.
    ///
    /// The analyzer must be deterministic for the lifetime of the index:
    /// updates re-analyze the caller's prior text to find the old postings.
    pub fn with_analyzer<A>(config: IndexConfig, analyzer: A) -> Result<Self>
    where
        A: Analyzer + 'static,
    {
        config.validate()?;
        Ok(Self::build(config, Box::new(analyzer)))
    }

    fn build(config: IndexConfig, analyzer: Box<dyn Analyzer>) -> Self {
        let extractor = NgramExtractor::new(config.ngram_width, config.word_marker);
        IndexService {
            config,
            analyzer,
            extractor: extractor.clone(),
            state: RwLock::new(IndexState {
                postings: PostingIndex::new(extractor),
                docs: AHashMap::new(),
                ext_ids: AHashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of live documents in the index.
    pub fn document_count(&self) -> usize {
        self.state.read().docs.len()
    }

    /// Diagnostic snapshot of the index.
    pub fn stats(&self) -> IndexStats {
        let state = self.state.read();
        IndexStats {
            documents: state.docs.len(),
            ngrams: state.postings.ngram_count(),
            pruned_ngrams: state.postings.pruned_count(),
        }
    }

    /// Typeahead search.
    ///
    /// Every query word must be a prefix of some word in the same document.
    /// Returns the external IDs of matching documents in insertion order of
    /// their current text. Fails with `InsufficientQuery` when the query has
    /// no words, and with `Cancelled` (and no partial results) when `cancel`
    /// fires before the candidates have all been checked.
    pub fn search(&self, cancel: &CancellationToken, query: &str) -> Result<Vec<u64>> {
        let words = self.analyzer.analyze(query);
        let ngrams = self.extractor.query_ngrams(&words);
        if ngrams.is_empty() {
            return Err(FulltextError::InsufficientQuery {
                query: query.to_string(),
            });
        }

        let state = self.state.read();
        let candidates = state.postings.query_ngrams(&ngrams);
        let doc_ids = state.verify_candidates(&candidates, &words, || cancel.is_cancelled())?;

        tracing::trace!(
            query,
            ngrams = ngrams.len(),
            candidates = candidates.len(),
            matches = doc_ids.len(),
            "search complete"
        );
        Ok(doc_ids)
    }

    /// Add or replace a batch of documents.
    ///
    /// The whole batch is validated before anything is mutated: IDs must be
    /// non-zero, and a document whose ID is already indexed (or appears
    /// earlier in the batch) must carry the text it was indexed with in
    /// `prior_text`. On error the index is unchanged.
    ///
    /// Deliberate exception to the prior-text rule: an empty `prior_text` is
    /// accepted when the indexed text is itself `""`, so an emptied document
    /// can be re-added.
    pub fn upsert(&self, docs: &[Doc]) -> Result<()> {
        let mut state = self.state.write();
        state.validate(docs)?;

        let mut summary = BatchSummary::default();
        for doc in docs {
            state.apply(self.analyzer.as_ref(), doc, &mut summary);
        }
        let pruned = state.postings.prune(self.config.prune_threshold);
        state.postings.sort();

        tracing::debug!(
            batch = docs.len(),
            inserted = summary.inserted,
            updated = summary.updated,
            pruned,
            documents = state.docs.len(),
            "upsert batch applied"
        );
        Ok(())
    }
}

impl IndexState {
    /// Keep the candidates whose verifier matches every word, in candidate
    /// order. `is_cancelled` is polled before each candidate.
    fn verify_candidates<F>(
        &self,
        candidates: &RoaringBitmap,
        words: &[String],
        is_cancelled: F,
    ) -> Result<Vec<u64>>
    where
        F: Fn() -> bool,
    {
        let mut doc_ids = Vec::with_capacity(candidates.len() as usize);
        for (checked, doc_id) in candidates.iter().enumerate() {
            if is_cancelled() {
                tracing::debug!(checked, "search cancelled");
                return Err(FulltextError::Cancelled);
            }
            let Some(meta) = self.docs.get(&doc_id) else {
                tracing::warn!(doc_id, "candidate has no metadata; skipping stale posting");
                continue;
            };
            if words
                .iter()
                .all(|word| meta.verifier.matches_word_prefix(word))
            {
                doc_ids.push(meta.external_id);
            }
        }
        Ok(doc_ids)
    }

    fn validate(&self, docs: &[Doc]) -> Result<()> {
        let available = self.postings.remaining_ids();
        if docs.len() > available {
            return Err(FulltextError::CapacityExhausted {
                requested: docs.len(),
                available,
            });
        }

        // IDs indexed earlier in this batch, and whether their text was empty.
        let mut pending: AHashMap<u64, bool> = AHashMap::new();
        for (index, doc) in docs.iter().enumerate() {
            if doc.id == 0 {
                return Err(FulltextError::InvalidInput {
                    index,
                    reason: "ID must be greater than zero".to_string(),
                });
            }
            let indexed_text_empty = match pending.get(&doc.id) {
                Some(&text_was_empty) => Some(text_was_empty),
                None => self
                    .ext_ids
                    .get(&doc.id)
                    .and_then(|doc_id| self.docs.get(doc_id))
                    .map(|meta| meta.text_was_empty),
            };
            if indexed_text_empty == Some(false) && doc.prior_text.is_empty() {
                return Err(FulltextError::InvalidInput {
                    index,
                    reason: "document is already indexed, but prior_text was not provided. \
                             To update the document, the text it contained previously must also be provided"
                        .to_string(),
                });
            }
            pending.insert(doc.id, doc.text.is_empty());
        }
        Ok(())
    }

    fn apply(&mut self, analyzer: &dyn Analyzer, doc: &Doc, summary: &mut BatchSummary) {
        if let Some(old_id) = self.ext_ids.get(&doc.id).copied() {
            // Old and new internal IDs differ, so the old postings must go
            // before the new text is added.
            for word in analyzer.analyze(&doc.prior_text) {
                self.postings.delete(&word, old_id);
            }
            self.postings.retire(old_id);
            self.docs.remove(&old_id);
            summary.updated += 1;
        } else {
            summary.inserted += 1;
        }

        let words = analyzer.analyze(&doc.text);
        let ngrams = self.postings.extractor().document_ngrams(&words);
        let doc_id = self.postings.add_ngrams(&ngrams);
        self.docs.insert(
            doc_id,
            DocMeta {
                external_id: doc.id,
                verifier: ExactMatchVerifier::new(&words),
                text_was_empty: doc.text.is_empty(),
            },
        );
        self.ext_ids.insert(doc.id, doc_id);
    }
}

impl Default for IndexService {
    fn default() -> Self {
        Self::new()
    }
}
