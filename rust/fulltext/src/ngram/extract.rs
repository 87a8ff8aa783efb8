//! N-gram extraction from word tokens.
//!
//! Every token is prefixed with the word marker before windowing, so the
//! windows that contain the marker can only match at the start of a word.
//! Tokens are expected to be lowercase already.

use ahash::AHashSet;

use crate::config::{DEFAULT_NGRAM_WIDTH, DEFAULT_WORD_MARKER};

/// A fixed-width character window (shorter only for short anchored prefixes).
pub type Ngram = String;

/// Deterministic token → n-gram function.
///
/// Updates re-derive the n-grams of the prior text to delete them, so the
/// output for a given `(width, marker, token)` must never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramExtractor {
    width: usize,
    marker: char,
}

/// Order-preserving unique accumulator.
#[derive(Default)]
struct NgramSet {
    seen: AHashSet<Ngram>,
    grams: Vec<Ngram>,
}

impl NgramSet {
    fn push(&mut self, gram: Ngram) {
        if !self.seen.contains(&gram) {
            self.seen.insert(gram.clone());
            self.grams.push(gram);
        }
    }

    fn into_vec(self) -> Vec<Ngram> {
        self.grams
    }
}

impl NgramExtractor {
    pub fn new(width: usize, marker: char) -> Self {
        NgramExtractor { width, marker }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// N-grams a query token must find in a document.
    ///
    /// All full-width windows of `marker + token`. When `marker + token` is
    /// shorter than the width, the whole marker-prefixed token is the single
    /// n-gram. Returns an empty Vec for an empty token.
    pub fn extract(&self, token: &str) -> Vec<Ngram> {
        let mut set = NgramSet::default();
        self.extract_into(token, &mut set);
        set.into_vec()
    }

    /// N-grams a document token is indexed under.
    ///
    /// `extract(token)` plus every anchored prefix shorter than the width, so
    /// that a short query token such as `b` (n-gram `_b`) finds `brown`.
    pub fn extract_for_index(&self, token: &str) -> Vec<Ngram> {
        let mut set = NgramSet::default();
        self.extract_for_index_into(token, &mut set);
        set.into_vec()
    }

    /// Unique query n-grams across all tokens, first occurrence first.
    pub fn query_ngrams<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Ngram> {
        let mut set = NgramSet::default();
        for token in tokens {
            self.extract_into(token.as_ref(), &mut set);
        }
        set.into_vec()
    }

    /// Unique index n-grams across all tokens, first occurrence first.
    pub fn document_ngrams<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Ngram> {
        let mut set = NgramSet::default();
        for token in tokens {
            self.extract_for_index_into(token.as_ref(), &mut set);
        }
        set.into_vec()
    }

    fn anchored(&self, token: &str) -> Vec<char> {
        std::iter::once(self.marker).chain(token.chars()).collect()
    }

    fn extract_into(&self, token: &str, set: &mut NgramSet) {
        if token.is_empty() {
            return;
        }
        let chars = self.anchored(token);
        if chars.len() < self.width {
            set.push(chars.iter().collect());
            return;
        }
        for window in chars.windows(self.width) {
            set.push(window.iter().collect());
        }
    }

    fn extract_for_index_into(&self, token: &str, set: &mut NgramSet) {
        if token.is_empty() {
            return;
        }
        let chars = self.anchored(token);
        let longest_prefix = chars.len().min(self.width.saturating_sub(1));
        for len in 2..=longest_prefix {
            set.push(chars[..len].iter().collect());
        }
        self.extract_into(token, set);
    }
}

impl Default for NgramExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NGRAM_WIDTH, DEFAULT_WORD_MARKER)
    }
}
