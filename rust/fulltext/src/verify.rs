//! Exact-match verification with a per-document suffix array.
//!
//! The document's tokens are joined as `\0tok1\0tok2\0…\0`. A query word `w`
//! is a prefix of some token iff `\0w` occurs in that text, and a suffix
//! array answers "does P occur" with a binary search: O(|P| log n) per query
//! instead of a scan over the text.

use std::fmt;

use suffix::SuffixTable;

/// Separates tokens in the verifier text. Analyzers never emit it.
pub const TOKEN_DELIMITER: char = '\0';

/// Immutable suffix array over one document's tokenized text.
///
/// Built with SA-IS (linear time), since it is built while an upsert holds
/// the write lock.
pub struct ExactMatchVerifier {
    table: SuffixTable<'static, 'static>,
}

impl ExactMatchVerifier {
    /// Build the verifier for a document's tokens.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        let capacity = tokens.iter().map(|t| t.as_ref().len() + 1).sum::<usize>() + 1;
        let mut text = String::with_capacity(capacity);
        for token in tokens {
            text.push(TOKEN_DELIMITER);
            text.push_str(token.as_ref());
        }
        text.push(TOKEN_DELIMITER);

        ExactMatchVerifier {
            table: SuffixTable::new(text),
        }
    }

    /// True if `pattern` occurs anywhere in the delimited text.
    pub fn contains(&self, pattern: &str) -> bool {
        pattern.is_empty() || self.table.contains(pattern)
    }

    /// True if `word` is a prefix of some token.
    pub fn matches_word_prefix(&self, word: &str) -> bool {
        let mut pattern = String::with_capacity(word.len() + 1);
        pattern.push(TOKEN_DELIMITER);
        pattern.push_str(word);
        self.contains(&pattern)
    }

    /// Size of the delimited text in bytes.
    pub fn text_len(&self) -> usize {
        self.table.text().len()
    }
}

impl fmt::Debug for ExactMatchVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExactMatchVerifier")
            .field("text_len", &self.text_len())
            .finish()
    }
}
