//! Text analysis: raw text → ordered lowercase word tokens.
//!
//! The index only relies on analysis being deterministic: the tokens produced
//! for a document's text at upsert time must be reproduced exactly from the
//! prior text on a later update, or the old postings cannot be found.

/// Converts raw text into an ordered sequence of word tokens.
///
/// Tokens must be non-empty and must not contain NUL or the configured word
/// marker; the verifier and the n-gram extractor use those as boundaries.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<String>;
}

/// ASCII-folding, punctuation-tolerant analyzer.
///
/// Non-ASCII text is transliterated (`Müller` → `muller`), `-`, `_`, `:` and
/// `|` split words like whitespace does, and any other punctuation inside a
/// word is dropped (`O'Brien` → `obrien`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAnalyzer;

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '_' | ':' | '|')
}

impl Analyzer for DefaultAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        let ascii = deunicode::deunicode(text);
        ascii
            .split(is_separator)
            .filter_map(|piece| {
                let token: String = piece
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                (!token.is_empty()).then_some(token)
            })
            .collect()
    }
}
