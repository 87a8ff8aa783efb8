//! Inverted n-gram index for approximate prefix lookup.
//!
//! # Architecture
//!
//! - **extract** — word token → marker-anchored n-grams
//! - **posting** — n-gram → Roaring bitmap of internal document IDs, with
//!   pruning of near-universal n-grams and conjunctive intersection
//!
//! Intersection over-approximates: n-grams from different words can combine
//! into a candidate that contains no real match. `crate::verify` removes those.

pub mod extract;
pub mod posting;

pub use extract::{Ngram, NgramExtractor};
pub use posting::PostingIndex;
