//! Posting index: n-gram → Roaring bitmap of internal document IDs.

use ahash::AHashMap;
use roaring::RoaringBitmap;

use super::extract::{Ngram, NgramExtractor};
use crate::types::DocId;

/// Postings for a single n-gram.
#[derive(Debug, Clone, PartialEq)]
pub enum Posting {
    /// Documents containing the n-gram, ascending.
    Docs(RoaringBitmap),
    /// Too common to discriminate. Matches every document and absorbs
    /// later insertions.
    Pruned,
}

/// Inverted n-gram index with fresh-ID allocation.
#[derive(Debug)]
pub struct PostingIndex {
    extractor: NgramExtractor,
    postings: AHashMap<Ngram, Posting>,
    /// Internal IDs currently indexed.
    live: RoaringBitmap,
    /// Next internal ID to assign. IDs are never reused.
    next_doc_id: u32,
}

impl PostingIndex {
    pub fn new(extractor: NgramExtractor) -> Self {
        PostingIndex {
            extractor,
            postings: AHashMap::new(),
            live: RoaringBitmap::new(),
            next_doc_id: 0,
        }
    }

    pub fn extractor(&self) -> &NgramExtractor {
        &self.extractor
    }

    /// How many more documents can be added before the ID space runs out.
    pub fn remaining_ids(&self) -> usize {
        (u32::MAX - self.next_doc_id) as usize
    }

    /// Allocate a fresh internal ID and post it under every n-gram.
    ///
    /// An empty n-gram list still registers a live document.
    /// Callers must check `remaining_ids()` first: IDs are never reused, so
    /// allocating past the end of the ID space is a bug.
    pub(crate) fn add_ngrams(&mut self, ngrams: &[Ngram]) -> DocId {
        debug_assert!(
            self.next_doc_id < u32::MAX,
            "PostingIndex: doc id space exhausted"
        );
        let doc_id = self.next_doc_id.min(u32::MAX - 1);
        self.next_doc_id = self.next_doc_id.saturating_add(1);

        for ngram in ngrams {
            match self.postings.get_mut(ngram) {
                Some(Posting::Docs(bitmap)) => {
                    bitmap.insert(doc_id);
                }
                Some(Posting::Pruned) => {}
                None => {
                    let mut bitmap = RoaringBitmap::new();
                    bitmap.insert(doc_id);
                    self.postings.insert(ngram.clone(), Posting::Docs(bitmap));
                }
            }
        }
        self.live.insert(doc_id);
        doc_id
    }

    /// Remove `doc_id` from the postings of `word`'s index n-grams.
    ///
    /// Idempotent. Emptied posting sets stay in place until `sort()`.
    pub fn delete(&mut self, word: &str, doc_id: DocId) {
        for ngram in self.extractor.extract_for_index(word) {
            if let Some(Posting::Docs(bitmap)) = self.postings.get_mut(&ngram) {
                bitmap.remove(doc_id);
            }
        }
    }

    /// Drop `doc_id` from the live set. Returns false if it was not live.
    pub fn retire(&mut self, doc_id: DocId) -> bool {
        self.live.remove(doc_id)
    }

    /// Documents containing every n-gram (conjunction).
    ///
    /// An n-gram never indexed matches nothing; a pruned n-gram matches
    /// everything. When no n-gram constrains the result, every live document
    /// is returned.
    pub fn query_ngrams(&self, ngrams: &[Ngram]) -> RoaringBitmap {
        let mut lists: Vec<&RoaringBitmap> = Vec::with_capacity(ngrams.len());
        for ngram in ngrams {
            match self.postings.get(ngram) {
                None => return RoaringBitmap::new(),
                Some(Posting::Pruned) => {}
                Some(Posting::Docs(bitmap)) => lists.push(bitmap),
            }
        }
        lists.push(&self.live);
        intersect(&mut lists)
    }

    /// Replace every posting set larger than `threshold × live documents`
    /// with a tombstone. Returns the number of n-grams pruned.
    pub fn prune(&mut self, threshold: f64) -> usize {
        let max_docs = (threshold * self.live.len() as f64) as u64;
        let mut pruned = 0;
        for posting in self.postings.values_mut() {
            if let Posting::Docs(bitmap) = posting {
                if bitmap.len() > max_docs {
                    *posting = Posting::Pruned;
                    pruned += 1;
                }
            }
        }
        pruned
    }

    /// Normalize after a batch of mutations.
    ///
    /// Bitmaps keep their IDs ordered on every insert; what a batch leaves
    /// behind is posting sets emptied by `delete`. Sweeping them restores the
    /// invariant that every entry is a non-empty ordered set or a tombstone,
    /// so an n-gram with no documents is absent again.
    pub fn sort(&mut self) {
        self.postings
            .retain(|_, posting| !matches!(posting, Posting::Docs(bitmap) if bitmap.is_empty()));
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> u64 {
        self.live.len()
    }

    /// Number of n-grams with postings or a tombstone.
    pub fn ngram_count(&self) -> usize {
        self.postings.len()
    }

    /// Number of pruned n-grams.
    pub fn pruned_count(&self) -> usize {
        self.postings
            .values()
            .filter(|posting| matches!(posting, Posting::Pruned))
            .count()
    }

    pub fn posting(&self, ngram: &str) -> Option<&Posting> {
        self.postings.get(ngram)
    }
}

impl Default for PostingIndex {
    fn default() -> Self {
        Self::new(NgramExtractor::default())
    }
}

/// Intersect posting sets (AND), smallest first.
///
/// Returns an empty bitmap for no input or as soon as the running result
/// empties.
fn intersect(lists: &mut [&RoaringBitmap]) -> RoaringBitmap {
    lists.sort_by_key(|bitmap| bitmap.len());
    let Some((first, rest)) = lists.split_first() else {
        return RoaringBitmap::new();
    };

    let mut result = (*first).clone();
    for bitmap in rest {
        if result.is_empty() {
            break;
        }
        result &= *bitmap;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> PostingIndex {
        PostingIndex::default()
    }

    fn ngrams_of(idx: &PostingIndex, words: &[&str]) -> Vec<Ngram> {
        idx.extractor().document_ngrams(words)
    }

    fn query(idx: &PostingIndex, words: &[&str]) -> Vec<u32> {
        let grams = idx.extractor().query_ngrams(words);
        idx.query_ngrams(&grams).iter().collect()
    }

    #[test]
    fn test_ids_sequential_and_fresh() {
        let mut idx = index();
        let a = idx.add_ngrams(&ngrams_of(&idx, &["hello"]));
        let b = idx.add_ngrams(&ngrams_of(&idx, &["world"]));
        assert_eq!((a, b), (0, 1));
        idx.retire(a);
        let c = idx.add_ngrams(&ngrams_of(&idx, &["hello"]));
        assert_eq!(c, 2);
        assert_eq!(idx.doc_count(), 2);
    }

    #[test]
    fn test_remaining_ids_counts_down() {
        let mut idx = index();
        idx.next_doc_id = u32::MAX - 2;
        assert_eq!(idx.remaining_ids(), 2);
        assert_eq!(idx.add_ngrams(&[]), u32::MAX - 2);
        assert_eq!(idx.add_ngrams(&[]), u32::MAX - 1);
        assert_eq!(idx.remaining_ids(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "doc id space exhausted")]
    fn test_allocation_past_id_space_panics() {
        let mut idx = index();
        idx.next_doc_id = u32::MAX;
        idx.add_ngrams(&[]);
    }

    #[test]
    fn test_query_intersects() {
        let mut idx = index();
        let grams = ngrams_of(&idx, &["quick", "brown"]);
        let a = idx.add_ngrams(&grams);
        let grams = ngrams_of(&idx, &["brown", "bear"]);
        let b = idx.add_ngrams(&grams);

        assert_eq!(query(&idx, &["brown"]), vec![a, b]);
        assert_eq!(query(&idx, &["qui", "bro"]), vec![a]);
        assert_eq!(query(&idx, &["bea"]), vec![b]);
    }

    #[test]
    fn test_unknown_ngram_matches_nothing() {
        let mut idx = index();
        let grams = ngrams_of(&idx, &["fox"]);
        idx.add_ngrams(&grams);
        assert!(query(&idx, &["zebra"]).is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut idx = index();
        let grams = ngrams_of(&idx, &["fox"]);
        let a = idx.add_ngrams(&grams);
        idx.delete("fox", a);
        idx.delete("fox", a);
        assert!(query(&idx, &["fox"]).is_empty());
        // Deleting a word that was never posted is a no-op.
        idx.delete("zebra", a);
    }

    #[test]
    fn test_sort_sweeps_empty_postings() {
        let mut idx = index();
        let grams = ngrams_of(&idx, &["fox"]);
        let a = idx.add_ngrams(&grams);
        let before = idx.ngram_count();
        assert!(before > 0);
        idx.delete("fox", a);
        assert_eq!(idx.ngram_count(), before);
        idx.sort();
        assert_eq!(idx.ngram_count(), 0);
        assert!(idx.posting("_fo").is_none());
    }

    #[test]
    fn test_prune_turns_common_ngrams_into_wildcards() {
        let mut idx = index();
        let mut ids = Vec::new();
        for word in ["apple", "apricot", "banana", "cherry"] {
            let grams = ngrams_of(&idx, &[word]);
            ids.push(idx.add_ngrams(&grams));
        }
        // 0.5 × 4 docs = 2: "_ap" (2 docs) survives, nothing is above 2.
        assert_eq!(idx.prune(0.5), 0);
        // 0.25 × 4 docs = 1: "_a"/"_ap" (2 docs) are pruned.
        let pruned = idx.prune(0.25);
        assert_eq!(pruned, 2);
        assert_eq!(idx.posting("_ap"), Some(&Posting::Pruned));
        assert_eq!(idx.pruned_count(), 2);

        // "_ap" no longer constrains; "apr" still narrows to apricot.
        assert_eq!(query(&idx, &["ap"]), ids);
        assert_eq!(query(&idx, &["apr"]), vec![ids[1]]);
    }

    #[test]
    fn test_pruned_ngram_absorbs_new_docs() {
        let mut idx = index();
        let grams = ngrams_of(&idx, &["fox"]);
        idx.add_ngrams(&grams);
        idx.prune(0.1);
        assert_eq!(idx.posting("fox"), Some(&Posting::Pruned));
        let grams = ngrams_of(&idx, &["fox"]);
        idx.add_ngrams(&grams);
        assert_eq!(idx.posting("fox"), Some(&Posting::Pruned));
        // Tombstones survive sort.
        idx.sort();
        assert_eq!(idx.posting("fox"), Some(&Posting::Pruned));
    }

    #[test]
    fn test_retired_docs_excluded_from_results() {
        let mut idx = index();
        let grams = ngrams_of(&idx, &["fox"]);
        let a = idx.add_ngrams(&grams);
        let b = idx.add_ngrams(&grams);
        assert!(idx.retire(a));
        assert!(!idx.retire(a));
        assert_eq!(query(&idx, &["fox"]), vec![b]);
    }

    #[test]
    fn test_all_pruned_returns_live_docs() {
        let mut idx = index();
        let grams = ngrams_of(&idx, &["fox"]);
        let a = idx.add_ngrams(&grams);
        let grams = ngrams_of(&idx, &["dog"]);
        let b = idx.add_ngrams(&grams);
        idx.prune(0.1);
        assert_eq!(query(&idx, &["fox"]), vec![a, b]);
    }

    #[test]
    fn test_intersect_empty_input() {
        assert!(intersect(&mut []).is_empty());
    }

    #[test]
    fn test_intersect_smallest_first() {
        let a: RoaringBitmap = (0..1000).collect();
        let b: RoaringBitmap = [3, 500, 2000].into_iter().collect();
        let result = intersect(&mut [&a, &b]);
        assert_eq!(result.iter().collect::<Vec<_>>(), vec![3, 500]);
    }
}
