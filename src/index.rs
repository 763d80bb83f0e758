//! The indexed document store.
//!
//! [`SearchIndex`] owns the forward index (document → term → TF), the
//! inverted index (term → document → TF), per-document parameters (status,
//! rating, original text), the stop-word set, and the ordered set of live
//! document ids. The two indices are mutual transposes at all times.
//!
//! The store is single-writer by API shape: every mutation takes
//! `&mut self`, every query takes `&self`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use tracing::debug;

use crate::analysis::{has_control_bytes, split_words};
use crate::document::{DocumentId, DocumentStatus};
use crate::error::{Result, SagittaError};

/// Term frequencies of one document, keyed by interned term, in term order.
pub type WordFrequencies = BTreeMap<Arc<str>, f64>;

/// Per-term posting map: document id → term frequency in that document.
pub(crate) type Postings = BTreeMap<DocumentId, f64>;

static EMPTY_WORD_FREQUENCIES: WordFrequencies = BTreeMap::new();

/// Parameters kept for every live document alongside the indices.
#[derive(Debug, Clone)]
pub(crate) struct DocumentEntry {
    pub(crate) status: DocumentStatus,
    pub(crate) rating: i32,
    /// Original text as supplied to [`SearchIndex::add_document`].
    pub(crate) text: String,
}

/// An in-memory TF-IDF document index.
///
/// Documents are created by [`add_document`](SearchIndex::add_document) and
/// destroyed by [`remove_document`](SearchIndex::remove_document); there is
/// no update-in-place. Terms are interned as `Arc<str>` shared between the
/// forward and the inverted index.
#[derive(Debug, Default)]
pub struct SearchIndex {
    /// term → document → term frequency.
    pub(crate) word_to_doc_freqs: AHashMap<Arc<str>, Postings>,
    /// document → term → term frequency; transpose of `word_to_doc_freqs`.
    pub(crate) doc_to_word_freqs: AHashMap<DocumentId, WordFrequencies>,
    /// Status, rating, and retained text per live document.
    pub(crate) documents: AHashMap<DocumentId, DocumentEntry>,
    /// Live ids in ascending order.
    pub(crate) doc_ids: BTreeSet<DocumentId>,
    /// Terms stripped from documents and queries before any processing.
    pub(crate) stop_words: AHashSet<String>,
}

impl SearchIndex {
    /// Create an index with an empty stop-word set.
    pub fn new() -> Self {
        SearchIndex::default()
    }

    /// Create an index from a collection of stop words.
    ///
    /// Empty words are ignored. Fails with `InvalidCharacters` if any word
    /// contains a byte in `[0x00, 0x20)`.
    pub fn with_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = SearchIndex::new();
        for word in stop_words {
            let word = word.as_ref();
            if has_control_bytes(word) {
                return Err(SagittaError::invalid_characters(word));
            }
            if !word.is_empty() {
                index.stop_words.insert(word.to_string());
            }
        }
        Ok(index)
    }

    /// Create an index from a whitespace-separated stop-word string.
    pub fn with_stop_words_text(text: &str) -> Result<Self> {
        Self::with_stop_words(split_words(text))
    }

    /// Add a document to the index.
    ///
    /// Fails with `InvalidDocument` if `document_id` is negative or already
    /// present, if `text` contains a control byte, or if `ratings` is
    /// empty. The stored rating is the truncated integer mean of `ratings`.
    pub fn add_document(
        &mut self,
        document_id: DocumentId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if document_id < 0 {
            return Err(SagittaError::invalid_document(format!(
                "negative id {document_id}"
            )));
        }
        if self.documents.contains_key(&document_id) {
            return Err(SagittaError::invalid_document(format!(
                "id {document_id} is already in the index"
            )));
        }
        if has_control_bytes(text) {
            return Err(SagittaError::invalid_document(format!(
                "text of document {document_id} contains control characters"
            )));
        }
        let rating = average_rating(document_id, ratings)?;

        let words = self.split_into_words_no_stop(text);
        let total_words = words.len() as f64;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for word in words {
            *counts.entry(word).or_insert(0) += 1;
        }

        let mut word_freqs = WordFrequencies::new();
        for (word, count) in counts {
            let term = self.intern_term(word);
            let frequency = count as f64 / total_words;
            self.word_to_doc_freqs
                .entry(Arc::clone(&term))
                .or_default()
                .insert(document_id, frequency);
            word_freqs.insert(term, frequency);
        }

        let term_count = word_freqs.len();
        self.doc_to_word_freqs.insert(document_id, word_freqs);
        self.documents.insert(
            document_id,
            DocumentEntry {
                status,
                rating,
                text: text.to_string(),
            },
        );
        self.doc_ids.insert(document_id);

        debug!(document_id, terms = term_count, "added document");
        Ok(())
    }

    /// Remove a document; a non-live `document_id` is a no-op.
    ///
    /// Walks the removed document's forward map so that exactly the
    /// affected inverted entries are touched; entries whose posting maps
    /// become empty are erased.
    pub fn remove_document(&mut self, document_id: DocumentId) {
        let Some(word_freqs) = self.doc_to_word_freqs.remove(&document_id) else {
            return;
        };
        for word in word_freqs.keys() {
            let now_empty = match self.word_to_doc_freqs.get_mut(word) {
                Some(postings) => {
                    postings.remove(&document_id);
                    postings.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.word_to_doc_freqs.remove(word);
            }
        }
        self.finish_removal(document_id);
    }

    /// Remove a document, fanning the inverted-index update out over rayon.
    ///
    /// Same contract as [`remove_document`](SearchIndex::remove_document).
    /// The affected posting maps are detached sequentially, updated in
    /// parallel, and re-inserted sequentially, so the `&mut self` borrow
    /// never exposes a partially-updated id.
    pub fn par_remove_document(&mut self, document_id: DocumentId) {
        let Some(word_freqs) = self.doc_to_word_freqs.remove(&document_id) else {
            return;
        };
        let mut detached: Vec<(Arc<str>, Postings)> = word_freqs
            .keys()
            .filter_map(|word| self.word_to_doc_freqs.remove_entry(word))
            .collect();

        detached.par_iter_mut().for_each(|(_, postings)| {
            postings.remove(&document_id);
        });

        for (word, postings) in detached {
            if !postings.is_empty() {
                self.word_to_doc_freqs.insert(word, postings);
            }
        }
        self.finish_removal(document_id);
    }

    /// The number of live documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.doc_ids.iter().copied()
    }

    /// Term frequencies of a document.
    ///
    /// Returns a stable empty view if `document_id` is not live.
    pub fn word_frequencies(&self, document_id: DocumentId) -> &WordFrequencies {
        self.doc_to_word_freqs
            .get(&document_id)
            .unwrap_or(&EMPTY_WORD_FREQUENCIES)
    }

    /// Original text of a live document.
    pub fn document_text(&self, document_id: DocumentId) -> Option<&str> {
        self.documents
            .get(&document_id)
            .map(|entry| entry.text.as_str())
    }

    /// Status of a live document.
    pub fn document_status(&self, document_id: DocumentId) -> Option<DocumentStatus> {
        self.documents.get(&document_id).map(|entry| entry.status)
    }

    /// Average rating of a live document.
    pub fn document_rating(&self, document_id: DocumentId) -> Option<i32> {
        self.documents.get(&document_id).map(|entry| entry.rating)
    }

    /// The configured stop words, in no particular order.
    pub fn stop_words(&self) -> impl Iterator<Item = &str> {
        self.stop_words.iter().map(String::as_str)
    }

    pub(crate) fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    fn split_into_words_no_stop<'a>(&self, text: &'a str) -> Vec<&'a str> {
        split_words(text)
            .filter(|word| !self.is_stop_word(word))
            .collect()
    }

    /// Reuse the inverted index's key for `word` if one exists.
    fn intern_term(&self, word: &str) -> Arc<str> {
        match self.word_to_doc_freqs.get_key_value(word) {
            Some((term, _)) => Arc::clone(term),
            None => Arc::from(word),
        }
    }

    fn finish_removal(&mut self, document_id: DocumentId) {
        self.documents.remove(&document_id);
        self.doc_ids.remove(&document_id);
        debug!(document_id, "removed document");
    }
}

fn average_rating(document_id: DocumentId, ratings: &[i32]) -> Result<i32> {
    if ratings.is_empty() {
        return Err(SagittaError::invalid_document(format!(
            "document {document_id} has no ratings"
        )));
    }
    let sum: i64 = ratings.iter().map(|&rating| i64::from(rating)).sum();
    Ok((sum / ratings.len() as i64) as i32)
}
