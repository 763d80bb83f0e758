//! Query execution: ranked top-K retrieval and per-document matching.
//!
//! Every operation comes in a sequential flavor and a rayon-parallel
//! `par_` flavor with the same contract. The parallel paths treat the
//! index as read-only; their only shared mutable state is a per-call
//! [`ConcurrentMap`] accumulator.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

use ahash::AHashSet;
use rayon::prelude::*;
use tracing::debug;

use crate::concurrent_map::ConcurrentMap;
use crate::document::{Document, DocumentId, DocumentStatus};
use crate::error::{Result, SagittaError};
use crate::index::SearchIndex;
use crate::query::{self, ParseMode, Query};

/// Maximum number of documents returned by a top-documents query.
pub const MAX_RESULT_COUNT: usize = 5;

/// Relevances closer than this are ranked by rating instead.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Shards in the parallel relevance accumulator.
const ACCUMULATOR_SHARDS: usize = 50;

impl SearchIndex {
    /// Find the best-matching `Actual` documents for `raw_query`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with_status(raw_query, DocumentStatus::Actual)
    }

    /// Find the best-matching documents with the requested status.
    pub fn find_top_documents_with_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with_filter(raw_query, move |_, document_status, _| {
            document_status == status
        })
    }

    /// Find the best-matching documents accepted by `filter`.
    ///
    /// The filter receives `(id, status, rating)` for every candidate that
    /// survived minus-term exclusion.
    pub fn find_top_documents_with_filter<F>(
        &self,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>>
    where
        F: Fn(DocumentId, DocumentStatus, i32) -> bool,
    {
        let started = Instant::now();
        let query = query::parse(raw_query, &self.stop_words, ParseMode::Deduplicate)?;
        let relevance = self.accumulate_relevance(&query, &filter);
        let result = self.rank_documents(relevance);
        debug!(
            elapsed_us = started.elapsed().as_micros() as u64,
            results = result.len(),
            "find_top_documents"
        );
        Ok(result)
    }

    /// Parallel [`find_top_documents`](SearchIndex::find_top_documents).
    pub fn par_find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.par_find_top_documents_with_status(raw_query, DocumentStatus::Actual)
    }

    /// Parallel [`find_top_documents_with_status`](SearchIndex::find_top_documents_with_status).
    pub fn par_find_top_documents_with_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.par_find_top_documents_with_filter(raw_query, move |_, document_status, _| {
            document_status == status
        })
    }

    /// Parallel [`find_top_documents_with_filter`](SearchIndex::find_top_documents_with_filter).
    ///
    /// Accumulation fans out one rayon task per plus-term into a sharded
    /// concurrent map, which is then drained into an ordered map before the
    /// sequential ranking tail.
    pub fn par_find_top_documents_with_filter<F>(
        &self,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>>
    where
        F: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let started = Instant::now();
        let query = query::parse(raw_query, &self.stop_words, ParseMode::Deduplicate)?;
        let relevance = self.par_accumulate_relevance(&query, &filter);
        let result = self.rank_documents(relevance);
        debug!(
            elapsed_us = started.elapsed().as_micros() as u64,
            results = result.len(),
            "par_find_top_documents"
        );
        Ok(result)
    }

    /// Return the query terms present in one document, with its status.
    ///
    /// The query is parsed in raw (non-deduplicating) mode. If any minus
    /// term occurs in the document, the matched list is empty; otherwise it
    /// holds the present plus terms, deduplicated and sorted ascending. The
    /// returned slices borrow from `raw_query`.
    pub fn match_document<'a>(
        &self,
        raw_query: &'a str,
        document_id: DocumentId,
    ) -> Result<(Vec<&'a str>, DocumentStatus)> {
        let status = self.matched_status(document_id)?;
        let query = query::parse(raw_query, &self.stop_words, ParseMode::Raw)?;

        if query
            .minus_words
            .iter()
            .any(|word| self.word_in_document(word, document_id))
        {
            return Ok((Vec::new(), status));
        }

        let mut matched: Vec<&'a str> = query
            .plus_words
            .iter()
            .copied()
            .filter(|word| self.word_in_document(word, document_id))
            .collect();
        matched.sort_unstable();
        matched.dedup();
        Ok((matched, status))
    }

    /// Parallel [`match_document`](SearchIndex::match_document).
    ///
    /// Minus terms are checked with a parallel `any`, plus terms collected
    /// with a parallel filter; sort and dedup run sequentially.
    pub fn par_match_document<'a>(
        &self,
        raw_query: &'a str,
        document_id: DocumentId,
    ) -> Result<(Vec<&'a str>, DocumentStatus)> {
        let status = self.matched_status(document_id)?;
        let query = query::parse(raw_query, &self.stop_words, ParseMode::Raw)?;

        if query
            .minus_words
            .par_iter()
            .any(|word| self.word_in_document(word, document_id))
        {
            return Ok((Vec::new(), status));
        }

        let mut matched: Vec<&'a str> = query
            .plus_words
            .par_iter()
            .copied()
            .filter(|word| self.word_in_document(word, document_id))
            .collect();
        matched.sort_unstable();
        matched.dedup();
        Ok((matched, status))
    }

    fn matched_status(&self, document_id: DocumentId) -> Result<DocumentStatus> {
        self.document_status(document_id)
            .ok_or(SagittaError::DocumentNotFound(document_id))
    }

    fn word_in_document(&self, word: &str, document_id: DocumentId) -> bool {
        self.word_to_doc_freqs
            .get(word)
            .is_some_and(|postings| postings.contains_key(&document_id))
    }

    /// Ids referenced by any minus term; absent terms contribute nothing.
    fn excluded_documents(&self, query: &Query<'_>) -> AHashSet<DocumentId> {
        let mut excluded = AHashSet::new();
        for word in &query.minus_words {
            if let Some(postings) = self.word_to_doc_freqs.get(*word) {
                excluded.extend(postings.keys().copied());
            }
        }
        excluded
    }

    fn word_idf(&self, document_frequency: usize) -> f64 {
        (self.document_count() as f64 / document_frequency as f64).ln()
    }

    fn accumulate_relevance<F>(&self, query: &Query<'_>, filter: &F) -> BTreeMap<DocumentId, f64>
    where
        F: Fn(DocumentId, DocumentStatus, i32) -> bool,
    {
        let excluded = self.excluded_documents(query);
        let mut relevance = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = self.word_to_doc_freqs.get(*word) else {
                continue;
            };
            let idf = self.word_idf(postings.len());
            for (&document_id, &tf) in postings {
                if excluded.contains(&document_id) {
                    continue;
                }
                let Some(entry) = self.documents.get(&document_id) else {
                    continue;
                };
                if filter(document_id, entry.status, entry.rating) {
                    *relevance.entry(document_id).or_insert(0.0) += tf * idf;
                }
            }
        }
        relevance
    }

    fn par_accumulate_relevance<F>(
        &self,
        query: &Query<'_>,
        filter: &F,
    ) -> BTreeMap<DocumentId, f64>
    where
        F: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let excluded = self.excluded_documents(query);
        let relevance: ConcurrentMap<DocumentId, f64> = ConcurrentMap::new(ACCUMULATOR_SHARDS);
        query.plus_words.par_iter().for_each(|word| {
            let Some(postings) = self.word_to_doc_freqs.get(*word) else {
                return;
            };
            let idf = self.word_idf(postings.len());
            for (&document_id, &tf) in postings {
                if excluded.contains(&document_id) {
                    continue;
                }
                let Some(entry) = self.documents.get(&document_id) else {
                    continue;
                };
                if filter(document_id, entry.status, entry.rating) {
                    *relevance.access(document_id) += tf * idf;
                }
            }
        });
        relevance.into_ordered_map()
    }

    fn rank_documents(&self, relevance: BTreeMap<DocumentId, f64>) -> Vec<Document> {
        let mut result: Vec<Document> = relevance
            .into_iter()
            .filter_map(|(document_id, relevance)| {
                self.document_rating(document_id)
                    .map(|rating| Document::new(document_id, relevance, rating))
            })
            .collect();
        result.sort_by(compare_documents);
        result.truncate(MAX_RESULT_COUNT);
        result
    }
}

/// Relevance descending; ratings break near-equal relevances.
fn compare_documents(a: &Document, b: &Document) -> Ordering {
    if (a.relevance - b.relevance).abs() < RELEVANCE_EPSILON {
        b.rating.cmp(&a.rating)
    } else {
        b.relevance.total_cmp(&a.relevance)
    }
}
