//! Removal of documents with identical vocabularies.

use std::sync::Arc;

use ahash::AHashSet;
use tracing::info;

use crate::document::DocumentId;
use crate::index::SearchIndex;

/// Remove every document whose vocabulary duplicates a lower-id document.
///
/// Documents are equivalent when their term sets coincide; frequencies and
/// ordering are irrelevant. Ids are scanned in ascending order, so the
/// smallest id among equivalents is retained. Returns the removed ids in
/// ascending order and emits a notification per removal.
pub fn remove_duplicates(index: &mut SearchIndex) -> Vec<DocumentId> {
    let mut seen_vocabularies: AHashSet<Vec<Arc<str>>> = AHashSet::new();
    let mut ids_to_remove = Vec::new();
    for document_id in index.document_ids() {
        let vocabulary: Vec<Arc<str>> = index
            .word_frequencies(document_id)
            .keys()
            .cloned()
            .collect();
        if !seen_vocabularies.insert(vocabulary) {
            ids_to_remove.push(document_id);
        }
    }

    for &document_id in &ids_to_remove {
        index.remove_document(document_id);
        info!(document_id, "found duplicate document");
    }
    ids_to_remove
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::DocumentStatus;

    #[test]
    fn test_remove_duplicates_keeps_minimum_id() {
        let mut index = SearchIndex::new();
        index
            .add_document(10, "x y z", DocumentStatus::Actual, &[1])
            .unwrap();
        index
            .add_document(20, "z y x", DocumentStatus::Actual, &[2])
            .unwrap();
        index
            .add_document(30, "x x y z", DocumentStatus::Actual, &[3])
            .unwrap();
        index
            .add_document(40, "x y", DocumentStatus::Actual, &[4])
            .unwrap();

        let removed = remove_duplicates(&mut index);

        assert_eq!(removed, vec![20, 30]);
        let remaining: Vec<DocumentId> = index.document_ids().collect();
        assert_eq!(remaining, vec![10, 40]);
    }

    #[test]
    fn test_remove_duplicates_without_duplicates() {
        let mut index = SearchIndex::new();
        index
            .add_document(0, "white cat", DocumentStatus::Actual, &[1])
            .unwrap();
        index
            .add_document(1, "black cat", DocumentStatus::Actual, &[1])
            .unwrap();

        assert!(remove_duplicates(&mut index).is_empty());
        assert_eq!(index.document_count(), 2);
    }

    #[test]
    fn test_remove_duplicates_ignores_frequencies() {
        let mut index = SearchIndex::new();
        index
            .add_document(1, "cat cat tail", DocumentStatus::Actual, &[1])
            .unwrap();
        index
            .add_document(2, "cat tail tail tail", DocumentStatus::Banned, &[9])
            .unwrap();

        let removed = remove_duplicates(&mut index);

        assert_eq!(removed, vec![2]);
        assert_eq!(index.document_ids().collect::<Vec<_>>(), vec![1]);
    }
}
