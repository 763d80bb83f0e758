//! Bulk query execution with parallel fan-out.

use rayon::prelude::*;

use crate::document::Document;
use crate::error::Result;
use crate::index::SearchIndex;

/// Run every query through [`SearchIndex::find_top_documents`] in parallel.
///
/// Element `i` of the output is the result for `queries[i]`; output order
/// always matches input order. The first observed error propagates.
pub fn process_queries<S>(index: &SearchIndex, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|raw_query| index.find_top_documents(raw_query.as_ref()))
        .collect()
}

/// Run every query in parallel and flatten the results.
///
/// The output is the concatenation of the per-query results in input-index
/// order.
pub fn process_queries_joined<S>(index: &SearchIndex, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(index, queries)?
        .into_iter()
        .flatten()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::{DocumentId, DocumentStatus};
    use crate::error::SagittaError;

    fn sample_index() -> SearchIndex {
        let mut index = SearchIndex::new();
        index
            .add_document(0, "white cat fancy collar", DocumentStatus::Actual, &[2])
            .unwrap();
        index
            .add_document(1, "fluffy cat fluffy tail", DocumentStatus::Actual, &[5])
            .unwrap();
        index
            .add_document(2, "groomed dog expressive eyes", DocumentStatus::Actual, &[-1])
            .unwrap();
        index
    }

    #[test]
    fn test_process_queries_preserves_order() {
        let index = sample_index();
        let queries = ["dog", "cat", "unicorn"];

        let results = process_queries(&index, &queries).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].id, 2);
        assert_eq!(results[1].len(), 2);
        assert!(results[2].is_empty());
    }

    #[test]
    fn test_process_queries_joined_concatenates_in_order() {
        let index = sample_index();
        let queries = ["dog", "cat"];

        let joined = process_queries_joined(&index, &queries).unwrap();
        let expected: Vec<DocumentId> = process_queries(&index, &queries)
            .unwrap()
            .into_iter()
            .flatten()
            .map(|document| document.id)
            .collect();

        let ids: Vec<DocumentId> = joined.iter().map(|document| document.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn test_process_queries_propagates_errors() {
        let index = sample_index();
        let queries = ["cat", "bad --query", "dog"];

        assert!(matches!(
            process_queries(&index, &queries),
            Err(SagittaError::InvalidQuery(_))
        ));
    }
}
