//! Sliding-window statistics over recently answered queries.

use std::collections::VecDeque;

use crate::document::{Document, DocumentId, DocumentStatus};
use crate::error::Result;
use crate::index::SearchIndex;

/// Submissions covered by the default window.
pub const MINUTES_IN_DAY: usize = 1440;

/// Outcome of one tracked submission.
#[derive(Debug, Clone, Copy)]
struct QueryResult {
    request_time: u64,
    is_empty: bool,
}

/// A bounded FIFO over the outcomes of the last N submitted queries.
///
/// Every submission is forwarded to the borrowed [`SearchIndex`]; only
/// successful submissions advance the logical clock and enter the window.
#[derive(Debug)]
pub struct RequestTracker<'a> {
    index: &'a SearchIndex,
    requests: VecDeque<QueryResult>,
    window: u64,
    current_time: u64,
    no_result_responses: usize,
}

impl<'a> RequestTracker<'a> {
    /// Track requests against `index` over the default day-long window.
    pub fn new(index: &'a SearchIndex) -> Self {
        Self::with_window(index, MINUTES_IN_DAY)
    }

    /// Track requests against `index` over a window of `window` submissions.
    pub fn with_window(index: &'a SearchIndex, window: usize) -> Self {
        RequestTracker {
            index,
            requests: VecDeque::new(),
            window: window as u64,
            current_time: 0,
            no_result_responses: 0,
        }
    }

    /// Submit a default-status query.
    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let response = self.index.find_top_documents(raw_query)?;
        self.record(&response);
        Ok(response)
    }

    /// Submit a query filtered by document status.
    pub fn add_find_request_with_status(
        &mut self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        let response = self.index.find_top_documents_with_status(raw_query, status)?;
        self.record(&response);
        Ok(response)
    }

    /// Submit a query filtered by a predicate over `(id, status, rating)`.
    pub fn add_find_request_with_filter<F>(
        &mut self,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>>
    where
        F: Fn(DocumentId, DocumentStatus, i32) -> bool,
    {
        let response = self.index.find_top_documents_with_filter(raw_query, filter)?;
        self.record(&response);
        Ok(response)
    }

    /// How many submissions inside the window returned no documents.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_responses
    }

    fn record(&mut self, response: &[Document]) {
        self.current_time += 1;
        let result = QueryResult {
            request_time: self.current_time,
            is_empty: response.is_empty(),
        };
        self.requests.push_back(result);
        if result.is_empty {
            self.no_result_responses += 1;
        }
        while let Some(front) = self.requests.front() {
            if front.request_time + self.window > self.current_time {
                break;
            }
            if front.is_empty {
                self.no_result_responses -= 1;
            }
            self.requests.pop_front();
        }
    }
}
