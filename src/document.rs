//! Document identifiers, statuses, and ranked search results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a document within a [`SearchIndex`](crate::index::SearchIndex).
///
/// Signed so that negative identifiers can be received and rejected at the
/// insertion boundary; every live id is non-negative.
pub type DocumentId = i64;

/// Lifecycle status attached to every indexed document.
///
/// The discriminants are fixed; [`Display`](fmt::Display) prints the integer
/// form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DocumentStatus {
    /// Live and returned by default queries.
    Actual = 0,
    /// Live but not relevant to default queries.
    Irrelevant = 1,
    /// Banned from default queries.
    Banned = 2,
    /// Scheduled for removal.
    Removed = 3,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// A single ranked search result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of the matched document.
    pub id: DocumentId,

    /// Accumulated TF-IDF relevance for the query.
    pub relevance: f64,

    /// Average rating of the document.
    pub rating: i32,
}

impl Document {
    /// Create a new document result.
    pub fn new(id: DocumentId, relevance: f64, rating: i32) -> Self {
        Document {
            id,
            relevance,
            rating,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}
