//! # Sagitta
//!
//! An in-memory TF-IDF search library.
//!
//! Sagitta keeps a forward and an inverted index over whitespace-tokenized
//! documents and answers ranked top-K queries with inclusion/exclusion
//! terms, stop-word filtering, per-document status and rating, and
//! caller-supplied predicates.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Deterministic TF-IDF ranking with rating tie-breaks
//! - Sequential and rayon-parallel query paths
//! - Bulk query execution with ordered fan-out
//! - Sliding-window request statistics
//! - Vocabulary-based duplicate removal
//!
//! ## Example
//!
//! ```
//! use sagitta::document::DocumentStatus;
//! use sagitta::index::SearchIndex;
//!
//! # fn main() -> sagitta::error::Result<()> {
//! let mut index = SearchIndex::with_stop_words_text("a in on")?;
//! index.add_document(0, "fluffy cat fluffy tail", DocumentStatus::Actual, &[7, 2, 7])?;
//!
//! let found = index.find_top_documents("fluffy")?;
//! assert_eq!(found[0].id, 0);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod concurrent_map;
pub mod dedup;
pub mod document;
pub mod error;
pub mod index;
pub mod paginator;
pub mod process;
mod query;
pub mod search;
pub mod tracker;

pub mod prelude {
    //! Convenient re-exports of the most used types.

    pub use crate::document::{Document, DocumentId, DocumentStatus};
    pub use crate::error::{Result, SagittaError};
    pub use crate::index::SearchIndex;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
