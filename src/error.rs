//! Error types for the Sagitta library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SagittaError`] enum. Validation errors surface synchronously to the
//! caller of the top-level operation; unknown query terms and empty result
//! sets are normal outcomes, not errors.

use thiserror::Error;

use crate::document::DocumentId;

/// The main error type for Sagitta operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SagittaError {
    /// A stop word contains a control byte.
    #[error("invalid characters: {0}")]
    InvalidCharacters(String),

    /// A document was rejected on insertion.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A raw query is structurally malformed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A single query token is invalid; carries the offending token.
    #[error("invalid word: {0}")]
    InvalidWord(String),

    /// The requested document id is not in the index.
    #[error("document {0} not found")]
    DocumentNotFound(DocumentId),
}

/// Result type alias for operations that may fail with [`SagittaError`].
pub type Result<T> = std::result::Result<T, SagittaError>;

impl SagittaError {
    /// Create a new invalid-characters error.
    pub fn invalid_characters<S: Into<String>>(msg: S) -> Self {
        SagittaError::InvalidCharacters(msg.into())
    }

    /// Create a new invalid-document error.
    pub fn invalid_document<S: Into<String>>(msg: S) -> Self {
        SagittaError::InvalidDocument(msg.into())
    }

    /// Create a new invalid-query error.
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        SagittaError::InvalidQuery(msg.into())
    }

    /// Create a new invalid-word error carrying the offending token.
    pub fn invalid_word<S: Into<String>>(word: S) -> Self {
        SagittaError::InvalidWord(word.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SagittaError::invalid_query("ends with '-'");
        assert_eq!(error.to_string(), "invalid query: ends with '-'");

        let error = SagittaError::invalid_word("bro\u{1}ken");
        assert_eq!(error.to_string(), "invalid word: bro\u{1}ken");

        let error = SagittaError::invalid_characters("stop\tword");
        assert_eq!(error.to_string(), "invalid characters: stop\tword");
    }

    #[test]
    fn test_document_not_found_display() {
        let error = SagittaError::DocumentNotFound(42);
        assert_eq!(error.to_string(), "document 42 not found");
    }
}
