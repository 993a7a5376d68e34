//! Error types for the search client and the ranking pipeline.

use thiserror::Error;

/// Errors produced while fetching or normalizing a result batch.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A raw record is missing a required field.
    #[error("invalid search result at position {index}: missing `{field}`")]
    Validation {
        /// Position of the offending record in the backend response.
        index: usize,
        /// Name of the first missing required field.
        field: &'static str,
    },

    /// The backend answered with a non-success status.
    #[error("Search failed (HTTP {status})")]
    RequestFailure { status: u16 },

    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
