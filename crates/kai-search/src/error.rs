//! Search error types.

use thiserror::Error;

/// Errors that can occur parsing or running a query.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query text does not follow the grammar
    #[error("Parse error at token {position}: {message}")]
    Parse { position: usize, message: String },

    /// Index read failed
    #[error("Index error: {0}")]
    Index(#[from] kai_index::IndexError),
}

impl SearchError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        SearchError::Parse {
            position,
            message: message.into(),
        }
    }
}
