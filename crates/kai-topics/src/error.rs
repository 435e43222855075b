//! Topic error types.

use thiserror::Error;

/// Errors that can occur during topic operations.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] kai_storage::StorageError),

    /// Word index error
    #[error("Index error: {0}")]
    Index(#[from] kai_index::IndexError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
