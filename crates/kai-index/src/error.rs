//! Index error types.

use thiserror::Error;

/// Errors that can occur in index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] kai_storage::StorageError),

    /// Invalid input (empty topic, nil sentence id, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
