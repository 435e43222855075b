//! Language layer error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading lexicon data
#[derive(Debug, Error)]
pub enum NluError {
    /// Data file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Data file had no usable lines
    #[error("No entries found in {0}")]
    EmptyData(PathBuf),
}
