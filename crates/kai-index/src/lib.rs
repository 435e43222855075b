//! # kai-index
//!
//! The inverted word index.
//!
//! - [`WordIndexer`] writes forward (`word -> sentence`) rows together with the
//!   reverse rows that make every sentence removable, and removes them again.
//! - [`DocumentFinder`] answers AND queries over the forward rows, keeping
//!   only grammatically compatible matches.
//! - [`SentenceStore`] keeps the sentences themselves so hits can be shown
//!   as text.
//!
//! Rows are partitioned by topic and by a caller-chosen integer shard.

pub mod error;
pub mod finder;
pub mod indexer;
pub mod sentences;

pub use error::IndexError;
pub use finder::{compatible_tags, DocumentFinder};
pub use indexer::{Removal, WordIndexer};
pub use sentences::{SentenceStore, TextMatch};

#[cfg(test)]
pub(crate) mod test_support;
