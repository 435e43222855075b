//! # kai-types
//!
//! Shared domain types for the k-ai text index.
//!
//! This crate defines the data structures every other crate passes around:
//! - Tokens and sentences as produced by the upstream language parser
//! - Index, unindex and match rows of the inverted word index
//! - Topics and their ranking rows
//! - Penn treebank tag helpers
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use kai_types::{Sentence, Token};
//!
//! let sentence = Sentence::new(vec![Token::new("Peter", "NNP")]);
//! assert!(!sentence.id.is_nil());
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod penn;
pub mod sentence;
pub mod topic;

pub use config::{IndexSettings, RetrySettings, Settings, TopicSettings};
pub use error::KaiError;
pub use index::{IndexEntry, IndexMatch, MatchSet, UnindexEntry};
pub use penn::{is_penn_tag, CoarseTag, PENN_TAGS};
pub use sentence::{Sentence, SentenceId, Token};
pub use topic::{Topic, TopicIndexEntry, TopicScore, TopicUnindexEntry};
