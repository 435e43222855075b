//! Rows of the inverted word index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sentence::SentenceId;

/// Forward index row: `word -> document`, keyed by `(topic, word, shard)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub sentence_id: SentenceId,
    /// Normalized (stemmed, lowercased) term
    pub word: String,
    /// Penn tag of the token that produced the row
    pub tag: String,
    pub shard: i32,
    /// Token position within the document, provenance only
    pub offset: i32,
    pub topic: String,
    pub score: f64,
}

/// Reverse index row: `document -> word`, the sole deletion handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnindexEntry {
    pub sentence_id: SentenceId,
    pub word: String,
    pub shard: i32,
}

/// An index row that satisfied a query keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    #[serde(flatten)]
    pub entry: IndexEntry,

    /// Zero-based position of the query keyword among the non-skipped keywords
    pub keyword_index: usize,
}

impl IndexMatch {
    pub fn new(entry: IndexEntry, keyword_index: usize) -> Self {
        Self {
            entry,
            keyword_index,
        }
    }
}

/// Retrieval result: matching documents with the rows that matched.
pub type MatchSet = HashMap<SentenceId, Vec<IndexMatch>>;
