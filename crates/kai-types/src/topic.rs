//! Topic records and topic ranking rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentence::SentenceId;

/// A named body of knowledge whose sentences are indexed under its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic name, also its index namespace
    pub name: String,

    /// Original text of the topic
    pub body: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

/// Summed score of one `(word, coarse tag)` within one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicIndexEntry {
    pub topic: String,
    pub word: String,
    /// Coarse tag, "NN" or "VB"
    pub tag: String,
    pub score: f64,
}

/// Records that a sentence contributed `(word, tag)` to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicUnindexEntry {
    pub topic: String,
    pub sentence_id: SentenceId,
    pub word: String,
    pub tag: String,
}

/// A topic and its relevance to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicScore {
    pub topic: String,
    pub score: f64,
}
