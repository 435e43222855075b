//! # kai-topics
//!
//! Named topics and topic ranking.
//!
//! A topic is a named body of text split into sentences. Saving a topic
//! stores its sentences, indexes them into the word index under the topic
//! and every mirror namespace, and records per-topic `(stem, coarse tag)`
//! scores so queries can be ranked against topics.
//!
//! ## Features
//! - Decayed per-topic term scores ([`TopicRanker`])
//! - Topic rows with ordered pagination ([`TopicStorage::list_topics`])
//! - Best-effort cascade delete of a topic's sentences and index rows

pub mod error;
pub mod ranker;
pub mod storage;

pub use error::TopicsError;
pub use ranker::TopicRanker;
pub use storage::{DeleteSummary, TopicStorage};
