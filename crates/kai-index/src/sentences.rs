//! Sentence text storage.
//!
//! Sentences are stored whole by id, with a `(topic, id)` membership row so a
//! topic's sentences can be enumerated.

use std::sync::Arc;

use kai_nlu::to_text;
use kai_storage::{from_row, to_row, Predicate, Storage, TableSchema};
use kai_types::{Sentence, SentenceId, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::IndexError;
use crate::finder::DocumentFinder;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSentence {
    id: SentenceId,
    topic: String,
    sentence: Sentence,
}

#[derive(Debug, Serialize, Deserialize)]
struct TopicMember {
    topic: String,
    id: SentenceId,
}

/// A retrieved sentence rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMatch {
    pub sentence_id: SentenceId,
    pub topic: String,
    pub text: String,
}

/// Stores and retrieves sentences.
#[derive(Clone)]
pub struct SentenceStore {
    storage: Arc<Storage>,
    finder: DocumentFinder,
}

impl SentenceStore {
    pub fn new(storage: Arc<Storage>, finder: DocumentFinder) -> Self {
        Self { storage, finder }
    }

    /// Save sentences under a topic. Every sentence needs an id.
    #[instrument(skip(self, sentences), fields(count = sentences.len()))]
    pub fn save_sentences(&self, sentences: &[Sentence], topic: &str) -> Result<(), IndexError> {
        if sentences.is_empty() || topic.is_empty() {
            return Err(IndexError::InvalidInput(
                "Sentences and topic must not be empty".to_string(),
            ));
        }
        if sentences.iter().any(|s| s.id.is_nil()) {
            return Err(IndexError::InvalidInput("Sentence without id".to_string()));
        }

        for sentence in sentences {
            let mut sentence = sentence.clone();
            sentence.topic = topic.to_string();
            let stored = StoredSentence {
                id: sentence.id,
                topic: topic.to_string(),
                sentence,
            };
            let member = TopicMember {
                topic: topic.to_string(),
                id: stored.id,
            };
            self.storage.insert_all(&[
                (TableSchema::SENTENCE_BY_ID, to_row(&stored)?),
                (TableSchema::SENTENCE_BY_TOPIC, to_row(&member)?),
            ])?;
        }
        debug!("Saved sentences");
        Ok(())
    }

    /// A stored sentence, with its topic set.
    pub fn get_sentence(&self, id: SentenceId) -> Result<Option<Sentence>, IndexError> {
        if id.is_nil() {
            return Err(IndexError::InvalidInput("Nil sentence id".to_string()));
        }
        let rows = self.storage.select(
            &TableSchema::SENTENCE_BY_ID,
            &[],
            &Predicate::new().eq("id", id),
            None,
        )?;
        match rows.into_iter().next() {
            Some(row) => {
                let stored: StoredSentence = from_row(row)?;
                let mut sentence = stored.sentence;
                sentence.id = stored.id;
                sentence.topic = stored.topic;
                Ok(Some(sentence))
            }
            None => Ok(None),
        }
    }

    /// Delete a sentence and its membership in `topic`.
    pub fn delete_sentence(&self, id: SentenceId, topic: &str) -> Result<(), IndexError> {
        if id.is_nil() {
            return Err(IndexError::InvalidInput("Nil sentence id".to_string()));
        }
        self.storage.delete(
            &TableSchema::SENTENCE_BY_TOPIC,
            &Predicate::new().eq("topic", topic).eq("id", id),
        )?;
        self.storage
            .delete(&TableSchema::SENTENCE_BY_ID, &Predicate::new().eq("id", id))?;
        Ok(())
    }

    /// Ids of the sentences saved under a topic.
    pub fn sentence_ids(&self, topic: &str) -> Result<Vec<SentenceId>, IndexError> {
        let rows = self.storage.select(
            &TableSchema::SENTENCE_BY_TOPIC,
            &[],
            &Predicate::new().eq("topic", topic),
            None,
        )?;
        rows.into_iter()
            .map(|row| -> Result<SentenceId, IndexError> { Ok(from_row::<TopicMember>(row)?.id) })
            .collect()
    }

    /// Run a query against shard 0 of `topic` and render each hit as text.
    ///
    /// Hits whose sentence is no longer stored are left out. Results are
    /// ordered by sentence id.
    pub fn find_text(&self, tokens: &[Token], topic: &str) -> Result<Vec<TextMatch>, IndexError> {
        let found = self.finder.find_documents(tokens, topic, 0)?;
        let mut ids: Vec<SentenceId> = found.into_keys().collect();
        ids.sort();

        let mut matches = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(sentence) = self.get_sentence(id)? {
                if !sentence.tokens.is_empty() {
                    matches.push(TextMatch {
                        sentence_id: id,
                        text: to_text(&sentence.tokens),
                        topic: sentence.topic,
                    });
                }
            }
        }
        Ok(matches)
    }
}
