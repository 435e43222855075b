//! Forward and reverse word index maintenance.
//!
//! Every forward row `(topic, word, shard, sentence_id, offset)` is written in
//! the same batch as its reverse row `(sentence_id, word, shard)`. Removal
//! reads the reverse rows of a sentence and deletes the forward rows they
//! point at, so a sentence can be dropped without scanning the index.

use std::ops::AddAssign;
use std::sync::Arc;

use kai_nlu::Lexicon;
use kai_storage::{from_row, to_row, Predicate, Row, Storage, TableSchema};
use kai_types::{IndexEntry, Sentence, SentenceId, Token, UnindexEntry};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::IndexError;

/// Weight of compound parts and semantic categories relative to the token.
const DERIVED_WEIGHT: f64 = 0.5;

/// Dependency label of auxiliary verbs, which are never indexed.
const AUX_DEP: &str = "aux";

/// Outcome of removing a sentence from the index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Removal {
    /// Forward rows deleted
    pub rows: usize,
    /// Forward row deletes that failed and were skipped
    pub failures: usize,
}

impl AddAssign for Removal {
    fn add_assign(&mut self, other: Self) {
        self.rows += other.rows;
        self.failures += other.failures;
    }
}

/// Writes and removes word index rows.
#[derive(Clone)]
pub struct WordIndexer {
    storage: Arc<Storage>,
    lexicon: Arc<dyn Lexicon>,
}

impl WordIndexer {
    pub fn new(storage: Arc<Storage>, lexicon: Arc<dyn Lexicon>) -> Self {
        Self { storage, lexicon }
    }

    /// Index sentences under one topic and shard.
    ///
    /// The first sentence scores 1.0 and each following one is multiplied by
    /// `score_dropoff`. Each sentence's rows are written in one batch; a
    /// failure leaves earlier sentences indexed. Returns the number of
    /// forward rows written.
    #[instrument(skip(self, sentences), fields(count = sentences.len()))]
    pub fn index_document(
        &self,
        topic: &str,
        shard: i32,
        sentences: &[Sentence],
        score_dropoff: f64,
    ) -> Result<usize, IndexError> {
        if topic.is_empty() {
            return Err(IndexError::InvalidInput("Topic must not be empty".to_string()));
        }
        if let Some(position) = sentences.iter().position(|s| s.id.is_nil()) {
            return Err(IndexError::InvalidInput(format!(
                "Sentence {} has no id",
                position
            )));
        }

        let mut score = 1.0;
        let mut written = 0;
        for sentence in sentences {
            let entries = self.entries_for(topic, shard, sentence, score);
            if !entries.is_empty() {
                let mut batch = Vec::with_capacity(entries.len() * 2);
                for entry in &entries {
                    let unindex = UnindexEntry {
                        sentence_id: entry.sentence_id,
                        word: entry.word.clone(),
                        shard: entry.shard,
                    };
                    batch.push((TableSchema::WORD_INDEX, to_row(entry)?));
                    batch.push((TableSchema::WORD_UNINDEX, to_row(&unindex)?));
                }
                self.storage.insert_all(&batch)?;
                written += entries.len();
            }
            debug!(sentence_id = %sentence.id, rows = entries.len(), score, "Indexed sentence");
            score *= score_dropoff;
        }

        info!(topic, shard, rows = written, "Indexed sentences");
        Ok(written)
    }

    /// Forward rows for one sentence.
    fn entries_for(&self, topic: &str, shard: i32, sentence: &Sentence, score: f64) -> Vec<IndexEntry> {
        let mut entries = Vec::new();
        for (offset, token) in sentence.tokens.iter().enumerate() {
            let offset = offset as i32;
            for (word, weight) in self.index_words(token) {
                entries.push(IndexEntry {
                    sentence_id: sentence.id,
                    word,
                    tag: token.tag.clone(),
                    shard,
                    offset,
                    topic: topic.to_string(),
                    score: score * weight,
                });
            }
        }
        entries
    }

    /// The words a token is indexed under, with their relative weight.
    ///
    /// Empty when the token is not indexable. Otherwise the stem comes first,
    /// then the parts of a spaced or hyphenated compound, then the semantic
    /// category. A word appears at most once.
    fn index_words(&self, token: &Token) -> Vec<(String, f64)> {
        let stem = self.lexicon.stem(&token.text);
        if stem.is_empty() || self.lexicon.is_undesirable(&stem) || token.dep == AUX_DEP {
            return Vec::new();
        }

        let mut words = vec![(stem, 1.0)];
        let mut add = |word: String| {
            if !word.is_empty()
                && !self.lexicon.is_undesirable(&word)
                && !words.iter().any(|(w, _)| *w == word)
            {
                words.push((word, DERIVED_WEIGHT));
            }
        };

        if token.text.contains([' ', '-']) {
            for part in token.text.split([' ', '-']) {
                add(part.trim().to_lowercase());
            }
        }
        if !token.semantic.is_empty() {
            add(token.semantic.trim().to_lowercase());
        }
        words
    }

    /// Remove a sentence's forward rows under `topic`, then its reverse rows.
    /// Removing an unknown sentence is a no-op.
    pub fn remove_indexes(&self, sentence_id: SentenceId, topic: &str) -> Result<Removal, IndexError> {
        self.remove_indexes_in(sentence_id, &[topic])
    }

    /// Remove a sentence's forward rows under every listed topic, then its
    /// reverse rows.
    ///
    /// A forward row that fails to delete is logged and counted, and the
    /// walk goes on. Only a failure to read or delete the reverse rows is
    /// returned as an error.
    #[instrument(skip(self), fields(sentence_id = %sentence_id))]
    pub fn remove_indexes_in(&self, sentence_id: SentenceId, topics: &[&str]) -> Result<Removal, IndexError> {
        let unindexes = self.read_unindexes(sentence_id)?;
        let mut removal = Removal::default();
        if unindexes.is_empty() {
            return Ok(removal);
        }

        for topic in topics {
            for unindex in &unindexes {
                let predicate = Predicate::new()
                    .eq("topic", *topic)
                    .eq("word", &unindex.word)
                    .eq("shard", unindex.shard)
                    .eq("sentence_id", sentence_id);
                match self.storage.delete(&TableSchema::WORD_INDEX, &predicate) {
                    Ok(rows) => removal.rows += rows,
                    Err(e) => {
                        warn!(topic = *topic, word = %unindex.word, error = %e, "Failed to delete index row");
                        removal.failures += 1;
                    }
                }
            }
        }
        self.storage.delete(
            &TableSchema::WORD_UNINDEX,
            &Predicate::new().eq("sentence_id", sentence_id),
        )?;

        debug!(rows = removal.rows, failures = removal.failures, "Removed sentence indexes");
        Ok(removal)
    }

    /// Remove every sentence in the list that has an id.
    pub fn remove_indexes_for_sentences(&self, sentences: &[Sentence], topic: &str) -> Result<Removal, IndexError> {
        let mut removal = Removal::default();
        for sentence in sentences.iter().filter(|s| !s.id.is_nil()) {
            removal += self.remove_indexes(sentence.id, topic)?;
        }
        Ok(removal)
    }

    /// Forward rows for one word (lowercased) under a topic and shard.
    pub fn read_indexes(&self, word: &str, topic: &str, shard: i32) -> Result<Vec<IndexEntry>, IndexError> {
        read_index_rows(&self.storage, &word.to_lowercase(), topic, shard)
    }

    /// Reverse rows of a sentence.
    pub fn read_unindexes(&self, sentence_id: SentenceId) -> Result<Vec<UnindexEntry>, IndexError> {
        let rows = self.storage.select(
            &TableSchema::WORD_UNINDEX,
            &[],
            &Predicate::new().eq("sentence_id", sentence_id),
            None,
        )?;
        rows_into(rows)
    }
}

pub(crate) fn read_index_rows(
    storage: &Storage,
    word: &str,
    topic: &str,
    shard: i32,
) -> Result<Vec<IndexEntry>, IndexError> {
    let rows = storage.select(
        &TableSchema::WORD_INDEX,
        &[],
        &Predicate::new()
            .eq("topic", topic)
            .eq("word", word)
            .eq("shard", shard),
        None,
    )?;
    rows_into(rows)
}

fn rows_into<T: serde::de::DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, IndexError> {
    rows.into_iter()
        .map(|row| from_row(row).map_err(IndexError::from))
        .collect()
}
