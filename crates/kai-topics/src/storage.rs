//! Topic storage operations.
//!
//! Saving a topic fans out to the sentence store, the topic ranker and the
//! word index (topic plus mirror namespaces). Deleting one walks the same
//! paths back, logging and skipping per-item failures.

use std::collections::HashSet;
use std::sync::Arc;

use kai_index::{DocumentFinder, SentenceStore, WordIndexer};
use kai_nlu::Lexicon;
use kai_storage::{from_row, to_row, Page, Predicate, Storage, TableSchema};
use kai_types::{Sentence, SentenceId, Topic, TopicSettings, TopicUnindexEntry};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::TopicsError;
use crate::ranker::TopicRanker;

/// Shard used for topic sentences in the word index.
const TOPIC_SHARD: i32 = 0;

/// What a topic delete removed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub sentences: usize,
    pub index_rows: usize,
    pub topic_terms: usize,
    /// Per-item failures that were logged and skipped
    pub failures: usize,
}

/// Topic storage interface.
pub struct TopicStorage {
    storage: Arc<Storage>,
    indexer: WordIndexer,
    sentences: SentenceStore,
    ranker: TopicRanker,
    settings: TopicSettings,
}

impl TopicStorage {
    pub fn new(storage: Arc<Storage>, lexicon: Arc<dyn Lexicon>, settings: TopicSettings) -> Self {
        let finder = DocumentFinder::new(storage.clone(), lexicon.clone());
        Self {
            indexer: WordIndexer::new(storage.clone(), lexicon.clone()),
            sentences: SentenceStore::new(storage.clone(), finder),
            ranker: TopicRanker::new(storage.clone(), lexicon, settings.score_decay),
            storage,
            settings,
        }
    }

    pub fn ranker(&self) -> &TopicRanker {
        &self.ranker
    }

    /// Word index namespaces a topic's sentences go into: the topic itself,
    /// then each mirror namespace.
    fn namespaces<'a>(&'a self, topic: &'a str) -> Vec<&'a str> {
        let mut namespaces = vec![topic];
        for mirror in &self.settings.mirror_namespaces {
            if !namespaces.contains(&mirror.as_str()) {
                namespaces.push(mirror.as_str());
            }
        }
        namespaces
    }

    /// Save a topic: store its sentences and the topic row, record its term
    /// scores, and index the sentences under the topic and every mirror
    /// namespace.
    #[instrument(skip(self, body, sentences), fields(count = sentences.len()))]
    pub fn save_topic(&self, name: &str, body: &str, sentences: &[Sentence]) -> Result<(), TopicsError> {
        if name.is_empty() || body.is_empty() || sentences.is_empty() {
            return Err(TopicsError::InvalidInput(
                "Topic name, body and sentences are required".to_string(),
            ));
        }

        self.sentences.save_sentences(sentences, name)?;
        self.storage
            .insert(&TableSchema::TOPIC, &to_row(&Topic::new(name, body))?)?;
        self.ranker.index_topic(name, sentences)?;
        for namespace in self.namespaces(name) {
            self.indexer
                .index_document(namespace, TOPIC_SHARD, sentences, self.settings.index_dropoff)?;
        }

        info!(topic = name, "Saved topic");
        Ok(())
    }

    /// Get a topic by name.
    pub fn get_topic(&self, name: &str) -> Result<Option<Topic>, TopicsError> {
        let rows = self.storage.select(
            &TableSchema::TOPIC,
            &[],
            &Predicate::new().eq("name", name),
            None,
        )?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Topics ordered by name, strictly after `after`, at most `page_size`.
    pub fn list_topics(&self, after: Option<&str>, page_size: usize) -> Result<Vec<Topic>, TopicsError> {
        if page_size == 0 {
            return Err(TopicsError::InvalidInput(
                "Page size must be greater than zero".to_string(),
            ));
        }
        let page = match after {
            Some(after) if !after.is_empty() => Page::after("name", after, page_size),
            _ => Page::first("name", page_size),
        };
        let rows = self
            .storage
            .select(&TableSchema::TOPIC, &[], &Predicate::new(), Some(&page))?;
        rows.into_iter()
            .map(|row| -> Result<Topic, TopicsError> { Ok(from_row(row)?) })
            .collect()
    }

    /// Topic unindex rows: one per `(stem, tag, sentence)` of the topic.
    pub fn get_unindexes_for_topic(&self, topic: &str) -> Result<Vec<TopicUnindexEntry>, TopicsError> {
        let rows = self.storage.select(
            &TableSchema::TOPIC_UNINDEX,
            &[],
            &Predicate::new().eq("topic", topic),
            None,
        )?;
        let mut unindexes = Vec::with_capacity(rows.len());
        for row in rows {
            let unindex: TopicUnindexEntry = from_row(row)?;
            if !unindex.sentence_id.is_nil() {
                unindexes.push(unindex);
            }
        }
        Ok(unindexes)
    }

    /// Delete a topic with everything saved for it.
    ///
    /// The topic row goes first. Then each of the topic's sentences is removed
    /// from the sentence store and from the word index under the topic and
    /// the mirror namespaces, and each term row is dropped. Failures past the
    /// topic row are logged and counted, not returned.
    #[instrument(skip(self))]
    pub fn delete_topic(&self, topic: &str) -> Result<DeleteSummary, TopicsError> {
        if topic.is_empty() {
            return Err(TopicsError::InvalidInput("Topic must not be empty".to_string()));
        }

        self.storage
            .delete(&TableSchema::TOPIC, &Predicate::new().eq("name", topic))?;
        let unindexes = self.get_unindexes_for_topic(topic)?;

        let mut summary = DeleteSummary::default();

        // Sentences with no nouns or verbs have no unindex rows; take the
        // membership rows too.
        let mut seen: HashSet<SentenceId> = HashSet::new();
        let mut ids: Vec<SentenceId> = unindexes.iter().map(|u| u.sentence_id).collect();
        match self.sentences.sentence_ids(topic) {
            Ok(members) => ids.extend(members),
            Err(e) => {
                warn!(topic, error = %e, "Failed to list topic sentences");
                summary.failures += 1;
            }
        }
        ids.retain(|id| seen.insert(*id));

        let namespaces = self.namespaces(topic);
        for id in ids {
            if let Err(e) = self.sentences.delete_sentence(id, topic) {
                warn!(%id, error = %e, "Failed to delete topic sentence");
                summary.failures += 1;
            }
            match self.indexer.remove_indexes_in(id, &namespaces) {
                Ok(removal) => {
                    summary.index_rows += removal.rows;
                    summary.failures += removal.failures;
                }
                Err(e) => {
                    warn!(%id, error = %e, "Failed to remove sentence indexes");
                    summary.failures += 1;
                }
            }
            summary.sentences += 1;
        }

        for unindex in &unindexes {
            match self.ranker.delete_term(topic, &unindex.word, &unindex.tag) {
                Ok(rows) => summary.topic_terms += rows,
                Err(e) => {
                    warn!(word = %unindex.word, tag = %unindex.tag, error = %e, "Failed to delete topic term");
                    summary.failures += 1;
                }
            }
        }

        if let Err(e) = self
            .storage
            .delete(&TableSchema::TOPIC_UNINDEX, &Predicate::new().eq("topic", topic))
        {
            warn!(topic, error = %e, "Failed to delete topic unindexes");
            summary.failures += 1;
        }

        debug!(?summary, "Topic cascade finished");
        info!(topic, sentences = summary.sentences, "Deleted topic");
        Ok(summary)
    }
}
