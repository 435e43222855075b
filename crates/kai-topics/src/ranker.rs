//! Per-topic term scores and topic ranking.
//!
//! Each noun or verb in a topic's sentences adds the sentence's decayed score
//! to the topic's `(stem, coarse tag)` total. A query is ranked against all
//! topics by summing the totals of its own nouns and verbs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kai_nlu::Lexicon;
use kai_storage::{from_row, to_row, Predicate, Storage, TableSchema};
use kai_types::{CoarseTag, Sentence, SentenceId, Token, TopicIndexEntry, TopicScore, TopicUnindexEntry};
use tracing::{debug, instrument};

use crate::error::TopicsError;

/// Builds and queries topic term scores.
#[derive(Clone)]
pub struct TopicRanker {
    storage: Arc<Storage>,
    lexicon: Arc<dyn Lexicon>,
    score_decay: f64,
}

impl TopicRanker {
    pub fn new(storage: Arc<Storage>, lexicon: Arc<dyn Lexicon>, score_decay: f64) -> Self {
        Self {
            storage,
            lexicon,
            score_decay,
        }
    }

    /// Stem and coarse tag of a noun or verb token.
    fn term(&self, token: &Token) -> Option<(String, CoarseTag)> {
        let tag = CoarseTag::from_tag(&token.tag)?;
        let stem = self.lexicon.stem(&token.text);
        (!stem.is_empty()).then_some((stem, tag))
    }

    /// Record term scores for a topic's sentences.
    ///
    /// Writes one topic index row per distinct `(stem, tag)`, replacing any
    /// previous total, and one unindex row per distinct
    /// `(stem, tag, sentence)`. Returns the number of topic index rows.
    #[instrument(skip(self, sentences), fields(count = sentences.len()))]
    pub fn index_topic(&self, topic: &str, sentences: &[Sentence]) -> Result<usize, TopicsError> {
        let mut scores: HashMap<(String, CoarseTag), f64> = HashMap::new();
        let mut seen: HashSet<(String, CoarseTag, SentenceId)> = HashSet::new();
        let mut batch = Vec::new();
        let mut sentence_score = 1.0;

        for sentence in sentences {
            for token in &sentence.tokens {
                let Some((stem, tag)) = self.term(token) else {
                    continue;
                };
                *scores.entry((stem.clone(), tag)).or_insert(0.0) += sentence_score;

                if seen.insert((stem.clone(), tag, sentence.id)) {
                    let unindex = TopicUnindexEntry {
                        topic: topic.to_string(),
                        sentence_id: sentence.id,
                        word: stem,
                        tag: tag.to_string(),
                    };
                    batch.push((TableSchema::TOPIC_UNINDEX, to_row(&unindex)?));
                }
            }
            sentence_score *= self.score_decay;
        }

        let terms = scores.len();
        for ((word, tag), score) in scores {
            let entry = TopicIndexEntry {
                topic: topic.to_string(),
                word,
                tag: tag.to_string(),
                score,
            };
            batch.push((TableSchema::TOPIC_INDEX, to_row(&entry)?));
        }
        if !batch.is_empty() {
            self.storage.insert_all(&batch)?;
        }

        debug!(terms, unindexes = seen.len(), "Indexed topic terms");
        Ok(terms)
    }

    /// Topics ranked by how much of the query they explain, best first.
    ///
    /// A topic needs only one matching term to be listed. Equal scores are
    /// ordered by topic name.
    pub fn get_top_topics(&self, tokens: &[Token]) -> Result<Vec<TopicScore>, TopicsError> {
        let mut totals: HashMap<String, f64> = HashMap::new();

        for (stem, tag) in tokens.iter().filter_map(|t| self.term(t)) {
            let rows = self.storage.select(
                &TableSchema::TOPIC_INDEX,
                &[],
                &Predicate::new().eq("word", &stem).eq("tag", tag.as_str()),
                None,
            )?;
            for row in rows {
                let entry: TopicIndexEntry = from_row(row)?;
                *totals.entry(entry.topic).or_insert(0.0) += entry.score;
            }
        }

        let mut ranked: Vec<TopicScore> = totals
            .into_iter()
            .map(|(topic, score)| TopicScore { topic, score })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.topic.cmp(&b.topic))
        });
        Ok(ranked)
    }

    /// Delete one topic index row.
    pub fn delete_term(&self, topic: &str, word: &str, tag: &str) -> Result<usize, TopicsError> {
        Ok(self.storage.delete(
            &TableSchema::TOPIC_INDEX,
            &Predicate::new().eq("word", word).eq("tag", tag).eq("topic", topic),
        )?)
    }
}
