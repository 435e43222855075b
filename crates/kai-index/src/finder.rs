//! Conjunctive keyword retrieval.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use kai_nlu::Lexicon;
use kai_storage::Storage;
use kai_types::{IndexMatch, MatchSet, Token};
use tracing::debug;

use crate::error::IndexError;
use crate::indexer::read_index_rows;

/// Whether an index row's tag may satisfy a query token's tag.
///
/// Nouns only match nouns or adjectives, verbs only match verbs. Every other
/// pairing, including missing or one-letter tags, is compatible.
pub fn compatible_tags(query_tag: &str, index_tag: &str) -> bool {
    let (Some(a), Some(b)) = (query_tag.get(..2), index_tag.get(..2)) else {
        return true;
    };
    if a == "NN" || b == "NN" {
        return a == b || a == "JJ" || b == "JJ";
    }
    if a == "VB" || b == "VB" {
        return a == b;
    }
    true
}

/// Finds sentences containing every keyword of a query.
#[derive(Clone)]
pub struct DocumentFinder {
    storage: Arc<Storage>,
    lexicon: Arc<dyn Lexicon>,
}

impl DocumentFinder {
    pub fn new(storage: Arc<Storage>, lexicon: Arc<dyn Lexicon>) -> Self {
        Self { storage, lexicon }
    }

    fn search_stem(&self, token: &Token) -> Option<String> {
        let stem = self.lexicon.stem(&token.text);
        (!stem.is_empty() && !self.lexicon.is_undesirable(&stem)).then_some(stem)
    }

    /// Number of tokens that take part in a query.
    pub fn count_search_tokens(&self, tokens: &[Token]) -> usize {
        tokens.iter().filter_map(|t| self.search_stem(t)).count()
    }

    /// Sentences under `topic`/`shard` that match every keyword.
    ///
    /// Stop words and punctuation are skipped. Each sentence maps to the index
    /// rows that satisfied the keywords, tagged with the keyword's position
    /// among the participating tokens. A keyword with no rows at all empties
    /// the result.
    pub fn find_documents(&self, tokens: &[Token], topic: &str, shard: i32) -> Result<MatchSet, IndexError> {
        let mut result: MatchSet = HashMap::new();

        let keywords = tokens
            .iter()
            .filter_map(|t| self.search_stem(t).map(|stem| (t, stem)));

        for (keyword_index, (token, stem)) in keywords.enumerate() {
            let entries = read_index_rows(&self.storage, &stem, topic, shard)?;
            debug!(keyword = %stem, rows = entries.len(), "Read keyword rows");
            if entries.is_empty() {
                return Ok(HashMap::new());
            }

            let compatible = entries
                .into_iter()
                .filter(|e| compatible_tags(&token.tag, &e.tag));

            if keyword_index == 0 {
                for entry in compatible {
                    result
                        .entry(entry.sentence_id)
                        .or_default()
                        .push(IndexMatch::new(entry, keyword_index));
                }
                continue;
            }

            let mut narrowed: MatchSet = HashMap::new();
            for entry in compatible {
                let id = entry.sentence_id;
                let matches = match narrowed.entry(id) {
                    Entry::Occupied(slot) => slot.into_mut(),
                    Entry::Vacant(slot) => match result.remove(&id) {
                        Some(prior) => slot.insert(prior),
                        None => continue,
                    },
                };
                matches.push(IndexMatch::new(entry, keyword_index));
            }
            result = narrowed;
            if result.is_empty() {
                return Ok(result);
            }
        }

        Ok(result)
    }
}
