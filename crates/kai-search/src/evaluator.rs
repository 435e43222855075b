//! Query evaluation over match sets.

use std::sync::Arc;

use kai_index::DocumentFinder;
use kai_nlu::{filter_spaces, tokenize, Lexicon};
use kai_storage::Storage;
use kai_types::MatchSet;
use tracing::{debug, instrument};

use crate::error::SearchError;
use crate::model::{QueryNode, WordQuery};
use crate::parser::parse_query;

/// Shard queried by every leaf.
const LEAF_SHARD: i32 = 0;

/// Sentences in both sets, with both match lists concatenated.
pub fn intersection(mut left: MatchSet, mut right: MatchSet) -> MatchSet {
    if left.len() > right.len() {
        // iterate the smaller side; the left list stays first
        return right
            .into_iter()
            .filter_map(|(id, r)| {
                left.remove(&id).map(|mut l| {
                    l.extend(r);
                    (id, l)
                })
            })
            .collect();
    }
    left.into_iter()
        .filter_map(|(id, mut l)| {
            right.remove(&id).map(|r| {
                l.extend(r);
                (id, l)
            })
        })
        .collect()
}

/// Sentences in either set. Lists are concatenated where both have one.
pub fn union(mut left: MatchSet, right: MatchSet) -> MatchSet {
    for (id, r) in right {
        left.entry(id).or_default().extend(r);
    }
    left
}

/// Sentences of `left` that are not in `right`, with `left`'s lists.
pub fn difference(mut left: MatchSet, right: &MatchSet) -> MatchSet {
    left.retain(|id, _| !right.contains_key(id));
    left
}

/// Runs parsed queries against one topic.
#[derive(Clone)]
pub struct QueryEvaluator {
    finder: DocumentFinder,
}

impl QueryEvaluator {
    pub fn new(storage: Arc<Storage>, lexicon: Arc<dyn Lexicon>) -> Self {
        Self {
            finder: DocumentFinder::new(storage, lexicon),
        }
    }

    /// Parse then evaluate.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str, origin: &str) -> Result<MatchSet, SearchError> {
        let node = parse_query(query)?;
        debug!(%node, "Parsed query");
        self.evaluate(&node, origin)
    }

    /// Evaluate a query tree against `origin`.
    ///
    /// Both sides of every operator are evaluated, left first.
    pub fn evaluate(&self, node: &QueryNode, origin: &str) -> Result<MatchSet, SearchError> {
        match node {
            QueryNode::Word(word) => self.leaf(word, origin),
            QueryNode::And(l, r) => {
                let left = self.evaluate(l, origin)?;
                let right = self.evaluate(r, origin)?;
                Ok(intersection(left, right))
            }
            QueryNode::Or(l, r) => {
                let left = self.evaluate(l, origin)?;
                let right = self.evaluate(r, origin)?;
                Ok(union(left, right))
            }
            QueryNode::AndNot(l, r) => {
                let left = self.evaluate(l, origin)?;
                let right = self.evaluate(r, origin)?;
                Ok(difference(left, &right))
            }
        }
    }

    // TODO: filter leaf matches on tag and category once the index rows carry
    // the parser's named tags (noun/verb/...) in a comparable form.
    fn leaf(&self, word: &WordQuery, origin: &str) -> Result<MatchSet, SearchError> {
        let tokens = filter_spaces(&tokenize(&word.text));
        let found = self.finder.find_documents(&tokens, origin, LEAF_SHARD)?;
        debug!(text = %word.text, documents = found.len(), "Evaluated leaf");
        Ok(found)
    }
}
