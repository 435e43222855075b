//! End-to-end test infrastructure for the k-ai index.
//!
//! Provides a shared TestHarness and parser-output fixtures for tests that
//! run indexing, retrieval, topics and boolean search against one store.

use std::collections::BTreeSet;
use std::sync::Arc;

use kai_index::{DocumentFinder, SentenceStore, WordIndexer};
use kai_nlu::{Lexicon, StandardLexicon};
use kai_search::QueryEvaluator;
use kai_storage::{RetryPolicy, Storage};
use kai_topics::TopicStorage;
use kai_types::{MatchSet, Sentence, SentenceId, Token, TopicSettings};

/// Shared test harness for E2E tests.
///
/// Every component it hands out shares one RocksDB instance in a temp dir.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub storage: Arc<Storage>,
    pub lexicon: Arc<dyn Lexicon>,
}

impl TestHarness {
    /// Create a new test harness with temp directory and storage.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage = Arc::new(
            Storage::open_with_retry(temp_dir.path(), RetryPolicy::none())
                .expect("Failed to open test storage"),
        );
        Self {
            _temp_dir: temp_dir,
            storage,
            lexicon: Arc::new(StandardLexicon::new()),
        }
    }

    pub fn indexer(&self) -> WordIndexer {
        WordIndexer::new(self.storage.clone(), self.lexicon.clone())
    }

    pub fn finder(&self) -> DocumentFinder {
        DocumentFinder::new(self.storage.clone(), self.lexicon.clone())
    }

    pub fn sentence_store(&self) -> SentenceStore {
        SentenceStore::new(self.storage.clone(), self.finder())
    }

    /// Topic storage with default settings (mirrors into "global").
    pub fn topics(&self) -> TopicStorage {
        self.topics_with(TopicSettings::default())
    }

    pub fn topics_with(&self, settings: TopicSettings) -> TopicStorage {
        TopicStorage::new(self.storage.clone(), self.lexicon.clone(), settings)
    }

    pub fn evaluator(&self) -> QueryEvaluator {
        QueryEvaluator::new(self.storage.clone(), self.lexicon.clone())
    }

    /// Index parser output under `topic`, shard 0, no dropoff.
    pub fn index(&self, topic: &str, json: &str) -> Vec<Sentence> {
        let sentences = parse_sentences(json);
        self.indexer()
            .index_document(topic, 0, &sentences, 1.0)
            .expect("Failed to index sentences");
        sentences
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser output to sentences, each with a fresh id.
pub fn parse_sentences(json: &str) -> Vec<Sentence> {
    Sentence::list_from_json(json).expect("Invalid sentence fixture")
}

/// Parser output for a single query sentence.
pub fn parse_tokens(json: &str) -> Vec<Token> {
    serde_json::from_str(json).expect("Invalid token fixture")
}

/// A sentence of `(text, tag)` tokens.
pub fn sentence(words: &[(&str, &str)]) -> Sentence {
    Sentence::new(words.iter().map(|(text, tag)| Token::new(*text, *tag)).collect())
}

/// Untagged query tokens, one per word.
pub fn words(text: &str) -> Vec<Token> {
    text.split_whitespace().map(Token::text).collect()
}

/// Sentence ids of a match set, ordered.
pub fn ids(found: &MatchSet) -> BTreeSet<SentenceId> {
    found.keys().copied().collect()
}

/// "Some text to index New York."
pub const NEW_YORK: &str = r#"[{"tokenList":[{"index":0,"list":[1],"tag":"DT","text":"Some","dep":"det","synid":-1,"semantic":""},{"index":1,"list":[],"tag":"NN","text":"text","dep":"ROOT","synid":-1,"semantic":""},{"index":2,"list":[1],"tag":"IN","text":"to","dep":"prep","synid":-1,"semantic":""},{"index":3,"list":[4,2,1],"tag":"NN","text":"index","dep":"compound","synid":-1,"semantic":""},{"index":4,"list":[4,2,1],"tag":"NNP","text":"New York","dep":"compound","synid":-1,"semantic":"state"},{"index":6,"list":[1],"tag":".","text":".","dep":"punct","synid":-1,"semantic":""}]}]"#;

/// "Some other text"
pub const SOME_OTHER_TEXT: &str = r#"[{"tokenList":[{"index":0,"list":[2],"tag":"DT","text":"Some other","dep":"det","synid":-1,"semantic":""},{"index":2,"list":[],"tag":"NN","text":"text","dep":"ROOT","synid":-1,"semantic":""}]}]"#;

/// "Some text to index New York or Japan."
pub const NEW_YORK_OR_JAPAN: &str = r#"[{"tokenList":[{"index":0,"list":[1],"tag":"DT","text":"Some","dep":"det","synid":-1,"semantic":""},{"index":1,"list":[],"tag":"NN","text":"text","dep":"ROOT","synid":-1,"semantic":""},{"index":2,"list":[1],"tag":"IN","text":"to","dep":"prep","synid":-1,"semantic":""},{"index":3,"list":[2,1],"tag":"NN","text":"index","dep":"pobj","synid":-1,"semantic":""},{"index":4,"list":[4,3,2,1],"tag":"NNP","text":"New York","dep":"compound","synid":-1,"semantic":"state"},{"index":6,"list":[4,3,2,1],"tag":"CC","text":"or","dep":"cc","synid":-1,"semantic":""},{"index":7,"list":[4,3,2,1],"tag":"NNP","text":"Japan","dep":"conj","synid":-1,"semantic":"country"},{"index":8,"list":[1],"tag":".","text":".","dep":"punct","synid":-1,"semantic":""}]}]"#;

/// "Some other text in Japan"
pub const OTHER_TEXT_IN_JAPAN: &str = r#"[{"tokenList":[{"index":0,"list":[2],"tag":"DT","text":"Some other","dep":"det","synid":-1,"semantic":""},{"index":2,"list":[],"tag":"NN","text":"text","dep":"ROOT","synid":-1,"semantic":""},{"index":3,"list":[2],"tag":"IN","text":"in","dep":"prep","synid":-1,"semantic":""},{"index":4,"list":[3,2],"tag":"NNP","text":"Japan","dep":"pobj","synid":-1,"semantic":"country"}]}]"#;

/// "Peter was working from home."
pub const PETER_WAS_WORKING: &str = r#"[{"tokenList":[{"index":0,"list":[2],"tag":"NNP","text":"Peter","dep":"nsubj","synid":-1,"semantic":""},{"index":1,"list":[2],"tag":"VBD","text":"was","dep":"aux","synid":-1,"semantic":""},{"index":2,"list":[],"tag":"VBG","text":"working","dep":"ROOT","synid":-1,"semantic":"location"},{"index":3,"list":[2],"tag":"IN","text":"from","dep":"prep","synid":-1,"semantic":""},{"index":4,"list":[3,2],"tag":"NN","text":"home","dep":"pobj","synid":-1,"semantic":"location"},{"index":5,"list":[2],"tag":".","text":".","dep":"punct","synid":-1,"semantic":""}]}]"#;

/// Query "what country indexes text?"
pub const WHAT_COUNTRY_QUERY: &str = r#"[{"index":0,"list":[3],"tag":"WP","text":"what","dep":"dobj","synid":-1,"semantic":""},{"index":1,"list":[3],"tag":"NN","text":"country","dep":"nsubj","synid":-1,"semantic":""},{"index":2,"list":[3],"tag":"NNS","text":"indexes","dep":"compound","synid":-1,"semantic":""},{"index":3,"list":[],"tag":"NN","text":"text","dep":"ROOT","synid":-1,"semantic":""},{"index":4,"list":[3],"tag":".","text":"?","dep":"punct","synid":-1,"semantic":""}]"#;

/// "Peter and Davis Patrick went to the beach at 12:45 to view the boats coming in."
pub const BEACH: &str = r#"[{"tokenList":[{"index":0,"list":[4],"tag":"NNP","text":"Peter","dep":"nsubj","synid":-1,"semantic":""},{"index":1,"list":[0,4],"tag":"CC","text":"and","dep":"cc","synid":-1,"semantic":""},{"index":2,"list":[3,0,4],"tag":"NNP","text":"Davis","dep":"compound","synid":-1,"semantic":"person"},{"index":3,"list":[0,4],"tag":"NNP","text":"Patrick","dep":"conj","synid":-1,"semantic":"person"},{"index":4,"list":[],"tag":"VBD","text":"went","dep":"ROOT","synid":-1,"semantic":""},{"index":5,"list":[4],"tag":"IN","text":"to","dep":"prep","synid":-1,"semantic":""},{"index":6,"list":[7,5,4],"tag":"DT","text":"the","dep":"det","synid":-1,"semantic":""},{"index":7,"list":[5,4],"tag":"NN","text":"beach","dep":"pobj","synid":-1,"semantic":"location"},{"index":8,"list":[4],"tag":"IN","text":"at","dep":"prep","synid":-1,"semantic":""},{"index":9,"list":[8,4],"tag":"CD","text":"12:45","dep":"pobj","synid":-1,"semantic":""},{"index":10,"list":[11,4],"tag":"TO","text":"to","dep":"aux","synid":-1,"semantic":""},{"index":11,"list":[4],"tag":"VB","text":"view","dep":"advcl","synid":-1,"semantic":""},{"index":12,"list":[13,11,4],"tag":"DT","text":"the","dep":"det","synid":-1,"semantic":""},{"index":13,"list":[11,4],"tag":"NNS","text":"boats","dep":"dobj","synid":-1,"semantic":"vehicle"},{"index":14,"list":[4],"tag":"VBG","text":"coming","dep":"advcl","synid":-1,"semantic":""},{"index":15,"list":[14,4],"tag":"RB","text":"in","dep":"advmod","synid":-1,"semantic":""},{"index":16,"list":[4],"tag":".","text":".","dep":"punct","synid":-1,"semantic":""}]}]"#;

/// "Peter and Sherry went to the mall to watch a movie."
pub const MALL: &str = r#"[{"tokenList":[{"index":0,"list":[3],"tag":"NNP","text":"Peter","dep":"nsubj","synid":-1,"semantic":""},{"index":1,"list":[0,3],"tag":"CC","text":"and","dep":"cc","synid":-1,"semantic":""},{"index":2,"list":[0,3],"tag":"NNP","text":"Sherry","dep":"conj","synid":-1,"semantic":"woman"},{"index":3,"list":[],"tag":"VBD","text":"went","dep":"ROOT","synid":-1,"semantic":""},{"index":4,"list":[3],"tag":"IN","text":"to","dep":"prep","synid":-1,"semantic":""},{"index":5,"list":[6,4,3],"tag":"DT","text":"the","dep":"det","synid":-1,"semantic":""},{"index":6,"list":[4,3],"tag":"NN","text":"mall","dep":"pobj","synid":-1,"semantic":""},{"index":7,"list":[8,3],"tag":"TO","text":"to","dep":"aux","synid":-1,"semantic":""},{"index":8,"list":[3],"tag":"VB","text":"watch","dep":"advcl","synid":-1,"semantic":""},{"index":9,"list":[10,8,3],"tag":"DT","text":"a","dep":"det","synid":-1,"semantic":""},{"index":10,"list":[8,3],"tag":"NN","text":"movie","dep":"dobj","synid":-1,"semantic":""},{"index":11,"list":[3],"tag":".","text":".","dep":"punct","synid":-1,"semantic":""}]}]"#;
