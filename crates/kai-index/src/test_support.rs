//! Parser output fixtures shared by the unit tests.

use std::sync::Arc;

use kai_nlu::StandardLexicon;
use kai_storage::{RetryPolicy, Storage};
use kai_types::{Sentence, Token};
use tempfile::TempDir;

use crate::indexer::WordIndexer;

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

/// Query "Japan text"
pub const JAPAN_TEXT_QUERY: &str = r#"[{"index":0,"list":[1],"tag":"NNP","text":"Japan","dep":"compound","synid":-1,"semantic":"country"},{"index":1,"list":[],"tag":"NN","text":"text","dep":"ROOT","synid":-1,"semantic":""}]"#;

/// Query "what country indexes text?"
pub const WHAT_COUNTRY_QUERY: &str = r#"[{"index":0,"list":[3],"tag":"WP","text":"what","dep":"dobj","synid":-1,"semantic":""},{"index":1,"list":[3],"tag":"NN","text":"country","dep":"nsubj","synid":-1,"semantic":""},{"index":2,"list":[3],"tag":"NNS","text":"indexes","dep":"compound","synid":-1,"semantic":""},{"index":3,"list":[],"tag":"NN","text":"text","dep":"ROOT","synid":-1,"semantic":""},{"index":4,"list":[3],"tag":".","text":"?","dep":"punct","synid":-1,"semantic":""}]"#;

pub fn sentences(json: &str) -> Vec<Sentence> {
    Sentence::list_from_json(json).unwrap()
}

pub fn tokens(json: &str) -> Vec<Token> {
    serde_json::from_str(json).unwrap()
}

pub fn create_test_storage() -> (TempDir, Arc<Storage>) {
    let temp_dir = TempDir::new().unwrap();
    let storage = Storage::open_with_retry(temp_dir.path(), RetryPolicy::none()).unwrap();
    (temp_dir, Arc::new(storage))
}

pub fn create_test_indexer() -> (TempDir, WordIndexer, Arc<Storage>) {
    let (temp_dir, storage) = create_test_storage();
    let indexer = WordIndexer::new(storage.clone(), Arc::new(StandardLexicon::new()));
    (temp_dir, indexer, storage)
}
