//! Tokens and sentences as delivered by the upstream language parser.
//!
//! The JSON shape matches the parser output:
//! `{"tokenList":[{"index":0,"list":[4],"tag":"NNP","text":"Peter","dep":"nsubj","synid":-1,"semantic":""}]}`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of an indexed sentence (document).
///
/// The nil ULID marks a sentence that has not been given an identity yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(pub Ulid);

impl SentenceId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// The "missing identifier" value.
    pub fn nil() -> Self {
        Self(Ulid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for SentenceId {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SentenceId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

impl From<Ulid> for SentenceId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

/// A single token of a parsed sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Position of the token in the parser's output
    #[serde(default)]
    pub index: i32,

    /// Indexes of the token's ancestors in the dependency tree
    #[serde(default, rename = "list")]
    pub ancestors: Vec<i32>,

    /// Penn treebank tag (e.g. "NNP", "VBD")
    #[serde(default)]
    pub tag: String,

    /// Surface text; may hold a compound such as "New York"
    #[serde(default)]
    pub text: String,

    /// Dependency label (e.g. "nsubj", "aux")
    #[serde(default)]
    pub dep: String,

    /// Synonym group id, -1 when none
    #[serde(default = "default_synid", rename = "synid")]
    pub syn_id: i64,

    /// Semantic category (e.g. "person", "country"), empty when unknown
    #[serde(default)]
    pub semantic: String,
}

fn default_synid() -> i64 {
    -1
}

impl Token {
    /// Create a bare token with text and tag.
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
            syn_id: default_synid(),
            ..Default::default()
        }
    }

    /// Create a token carrying only text, as the tokenizer does.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, "")
    }

    /// Set the dependency label.
    pub fn with_dep(mut self, dep: impl Into<String>) -> Self {
        self.dep = dep.into();
        self
    }

    /// Set the semantic category.
    pub fn with_semantic(mut self, semantic: impl Into<String>) -> Self {
        self.semantic = semantic.into();
        self
    }
}

/// A parsed sentence: the unit of indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default)]
    pub id: SentenceId,

    /// Owning topic, filled in when the sentence is stored
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,

    #[serde(default, rename = "tokenList")]
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Create a sentence with a fresh id.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            id: SentenceId::new(),
            topic: String::new(),
            tokens,
        }
    }

    /// Give the sentence a fresh id if it has none.
    pub fn ensure_id(&mut self) -> SentenceId {
        if self.id.is_nil() {
            self.id = SentenceId::new();
        }
        self.id
    }

    /// Parse a JSON array of sentences and give each one a fresh id when missing.
    pub fn list_from_json(json: &str) -> Result<Vec<Sentence>, serde_json::Error> {
        let mut sentences: Vec<Sentence> = serde_json::from_str(json)?;
        for sentence in &mut sentences {
            sentence.ensure_id();
        }
        Ok(sentences)
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
