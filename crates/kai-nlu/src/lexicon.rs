//! Stemming and stop-word lookup.
//!
//! Stems come from inflection tables: a plural maps to its singular, a verb
//! form maps to its base. Anything not in a table stems to its lowercase form.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use crate::error::NluError;

const BUILTIN_PLURALS: &str = include_str!("../data/plurals.txt");
const BUILTIN_VERBS: &str = include_str!("../data/verbs.txt");

/// Minimum number of `|`-separated fields in a verb line.
const MIN_VERB_FIELDS: usize = 6;

/// Words that never carry search meaning.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "to", "was", "were", "will", "with", "this",
    "they", "but", "have", "had", "what", "when", "where", "who", "which", "why", "how", "all",
    "each", "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very", "can", "just", "should", "now",
    "also", "been", "being", "do", "does", "did", "doing", "would", "could", "might", "must",
    "shall", "about", "above", "after", "again", "against", "am", "any", "before", "below",
    "between", "into", "through", "during", "out", "over", "under", "up", "down", "then",
    "once", "here", "there", "if", "else", "while", "because", "until", "we", "you", "your",
    "our", "their", "him", "her", "them", "me", "my", "myself", "itself", "those", "these",
    "his", "i", "she",
];

/// Whitespace and punctuation tokens produced by the tokenizer.
const SYMBOLS: &[&str] = &[
    " ", ".", ",", "!", "?", ":", ";", "-", "'", "\"", "(", ")", "[", "]", "{", "}", "<", ">",
    "/", "\\", "_", "%", "$", "#", "@", "^", "&", "*", "=", "+", "|",
];

/// What the index needs from the language pipeline.
pub trait Lexicon: Send + Sync {
    /// Normalized base form of a word (lowercase).
    fn stem(&self, word: &str) -> String;

    /// True for stop words and punctuation.
    fn is_undesirable(&self, word: &str) -> bool;
}

/// Table-driven lexicon with built-in English inflections.
#[derive(Debug, Clone)]
pub struct StandardLexicon {
    plurals: HashMap<String, String>,
    verbs: HashMap<String, String>,
    undesirables: HashSet<String>,
}

impl StandardLexicon {
    /// Lexicon with the built-in tables only.
    pub fn new() -> Self {
        let mut lexicon = Self {
            plurals: HashMap::new(),
            verbs: HashMap::new(),
            undesirables: STOP_WORDS
                .iter()
                .chain(SYMBOLS.iter())
                .map(|w| w.to_string())
                .collect(),
        };
        lexicon.add_plurals(BUILTIN_PLURALS);
        lexicon.add_verbs(BUILTIN_VERBS);
        lexicon
    }

    /// Built-in tables extended by `plurals.txt` and `verbs.txt` from `dir`,
    /// where present.
    pub fn from_dir(dir: &Path) -> Result<Self, NluError> {
        let mut lexicon = Self::new();
        let plurals = dir.join("plurals.txt");
        if plurals.exists() {
            lexicon.load_plurals(&plurals)?;
        }
        let verbs = dir.join("verbs.txt");
        if verbs.exists() {
            lexicon.load_verbs(&verbs)?;
        }
        info!(
            plurals = lexicon.plurals.len(),
            verbs = lexicon.verbs.len(),
            undesirables = lexicon.undesirables.len(),
            "Lexicon loaded"
        );
        Ok(lexicon)
    }

    /// Load `singular|plural` lines. Returns the number of entries added.
    pub fn load_plurals(&mut self, path: &Path) -> Result<usize, NluError> {
        let contents = read_data_file(path)?;
        let added = self.add_plurals(&contents);
        if added == 0 {
            return Err(NluError::EmptyData(path.to_path_buf()));
        }
        debug!(?path, added, "Loaded plurals");
        Ok(added)
    }

    /// Load `base|form|form|...` lines. Returns the number of entries added.
    pub fn load_verbs(&mut self, path: &Path) -> Result<usize, NluError> {
        let contents = read_data_file(path)?;
        let added = self.add_verbs(&contents);
        if added == 0 {
            return Err(NluError::EmptyData(path.to_path_buf()));
        }
        debug!(?path, added, "Loaded verbs");
        Ok(added)
    }

    fn add_plurals(&mut self, contents: &str) -> usize {
        let mut added = 0;
        for line in contents.lines() {
            let parts: Vec<&str> = line.trim().split('|').collect();
            if let [singular, plural] = parts.as_slice() {
                self.plurals
                    .insert(plural.to_lowercase(), singular.to_lowercase());
                added += 1;
            }
        }
        added
    }

    fn add_verbs(&mut self, contents: &str) -> usize {
        let mut added = 0;
        for line in contents.lines() {
            let parts: Vec<&str> = line.trim().split('|').collect();
            if parts.len() < MIN_VERB_FIELDS {
                continue;
            }
            let base = parts[0].to_lowercase();
            for form in &parts[1..] {
                let form = form.to_lowercase();
                if form != base {
                    self.verbs.insert(form, base.clone());
                    added += 1;
                }
            }
        }
        added
    }
}

impl Default for StandardLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon for StandardLexicon {
    fn stem(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if let Some(singular) = self.plurals.get(&lower) {
            return singular.clone();
        }
        if let Some(base) = self.verbs.get(&lower) {
            return base.clone();
        }
        lower
    }

    fn is_undesirable(&self, word: &str) -> bool {
        self.undesirables.contains(&word.to_lowercase())
    }
}

fn read_data_file(path: &Path) -> Result<String, NluError> {
    std::fs::read_to_string(path).map_err(|source| NluError::Io {
        path: path.to_path_buf(),
        source,
    })
}
