//! Recursive-descent query parser.
//!
//! ```text
//! where    ::= ['exact'] category '(' text [',' tag] ')'
//!            | '(' where ')'
//!            | where 'and' where
//!            | where 'and' 'not' where
//!            | where 'or' where
//! category ::= 'any' | 'person' | 'location'
//! tag      ::= penn-tag | 'noun' | 'proper noun' | 'adjective' | 'verb'
//! ```
//!
//! Operators bind to the right with equal precedence: `a and b or c` parses
//! as `a and (b or c)`. Whitespace between tokens is ignored; whitespace
//! inside leaf text is kept.

use kai_nlu::tokenize;
use kai_types::{is_penn_tag, Token};

use crate::error::SearchError;
use crate::model::{Category, QueryNode, WordQuery};

/// Tag names accepted besides Penn tags. `proper noun` is two tokens.
const NAMED_TAGS: &[&str] = &["noun", "adjective", "verb"];

/// Parse query text into a tree.
///
/// Error positions are indexes into the tokenized query.
pub fn parse_query(text: &str) -> Result<QueryNode, SearchError> {
    let mut parser = Parser {
        tokens: tokenize(text),
        pos: 0,
    };
    if parser.next_index().is_none() {
        return Err(SearchError::parse(0, "Empty query"));
    }

    let node = parser.expression()?;
    if let Some(i) = parser.next_index() {
        return Err(SearchError::parse(
            i,
            format!("Unexpected '{}' after complete expression", parser.text_at(i)),
        ));
    }
    Ok(node)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Position of the next non-space token.
    fn next_index(&self) -> Option<usize> {
        (self.pos..self.tokens.len()).find(|&i| !self.tokens[i].text.trim().is_empty())
    }

    fn text_at(&self, i: usize) -> &str {
        &self.tokens[i].text
    }

    fn peek_is(&self, word: &str) -> bool {
        self.next_index().is_some_and(|i| self.text_at(i) == word)
    }

    /// Consume the next non-space token, which must be `word`.
    fn expect(&mut self, word: &str) -> Result<(), SearchError> {
        match self.next_index() {
            Some(i) if self.text_at(i) == word => {
                self.pos = i + 1;
                Ok(())
            }
            Some(i) => Err(SearchError::parse(
                i,
                format!("Expected '{}', found '{}'", word, self.text_at(i)),
            )),
            None => Err(SearchError::parse(
                self.tokens.len(),
                format!("Expected '{}' at end of query", word),
            )),
        }
    }

    fn expression(&mut self) -> Result<QueryNode, SearchError> {
        let left = self.primary()?;

        if self.peek_is("or") {
            self.expect("or")?;
            let right = self.operand("or")?;
            return Ok(QueryNode::or(left, right));
        }
        if self.peek_is("and") {
            self.expect("and")?;
            if self.peek_is("not") {
                self.expect("not")?;
                let right = self.operand("and not")?;
                return Ok(QueryNode::and_not(left, right));
            }
            let right = self.operand("and")?;
            return Ok(QueryNode::and(left, right));
        }
        Ok(left)
    }

    /// Right-hand side of an operator.
    fn operand(&mut self, op: &str) -> Result<QueryNode, SearchError> {
        if self.next_index().is_none() {
            return Err(SearchError::parse(
                self.tokens.len(),
                format!("'{}' is missing its right-hand expression", op),
            ));
        }
        self.expression()
    }

    fn primary(&mut self) -> Result<QueryNode, SearchError> {
        let Some(i) = self.next_index() else {
            return Err(SearchError::parse(self.tokens.len(), "Expected expression"));
        };
        let keyword = self.text_at(i).to_string();
        self.pos = i + 1;

        match keyword.as_str() {
            "(" => {
                let node = self.expression()?;
                self.expect(")")?;
                Ok(node)
            }
            "exact" => {
                let Some(j) = self.next_index() else {
                    return Err(SearchError::parse(
                        self.tokens.len(),
                        "'exact' must be followed by a category",
                    ));
                };
                let category = Category::from_keyword(self.text_at(j)).ok_or_else(|| {
                    SearchError::parse(j, format!("Unknown category '{}'", self.text_at(j)))
                })?;
                self.pos = j + 1;
                self.word(category, true)
            }
            other => match Category::from_keyword(other) {
                Some(category) => self.word(category, false),
                None => Err(SearchError::parse(i, format!("Unknown token '{}'", other))),
            },
        }
    }

    /// `'(' text [',' tag] ')'` after a category keyword.
    fn word(&mut self, category: Category, exact: bool) -> Result<QueryNode, SearchError> {
        self.expect("(")?;
        let start = self.pos;

        let mut text = String::new();
        let terminator = loop {
            let Some(token) = self.tokens.get(self.pos) else {
                return Err(SearchError::parse(start, "Unterminated text"));
            };
            self.pos += 1;
            match token.text.as_str() {
                ")" | "," => break token.text.clone(),
                part => text.push_str(part),
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(SearchError::parse(start, "Empty text"));
        }

        let mut tag = None;
        if terminator == "," {
            tag = Some(self.tag()?);
            self.expect(")")?;
        }

        if let Some(implied) = category.implied_tag() {
            if tag.is_some() {
                return Err(SearchError::parse(
                    start,
                    format!("'{}' takes no tag, it is always {}", category.as_str(), implied),
                ));
            }
            tag = Some(implied.to_string());
        }

        Ok(QueryNode::Word(WordQuery {
            text,
            tag,
            category,
            exact,
        }))
    }

    fn tag(&mut self) -> Result<String, SearchError> {
        let Some(i) = self.next_index() else {
            return Err(SearchError::parse(self.tokens.len(), "Expected tag after ','"));
        };
        let word = self.text_at(i).to_string();
        self.pos = i + 1;

        if word == "proper" {
            self.expect("noun")?;
            return Ok("proper noun".to_string());
        }
        if NAMED_TAGS.contains(&word.as_str()) {
            return Ok(word);
        }
        if is_penn_tag(&word) {
            return Ok(word.to_uppercase());
        }
        Err(SearchError::parse(i, format!("Invalid tag '{}'", word)))
    }
}
