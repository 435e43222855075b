//! Query tree.

use std::fmt;

/// The category keyword that opens a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// No tag constraint
    Any,
    Person,
    Location,
}

impl Category {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "any" => Some(Category::Any),
            "person" => Some(Category::Person),
            "location" => Some(Category::Location),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Any => "any",
            Category::Person => "person",
            Category::Location => "location",
        }
    }

    /// Tag the category implies. Person and location are proper nouns.
    pub fn implied_tag(&self) -> Option<&'static str> {
        match self {
            Category::Any => None,
            Category::Person | Category::Location => Some("NNP"),
        }
    }
}

/// A keyword leaf: `[exact] category(text[, tag])`.
///
/// Only `text` drives retrieval; `tag`, `category` and `exact` are kept for
/// display and for callers that want to post-filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordQuery {
    pub text: String,
    /// Uppercased Penn tag, or one of `noun`, `proper noun`, `adjective`, `verb`
    pub tag: Option<String>,
    pub category: Category,
    pub exact: bool,
}

/// A parsed query. Binary nodes own both operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    Word(WordQuery),
    And(Box<QueryNode>, Box<QueryNode>),
    Or(Box<QueryNode>, Box<QueryNode>),
    AndNot(Box<QueryNode>, Box<QueryNode>),
}

impl QueryNode {
    pub fn and(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::Or(Box::new(left), Box::new(right))
    }

    pub fn and_not(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::AndNot(Box::new(left), Box::new(right))
    }

    /// The leaf, if this node is one.
    pub fn as_word(&self) -> Option<&WordQuery> {
        match self {
            QueryNode::Word(word) => Some(word),
            _ => None,
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            QueryNode::Word(_) => 1,
            QueryNode::And(l, r) | QueryNode::Or(l, r) | QueryNode::AndNot(l, r) => {
                l.leaf_count() + r.leaf_count()
            }
        }
    }
}

impl fmt::Display for WordQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact {
            write!(f, "exact ")?;
        }
        write!(f, "{}({}", self.category.as_str(), self.text)?;
        // implied tags are not written back; the parser rejects them
        if let Some(tag) = &self.tag {
            if self.category.implied_tag().is_none() {
                write!(f, ", {}", tag)?;
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Word(word) => write!(f, "{}", word),
            QueryNode::And(l, r) => write!(f, "({} and {})", l, r),
            QueryNode::Or(l, r) => write!(f, "({} or {})", l, r),
            QueryNode::AndNot(l, r) => write!(f, "({} and not {})", l, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any(text: &str) -> QueryNode {
        QueryNode::Word(WordQuery {
            text: text.to_string(),
            tag: None,
            category: Category::Any,
            exact: false,
        })
    }

    #[test]
    fn test_display() {
        let person = QueryNode::Word(WordQuery {
            text: "Peter".to_string(),
            tag: Some("NNP".to_string()),
            category: Category::Person,
            exact: true,
        });
        let tree = QueryNode::and_not(QueryNode::or(any("boat"), any("ship")), person);
        assert_eq!(
            tree.to_string(),
            "((any(boat) or any(ship)) and not exact person(Peter))"
        );
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn test_category_keywords() {
        assert_eq!(Category::from_keyword("person"), Some(Category::Person));
        assert_eq!(Category::from_keyword("url"), None);
        assert_eq!(Category::Location.implied_tag(), Some("NNP"));
        assert_eq!(Category::Any.implied_tag(), None);
    }
}
