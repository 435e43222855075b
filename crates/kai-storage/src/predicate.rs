//! Typed column predicates and pagination.
//!
//! ```
//! use kai_storage::Predicate;
//!
//! let predicate = Predicate::new().eq("word", "text").eq("shard", 0);
//! assert_eq!(predicate.len(), 2);
//! ```

use std::cmp::Ordering;

use kai_types::SentenceId;
use serde_json::Value as JsonValue;
use ulid::Ulid;

use crate::db::Row;

/// A column value usable in keys and predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Id(Ulid),
}

impl Value {
    /// JSON form, as stored in a row.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => JsonValue::from(*f),
            Value::Id(id) => JsonValue::String(id.to_string()),
        }
    }

    /// Order a stored row value relative to this value.
    ///
    /// Returns `None` when the stored value has an incompatible type.
    pub fn compare_stored(&self, stored: &JsonValue) -> Option<Ordering> {
        match self {
            Value::Text(s) => stored.as_str().map(|v| v.cmp(s.as_str())),
            Value::Int(i) => stored.as_i64().map(|v| v.cmp(i)),
            Value::Float(f) => stored.as_f64().and_then(|v| v.partial_cmp(f)),
            Value::Id(id) => stored
                .as_str()
                .and_then(|v| Ulid::from_string(v).ok())
                .map(|v| v.cmp(id)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Ulid> for Value {
    fn from(id: Ulid) -> Self {
        Value::Id(id)
    }
}

impl From<SentenceId> for Value {
    fn from(id: SentenceId) -> Self {
        Value::Id(id.0)
    }
}

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gt,
}

/// `column <op> value`
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Clause {
    /// Whether a row satisfies this clause. A missing column never matches.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(stored) = row.get(&self.column) else {
            return false;
        };
        match (self.op, self.value.compare_stored(stored)) {
            (Op::Eq, Some(Ordering::Equal)) => true,
            (Op::Gt, Some(Ordering::Greater)) => true,
            _ => false,
        }
    }
}

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value`.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            column: column.to_string(),
            op: Op::Eq,
            value: value.into(),
        });
        self
    }

    /// Add `column > value`.
    pub fn gt(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            column: column.to_string(),
            op: Op::Gt,
            value: value.into(),
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// The value of the first equality clause on `column`.
    pub fn eq_value(&self, column: &str) -> Option<&Value> {
        self.clauses
            .iter()
            .find(|c| c.op == Op::Eq && c.column == column)
            .map(|c| &c.value)
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.clauses.iter().all(|c| c.matches(row))
    }
}

/// One page of an ordered scan: rows with `order_by > after`, at most `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub order_by: String,
    pub after: Option<Value>,
    pub size: usize,
}

impl Page {
    /// First page ordered by `order_by`.
    pub fn first(order_by: &str, size: usize) -> Self {
        Self {
            order_by: order_by.to_string(),
            after: None,
            size,
        }
    }

    /// Page following the row whose `order_by` column held `after`.
    pub fn after(order_by: &str, after: impl Into<Value>, size: usize) -> Self {
        Self {
            order_by: order_by.to_string(),
            after: Some(after.into()),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: JsonValue) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_eq_and_gt() {
        let r = row(json!({"word": "boat", "shard": 3, "score": 0.5}));
        assert!(Predicate::new().eq("word", "boat").eq("shard", 3).matches(&r));
        assert!(!Predicate::new().eq("word", "boats").matches(&r));
        assert!(Predicate::new().gt("shard", 2).matches(&r));
        assert!(!Predicate::new().gt("shard", 3).matches(&r));
        assert!(Predicate::new().gt("score", 0.25).matches(&r));
    }

    #[test]
    fn test_missing_column_or_wrong_type_never_matches() {
        let r = row(json!({"word": "boat"}));
        assert!(!Predicate::new().eq("topic", "t1").matches(&r));
        assert!(!Predicate::new().eq("word", 7).matches(&r));
    }

    #[test]
    fn test_id_values_compare_through_their_string_form() {
        let id = SentenceId::new();
        let r = row(json!({"sentence_id": id.to_string()}));
        assert!(Predicate::new().eq("sentence_id", id).matches(&r));
        assert!(!Predicate::new().eq("sentence_id", SentenceId::new()).matches(&r));
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        let predicate = Predicate::new();
        assert!(predicate.is_empty());
        assert!(predicate.matches(&row(json!({"a": 1}))));
    }

    #[test]
    fn test_eq_value_lookup() {
        let predicate = Predicate::new().gt("topic", "a").eq("topic", "b");
        assert_eq!(predicate.eq_value("topic"), Some(&Value::from("b")));
        assert_eq!(predicate.eq_value("word"), None);
    }
}
