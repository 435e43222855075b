//! # kai-search
//!
//! Boolean queries over the word index.
//!
//! Queries combine keyword leaves with `and`, `or` and `and not`:
//!
//! ```text
//! any(Peter) and not (exact person(Sherry) or any(movie, noun))
//! ```
//!
//! [`parse_query`] turns the text into a [`QueryNode`] tree and
//! [`QueryEvaluator`] runs it against one topic, combining the per-leaf
//! [`MatchSet`](kai_types::MatchSet)s with set algebra.

pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;

pub use error::SearchError;
pub use evaluator::{difference, intersection, union, QueryEvaluator};
pub use model::{Category, QueryNode, WordQuery};
pub use parser::parse_query;
