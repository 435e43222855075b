//! # kai-nlu
//!
//! The language side of the k-ai index: stemming, stop-word tests and the
//! tokenizer used for query text.
//!
//! The upstream parser that tags and lemmatizes sentences is external; what
//! the index needs from it is captured by the [`Lexicon`] trait.
//! [`StandardLexicon`] is a table-driven implementation with built-in
//! inflection tables that can be extended from files.

pub mod error;
pub mod lexicon;
pub mod tokenizer;

pub use error::NluError;
pub use lexicon::{Lexicon, StandardLexicon};
pub use tokenizer::{filter_spaces, to_text, tokenize};
