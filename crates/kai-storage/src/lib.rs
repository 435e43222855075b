//! Storage layer for the k-ai text index.
//!
//! Provides RocksDB-backed table storage with:
//! - Column family isolation per logical table
//! - Composite keys built from each table's key columns, so equality
//!   predicates on leading key columns become prefix scans
//! - Typed predicates and `>`-style pagination on one column
//! - Bounded, fixed-delay retries for writes

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;
pub mod predicate;
pub mod retry;
pub mod schema;

pub use db::{from_row, to_row, Row, Storage, StorageStats};
pub use error::StorageError;
pub use predicate::{Clause, Op, Page, Predicate, Value};
pub use retry::RetryPolicy;
pub use schema::TableSchema;
