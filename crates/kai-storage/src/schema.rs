//! Logical table layouts.
//!
//! A row's RocksDB key is the concatenation of its key columns in the
//! order listed here. Equality clauses on a leading run of key columns
//! narrow a scan to a key prefix; every other clause filters the scan.

use crate::column_families::{
    CF_SENTENCE_BY_ID, CF_SENTENCE_BY_TOPIC, CF_TOPIC, CF_TOPIC_INDEX, CF_TOPIC_UNINDEX,
    CF_WORD_INDEX, CF_WORD_UNINDEX,
};

/// A table: its column family and ordered key columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub cf: &'static str,
    pub key_columns: &'static [&'static str],
}

impl TableSchema {
    /// Forward word index: one row per (topic, word, shard, sentence, offset)
    pub const WORD_INDEX: TableSchema = TableSchema {
        cf: CF_WORD_INDEX,
        key_columns: &["topic", "word", "shard", "sentence_id", "offset"],
    };

    /// Reverse word index, grouped by sentence
    pub const WORD_UNINDEX: TableSchema = TableSchema {
        cf: CF_WORD_UNINDEX,
        key_columns: &["sentence_id", "word", "shard"],
    };

    pub const TOPIC: TableSchema = TableSchema {
        cf: CF_TOPIC,
        key_columns: &["name"],
    };

    /// Topic ranking scores, grouped by (word, tag) across topics
    pub const TOPIC_INDEX: TableSchema = TableSchema {
        cf: CF_TOPIC_INDEX,
        key_columns: &["word", "tag", "topic"],
    };

    pub const TOPIC_UNINDEX: TableSchema = TableSchema {
        cf: CF_TOPIC_UNINDEX,
        key_columns: &["topic", "sentence_id", "word", "tag"],
    };

    pub const SENTENCE_BY_ID: TableSchema = TableSchema {
        cf: CF_SENTENCE_BY_ID,
        key_columns: &["id"],
    };

    pub const SENTENCE_BY_TOPIC: TableSchema = TableSchema {
        cf: CF_SENTENCE_BY_TOPIC,
        key_columns: &["topic", "id"],
    };

    /// Every table, in column family order.
    pub const ALL: &'static [TableSchema] = &[
        Self::WORD_INDEX,
        Self::WORD_UNINDEX,
        Self::TOPIC,
        Self::TOPIC_INDEX,
        Self::TOPIC_UNINDEX,
        Self::SENTENCE_BY_ID,
        Self::SENTENCE_BY_TOPIC,
    ];

    /// Position of a column in the key, if it is a key column.
    pub fn key_position(&self, column: &str) -> Option<usize> {
        self.key_columns.iter().position(|c| *c == column)
    }
}
