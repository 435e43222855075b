//! Column family definitions for RocksDB.
//!
//! One column family per logical table:
//! - word_index: forward word index rows (topic, word, shard -> document)
//! - word_unindex: reverse rows used to delete a document's index rows
//! - topic: topic records
//! - topic_index: per-topic word scores for ranking
//! - topic_unindex: per-topic sentence contributions for cascade deletes
//! - sentence_by_id: stored sentence JSON
//! - sentence_by_topic: topic membership of stored sentences

use rocksdb::{ColumnFamilyDescriptor, Options};

pub const CF_WORD_INDEX: &str = "word_index";
pub const CF_WORD_UNINDEX: &str = "word_unindex";
pub const CF_TOPIC: &str = "topic";
pub const CF_TOPIC_INDEX: &str = "topic_index";
pub const CF_TOPIC_UNINDEX: &str = "topic_unindex";
pub const CF_SENTENCE_BY_ID: &str = "sentence_by_id";
pub const CF_SENTENCE_BY_TOPIC: &str = "sentence_by_topic";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[
    CF_WORD_INDEX,
    CF_WORD_UNINDEX,
    CF_TOPIC,
    CF_TOPIC_INDEX,
    CF_TOPIC_UNINDEX,
    CF_SENTENCE_BY_ID,
    CF_SENTENCE_BY_TOPIC,
];

/// Options for the index tables: many small rows scanned by prefix
fn index_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts
}

/// Options for sentence JSON (larger values, read by id)
fn sentence_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_WORD_INDEX, index_options()),
        ColumnFamilyDescriptor::new(CF_WORD_UNINDEX, index_options()),
        ColumnFamilyDescriptor::new(CF_TOPIC, Options::default()),
        ColumnFamilyDescriptor::new(CF_TOPIC_INDEX, index_options()),
        ColumnFamilyDescriptor::new(CF_TOPIC_UNINDEX, index_options()),
        ColumnFamilyDescriptor::new(CF_SENTENCE_BY_ID, sentence_options()),
        ColumnFamilyDescriptor::new(CF_SENTENCE_BY_TOPIC, Options::default()),
    ]
}
