//! RocksDB wrapper for k-ai table storage.
//!
//! Provides:
//! - Database open with column family setup
//! - Row insert, atomic multi-row insert, predicate delete
//! - Predicate selects with optional ordered pagination
//! - Retried writes (see [`RetryPolicy`])

use std::cmp::Ordering;
use std::path::Path;

use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::column_families::{build_cf_descriptors, ALL_CF_NAMES};
use crate::error::StorageError;
use crate::keys::{encode_component, prefix_key, row_key};
use crate::predicate::{Page, Predicate};
use crate::retry::RetryPolicy;
use crate::schema::TableSchema;

/// A table row: column name -> JSON value.
pub type Row = serde_json::Map<String, JsonValue>;

/// Convert a serializable struct into a row.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, StorageError> {
    match serde_json::to_value(value)? {
        JsonValue::Object(row) => Ok(row),
        other => Err(StorageError::Serialization(format!(
            "Expected an object row, got {}",
            other
        ))),
    }
}

/// Convert a row back into a struct.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StorageError> {
    Ok(serde_json::from_value(JsonValue::Object(row))?)
}

/// Main storage interface for the k-ai index
pub struct Storage {
    db: DB,
    retry: RetryPolicy,
}

impl Storage {
    /// Open storage at the given path, creating if necessary.
    ///
    /// Writes use the default retry policy.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_retry(path, RetryPolicy::default())
    }

    /// Open storage with an explicit write retry policy.
    pub fn open_with_retry(path: &Path, retry: RetryPolicy) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(4);

        let db = DB::open_cf_descriptors(&db_opts, path, build_cf_descriptors())?;
        Ok(Self { db, retry })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(name.to_string()))
    }

    /// Insert (upsert) one row.
    pub fn insert(&self, table: &TableSchema, row: &Row) -> Result<(), StorageError> {
        let cf = self.cf(table.cf)?;
        let key = row_key(table, row)?;
        let value = serde_json::to_vec(row)?;

        self.retry.execute("insert", || {
            self.db.put_cf(cf, &key, &value)?;
            Ok(())
        })?;
        debug!(table = table.cf, "Inserted row");
        Ok(())
    }

    /// Insert several rows, possibly across tables, in one atomic batch.
    pub fn insert_all(&self, rows: &[(TableSchema, Row)]) -> Result<(), StorageError> {
        let mut encoded = Vec::with_capacity(rows.len());
        for (table, row) in rows {
            encoded.push((self.cf(table.cf)?, row_key(table, row)?, serde_json::to_vec(row)?));
        }

        self.retry.execute("insert_all", || {
            let mut batch = WriteBatch::default();
            for (cf, key, value) in &encoded {
                batch.put_cf(*cf, key, value);
            }
            self.db.write(batch)?;
            Ok(())
        })?;
        debug!(rows = rows.len(), "Inserted row batch");
        Ok(())
    }

    /// Delete every row matching the predicate. Returns the number deleted.
    ///
    /// An empty predicate is rejected rather than truncating the table.
    pub fn delete(&self, table: &TableSchema, predicate: &Predicate) -> Result<usize, StorageError> {
        if predicate.is_empty() {
            return Err(StorageError::InvalidInput(format!(
                "Refusing unconditional delete on {}",
                table.cf
            )));
        }
        let cf = self.cf(table.cf)?;
        let prefix = self.scan_prefix(table, predicate)?;

        let count = self.retry.execute("delete", || {
            let mut batch = WriteBatch::default();
            let mut count = 0;
            self.scan(cf, &prefix, &prefix, |key, row| {
                if predicate.matches(&row) {
                    batch.delete_cf(cf, key);
                    count += 1;
                }
                Ok(true)
            })?;
            if count > 0 {
                self.db.write(batch)?;
            }
            Ok(count)
        })?;

        debug!(table = table.cf, count, "Deleted rows");
        Ok(count)
    }

    /// Select rows matching the predicate.
    ///
    /// `columns` projects the returned rows; empty means every column.
    /// With a page, rows are ordered by `page.order_by`, limited to those
    /// strictly greater than `page.after`, and capped at `page.size`.
    pub fn select(
        &self,
        table: &TableSchema,
        columns: &[&str],
        predicate: &Predicate,
        page: Option<&Page>,
    ) -> Result<Vec<Row>, StorageError> {
        let cf = self.cf(table.cf)?;
        let prefix = self.scan_prefix(table, predicate)?;

        let mut rows = match page {
            None => {
                let mut rows = Vec::new();
                self.scan(cf, &prefix, &prefix, |_, row| {
                    if predicate.matches(&row) {
                        rows.push(row);
                    }
                    Ok(true)
                })?;
                rows
            }
            Some(page) => self.select_page(table, cf, &prefix, predicate, page)?,
        };

        if !columns.is_empty() {
            for row in &mut rows {
                row.retain(|name, _| columns.contains(&name.as_str()));
            }
        }
        Ok(rows)
    }

    fn select_page(
        &self,
        table: &TableSchema,
        cf: &ColumnFamily,
        prefix: &[u8],
        predicate: &Predicate,
        page: &Page,
    ) -> Result<Vec<Row>, StorageError> {
        if page.size == 0 {
            return Err(StorageError::InvalidInput(
                "Page size must be greater than zero".to_string(),
            ));
        }

        let filter = match &page.after {
            Some(after) => predicate.clone().gt(&page.order_by, after.clone()),
            None => predicate.clone(),
        };

        // Keys are already ordered by the first key column not fixed by the prefix.
        let prefix_columns = self.prefix_columns(table, predicate);
        let natively_ordered = table.key_columns.get(prefix_columns) == Some(&page.order_by.as_str());

        if natively_ordered {
            let mut start = prefix.to_vec();
            if let Some(after) = &page.after {
                encode_component(after, &mut start)?;
            }
            let mut rows = Vec::with_capacity(page.size);
            self.scan(cf, prefix, &start, |_, row| {
                if filter.matches(&row) {
                    rows.push(row);
                }
                Ok(rows.len() < page.size)
            })?;
            return Ok(rows);
        }

        let mut rows = Vec::new();
        self.scan(cf, prefix, prefix, |_, row| {
            if filter.matches(&row) {
                rows.push(row);
            }
            Ok(true)
        })?;
        rows.sort_by(|a, b| compare_cells(a.get(&page.order_by), b.get(&page.order_by)));
        rows.truncate(page.size);
        Ok(rows)
    }

    /// Number of leading key columns fixed by equality clauses.
    fn prefix_columns(&self, table: &TableSchema, predicate: &Predicate) -> usize {
        table
            .key_columns
            .iter()
            .take_while(|column| predicate.eq_value(column).is_some())
            .count()
    }

    fn scan_prefix(&self, table: &TableSchema, predicate: &Predicate) -> Result<Vec<u8>, StorageError> {
        let values: Vec<_> = table
            .key_columns
            .iter()
            .map_while(|column| predicate.eq_value(column))
            .collect();
        prefix_key(&values)
    }

    /// Visit rows whose key starts with `prefix`, beginning at `start`.
    /// The visitor returns `false` to stop early.
    fn scan<F>(&self, cf: &ColumnFamily, prefix: &[u8], start: &[u8], mut visit: F) -> Result<(), StorageError>
    where
        F: FnMut(&[u8], Row) -> Result<bool, StorageError>,
    {
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(start, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            // Stop if we've passed the prefix
            if !key.starts_with(prefix) {
                break;
            }
            let row: Row = serde_json::from_slice(&value)?;
            if !visit(&key[..], row)? {
                break;
            }
        }
        Ok(())
    }

    /// Count rows in a table.
    pub fn count(&self, table: &TableSchema) -> Result<u64, StorageError> {
        let cf = self.cf(table.cf)?;
        let mut count = 0u64;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Flush all column families to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.flush_cf(cf)?;
            }
        }
        Ok(())
    }

    /// Get database statistics.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        Ok(StorageStats {
            word_index_rows: self.count(&TableSchema::WORD_INDEX)?,
            word_unindex_rows: self.count(&TableSchema::WORD_UNINDEX)?,
            topic_rows: self.count(&TableSchema::TOPIC)?,
            topic_index_rows: self.count(&TableSchema::TOPIC_INDEX)?,
            topic_unindex_rows: self.count(&TableSchema::TOPIC_UNINDEX)?,
            sentence_rows: self.count(&TableSchema::SENTENCE_BY_ID)?,
            disk_usage_bytes: self.get_disk_usage(),
        })
    }

    fn get_disk_usage(&self) -> u64 {
        let mut total_size = 0u64;
        if let Ok(entries) = std::fs::read_dir(self.db.path()) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }
        total_size
    }
}

/// Order two optional JSON cells: strings lexically, numbers numerically.
fn compare_cells(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (Some(JsonValue::String(a)), Some(JsonValue::String(b))) => a.cmp(b),
        (Some(JsonValue::Number(a)), Some(JsonValue::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Statistics about the storage.
#[derive(Debug, Default, Serialize)]
pub struct StorageStats {
    pub word_index_rows: u64,
    pub word_unindex_rows: u64,
    pub topic_rows: u64,
    pub topic_index_rows: u64,
    pub topic_unindex_rows: u64,
    /// Number of stored sentences
    pub sentence_rows: u64,
    /// Total disk usage in bytes
    pub disk_usage_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open_with_retry(temp_dir.path(), RetryPolicy::none()).unwrap();
        (storage, temp_dir)
    }

    fn row(value: JsonValue) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn topic_row(name: &str) -> Row {
        row(json!({"name": name, "body": format!("about {}", name)}))
    }

    #[test]
    fn test_open_creates_column_families() {
        let (storage, _temp) = create_test_storage();
        for cf_name in ALL_CF_NAMES {
            assert!(
                storage.db.cf_handle(cf_name).is_some(),
                "CF {} should exist",
                cf_name
            );
        }
    }

    #[test]
    fn test_insert_and_select_by_leading_columns() {
        let (storage, _temp) = create_test_storage();
        let table = TableSchema::TOPIC_INDEX;
        storage.insert(&table, &row(json!({"word": "boat", "tag": "NN", "topic": "sea", "score": 1.5}))).unwrap();
        storage.insert(&table, &row(json!({"word": "boat", "tag": "NN", "topic": "lake", "score": 0.5}))).unwrap();
        storage.insert(&table, &row(json!({"word": "boat", "tag": "VB", "topic": "sea", "score": 0.1}))).unwrap();
        storage.insert(&table, &row(json!({"word": "boats", "tag": "NN", "topic": "sea", "score": 9.0}))).unwrap();

        let rows = storage
            .select(&table, &["topic", "score"], &Predicate::new().eq("word", "boat").eq("tag", "NN"), None)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 2 && r.contains_key("topic")));
    }

    #[test]
    fn test_insert_is_upsert_on_key() {
        let (storage, _temp) = create_test_storage();
        let table = TableSchema::TOPIC_INDEX;
        storage.insert(&table, &row(json!({"word": "boat", "tag": "NN", "topic": "sea", "score": 1.0}))).unwrap();
        storage.insert(&table, &row(json!({"word": "boat", "tag": "NN", "topic": "sea", "score": 2.0}))).unwrap();

        let rows = storage.select(&table, &[], &Predicate::new().eq("word", "boat"), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["score"], json!(2.0));
    }

    #[test]
    fn test_non_key_clauses_filter_scan() {
        let (storage, _temp) = create_test_storage();
        let table = TableSchema::TOPIC_INDEX;
        storage.insert(&table, &row(json!({"word": "boat", "tag": "NN", "topic": "sea", "score": 1.0}))).unwrap();
        storage.insert(&table, &row(json!({"word": "car", "tag": "NN", "topic": "sea", "score": 1.0}))).unwrap();

        // topic is a trailing key column: no prefix, full filter
        let rows = storage.select(&table, &[], &Predicate::new().eq("topic", "sea"), None).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_insert_all_is_atomic_across_tables() {
        let (storage, _temp) = create_test_storage();
        let bad = row(json!({"word": "boat"}));
        let result = storage.insert_all(&[(TableSchema::TOPIC, topic_row("sea")), (TableSchema::TOPIC_INDEX, bad)]);
        assert!(result.is_err());
        assert_eq!(storage.count(&TableSchema::TOPIC).unwrap(), 0);

        storage
            .insert_all(&[
                (TableSchema::TOPIC, topic_row("sea")),
                (TableSchema::TOPIC_INDEX, row(json!({"word": "boat", "tag": "NN", "topic": "sea", "score": 1.0}))),
            ])
            .unwrap();
        assert_eq!(storage.count(&TableSchema::TOPIC).unwrap(), 1);
        assert_eq!(storage.count(&TableSchema::TOPIC_INDEX).unwrap(), 1);
    }

    #[test]
    fn test_delete_by_predicate() {
        let (storage, _temp) = create_test_storage();
        let table = TableSchema::TOPIC_INDEX;
        for topic in ["a", "b", "c"] {
            storage.insert(&table, &row(json!({"word": "boat", "tag": "NN", "topic": topic, "score": 1.0}))).unwrap();
        }
        storage.insert(&table, &row(json!({"word": "car", "tag": "NN", "topic": "a", "score": 1.0}))).unwrap();

        let deleted = storage
            .delete(&table, &Predicate::new().eq("word", "boat").eq("tag", "NN").eq("topic", "b"))
            .unwrap();
        assert_eq!(deleted, 1);

        let deleted = storage.delete(&table, &Predicate::new().eq("topic", "a")).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(storage.count(&table).unwrap(), 1);

        // Deleting nothing is fine
        assert_eq!(storage.delete(&table, &Predicate::new().eq("topic", "zzz")).unwrap(), 0);
    }

    #[test]
    fn test_unconditional_delete_rejected() {
        let (storage, _temp) = create_test_storage();
        let err = storage.delete(&TableSchema::TOPIC, &Predicate::new()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_paginated_select_in_key_order() {
        let (storage, _temp) = create_test_storage();
        for name in ["delta", "alpha", "echo", "charlie", "bravo"] {
            storage.insert(&TableSchema::TOPIC, &topic_row(name)).unwrap();
        }

        let page1 = storage
            .select(&TableSchema::TOPIC, &["name"], &Predicate::new(), Some(&Page::first("name", 2)))
            .unwrap();
        let names: Vec<_> = page1.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["alpha", "bravo"]);

        let page2 = storage
            .select(&TableSchema::TOPIC, &["name"], &Predicate::new(), Some(&Page::after("name", "bravo", 2)))
            .unwrap();
        let names: Vec<_> = page2.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["charlie", "delta"]);

        let page3 = storage
            .select(&TableSchema::TOPIC, &["name"], &Predicate::new(), Some(&Page::after("name", "delta", 2)))
            .unwrap();
        assert_eq!(page3.len(), 1);
    }

    #[test]
    fn test_paginated_select_on_non_key_column() {
        let (storage, _temp) = create_test_storage();
        let table = TableSchema::TOPIC_INDEX;
        for (topic, score) in [("a", 3.0), ("b", 1.0), ("c", 2.0)] {
            storage.insert(&table, &row(json!({"word": "boat", "tag": "NN", "topic": topic, "score": score}))).unwrap();
        }
        let rows = storage
            .select(&table, &[], &Predicate::new().eq("word", "boat"), Some(&Page::after("score", 1.0, 10)))
            .unwrap();
        let topics: Vec<_> = rows.iter().map(|r| r["topic"].as_str().unwrap()).collect();
        assert_eq!(topics, vec!["c", "a"]);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let (storage, _temp) = create_test_storage();
        let err = storage
            .select(&TableSchema::TOPIC, &[], &Predicate::new(), Some(&Page::first("name", 0)))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_row_conversion() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Sample {
            name: String,
            count: i64,
        }
        let sample = Sample { name: "x".to_string(), count: 3 };
        let r = to_row(&sample).unwrap();
        assert_eq!(r["count"], json!(3));
        let back: Sample = from_row(r).unwrap();
        assert_eq!(back, sample);
        assert!(to_row(&5).is_err());
    }

    #[test]
    fn test_stats_count_rows() {
        let (storage, _temp) = create_test_storage();
        storage.insert(&TableSchema::TOPIC, &topic_row("sea")).unwrap();
        let stats = storage.get_stats().unwrap();
        assert_eq!(stats.topic_rows, 1);
        assert_eq!(stats.word_index_rows, 0);
        storage.flush().unwrap();
    }
}
