//! Key encoding for table rows.
//!
//! Key format: `{c1}\0{c2}\0...{cn}\0` over the table's key columns.
//! - text: raw UTF-8 (must not contain `\0`)
//! - int: 16 hex digits of the sign-flipped value, so byte order is numeric order
//! - id: 26-character ULID string
//!
//! Every component is terminated, so a prefix built from leading columns
//! never matches a longer value (`word\0` does not prefix `words\0`).

use serde_json::Value as JsonValue;

use crate::db::Row;
use crate::error::StorageError;
use crate::predicate::Value;
use crate::schema::TableSchema;

const SEPARATOR: u8 = 0;

/// Encode one key component.
pub fn encode_component(value: &Value, out: &mut Vec<u8>) -> Result<(), StorageError> {
    match value {
        Value::Text(s) => {
            if s.as_bytes().contains(&SEPARATOR) {
                return Err(StorageError::Key(format!(
                    "Key text contains a NUL byte: {:?}",
                    s
                )));
            }
            out.extend_from_slice(s.as_bytes());
        }
        Value::Int(i) => {
            let flipped = (*i as u64) ^ (1u64 << 63);
            out.extend_from_slice(format!("{:016x}", flipped).as_bytes());
        }
        Value::Id(id) => out.extend_from_slice(id.to_string().as_bytes()),
        Value::Float(f) => {
            return Err(StorageError::Key(format!(
                "Float values cannot be key components: {}",
                f
            )))
        }
    }
    out.push(SEPARATOR);
    Ok(())
}

/// Recover a typed key value from a stored row cell.
///
/// Stored ids are strings; ids and text share one byte form, so reading
/// them back as text yields the same key.
pub fn value_from_json(column: &str, json: &JsonValue) -> Result<Value, StorageError> {
    match json {
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| StorageError::Key(format!("Non-integer key column {}: {}", column, n))),
        other => Err(StorageError::Key(format!(
            "Unsupported key column {} value: {}",
            column, other
        ))),
    }
}

/// Build the full key of a row.
pub fn row_key(table: &TableSchema, row: &Row) -> Result<Vec<u8>, StorageError> {
    let mut key = Vec::with_capacity(64);
    for column in table.key_columns {
        let cell = row.get(*column).ok_or_else(|| {
            StorageError::InvalidInput(format!(
                "Row for {} is missing key column {}",
                table.cf, column
            ))
        })?;
        encode_component(&value_from_json(column, cell)?, &mut key)?;
    }
    Ok(key)
}

/// Build a key prefix from leading key column values.
pub fn prefix_key(values: &[&Value]) -> Result<Vec<u8>, StorageError> {
    let mut key = Vec::with_capacity(64);
    for value in values {
        encode_component(value, &mut key)?;
    }
    Ok(key)
}
