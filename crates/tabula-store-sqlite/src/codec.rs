//! Conversions between JSON field values and SQLite values.
//!
//! JSON scalars map onto their SQLite storage classes; booleans become
//! `0`/`1`, and arrays or objects are stored as compact JSON text. Reading
//! back, BLOBs surface as arrays of byte values and non-finite reals as `null`.

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::{Number, Value};
use tabula_core::entity::Record;

// ─── JSON → SQLite ───────────────────────────────────────────────────────────

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => {
      if let Some(i) = n.as_i64() {
        SqlValue::Integer(i)
      } else {
        // u64 beyond i64::MAX or a float.
        SqlValue::Real(n.as_f64().unwrap_or(f64::NAN))
      }
    }
    Value::String(s) => SqlValue::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
  }
}

// ─── SQLite → JSON ───────────────────────────────────────────────────────────

pub fn decode_value(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::from(i),
    ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
    ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
  }
}

/// Decode a whole row, pairing values with `columns` by position.
pub fn decode_row(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Record> {
  let mut record = Record::new();
  for (idx, name) in columns.iter().enumerate() {
    record.insert(name.clone(), decode_value(row.get_ref(idx)?));
  }
  Ok(record)
}
