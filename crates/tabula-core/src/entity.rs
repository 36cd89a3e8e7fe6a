//! The record types served over REST and the identifiers that address them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A stored row, keyed by column name.
pub type Record = Map<String, Value>;

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A table exposed through the entity store.
///
/// Every entity is keyed by an integer `id` column; `columns` are the fields a
/// client may write.
#[derive(Debug, PartialEq, Eq)]
pub struct Entity {
  /// Table name, also the URL path segment.
  pub table:   &'static str,
  /// Capitalised singular noun used in response messages.
  pub label:   &'static str,
  pub columns: &'static [&'static str],
}

pub const USERS: Entity = Entity {
  table:   "users",
  label:   "User",
  columns: &["username", "email", "password"],
};

pub const POSTS: Entity = Entity {
  table:   "posts",
  label:   "Post",
  columns: &["title", "body"],
};

/// Every entity served by the API.
pub static ENTITIES: [&Entity; 2] = [&USERS, &POSTS];

impl Entity {
  /// Find the entity served under `table`.
  pub fn lookup(table: &str) -> Option<&'static Entity> {
    ENTITIES.iter().copied().find(|e| e.table == table)
  }

  /// Values for each writable column in column order. Absent fields are
  /// `null`; fields that are not columns of this entity are ignored.
  pub fn column_values(&self, fields: &Record) -> Vec<Value> {
    self
      .columns
      .iter()
      .map(|c| fields.get(*c).cloned().unwrap_or(Value::Null))
      .collect()
  }
}

/// Interpret a request body as record fields.
pub fn fields_from_value(value: Value) -> Result<Record> {
  match value {
    Value::Object(map) => Ok(map),
    _ => Err(Error::FieldsNotAnObject),
  }
}

// ─── RecordId ────────────────────────────────────────────────────────────────

/// The integer primary key of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
  pub fn get(self) -> i64 { self.0 }
}

impl FromStr for RecordId {
  type Err = Error;

  /// Surrounding whitespace is ignored; anything else that is not an `i64` is
  /// rejected.
  fn from_str(s: &str) -> Result<Self> {
    s.trim()
      .parse::<i64>()
      .map(RecordId)
      .map_err(|_| Error::InvalidId(s.to_owned()))
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<i64> for RecordId {
  fn from(id: i64) -> Self { RecordId(id) }
}
