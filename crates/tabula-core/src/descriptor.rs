//! Declarative table descriptions used to drive schema reconciliation.
//!
//! A descriptor file is a JSON array of columns:
//!
//! ```json
//! [
//!   { "name": "id",    "type": "INTEGER", "primary": true },
//!   { "name": "email", "type": "TEXT",    "unique": true }
//! ]
//! ```
//!
//! Column names are normalised to lower case everywhere they reach SQL, so a
//! table created from a descriptor and a column added to it later agree on
//! casing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Column ──────────────────────────────────────────────────────────────────

/// One described column of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
  pub name:    String,
  /// Storage-engine type name, passed through to SQL verbatim.
  #[serde(rename = "type")]
  pub ty:      String,
  #[serde(default)]
  pub primary: bool,
  #[serde(default)]
  pub unique:  bool,
}

impl ColumnDescriptor {
  pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
    Self {
      name:    name.into(),
      ty:      ty.into(),
      primary: false,
      unique:  false,
    }
  }

  pub fn primary(mut self) -> Self {
    self.primary = true;
    self
  }

  pub fn unique(mut self) -> Self {
    self.unique = true;
    self
  }

  /// The name this column is stored under.
  pub fn column_name(&self) -> String { self.name.to_lowercase() }

  /// Render the column as it appears in `CREATE TABLE` and `ADD COLUMN`:
  /// `<name> <type>[ PRIMARY KEY][ UNIQUE]`.
  pub fn definition(&self) -> String {
    let mut def = format!("{} {}", self.column_name(), self.ty);
    if self.primary {
      def.push_str(" PRIMARY KEY");
    }
    if self.unique {
      def.push_str(" UNIQUE");
    }
    def
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// The desired shape of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
  pub name:    String,
  pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
  /// Build a descriptor, checking that the table and column names are plain
  /// identifiers and that no column is described twice.
  pub fn new(
    name: impl Into<String>,
    columns: Vec<ColumnDescriptor>,
  ) -> Result<Self, DescriptorError> {
    let name = name.into();
    if !is_identifier(&name) {
      return Err(DescriptorError::InvalidTableName(name));
    }
    if columns.is_empty() {
      return Err(DescriptorError::NoColumns(name));
    }

    let mut seen = HashSet::new();
    for column in &columns {
      if !is_identifier(&column.name) {
        return Err(DescriptorError::InvalidColumnName {
          table:  name,
          column: column.name.clone(),
        });
      }
      if column.ty.trim().is_empty() {
        return Err(DescriptorError::MissingType {
          table:  name,
          column: column.name.clone(),
        });
      }
      if !is_type_name(&column.ty) {
        return Err(DescriptorError::InvalidType {
          table:  name,
          column: column.name.clone(),
          ty:     column.ty.clone(),
        });
      }
      if !seen.insert(column.column_name()) {
        return Err(DescriptorError::DuplicateColumn {
          table:  name,
          column: column.name.clone(),
        });
      }
    }

    Ok(Self { name, columns })
  }

  /// The `CREATE TABLE` statement for this descriptor, columns in
  /// descriptor order.
  pub fn create_statement(&self) -> String {
    let columns = self
      .columns
      .iter()
      .map(ColumnDescriptor::definition)
      .collect::<Vec<_>>()
      .join(", ");
    format!("CREATE TABLE {} ({columns});", self.name)
  }

  /// The `ALTER TABLE ... ADD COLUMN` statement for one of this table's
  /// columns.
  pub fn add_column_statement(&self, column: &ColumnDescriptor) -> String {
    format!("ALTER TABLE {} ADD COLUMN {};", self.name, column.definition())
  }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A column type such as `TEXT`, `VARCHAR(255)` or `DECIMAL(10, 2)`: words
/// and numbers, with commas only inside balanced parentheses.
pub fn is_type_name(s: &str) -> bool {
  let mut depth = 0usize;
  for c in s.chars() {
    match c {
      '(' => depth += 1,
      ')' => match depth.checked_sub(1) {
        Some(d) => depth = d,
        None => return false,
      },
      ',' if depth == 0 => return false,
      ',' | ' ' | '_' | '.' | '+' => {}
      c if c.is_ascii_alphanumeric() => {}
      _ => return false,
    }
  }
  depth == 0
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a descriptor (or the directory holding them) could not be used.
#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("cannot read descriptor directory {path}: {source}")]
  Directory {
    path:   String,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot read descriptor {path}: {source}")]
  Read {
    path:   String,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed descriptor {path}: {source}")]
  Parse {
    path:   String,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid table name {0:?}")]
  InvalidTableName(String),

  #[error("table {0} describes no columns")]
  NoColumns(String),

  #[error("invalid column name {column:?} in table {table}")]
  InvalidColumnName { table: String, column: String },

  #[error("column {column} in table {table} has no type")]
  MissingType { table: String, column: String },

  #[error("column {column} in table {table} has unsupported type {ty:?}")]
  InvalidType {
    table:  String,
    column: String,
    ty:     String,
  },

  #[error("column {column} is described twice in table {table}")]
  DuplicateColumn { table: String, column: String },

  #[error("table {table} is described by both {first} and {second}")]
  DuplicateTable {
    table:  String,
    first:  String,
    second: String,
  },
}
