//! [`SqliteStore`] — the SQLite implementation of [`EntityStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tabula_core::{
  entity::{Entity, Record, RecordId},
  store::EntityStore,
};

use crate::{
  codec::{decode_row, encode_value},
  Error, Result,
};

/// Applied to every connection before use.
const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode = WAL;";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tabula store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The same
/// handle serves schema reconciliation and request handling.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_connection().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_connection().await?;
    Ok(store)
  }

  async fn init_connection(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Whether a table named exactly `table` exists.
  pub async fn table_exists(&self, table: &str) -> Result<bool> {
    let table = table.to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
              rusqlite::params![table],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  /// The live column names of `table`, lower-cased, in table order. Empty if
  /// the table does not exist.
  pub async fn column_names(&self, table: &str) -> Result<Vec<String>> {
    let table = table.to_owned();

    let names = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let names = stmt
          .query_map(rusqlite::params![table], |row| row.get::<_, String>(0))?
          .map(|name| name.map(|n| n.to_lowercase()))
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
      })
      .await?;
    Ok(names)
  }

  /// Run a single schema-changing statement. Only the first statement in
  /// `sql` is prepared; any trailing text never reaches the database.
  pub(crate) async fn execute_ddl(&self, sql: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────

fn insert_sql(entity: &Entity) -> String {
  let placeholders = (1..=entity.columns.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "INSERT INTO {} ({}) VALUES ({placeholders})",
    entity.table,
    entity.columns.join(", ")
  )
}

fn update_sql(entity: &Entity) -> String {
  let assignments = entity
    .columns
    .iter()
    .enumerate()
    .map(|(i, c)| format!("{c} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "UPDATE {} SET {assignments} WHERE id = ?{}",
    entity.table,
    entity.columns.len() + 1
  )
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

impl EntityStore for SqliteStore {
  type Error = Error;

  async fn create<'a>(
    &'a self,
    entity: &'static Entity,
    fields: &'a Record,
  ) -> Result<RecordId> {
    let sql = insert_sql(entity);
    let values: Vec<_> = entity
      .column_values(fields)
      .iter()
      .map(encode_value)
      .collect();

    let rowid = self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(RecordId(rowid))
  }

  async fn list_all(&self, entity: &'static Entity) -> Result<Vec<Record>> {
    let sql = format!("SELECT * FROM {}", entity.table);

    let records = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();
        let rows = stmt
          .query_map([], |row| decode_row(row, &columns))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(records)
  }

  async fn get_by_id(
    &self,
    entity: &'static Entity,
    id: RecordId,
  ) -> Result<Option<Record>> {
    let sql = format!("SELECT * FROM {} WHERE id = ?1", entity.table);

    let record = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();
        Ok(
          stmt
            .query_row(rusqlite::params![id.get()], |row| decode_row(row, &columns))
            .optional()?,
        )
      })
      .await?;

    Ok(record)
  }

  async fn update_by_id<'a>(
    &'a self,
    entity: &'static Entity,
    id: RecordId,
    fields: &'a Record,
  ) -> Result<bool> {
    let sql = update_sql(entity);
    let mut values: Vec<_> = entity
      .column_values(fields)
      .iter()
      .map(encode_value)
      .collect();
    values.push(rusqlite::types::Value::Integer(id.get()));

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(values))?))
      .await?;

    Ok(changed > 0)
  }

  async fn delete_by_id(&self, entity: &'static Entity, id: RecordId) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", entity.table);

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![id.get()])?))
      .await?;

    Ok(changed > 0)
  }
}

#[cfg(test)]
mod tests {
  use tabula_core::entity::{POSTS, USERS};

  use super::*;

  #[test]
  fn insert_binds_every_writable_column() {
    assert_eq!(
      insert_sql(&USERS),
      "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)"
    );
  }

  #[test]
  fn update_binds_id_last() {
    assert_eq!(
      update_sql(&POSTS),
      "UPDATE posts SET title = ?1, body = ?2 WHERE id = ?3"
    );
  }
}
