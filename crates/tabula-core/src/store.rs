//! The `EntityStore` trait.
//!
//! Implemented by storage backends (e.g. `tabula-store-sqlite`). The REST
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::entity::{Entity, Record, RecordId};

/// Generic single-statement CRUD over the tables described by [`Entity`].
///
/// Each method maps to exactly one SQL statement. "Not found" is never an
/// error: reads return `None` and writes return `false` when no row matched.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EntityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a record and return its new id. Fields missing from `fields` are
  /// stored as NULL.
  fn create<'a>(
    &'a self,
    entity: &'static Entity,
    fields: &'a Record,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + 'a;

  /// Every record of `entity`, in storage order.
  fn list_all(
    &self,
    entity: &'static Entity,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// A single record by id. Returns `None` if not found.
  fn get_by_id(
    &self,
    entity: &'static Entity,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// Overwrite every writable column of the record with `id`. Returns `false`
  /// if no record was affected.
  fn update_by_id<'a>(
    &'a self,
    entity: &'static Entity,
    id: RecordId,
    fields: &'a Record,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete the record with `id`. Returns `false` if no record was affected.
  fn delete_by_id(
    &self,
    entity: &'static Entity,
    id: RecordId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
