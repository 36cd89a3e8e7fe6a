//! Handlers for the per-entity CRUD endpoints.
//!
//! `{entity}` is the table name of an [`Entity`] (`users` or `posts`).
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `GET`    | `/{entity}`       | All records |
//! | `POST`   | `/{entity}`       | Body: JSON object; returns 201 + new id |
//! | `GET`    | `/{entity}/{id}`  | 400 on non-integer id, 404 if not found |
//! | `POST`   | `/{entity}/{id}`  | Update; body: JSON object |
//! | `DELETE` | `/{entity}/{id}`  | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::{Value, json};
use tabula_core::{
  entity::{Entity, Record, RecordId, fields_from_value},
  store::EntityStore,
};

use crate::error::ApiError;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn resolve_entity(table: &str) -> Result<&'static Entity, ApiError> {
  Entity::lookup(table)
    .ok_or_else(|| ApiError::NotFound(format!("Unknown resource: {table}")))
}

fn noun(entity: &Entity) -> String { entity.label.to_lowercase() }

fn record_id(entity: &Entity, raw: &str) -> Result<RecordId, ApiError> {
  raw.parse().map_err(|_| {
    ApiError::BadRequest(format!(
      "Invalid {} ID. Must be a valid integer.",
      noun(entity)
    ))
  })
}

fn parse_fields(body: Result<Json<Value>, JsonRejection>) -> Result<Record, ApiError> {
  let Json(body) = body?;
  fields_from_value(body)
    .map_err(|_| ApiError::BadRequest("Request body must be a JSON object.".into()))
}

fn not_found(entity: &Entity) -> ApiError {
  ApiError::NotFound(format!("{} not found.", entity.label))
}

fn message(text: String) -> Json<Value> { Json(json!({ "message": text })) }

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /{entity}`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(table): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError>
where
  S: EntityStore,
{
  let entity = resolve_entity(&table)?;
  let records = store
    .list_all(entity)
    .await
    .map_err(|e| ApiError::store(format!("Error retrieving {}.", entity.table), e))?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /{entity}` — returns 201 + the new record id.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(table): Path<String>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EntityStore,
{
  let entity = resolve_entity(&table)?;
  let fields = parse_fields(body)?;
  let id = store
    .create(entity, &fields)
    .await
    .map_err(|e| ApiError::store(format!("Error creating the {}.", noun(entity)), e))?;

  tracing::debug!(table = entity.table, %id, "record created");
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message": format!("{} created successfully.", entity.label),
      "id":      id,
    })),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /{entity}/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((table, raw_id)): Path<(String, String)>,
) -> Result<Json<Record>, ApiError>
where
  S: EntityStore,
{
  let entity = resolve_entity(&table)?;
  let id = record_id(entity, &raw_id)?;
  let record = store
    .get_by_id(entity, id)
    .await
    .map_err(|e| ApiError::store(format!("Error retrieving {}.", noun(entity)), e))?
    .ok_or_else(|| not_found(entity))?;
  Ok(Json(record))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `POST /{entity}/{id}` — overwrites every writable field.
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path((table, raw_id)): Path<(String, String)>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: EntityStore,
{
  let entity = resolve_entity(&table)?;
  let id = record_id(entity, &raw_id)?;
  let fields = parse_fields(body)?;
  let updated = store
    .update_by_id(entity, id, &fields)
    .await
    .map_err(|e| ApiError::store(format!("Error updating {}.", noun(entity)), e))?;

  if !updated {
    return Err(not_found(entity));
  }
  Ok(message(format!("{} updated successfully.", entity.label)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /{entity}/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path((table, raw_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError>
where
  S: EntityStore,
{
  let entity = resolve_entity(&table)?;
  let id = record_id(entity, &raw_id)?;
  let deleted = store
    .delete_by_id(entity, id)
    .await
    .map_err(|e| ApiError::store(format!("Error deleting {}.", noun(entity)), e))?;

  if !deleted {
    return Err(not_found(entity));
  }
  Ok(message(format!("{} deleted successfully.", entity.label)))
}
