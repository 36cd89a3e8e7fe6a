//! JSON REST API for Tabula.
//!
//! Exposes an axum [`Router`] backed by any [`tabula_core::store::EntityStore`].
//! Every entity in [`tabula_core::entity::ENTITIES`] is served under its table
//! name; unknown names answer 404.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::serve(listener, tabula_api::api_router(store.clone())).await?;
//! ```

pub mod entities;
pub mod error;

use std::sync::Arc;

use axum::{Router, routing::get};
use tabula_core::store::EntityStore;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EntityStore + 'static,
{
  Router::new()
    .route("/{entity}", get(entities::list::<S>).post(entities::create::<S>))
    .route(
      "/{entity}/{id}",
      get(entities::get_one::<S>)
        .post(entities::update_one::<S>)
        .delete(entities::delete_one::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
