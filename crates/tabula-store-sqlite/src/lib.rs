//! SQLite backend for Tabula.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Besides the CRUD operations of
//! [`tabula_core::store::EntityStore`], the store reconciles the database
//! schema against table descriptors (see [`SqliteStore::reconcile`]).

mod codec;
mod reconcile;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
