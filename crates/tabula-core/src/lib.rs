//! Core types and trait definitions for Tabula.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the table descriptors that drive schema reconciliation, the entity
//! definitions served over REST, and the [`store::EntityStore`] abstraction
//! that storage backends implement.

pub mod descriptor;
pub mod entity;
pub mod error;
pub mod loader;
pub mod reconcile;
pub mod store;

pub use error::{Error, Result};
