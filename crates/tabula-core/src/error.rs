//! Error types for `tabula-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A path identifier that does not parse as an integer.
  #[error("invalid record id: {0:?}")]
  InvalidId(String),

  /// A request body that is not a JSON object.
  #[error("record fields must be a JSON object")]
  FieldsNotAnObject,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
