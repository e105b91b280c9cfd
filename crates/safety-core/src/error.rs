//! Error types for `safety-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation error: {0}")]
  Validation(String),

  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: i64 },

  #[error("cannot move {entity} from {from} to {to}")]
  InvalidTransition {
    entity: &'static str,
    from:   &'static str,
    to:     &'static str,
  },

  #[error("unrecognized {kind} label: {value:?}")]
  UnknownLabel { kind: &'static str, value: String },
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
