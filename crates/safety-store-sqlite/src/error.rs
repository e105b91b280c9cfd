//! Error type for `safety-store-sqlite`.

use safety_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] safety_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value the domain type does not recognise.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: i64 },
}

impl Error {
  pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
    Self::NotFound { entity, id }
  }
}

impl StoreError for Error {
  fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::NotFound { .. } | Self::Core(safety_core::Error::NotFound { .. })
    )
  }

  fn domain(&self) -> Option<&safety_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
