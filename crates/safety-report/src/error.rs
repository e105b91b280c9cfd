//! Error types for the regulatory reports.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("establishment {0} not found")]
  EstablishmentNotFound(i64),

  #[error("incident {0} not found")]
  IncidentNotFound(i64),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
