//! Error types for the CSV importer.

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::mapping::CanonicalField;

/// Failures that stop an import before or during persistence.
#[derive(Debug, Error)]
pub enum ImportError {
  #[error("required field {0} is not mapped to a column")]
  MissingRequired(CanonicalField),

  #[error("field {field} is mapped to column {header:?}, which is not in the file")]
  UnknownColumn {
    field:  CanonicalField,
    header: String,
  },

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("establishment {0} not found")]
  EstablishmentNotFound(i64),

  #[error("location {0} not found in this establishment")]
  LocationNotFound(i64),

  #[error("store error after {imported} rows were imported: {source}")]
  Store {
    imported: usize,
    #[source]
    source:   Box<dyn std::error::Error + Send + Sync>,
  },
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;

/// A single rejected data row.
///
/// `row` is 1-based and does not count the header line. Serializes as its
/// message, e.g. `"Row 2: missing employee name"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}: {reason}")]
pub struct RowError {
  pub row:    usize,
  pub reason: String,
}

impl RowError {
  pub fn new(row: usize, reason: impl Into<String>) -> Self {
    Self { row, reason: reason.into() }
  }
}

impl Serialize for RowError {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn row_error_serializes_as_its_message() {
    let e = RowError::new(1, "missing employee name");
    assert_eq!(
      serde_json::to_value(&e).unwrap(),
      serde_json::json!("Row 1: missing employee name")
    );
  }
}
