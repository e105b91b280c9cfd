//! CSV incident importer.
//!
//! Turns an arbitrary spreadsheet export into incident records under a
//! caller-chosen column mapping. Row-level failures are collected and the
//! remaining rows still import; only a bad mapping, an unknown establishment
//! or a store failure stops the run.
//!
//! # Quick start
//!
//! ```no_run
//! use safety_import::{ColumnMapping, CsvTable};
//!
//! let csv = "Employee Name,Incident Date\nJane Doe,2026-03-01\n";
//! let table = CsvTable::parse(csv.as_bytes()).unwrap();
//! let mapping = ColumnMapping::auto(&table.headers);
//! mapping.validate(&table.headers).unwrap();
//! ```

mod convert;
pub mod error;
mod mapping;
mod table;

pub use convert::{
  DEFAULT_DESCRIPTION,
  RowContext,
  convert_rows,
  parse_bool,
  parse_date,
  parse_days,
};
pub use error::{ImportError, Result, RowError};
pub use mapping::{CanonicalField, ColumnMapping};
use safety_core::store::{SafetyStore, StoreError};
use serde::{Deserialize, Serialize};
pub use table::{CsvPreview, CsvTable, DEFAULT_SAMPLE_ROWS, preview};
use tracing::{info, warn};

// ─── Public types ────────────────────────────────────────────────────────────

/// Caller choices for one import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
  /// Absent means [`ColumnMapping::auto`] against the file headers.
  #[serde(default)]
  pub mapping:             Option<ColumnMapping>,
  /// Applied to rows with no `location` value.
  #[serde(default)]
  pub default_location_id: Option<i64>,
}

/// Outcome of an import run: rows persisted, plus one error per rejected row
/// in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
  pub imported: usize,
  pub errors:   Vec<RowError>,
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Convert and persist every row of `table` under `establishment_id`.
///
/// Rows are written one at a time; a store failure aborts with
/// [`ImportError::Store`] and leaves earlier rows in place.
pub async fn import<S: SafetyStore>(
  store: &S,
  establishment_id: i64,
  table: &CsvTable,
  mapping: &ColumnMapping,
  default_location_id: Option<i64>,
) -> Result<ImportReport> {
  mapping.validate(&table.headers)?;

  store
    .get_establishment(establishment_id)
    .await
    .map_err(|e| store_error(0, e))?
    .ok_or(ImportError::EstablishmentNotFound(establishment_id))?;

  let locations = store
    .list_locations(establishment_id)
    .await
    .map_err(|e| store_error(0, e))?;

  if let Some(id) = default_location_id {
    if !locations.iter().any(|l| l.id == id) {
      return Err(ImportError::LocationNotFound(id));
    }
  }

  let ctx = RowContext {
    establishment_id,
    default_location_id,
    locations,
  };

  let mut report = ImportReport::default();
  for (i, row) in convert_rows(table, mapping, &ctx).into_iter().enumerate() {
    let incident = match row {
      Ok(incident) => incident,
      Err(e) => {
        warn!(establishment_id, row = e.row, reason = %e.reason, "skipping CSV row");
        report.errors.push(e);
        continue;
      }
    };

    match store.create_incident(incident).await {
      Ok(_) => report.imported += 1,
      // Validation inside the store counts against the row.
      Err(e) if e.domain().is_some() => {
        let e = RowError::new(i + 1, e.to_string());
        warn!(establishment_id, row = e.row, reason = %e.reason, "skipping CSV row");
        report.errors.push(e);
      }
      Err(e) => return Err(store_error(report.imported, e)),
    }
  }

  info!(
    establishment_id,
    imported = report.imported,
    failed = report.errors.len(),
    "CSV import finished"
  );
  Ok(report)
}

fn store_error<E: StoreError>(imported: usize, e: E) -> ImportError {
  ImportError::Store {
    imported,
    source: Box::new(e),
  }
}
