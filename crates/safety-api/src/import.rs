//! Handlers for CSV import.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/import/preview` | Body: raw CSV text; returns headers, sample rows and a suggested mapping |
//! | `POST` | `/establishments/{id}/import` | Body: [`ImportBody`]; returns the [`ImportReport`] |

use axum::extract::State;
use safety_core::store::SafetyStore;
use safety_import::{
  ColumnMapping,
  CsvPreview,
  CsvTable,
  DEFAULT_SAMPLE_ROWS,
  ImportReport,
  ImportRequest,
};
use serde::Deserialize;

use crate::{ApiResult, AppState, extract::{Json, Path}};

/// `POST /import/preview`
pub async fn preview(body: String) -> ApiResult<Json<CsvPreview>> {
  let table = CsvTable::parse(body.as_bytes())?;
  Ok(Json(safety_import::preview(&table, DEFAULT_SAMPLE_ROWS)))
}

/// JSON body accepted by `POST /establishments/{id}/import`.
#[derive(Debug, Deserialize)]
pub struct ImportBody {
  /// The whole file as text.
  pub csv:     String,
  #[serde(flatten)]
  pub request: ImportRequest,
}

/// `POST /establishments/{id}/import`
pub async fn run<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(establishment_id): Path<i64>,
  Json(body): Json<ImportBody>,
) -> ApiResult<Json<ImportReport>> {
  let table = CsvTable::parse(body.csv.as_bytes())?;
  let mapping = body
    .request
    .mapping
    .unwrap_or_else(|| ColumnMapping::auto(&table.headers));

  let report = safety_import::import(
    &*state.store,
    establishment_id,
    &table,
    &mapping,
    body.request.default_location_id,
  )
  .await?;
  Ok(Json(report))
}
