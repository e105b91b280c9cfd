//! Handlers for the regulatory reports, annual statistics and the dashboard.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/establishments/{id}/annual-stats/{year}` | `null` when nothing was entered |
//! | `PUT`  | `/establishments/{id}/annual-stats/{year}` | Body: [`AnnualStatsInput`]; replaces any previous figures |
//! | `GET`  | `/establishments/{id}/osha/{year}/log` | Form 300 rows |
//! | `GET`  | `/establishments/{id}/osha/{year}/log.csv` | Form 300 as a CSV attachment |
//! | `GET`  | `/establishments/{id}/osha/{year}/summary` | Form 300A summary |
//! | `GET`  | `/incidents/{id}/osha-301` | Form 301 for one incident |
//! | `GET`  | `/establishments/{id}/dashboard/{year}` | Dashboard figures and breakdowns |

use axum::{
  extract::State,
  http::header,
  response::IntoResponse,
};
use safety_core::{
  stats::{AnnualStats, AnnualStatsInput},
  store::SafetyStore,
  validate,
};
use safety_report::{
  AnnualSummary,
  Dashboard,
  IndividualReport,
  LogRow,
  fetch,
  write_log_csv,
};

use crate::{ApiError, ApiResult, AppState, establishments, extract::{Json, Path}};

// ─── Annual statistics ────────────────────────────────────────────────────────

/// `GET /establishments/{id}/annual-stats/{year}`
pub async fn get_stats<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path((id, year)): Path<(i64, i32)>,
) -> ApiResult<Json<Option<AnnualStats>>> {
  validate::year(year)?;
  establishments::require(&*state.store, id).await?;
  let stats = state
    .store
    .get_annual_stats(id, year)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stats))
}

/// `PUT /establishments/{id}/annual-stats/{year}`
pub async fn put_stats<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path((id, year)): Path<(i64, i32)>,
  Json(body): Json<AnnualStatsInput>,
) -> ApiResult<Json<AnnualStats>> {
  let stats = state
    .store
    .upsert_annual_stats(id, year, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stats))
}

// ─── Forms ────────────────────────────────────────────────────────────────────

/// `GET /establishments/{id}/osha/{year}/log`
pub async fn log<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path((id, year)): Path<(i64, i32)>,
) -> ApiResult<Json<Vec<LogRow>>> {
  validate::year(year)?;
  Ok(Json(fetch::osha_log(&*state.store, id, year).await?))
}

/// `GET /establishments/{id}/osha/{year}/log.csv`
pub async fn log_csv<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path((id, year)): Path<(i64, i32)>,
) -> ApiResult<impl IntoResponse> {
  validate::year(year)?;
  let est = establishments::require(&*state.store, id).await?;
  let rows = fetch::osha_log(&*state.store, id, year).await?;

  let mut body = Vec::new();
  write_log_csv(&rows, &mut body)?;

  let stem = validate::sanitize_filename(&format!("OSHA_300_{}_{year}", est.name))
    .replace(char::is_control, "");
  tracing::info!(establishment_id = id, year, rows = rows.len(), "log exported");
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{stem}.csv\""),
      ),
    ],
    body,
  ))
}

/// `GET /establishments/{id}/osha/{year}/summary`
pub async fn summary<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path((id, year)): Path<(i64, i32)>,
) -> ApiResult<Json<AnnualSummary>> {
  validate::year(year)?;
  Ok(Json(fetch::osha_summary(&*state.store, id, year).await?))
}

/// `GET /incidents/{id}/osha-301`
pub async fn individual<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<IndividualReport>> {
  Ok(Json(fetch::osha_301(&*state.store, id).await?))
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

/// `GET /establishments/{id}/dashboard/{year}`
pub async fn dashboard<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path((id, year)): Path<(i64, i32)>,
) -> ApiResult<Json<Dashboard>> {
  validate::year(year)?;
  let dashboard = fetch::dashboard(&*state.store, id, year, state.today()).await?;
  Ok(Json(dashboard))
}
