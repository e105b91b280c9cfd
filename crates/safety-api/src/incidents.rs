//! Handlers for `/incidents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/incidents` | Query: [`IncidentFilter`]; newest first |
//! | `POST`   | `/incidents` | Body: [`NewIncident`]; returns 201 with its case number |
//! | `GET`    | `/incidents/{id}` | Single incident |
//! | `PATCH`  | `/incidents/{id}` | Body: [`IncidentPatch`]; checks the status transition |
//! | `DELETE` | `/incidents/{id}` | Cascades to actions and RCA sessions; 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use safety_core::{
  incident::{Incident, IncidentFilter, IncidentPatch, NewIncident},
  store::SafetyStore,
};

use crate::{ApiError, ApiResult, AppState, extract::{Json, Path, Query}};

pub(crate) async fn require<S: SafetyStore>(store: &S, id: i64) -> ApiResult<Incident> {
  store
    .get_incident(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("incident", id))
}

/// `GET /incidents[?establishment_id=..][&status=..][&search=..]`
pub async fn list<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Query(filter): Query<IncidentFilter>,
) -> ApiResult<Json<Vec<Incident>>> {
  let incidents = state
    .store
    .list_incidents(filter)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(incidents))
}

/// `POST /incidents`
pub async fn create<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewIncident>,
) -> ApiResult<impl IntoResponse> {
  let created = state
    .store
    .create_incident(body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    id = created.id,
    case_number = created.case_number,
    case_year = created.case_year,
    "incident recorded"
  );
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /incidents/{id}`
pub async fn get_one<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<Incident>> {
  Ok(Json(require(&*state.store, id).await?))
}

/// `PATCH /incidents/{id}`
pub async fn update<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<IncidentPatch>,
) -> ApiResult<Json<Incident>> {
  let mut incident = require(&*state.store, id).await?;
  patch.apply(&mut incident)?;
  let updated = state
    .store
    .update_incident(incident)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /incidents/{id}`
pub async fn delete<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
  state
    .store
    .delete_incident(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
