//! Handlers for root-cause analysis endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/incidents/{id}/rca` | Sessions of one incident |
//! | `POST`   | `/incidents/{id}/rca` | Body: [`NewRcaSession`]; returns 201 |
//! | `GET`    | `/rca/{id}` | Single session |
//! | `DELETE` | `/rca/{id}` | Cascades to steps and fishbone; 204 |
//! | `POST`   | `/rca/{id}/complete` | Body: [`CompleteRca`] |
//! | `GET`    | `/rca/{id}/five-whys` | Steps in order |
//! | `POST`   | `/rca/{id}/five-whys` | Body: [`NewFiveWhysStep`]; returns 201 |
//! | `PATCH`  | `/five-whys/{id}` | Body: [`FiveWhysStepUpdate`] |
//! | `GET`    | `/rca/{id}/fishbone` | Categories with their causes |
//! | `POST`   | `/rca/{id}/fishbone` | Body: [`NewFishboneCategory`]; returns 201 |
//! | `POST`   | `/fishbone/{category_id}/causes` | Body: [`NewFishboneCause`]; returns 201 |
//! | `PATCH`  | `/fishbone/causes/{id}` | Body: [`FishboneCausePatch`] |
//! | `DELETE` | `/fishbone/causes/{id}` | 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use safety_core::{
  rca::{
    CompleteRca,
    FishboneCategory,
    FishboneCause,
    FishboneCausePatch,
    FiveWhysStep,
    FiveWhysStepUpdate,
    NewFishboneCategory,
    NewFishboneCause,
    NewFiveWhysStep,
    NewRcaSession,
    RcaSession,
  },
  store::SafetyStore,
};

use crate::{ApiError, ApiResult, AppState, extract::{Json, Path}, incidents};

async fn require<S: SafetyStore>(store: &S, id: i64) -> ApiResult<RcaSession> {
  store
    .get_rca_session(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("rca session", id))
}

// ─── Sessions ─────────────────────────────────────────────────────────────────

/// `GET /incidents/{id}/rca`
pub async fn list<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(incident_id): Path<i64>,
) -> ApiResult<Json<Vec<RcaSession>>> {
  incidents::require(&*state.store, incident_id).await?;
  let sessions = state
    .store
    .list_rca_sessions(incident_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

/// `POST /incidents/{id}/rca`
pub async fn create<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(incident_id): Path<i64>,
  Json(body): Json<NewRcaSession>,
) -> ApiResult<impl IntoResponse> {
  let session = state
    .store
    .create_rca_session(incident_id, body.method)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /rca/{id}`
pub async fn get_one<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<RcaSession>> {
  Ok(Json(require(&*state.store, id).await?))
}

/// `POST /rca/{id}/complete`
pub async fn complete<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<CompleteRca>,
) -> ApiResult<Json<RcaSession>> {
  body.validate()?;
  let session = state
    .store
    .complete_rca_session(id, body.root_cause_summary)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id, "root-cause analysis completed");
  Ok(Json(session))
}

/// `DELETE /rca/{id}`
pub async fn delete<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
  state
    .store
    .delete_rca_session(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Five whys ────────────────────────────────────────────────────────────────

/// `GET /rca/{id}/five-whys`
pub async fn list_steps<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<Vec<FiveWhysStep>>> {
  require(&*state.store, id).await?;
  let steps = state
    .store
    .list_five_whys_steps(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(steps))
}

/// `POST /rca/{id}/five-whys`
pub async fn add_step<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewFiveWhysStep>,
) -> ApiResult<impl IntoResponse> {
  let step = state
    .store
    .add_five_whys_step(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(step)))
}

/// `PATCH /five-whys/{id}`
pub async fn update_step<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<FiveWhysStepUpdate>,
) -> ApiResult<Json<FiveWhysStep>> {
  let step = state
    .store
    .update_five_whys_step(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(step))
}

// ─── Fishbone ─────────────────────────────────────────────────────────────────

/// `GET /rca/{id}/fishbone`
pub async fn list_fishbone<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<Vec<FishboneCategory>>> {
  require(&*state.store, id).await?;
  let categories = state
    .store
    .list_fishbone(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(categories))
}

/// `POST /rca/{id}/fishbone`
pub async fn add_category<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewFishboneCategory>,
) -> ApiResult<impl IntoResponse> {
  let category = state
    .store
    .add_fishbone_category(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(category)))
}

/// `POST /fishbone/{category_id}/causes`
pub async fn add_cause<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(category_id): Path<i64>,
  Json(body): Json<NewFishboneCause>,
) -> ApiResult<impl IntoResponse> {
  let cause = state
    .store
    .add_fishbone_cause(category_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(cause)))
}

/// `PATCH /fishbone/causes/{id}`
pub async fn update_cause<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<FishboneCausePatch>,
) -> ApiResult<Json<FishboneCause>> {
  let mut cause = state
    .store
    .get_fishbone_cause(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("fishbone cause", id))?;
  patch.apply(&mut cause)?;
  let updated = state
    .store
    .update_fishbone_cause(cause)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /fishbone/causes/{id}`
pub async fn delete_cause<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
  state
    .store
    .delete_fishbone_cause(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
