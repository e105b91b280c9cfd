//! Handlers for job-safety analysis endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/jsa/templates` | Built-in templates |
//! | `GET`  | `/establishments/{id}/jsa` | Analyses of one establishment |
//! | `POST` | `/establishments/{id}/jsa` | Body: [`NewJsaInstance`]; returns 201 |
//! | `GET`  | `/jsa/{id}` | Single analysis |
//! | `PUT`  | `/jsa/{id}/status` | Body: [`JsaStatusUpdate`] |
//! | `GET`  | `/jsa/{id}/steps` | Steps in order |
//! | `POST` | `/jsa/{id}/steps` | Body: [`NewJsaStep`]; returns 201 |
//! | `POST` | `/jsa-steps/{id}/toggle` | Flips the completed flag |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use safety_core::{
  jsa::{JsaInstance, JsaStatusUpdate, JsaStep, JsaTemplate, NewJsaInstance, NewJsaStep},
  store::SafetyStore,
};

use crate::{ApiError, ApiResult, AppState, establishments, extract::{Json, Path}};

async fn require<S: SafetyStore>(store: &S, id: i64) -> ApiResult<JsaInstance> {
  store
    .get_jsa(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("job safety analysis", id))
}

/// `GET /jsa/templates`
pub async fn templates<S: SafetyStore>(
  State(state): State<AppState<S>>,
) -> ApiResult<Json<Vec<JsaTemplate>>> {
  let templates = state
    .store
    .list_jsa_templates()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(templates))
}

/// `GET /establishments/{id}/jsa`
pub async fn list<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(establishment_id): Path<i64>,
) -> ApiResult<Json<Vec<JsaInstance>>> {
  establishments::require(&*state.store, establishment_id).await?;
  let jsas = state
    .store
    .list_jsas(establishment_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(jsas))
}

/// `POST /establishments/{id}/jsa`
pub async fn create<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(establishment_id): Path<i64>,
  Json(body): Json<NewJsaInstance>,
) -> ApiResult<impl IntoResponse> {
  let jsa = state
    .store
    .create_jsa(establishment_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(jsa)))
}

/// `GET /jsa/{id}`
pub async fn get_one<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<JsaInstance>> {
  Ok(Json(require(&*state.store, id).await?))
}

/// `PUT /jsa/{id}/status`
pub async fn set_status<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<JsaStatusUpdate>,
) -> ApiResult<Json<JsaInstance>> {
  let jsa = state
    .store
    .set_jsa_status(id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(jsa))
}

/// `GET /jsa/{id}/steps`
pub async fn list_steps<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<Vec<JsaStep>>> {
  require(&*state.store, id).await?;
  let steps = state
    .store
    .list_jsa_steps(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(steps))
}

/// `POST /jsa/{id}/steps`
pub async fn add_step<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewJsaStep>,
) -> ApiResult<impl IntoResponse> {
  let step = state
    .store
    .add_jsa_step(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(step)))
}

/// `POST /jsa-steps/{id}/toggle`
pub async fn toggle_step<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<JsaStep>> {
  let step = state
    .store
    .toggle_jsa_step(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(step))
}
