//! Handlers for `/establishments` and `/locations` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/establishments` | All establishments, by name |
//! | `POST`   | `/establishments` | Body: [`NewEstablishment`]; returns 201 |
//! | `GET`    | `/establishments/{id}` | Single establishment |
//! | `PATCH`  | `/establishments/{id}` | Body: [`EstablishmentPatch`] |
//! | `DELETE` | `/establishments/{id}` | Cascades to everything it owns; 204 |
//! | `GET`    | `/establishments/{id}/locations` | Locations of one establishment |
//! | `POST`   | `/establishments/{id}/locations` | Body: [`NewLocation`]; returns 201 |
//! | `GET`    | `/locations/{id}` | Single location |
//! | `PATCH`  | `/locations/{id}` | Body: [`LocationPatch`] |
//! | `DELETE` | `/locations/{id}` | 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use safety_core::{
  establishment::{
    Establishment,
    EstablishmentPatch,
    Location,
    LocationPatch,
    NewEstablishment,
    NewLocation,
  },
  store::SafetyStore,
};

use crate::{ApiError, ApiResult, AppState, extract::{Json, Path}};

/// Load an establishment or fail with 404. Nested list routes call this so an
/// unknown parent is not mistaken for an empty list.
pub(crate) async fn require<S: SafetyStore>(
  store: &S,
  id: i64,
) -> ApiResult<Establishment> {
  store
    .get_establishment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("establishment", id))
}

// ─── Establishments ───────────────────────────────────────────────────────────

/// `GET /establishments`
pub async fn list<S: SafetyStore>(
  State(state): State<AppState<S>>,
) -> ApiResult<Json<Vec<Establishment>>> {
  let all = state
    .store
    .list_establishments()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(all))
}

/// `POST /establishments`
pub async fn create<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewEstablishment>,
) -> ApiResult<impl IntoResponse> {
  let created = state
    .store
    .create_establishment(body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = created.id, name = %created.name, "establishment created");
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /establishments/{id}`
pub async fn get_one<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<Establishment>> {
  Ok(Json(require(&*state.store, id).await?))
}

/// `PATCH /establishments/{id}`
pub async fn update<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<EstablishmentPatch>,
) -> ApiResult<Json<Establishment>> {
  let mut est = require(&*state.store, id).await?;
  patch.apply(&mut est)?;
  let updated = state
    .store
    .update_establishment(est)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /establishments/{id}`
pub async fn delete<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
  state
    .store
    .delete_establishment(id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id, "establishment deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Locations ────────────────────────────────────────────────────────────────

/// `GET /establishments/{id}/locations`
pub async fn list_locations<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Location>>> {
  require(&*state.store, id).await?;
  let locations = state
    .store
    .list_locations(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(locations))
}

/// `POST /establishments/{id}/locations`
pub async fn create_location<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewLocation>,
) -> ApiResult<impl IntoResponse> {
  let created = state
    .store
    .create_location(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /locations/{id}`
pub async fn get_location<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<Location>> {
  let location = state
    .store
    .get_location(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("location", id))?;
  Ok(Json(location))
}

/// `PATCH /locations/{id}`
pub async fn update_location<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<LocationPatch>,
) -> ApiResult<Json<Location>> {
  let mut location = state
    .store
    .get_location(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("location", id))?;
  patch.apply(&mut location)?;
  let updated = state
    .store
    .update_location(location)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /locations/{id}`
pub async fn delete_location<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
  state
    .store
    .delete_location(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
