//! Handlers for corrective-action endpoints.
//!
//! Every action is served as an [`ActionView`]: the stored record plus its
//! status derived against the state's `today`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/incidents/{id}/corrective-actions` | Actions of one incident |
//! | `POST`   | `/incidents/{id}/corrective-actions` | Body: [`NewCorrectiveAction`]; returns 201 |
//! | `PATCH`  | `/corrective-actions/{id}` | Body: [`CorrectiveActionPatch`]; `"overdue"` is rejected |
//! | `DELETE` | `/corrective-actions/{id}` | 204 |
//! | `GET`    | `/establishments/{id}/corrective-actions/summary` | [`ActionSummary`] |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use safety_core::{
  action::{ActionView, CorrectiveActionPatch, NewCorrectiveAction},
  store::SafetyStore,
};
use safety_report::{ActionSummary, fetch};

use crate::{ApiError, ApiResult, AppState, extract::{Json, Path}, incidents};

/// `GET /incidents/{id}/corrective-actions`
pub async fn list<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(incident_id): Path<i64>,
) -> ApiResult<Json<Vec<ActionView>>> {
  incidents::require(&*state.store, incident_id).await?;
  let today = state.today();
  let actions = state
    .store
    .list_corrective_actions(incident_id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|a| ActionView::new(a, today))
    .collect();
  Ok(Json(actions))
}

/// `POST /incidents/{id}/corrective-actions`
pub async fn create<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(incident_id): Path<i64>,
  Json(body): Json<NewCorrectiveAction>,
) -> ApiResult<impl IntoResponse> {
  let created = state
    .store
    .create_corrective_action(incident_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(ActionView::new(created, state.today()))))
}

/// `PATCH /corrective-actions/{id}`
pub async fn update<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<CorrectiveActionPatch>,
) -> ApiResult<Json<ActionView>> {
  let today = state.today();
  let mut action = state
    .store
    .get_corrective_action(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("corrective action", id))?;
  patch.apply(&mut action, today)?;
  let updated = state
    .store
    .update_corrective_action(action)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ActionView::new(updated, today)))
}

/// `DELETE /corrective-actions/{id}`
pub async fn delete<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
  state
    .store
    .delete_corrective_action(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /establishments/{id}/corrective-actions/summary`
pub async fn summary<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(establishment_id): Path<i64>,
) -> ApiResult<Json<ActionSummary>> {
  let summary =
    fetch::action_summary(&*state.store, establishment_id, state.today()).await?;
  Ok(Json(summary))
}
