//! Handlers for toolbox-talk endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/toolbox/topics` | `?include_inactive=true` also returns retired topics |
//! | `GET`    | `/toolbox/topics/{id}` | Single topic with its content |
//! | `GET`    | `/establishments/{id}/toolbox-talks` | Talks of one establishment |
//! | `POST`   | `/establishments/{id}/toolbox-talks` | Body: [`NewToolboxTalk`]; returns 201 |
//! | `GET`    | `/toolbox-talks/{id}` | Single talk |
//! | `POST`   | `/toolbox-talks/{id}/complete` | Marks the talk completed |
//! | `GET`    | `/toolbox-talks/{id}/attendees` | Attendance sheet |
//! | `POST`   | `/toolbox-talks/{id}/attendees` | Body: [`NewAttendee`]; returns 201 |
//! | `POST`   | `/attendees/{id}/sign` | Body: [`Signature`]; stamps `signed_at` |
//! | `DELETE` | `/attendees/{id}` | 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use safety_core::{
  store::SafetyStore,
  toolbox::{Attendee, NewAttendee, NewToolboxTalk, Signature, TalkTopic, ToolboxTalk},
};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState, establishments, extract::{Json, Path, Query}};

async fn require_talk<S: SafetyStore>(store: &S, id: i64) -> ApiResult<ToolboxTalk> {
  store
    .get_talk(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("toolbox talk", id))
}

// ─── Topics ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TopicParams {
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /toolbox/topics[?include_inactive=true]`
pub async fn list_topics<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<TopicParams>,
) -> ApiResult<Json<Vec<TalkTopic>>> {
  let topics = state
    .store
    .list_topics(params.include_inactive)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(topics))
}

/// `GET /toolbox/topics/{id}`
pub async fn get_topic<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<TalkTopic>> {
  let topic = state
    .store
    .get_topic(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("topic", id))?;
  Ok(Json(topic))
}

// ─── Talks ────────────────────────────────────────────────────────────────────

/// `GET /establishments/{id}/toolbox-talks`
pub async fn list_talks<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(establishment_id): Path<i64>,
) -> ApiResult<Json<Vec<ToolboxTalk>>> {
  establishments::require(&*state.store, establishment_id).await?;
  let talks = state
    .store
    .list_talks(establishment_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(talks))
}

/// `POST /establishments/{id}/toolbox-talks`
pub async fn create_talk<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(establishment_id): Path<i64>,
  Json(body): Json<NewToolboxTalk>,
) -> ApiResult<impl IntoResponse> {
  let talk = state
    .store
    .create_talk(establishment_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(talk)))
}

/// `GET /toolbox-talks/{id}`
pub async fn get_talk<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<ToolboxTalk>> {
  Ok(Json(require_talk(&*state.store, id).await?))
}

/// `POST /toolbox-talks/{id}/complete`
pub async fn complete_talk<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<Json<ToolboxTalk>> {
  let talk = state
    .store
    .complete_talk(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(talk))
}

// ─── Attendees ────────────────────────────────────────────────────────────────

/// `GET /toolbox-talks/{id}/attendees`
pub async fn list_attendees<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(talk_id): Path<i64>,
) -> ApiResult<Json<Vec<Attendee>>> {
  require_talk(&*state.store, talk_id).await?;
  let attendees = state
    .store
    .list_attendees(talk_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(attendees))
}

/// `POST /toolbox-talks/{id}/attendees`
pub async fn add_attendee<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(talk_id): Path<i64>,
  Json(body): Json<NewAttendee>,
) -> ApiResult<impl IntoResponse> {
  let attendee = state
    .store
    .add_attendee(talk_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(attendee)))
}

/// `POST /attendees/{id}/sign`
pub async fn sign<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<Signature>,
) -> ApiResult<Json<Attendee>> {
  let attendee = state
    .store
    .sign_attendee(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(attendee))
}

/// `DELETE /attendees/{id}`
pub async fn delete_attendee<S: SafetyStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
  state
    .store
    .delete_attendee(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
