//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use safety_core::store::StoreError;
use safety_import::ImportError;
use safety_report::ReportError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn not_found(entity: &str, id: i64) -> Self {
    Self::NotFound(format!("{entity} {id} not found"))
  }

  /// Classify a store failure: missing rows become 404, domain rejections
  /// 422, anything else 500.
  pub fn store<E: StoreError>(e: E) -> Self {
    if e.is_not_found() {
      return Self::NotFound(e.to_string());
    }
    if let Some(domain) = e.domain() {
      return Self::from_domain(domain);
    }
    Self::Store(Box::new(e))
  }

  fn from_domain(e: &safety_core::Error) -> Self {
    match e {
      safety_core::Error::NotFound { .. } => Self::NotFound(e.to_string()),
      _ => Self::Unprocessable(e.to_string()),
    }
  }
}

impl From<safety_core::Error> for ApiError {
  fn from(e: safety_core::Error) -> Self { Self::from_domain(&e) }
}

impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self {
    match e {
      JsonRejection::JsonDataError(_) => Self::Unprocessable(e.body_text()),
      _ => Self::BadRequest(e.body_text()),
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(e: PathRejection) -> Self { Self::BadRequest(e.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(e: QueryRejection) -> Self { Self::BadRequest(e.body_text()) }
}

impl From<ImportError> for ApiError {
  fn from(e: ImportError) -> Self {
    match e {
      ImportError::Csv(_) => Self::BadRequest(e.to_string()),
      ImportError::MissingRequired(_) | ImportError::UnknownColumn { .. } => {
        Self::Unprocessable(e.to_string())
      }
      ImportError::EstablishmentNotFound(_) | ImportError::LocationNotFound(_) => {
        Self::NotFound(e.to_string())
      }
      ImportError::Store { .. } => Self::Store(Box::new(e)),
    }
  }
}

impl From<ReportError> for ApiError {
  fn from(e: ReportError) -> Self {
    match e {
      ReportError::EstablishmentNotFound(_) | ReportError::IncidentNotFound(_) => {
        Self::NotFound(e.to_string())
      }
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
