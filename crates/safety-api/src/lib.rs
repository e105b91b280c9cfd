//! JSON REST API for the safety tracker.
//!
//! Exposes an axum [`Router`] backed by any [`safety_core::store::SafetyStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", safety_api::api_router(AppState::new(store.clone())))
//! ```

pub mod actions;
pub mod error;
pub mod establishments;
pub mod extract;
pub mod import;
pub mod incidents;
pub mod jsa;
pub mod osha;
pub mod rca;
pub mod toolbox;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use chrono::{Local, NaiveDate};
use safety_core::store::SafetyStore;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  /// Pins "today" for overdue and days-since figures; `None` reads the local
  /// clock.
  pub today: Option<NaiveDate>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, today: None } }

  pub fn today(&self) -> NaiveDate {
    self.today.unwrap_or_else(|| Local::now().date_naive())
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      today: self.today,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: SafetyStore + 'static,
{
  Router::new()
    // Establishments & locations
    .route(
      "/establishments",
      get(establishments::list::<S>).post(establishments::create::<S>),
    )
    .route(
      "/establishments/{id}",
      get(establishments::get_one::<S>)
        .patch(establishments::update::<S>)
        .delete(establishments::delete::<S>),
    )
    .route(
      "/establishments/{id}/locations",
      get(establishments::list_locations::<S>)
        .post(establishments::create_location::<S>),
    )
    .route(
      "/locations/{id}",
      get(establishments::get_location::<S>)
        .patch(establishments::update_location::<S>)
        .delete(establishments::delete_location::<S>),
    )
    // Incidents
    .route("/incidents", get(incidents::list::<S>).post(incidents::create::<S>))
    .route(
      "/incidents/{id}",
      get(incidents::get_one::<S>)
        .patch(incidents::update::<S>)
        .delete(incidents::delete::<S>),
    )
    // Corrective actions
    .route(
      "/incidents/{id}/corrective-actions",
      get(actions::list::<S>).post(actions::create::<S>),
    )
    .route(
      "/corrective-actions/{id}",
      patch(actions::update::<S>).delete(actions::delete::<S>),
    )
    .route(
      "/establishments/{id}/corrective-actions/summary",
      get(actions::summary::<S>),
    )
    // Root-cause analysis
    .route("/incidents/{id}/rca", get(rca::list::<S>).post(rca::create::<S>))
    .route("/rca/{id}", get(rca::get_one::<S>).delete(rca::delete::<S>))
    .route("/rca/{id}/complete", post(rca::complete::<S>))
    .route(
      "/rca/{id}/five-whys",
      get(rca::list_steps::<S>).post(rca::add_step::<S>),
    )
    .route("/five-whys/{id}", patch(rca::update_step::<S>))
    .route(
      "/rca/{id}/fishbone",
      get(rca::list_fishbone::<S>).post(rca::add_category::<S>),
    )
    .route("/fishbone/{id}/causes", post(rca::add_cause::<S>))
    .route(
      "/fishbone/causes/{id}",
      patch(rca::update_cause::<S>).delete(rca::delete_cause::<S>),
    )
    // Regulatory reports
    .route(
      "/establishments/{id}/annual-stats/{year}",
      get(osha::get_stats::<S>).put(osha::put_stats::<S>),
    )
    .route("/establishments/{id}/osha/{year}/log", get(osha::log::<S>))
    .route("/establishments/{id}/osha/{year}/log.csv", get(osha::log_csv::<S>))
    .route("/establishments/{id}/osha/{year}/summary", get(osha::summary::<S>))
    .route("/incidents/{id}/osha-301", get(osha::individual::<S>))
    .route("/establishments/{id}/dashboard/{year}", get(osha::dashboard::<S>))
    // CSV import
    .route("/import/preview", post(import::preview))
    .route("/establishments/{id}/import", post(import::run::<S>))
    // Toolbox talks
    .route("/toolbox/topics", get(toolbox::list_topics::<S>))
    .route("/toolbox/topics/{id}", get(toolbox::get_topic::<S>))
    .route(
      "/establishments/{id}/toolbox-talks",
      get(toolbox::list_talks::<S>).post(toolbox::create_talk::<S>),
    )
    .route("/toolbox-talks/{id}", get(toolbox::get_talk::<S>))
    .route("/toolbox-talks/{id}/complete", post(toolbox::complete_talk::<S>))
    .route(
      "/toolbox-talks/{id}/attendees",
      get(toolbox::list_attendees::<S>).post(toolbox::add_attendee::<S>),
    )
    .route("/attendees/{id}/sign", post(toolbox::sign::<S>))
    .route("/attendees/{id}", axum::routing::delete(toolbox::delete_attendee::<S>))
    // Job-safety analyses
    .route("/jsa/templates", get(jsa::templates::<S>))
    .route(
      "/establishments/{id}/jsa",
      get(jsa::list::<S>).post(jsa::create::<S>),
    )
    .route("/jsa/{id}", get(jsa::get_one::<S>))
    .route("/jsa/{id}/status", put(jsa::set_status::<S>))
    .route("/jsa/{id}/steps", get(jsa::list_steps::<S>).post(jsa::add_step::<S>))
    .route("/jsa-steps/{id}/toggle", post(jsa::toggle_step::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
