//! The `SafetyStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `safety-store-sqlite`).
//! The importer, the report builders and the API depend on this abstraction,
//! not on any concrete backend.
//!
//! Conventions shared by every method:
//! - `get_*` returns `Ok(None)` for an unknown id.
//! - `update_*`, `delete_*` and the single-record commands (complete, sign,
//!   toggle) fail with a not-found error for an unknown id.
//! - `create_*`/`add_*` fail with a not-found error when the parent record
//!   does not exist.
//! - Updates take the whole record, already patched and validated by the
//!   caller. Identity columns (ids, case number, case year, parent ids) are
//!   never rewritten.

use std::future::Future;

use crate::{
  action::{CorrectiveAction, NewCorrectiveAction},
  establishment::{Establishment, Location, NewEstablishment, NewLocation},
  incident::{Incident, IncidentFilter, NewIncident},
  jsa::{JsaInstance, JsaStatus, JsaStep, JsaTemplate, NewJsaInstance, NewJsaStep},
  rca::{
    FishboneCategory,
    FishboneCause,
    FiveWhysStep,
    FiveWhysStepUpdate,
    NewFishboneCategory,
    NewFishboneCause,
    NewFiveWhysStep,
    RcaMethod,
    RcaSession,
  },
  stats::{AnnualStats, AnnualStatsInput},
  toolbox::{Attendee, NewAttendee, NewToolboxTalk, Signature, TalkTopic, ToolboxTalk},
};

/// Error type of a [`SafetyStore`] backend.
///
/// Lets callers tell a missing record or a rejected input apart from an
/// infrastructure failure without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_not_found(&self) -> bool;

  /// The domain error, if the backend rejected the input itself.
  fn domain(&self) -> Option<&crate::Error>;
}

/// Abstraction over a safety-tracker store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SafetyStore: Send + Sync {
  type Error: StoreError;

  // ── Establishments ────────────────────────────────────────────────────

  fn create_establishment(
    &self,
    input: NewEstablishment,
  ) -> impl Future<Output = Result<Establishment, Self::Error>> + Send + '_;

  fn get_establishment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Establishment>, Self::Error>> + Send + '_;

  fn list_establishments(
    &self,
  ) -> impl Future<Output = Result<Vec<Establishment>, Self::Error>> + Send + '_;

  fn update_establishment(
    &self,
    establishment: Establishment,
  ) -> impl Future<Output = Result<Establishment, Self::Error>> + Send + '_;

  /// Delete an establishment and, by cascade, everything it owns.
  fn delete_establishment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Locations ─────────────────────────────────────────────────────────

  fn create_location(
    &self,
    establishment_id: i64,
    input: NewLocation,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + '_;

  fn get_location(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + '_;

  fn list_locations(
    &self,
    establishment_id: i64,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  fn update_location(
    &self,
    location: Location,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + '_;

  fn delete_location(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Incidents ─────────────────────────────────────────────────────────

  /// Normalize, validate and persist a new incident, assigning the next case
  /// number for its establishment and year in the same transaction.
  fn create_incident(
    &self,
    input: NewIncident,
  ) -> impl Future<Output = Result<Incident, Self::Error>> + Send + '_;

  fn get_incident(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Incident>, Self::Error>> + Send + '_;

  /// Incidents matching `filter`, newest first.
  fn list_incidents(
    &self,
    filter: IncidentFilter,
  ) -> impl Future<Output = Result<Vec<Incident>, Self::Error>> + Send + '_;

  fn update_incident(
    &self,
    incident: Incident,
  ) -> impl Future<Output = Result<Incident, Self::Error>> + Send + '_;

  fn delete_incident(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Annual statistics ─────────────────────────────────────────────────

  fn upsert_annual_stats(
    &self,
    establishment_id: i64,
    year: i32,
    input: AnnualStatsInput,
  ) -> impl Future<Output = Result<AnnualStats, Self::Error>> + Send + '_;

  fn get_annual_stats(
    &self,
    establishment_id: i64,
    year: i32,
  ) -> impl Future<Output = Result<Option<AnnualStats>, Self::Error>> + Send + '_;

  // ── Corrective actions ────────────────────────────────────────────────

  fn create_corrective_action(
    &self,
    incident_id: i64,
    input: NewCorrectiveAction,
  ) -> impl Future<Output = Result<CorrectiveAction, Self::Error>> + Send + '_;

  fn get_corrective_action(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CorrectiveAction>, Self::Error>> + Send + '_;

  fn list_corrective_actions(
    &self,
    incident_id: i64,
  ) -> impl Future<Output = Result<Vec<CorrectiveAction>, Self::Error>> + Send + '_;

  /// Every corrective action on every incident of an establishment.
  fn list_establishment_actions(
    &self,
    establishment_id: i64,
  ) -> impl Future<Output = Result<Vec<CorrectiveAction>, Self::Error>> + Send + '_;

  fn update_corrective_action(
    &self,
    action: CorrectiveAction,
  ) -> impl Future<Output = Result<CorrectiveAction, Self::Error>> + Send + '_;

  fn delete_corrective_action(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Root-cause analysis ───────────────────────────────────────────────

  fn create_rca_session(
    &self,
    incident_id: i64,
    method: RcaMethod,
  ) -> impl Future<Output = Result<RcaSession, Self::Error>> + Send + '_;

  fn get_rca_session(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<RcaSession>, Self::Error>> + Send + '_;

  fn list_rca_sessions(
    &self,
    incident_id: i64,
  ) -> impl Future<Output = Result<Vec<RcaSession>, Self::Error>> + Send + '_;

  /// Mark a session completed and record its summary.
  fn complete_rca_session(
    &self,
    id: i64,
    root_cause_summary: String,
  ) -> impl Future<Output = Result<RcaSession, Self::Error>> + Send + '_;

  fn delete_rca_session(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_five_whys_step(
    &self,
    rca_session_id: i64,
    input: NewFiveWhysStep,
  ) -> impl Future<Output = Result<FiveWhysStep, Self::Error>> + Send + '_;

  /// Steps of a session ordered by step number.
  fn list_five_whys_steps(
    &self,
    rca_session_id: i64,
  ) -> impl Future<Output = Result<Vec<FiveWhysStep>, Self::Error>> + Send + '_;

  fn update_five_whys_step(
    &self,
    id: i64,
    update: FiveWhysStepUpdate,
  ) -> impl Future<Output = Result<FiveWhysStep, Self::Error>> + Send + '_;

  fn add_fishbone_category(
    &self,
    rca_session_id: i64,
    input: NewFishboneCategory,
  ) -> impl Future<Output = Result<FishboneCategory, Self::Error>> + Send + '_;

  /// Categories of a session with their causes, both in sort order.
  fn list_fishbone(
    &self,
    rca_session_id: i64,
  ) -> impl Future<Output = Result<Vec<FishboneCategory>, Self::Error>> + Send + '_;

  fn add_fishbone_cause(
    &self,
    category_id: i64,
    input: NewFishboneCause,
  ) -> impl Future<Output = Result<FishboneCause, Self::Error>> + Send + '_;

  fn get_fishbone_cause(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<FishboneCause>, Self::Error>> + Send + '_;

  fn update_fishbone_cause(
    &self,
    cause: FishboneCause,
  ) -> impl Future<Output = Result<FishboneCause, Self::Error>> + Send + '_;

  fn delete_fishbone_cause(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Toolbox talks ─────────────────────────────────────────────────────

  fn list_topics(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<TalkTopic>, Self::Error>> + Send + '_;

  fn get_topic(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<TalkTopic>, Self::Error>> + Send + '_;

  fn create_talk(
    &self,
    establishment_id: i64,
    input: NewToolboxTalk,
  ) -> impl Future<Output = Result<ToolboxTalk, Self::Error>> + Send + '_;

  fn get_talk(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ToolboxTalk>, Self::Error>> + Send + '_;

  fn list_talks(
    &self,
    establishment_id: i64,
  ) -> impl Future<Output = Result<Vec<ToolboxTalk>, Self::Error>> + Send + '_;

  fn complete_talk(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<ToolboxTalk, Self::Error>> + Send + '_;

  fn add_attendee(
    &self,
    talk_id: i64,
    input: NewAttendee,
  ) -> impl Future<Output = Result<Attendee, Self::Error>> + Send + '_;

  fn list_attendees(
    &self,
    talk_id: i64,
  ) -> impl Future<Output = Result<Vec<Attendee>, Self::Error>> + Send + '_;

  /// Store the signature and stamp `signed_at`.
  fn sign_attendee(
    &self,
    id: i64,
    signature: Signature,
  ) -> impl Future<Output = Result<Attendee, Self::Error>> + Send + '_;

  fn delete_attendee(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Job-safety analyses ───────────────────────────────────────────────

  fn list_jsa_templates(
    &self,
  ) -> impl Future<Output = Result<Vec<JsaTemplate>, Self::Error>> + Send + '_;

  fn create_jsa(
    &self,
    establishment_id: i64,
    input: NewJsaInstance,
  ) -> impl Future<Output = Result<JsaInstance, Self::Error>> + Send + '_;

  fn get_jsa(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<JsaInstance>, Self::Error>> + Send + '_;

  fn list_jsas(
    &self,
    establishment_id: i64,
  ) -> impl Future<Output = Result<Vec<JsaInstance>, Self::Error>> + Send + '_;

  fn set_jsa_status(
    &self,
    id: i64,
    status: JsaStatus,
  ) -> impl Future<Output = Result<JsaInstance, Self::Error>> + Send + '_;

  fn add_jsa_step(
    &self,
    jsa_id: i64,
    input: NewJsaStep,
  ) -> impl Future<Output = Result<JsaStep, Self::Error>> + Send + '_;

  /// Steps of an analysis ordered by step number.
  fn list_jsa_steps(
    &self,
    jsa_id: i64,
  ) -> impl Future<Output = Result<Vec<JsaStep>, Self::Error>> + Send + '_;

  /// Flip a step's completed flag and return the updated step.
  fn toggle_jsa_step(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<JsaStep, Self::Error>> + Send + '_;
}
