//! Report builders that load their inputs from a [`SafetyStore`].

use chrono::NaiveDate;
use safety_core::{
  establishment::Establishment,
  incident::IncidentFilter,
  store::SafetyStore,
};
use tracing::debug;

use crate::{
  ReportError,
  Result,
  dashboard::{self, ActionSummary, Dashboard},
  individual::{IndividualReport, individual_report},
  log::{LogRow, log_rows},
  summary::{AnnualSummary, annual_summary},
};

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ReportError {
  ReportError::Store(Box::new(e))
}

async fn establishment<S: SafetyStore>(store: &S, id: i64) -> Result<Establishment> {
  store
    .get_establishment(id)
    .await
    .map_err(store_err)?
    .ok_or(ReportError::EstablishmentNotFound(id))
}

pub async fn osha_log<S: SafetyStore>(
  store: &S,
  establishment_id: i64,
  year: i32,
) -> Result<Vec<LogRow>> {
  establishment(store, establishment_id).await?;
  let incidents = store
    .list_incidents(IncidentFilter::for_year(establishment_id, year))
    .await
    .map_err(store_err)?;
  debug!(establishment_id, year, incidents = incidents.len(), "building injury log");
  Ok(log_rows(&incidents, year))
}

pub async fn osha_summary<S: SafetyStore>(
  store: &S,
  establishment_id: i64,
  year: i32,
) -> Result<AnnualSummary> {
  let est = establishment(store, establishment_id).await?;
  let incidents = store
    .list_incidents(IncidentFilter::for_year(establishment_id, year))
    .await
    .map_err(store_err)?;
  let stats = store
    .get_annual_stats(establishment_id, year)
    .await
    .map_err(store_err)?;
  debug!(
    establishment_id,
    year,
    incidents = incidents.len(),
    has_stats = stats.is_some(),
    "building annual summary"
  );
  Ok(annual_summary(&est, year, &incidents, stats.as_ref()))
}

pub async fn osha_301<S: SafetyStore>(
  store: &S,
  incident_id: i64,
) -> Result<IndividualReport> {
  let incident = store
    .get_incident(incident_id)
    .await
    .map_err(store_err)?
    .ok_or(ReportError::IncidentNotFound(incident_id))?;
  Ok(individual_report(&incident))
}

pub async fn dashboard<S: SafetyStore>(
  store: &S,
  establishment_id: i64,
  year: i32,
  today: NaiveDate,
) -> Result<Dashboard> {
  establishment(store, establishment_id).await?;
  let incidents = store
    .list_incidents(IncidentFilter {
      establishment_id: Some(establishment_id),
      ..Default::default()
    })
    .await
    .map_err(store_err)?;
  let locations = store
    .list_locations(establishment_id)
    .await
    .map_err(store_err)?;
  let stats = store
    .get_annual_stats(establishment_id, year)
    .await
    .map_err(store_err)?;
  debug!(establishment_id, year, incidents = incidents.len(), %today, "building dashboard");
  Ok(dashboard::dashboard(
    &incidents,
    year,
    &locations,
    stats.as_ref(),
    today,
  ))
}

pub async fn action_summary<S: SafetyStore>(
  store: &S,
  establishment_id: i64,
  today: NaiveDate,
) -> Result<ActionSummary> {
  establishment(store, establishment_id).await?;
  let actions = store
    .list_establishment_actions(establishment_id)
    .await
    .map_err(store_err)?;
  Ok(dashboard::corrective_action_summary(&actions, today))
}
