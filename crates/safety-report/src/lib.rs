//! Regulatory reports for the safety tracker.
//!
//! Pure builders turn incident snapshots into the injury and illness log
//! (Form 300), the annual summary (Form 300A), the individual incident
//! report (Form 301) and the dashboard breakdowns. The `fetch` functions
//! load those snapshots from a [`safety_core::store::SafetyStore`].

pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod individual;
pub mod log;
pub mod summary;

pub use dashboard::{ActionSummary, Dashboard, DashboardSummary};
pub use error::{ReportError, Result};
pub use individual::{IndividualReport, individual_report};
pub use log::{LOG_HEADERS, LogRow, log_rows, write_log_csv};
pub use summary::{AnnualSummary, annual_summary, incident_rate};

// ─── Shared test helpers ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_helpers {
  use chrono::{NaiveDate, Utc};
  use safety_core::{
    establishment::Establishment,
    incident::{Incident, IncidentDetails, IncidentStatus},
  };

  pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  /// Recordable "other recordable" injury numbered `n`, for "Worker n".
  pub(crate) fn incident(n: i64, y: i32, m: u32, d: u32) -> Incident {
    let now = Utc::now();
    Incident {
      id: n,
      establishment_id: 1,
      case_number: n,
      case_year: y,
      status: IncidentStatus::Open,
      details: IncidentDetails::new(format!("Worker {n}"), date(y, m, d), "fell"),
      created_at: now,
      updated_at: now,
    }
  }

  pub(crate) fn establishment() -> Establishment {
    let now = Utc::now();
    Establishment {
      id:                   1,
      name:                 "Plant 1".into(),
      street_address:       Some("1 Main St".into()),
      city:                 None,
      state:                None,
      zip_code:             None,
      industry_description: None,
      naics_code:           None,
      created_at:           now,
      updated_at:           now,
    }
  }
}

#[cfg(test)]
mod fetch_tests {
  use safety_core::{
    action::NewCorrectiveAction,
    establishment::NewEstablishment,
    incident::{NewIncident, OutcomeSeverity},
    stats::AnnualStatsInput,
    store::SafetyStore,
  };
  use safety_store_sqlite::SqliteStore;

  use super::{fetch, test_helpers::date, *};

  async fn seeded() -> (SqliteStore, i64) {
    let store = SqliteStore::open_in_memory()
      .await
      .expect("in-memory store");
    let est = store
      .create_establishment(NewEstablishment::named("Plant"))
      .await
      .unwrap()
      .id;

    for (name, d, severity) in [
      ("Ann", date(2026, 1, 4), OutcomeSeverity::Death),
      ("Ben", date(2026, 2, 4), OutcomeSeverity::OtherRecordable),
      ("Cal", date(2026, 3, 4), OutcomeSeverity::OtherRecordable),
      ("Dee", date(2025, 3, 4), OutcomeSeverity::OtherRecordable),
    ] {
      let mut input = NewIncident::new(est, name, d, "hurt");
      input.details.outcome_severity = severity;
      store.create_incident(input).await.unwrap();
    }
    store
      .upsert_annual_stats(est, 2026, AnnualStatsInput::new(150, 300_000))
      .await
      .unwrap();
    (store, est)
  }

  #[tokio::test]
  async fn summary_from_store() {
    let (store, est) = seeded().await;
    let s = fetch::osha_summary(&store, est, 2026).await.unwrap();
    assert_eq!(s.total_recordable, 3);
    assert_eq!(s.total_deaths, 1);
    assert_eq!(s.incident_rate, Some(2.0));

    let log = fetch::osha_log(&store, est, 2026).await.unwrap();
    let numbers: Vec<_> = log.iter().map(|r| r.case_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(log[0].outcome_death);
  }

  #[tokio::test]
  async fn unknown_ids_are_errors() {
    let (store, _) = seeded().await;
    assert!(matches!(
      fetch::osha_summary(&store, 99, 2026).await,
      Err(ReportError::EstablishmentNotFound(99))
    ));
    assert!(matches!(
      fetch::osha_301(&store, 99).await,
      Err(ReportError::IncidentNotFound(99))
    ));
  }

  #[tokio::test]
  async fn empty_year_is_not_an_error() {
    let (store, est) = seeded().await;
    let s = fetch::osha_summary(&store, est, 2020).await.unwrap();
    assert_eq!(s.total_recordable, 0);
    assert_eq!(s.incident_rate, None);
    assert!(fetch::osha_log(&store, est, 2020).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn dashboard_and_actions() {
    let (store, est) = seeded().await;
    let d = fetch::dashboard(&store, est, 2026, date(2026, 3, 14))
      .await
      .unwrap();
    assert_eq!(d.summary.total_incidents, 3);
    assert_eq!(d.summary.days_since_last_incident, Some(10));
    assert_eq!(d.by_month.len(), 3);
    assert_eq!(d.by_location[0].location_name, dashboard::UNASSIGNED_LOCATION);

    let incident = store
      .list_incidents(Default::default())
      .await
      .unwrap()
      .remove(0);
    store
      .create_corrective_action(
        incident.id,
        NewCorrectiveAction {
          description: "Guard rail".into(),
          due_date: Some(date(2026, 3, 1)),
          ..Default::default()
        },
      )
      .await
      .unwrap();
    let summary = fetch::action_summary(&store, est, date(2026, 3, 14))
      .await
      .unwrap();
    assert_eq!(summary.overdue, 1);
  }
}
