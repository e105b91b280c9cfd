//! Dashboard figures and breakdowns for one establishment-year.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use safety_core::{
  action::{ActionStatus, CorrectiveAction},
  establishment::Location,
  incident::{Incident, IncidentStatus, InjuryType, OutcomeSeverity},
  label::Labeled,
  stats::AnnualStats,
};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::summary::incident_rate;

pub const UNASSIGNED_LOCATION: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
  pub total_incidents:          i64,
  pub open_incidents:           i64,
  pub total_recordable:         i64,
  /// Days between `today` and the most recent incident of any year.
  pub days_since_last_incident: Option<i64>,
  pub incident_rate:            Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
  /// `YYYY-MM`.
  pub month: String,
  pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
  pub severity: OutcomeSeverity,
  pub count:    i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
  pub injury_type: InjuryType,
  pub count:       i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
  pub location_name: String,
  pub count:         i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
  pub open:        i64,
  pub in_progress: i64,
  pub completed:   i64,
  pub overdue:     i64,
}

/// Everything the dashboard page shows for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
  pub year:        i32,
  pub summary:     DashboardSummary,
  pub by_month:    Vec<MonthCount>,
  pub by_severity: Vec<SeverityCount>,
  pub by_type:     Vec<TypeCount>,
  pub by_location: Vec<LocationCount>,
}

fn in_year(incidents: &[Incident], year: i32) -> impl Iterator<Item = &Incident> {
  incidents
    .iter()
    .filter(move |i| i.details.incident_date.year() == year)
}

/// `incidents` should hold every incident of the establishment; the year
/// figures filter it, the days-since figure does not.
pub fn dashboard_summary(
  incidents: &[Incident],
  year: i32,
  stats: Option<&AnnualStats>,
  today: NaiveDate,
) -> DashboardSummary {
  let (mut total, mut open, mut recordable) = (0, 0, 0);
  for i in in_year(incidents, year) {
    total += 1;
    if i.status == IncidentStatus::Open {
      open += 1;
    }
    if i.details.is_recordable {
      recordable += 1;
    }
  }

  // Incidents dated after `today` do not count as the last one.
  let days_since_last_incident = incidents
    .iter()
    .map(|i| i.details.incident_date)
    .filter(|d| *d <= today)
    .max()
    .map(|last| (today - last).num_days());

  DashboardSummary {
    total_incidents: total,
    open_incidents: open,
    total_recordable: recordable,
    days_since_last_incident,
    incident_rate: incident_rate(recordable, stats.map(|s| s.total_hours_worked)),
  }
}

/// Incident counts per month of `year`, ascending; empty months are omitted.
pub fn by_month(incidents: &[Incident], year: i32) -> Vec<MonthCount> {
  let mut months = BTreeMap::<String, i64>::new();
  for i in in_year(incidents, year) {
    *months
      .entry(i.details.incident_date.format("%Y-%m").to_string())
      .or_default() += 1;
  }
  months
    .into_iter()
    .map(|(month, count)| MonthCount { month, count })
    .collect()
}

/// Occurrences of each variant, in declaration order, skipping zeros.
fn count_in_order<T: Labeled + PartialEq>(
  values: impl Iterator<Item = T>,
) -> Vec<(T, i64)> {
  let values: Vec<T> = values.collect();
  T::iter()
    .map(|v| (v, values.iter().filter(|x| **x == v).count() as i64))
    .filter(|(_, count)| *count > 0)
    .collect()
}

/// Recordable cases per outcome, in form order; absent outcomes are omitted.
pub fn by_severity(incidents: &[Incident], year: i32) -> Vec<SeverityCount> {
  count_in_order(
    in_year(incidents, year)
      .filter(|i| i.details.is_recordable)
      .map(|i| i.details.outcome_severity),
  )
  .into_iter()
  .map(|(severity, count)| SeverityCount { severity, count })
  .collect()
}

/// Recordable cases per injury/illness type, in form order.
pub fn by_type(incidents: &[Incident], year: i32) -> Vec<TypeCount> {
  count_in_order(
    in_year(incidents, year)
      .filter(|i| i.details.is_recordable)
      .map(|i| i.details.injury_illness_type),
  )
  .into_iter()
  .map(|(injury_type, count)| TypeCount { injury_type, count })
  .collect()
}

/// All incidents of `year` per location name, sorted by name. Incidents with
/// no location, or a location not in `locations`, count as
/// [`UNASSIGNED_LOCATION`].
pub fn by_location(
  incidents: &[Incident],
  year: i32,
  locations: &[Location],
) -> Vec<LocationCount> {
  let mut counts = BTreeMap::<&str, i64>::new();
  for i in in_year(incidents, year) {
    let name = i
      .details
      .location_id
      .and_then(|id| locations.iter().find(|l| l.id == id))
      .map(|l| l.name.as_str())
      .unwrap_or(UNASSIGNED_LOCATION);
    *counts.entry(name).or_default() += 1;
  }
  counts
    .into_iter()
    .map(|(name, count)| LocationCount {
      location_name: name.to_owned(),
      count,
    })
    .collect()
}

/// Actions per derived status; each action lands in exactly one bucket.
pub fn corrective_action_summary(
  actions: &[CorrectiveAction],
  today: NaiveDate,
) -> ActionSummary {
  let mut summary = ActionSummary::default();
  for action in actions {
    match action.status(today) {
      ActionStatus::Open => summary.open += 1,
      ActionStatus::InProgress => summary.in_progress += 1,
      ActionStatus::Completed => summary.completed += 1,
      ActionStatus::Overdue => summary.overdue += 1,
    }
  }
  summary
}

pub fn dashboard(
  incidents: &[Incident],
  year: i32,
  locations: &[Location],
  stats: Option<&AnnualStats>,
  today: NaiveDate,
) -> Dashboard {
  Dashboard {
    year,
    summary: dashboard_summary(incidents, year, stats, today),
    by_month: by_month(incidents, year),
    by_severity: by_severity(incidents, year),
    by_type: by_type(incidents, year),
    by_location: by_location(incidents, year, locations),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use safety_core::action::ActionState;

  use super::*;
  use crate::test_helpers::{date, incident};

  fn location(id: i64, name: &str) -> Location {
    Location {
      id,
      establishment_id: 1,
      name: name.into(),
      address: None,
      city: None,
      state: None,
      is_active: true,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn action(state: ActionState, due: Option<NaiveDate>) -> CorrectiveAction {
    CorrectiveAction {
      id: 1,
      incident_id: 1,
      rca_session_id: None,
      description: "fix".into(),
      assigned_to: None,
      due_date: due,
      state,
      completed_date: None,
      notes: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn summary_counts_year_and_days_since_any_year() {
    let mut closed = incident(1, 2025, 3, 1);
    closed.status = IncidentStatus::Closed;
    let mut not_recordable = incident(2, 2025, 6, 1);
    not_recordable.details.is_recordable = false;
    let later = incident(3, 2026, 1, 10);
    let all = [closed, not_recordable, later];

    let s = dashboard_summary(&all, 2025, None, date(2026, 1, 20));
    assert_eq!(s.total_incidents, 2);
    assert_eq!(s.open_incidents, 1);
    assert_eq!(s.total_recordable, 1);
    assert_eq!(s.days_since_last_incident, Some(10));
    assert_eq!(s.incident_rate, None);
  }

  #[test]
  fn empty_establishment_has_no_last_incident() {
    let s = dashboard_summary(&[], 2026, None, date(2026, 1, 20));
    assert_eq!(s.total_incidents, 0);
    assert_eq!(s.days_since_last_incident, None);
  }

  #[test]
  fn future_dated_incidents_are_ignored() {
    let past = incident(1, 2026, 1, 10);
    let future = incident(2, 2026, 3, 1);

    let s = dashboard_summary(&[past, future.clone()], 2026, None, date(2026, 1, 20));
    assert_eq!(s.total_incidents, 2);
    assert_eq!(s.days_since_last_incident, Some(10));

    let s = dashboard_summary(&[future], 2026, None, date(2026, 1, 20));
    assert_eq!(s.days_since_last_incident, None);
  }

  #[test]
  fn breakdowns() {
    let mut a = incident(1, 2026, 1, 5);
    a.details.outcome_severity = OutcomeSeverity::Death;
    a.details.location_id = Some(10);
    let mut b = incident(2, 2026, 1, 20);
    b.details.injury_illness_type = InjuryType::Poisoning;
    b.details.location_id = Some(10);
    let mut c = incident(3, 2026, 4, 2);
    c.details.is_recordable = false;
    let all = [a, b, c, incident(4, 2025, 4, 2)];

    let months = by_month(&all, 2026);
    assert_eq!(
      months,
      vec![
        MonthCount { month: "2026-01".into(), count: 2 },
        MonthCount { month: "2026-04".into(), count: 1 },
      ]
    );

    let sev = by_severity(&all, 2026);
    assert_eq!(sev.len(), 2);
    assert_eq!(sev[0], SeverityCount { severity: OutcomeSeverity::Death, count: 1 });
    assert_eq!(sev[1].severity, OutcomeSeverity::OtherRecordable);

    let types = by_type(&all, 2026);
    assert_eq!(types[0], TypeCount { injury_type: InjuryType::Injury, count: 1 });
    assert_eq!(types[1], TypeCount { injury_type: InjuryType::Poisoning, count: 1 });

    let locs = by_location(&all, 2026, &[location(10, "Dock")]);
    assert_eq!(
      locs,
      vec![
        LocationCount { location_name: "Dock".into(), count: 2 },
        LocationCount { location_name: UNASSIGNED_LOCATION.into(), count: 1 },
      ]
    );
  }

  #[test]
  fn actions_counted_once() {
    let today = date(2026, 6, 1);
    let actions = [
      action(ActionState::Open, None),
      action(ActionState::Open, Some(date(2026, 5, 1))),
      action(ActionState::InProgress, Some(date(2026, 7, 1))),
      action(ActionState::Completed, Some(date(2026, 5, 1))),
    ];
    assert_eq!(
      corrective_action_summary(&actions, today),
      ActionSummary { open: 1, in_progress: 1, completed: 1, overdue: 1 }
    );
  }
}
