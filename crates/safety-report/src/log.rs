//! The line-item injury and illness log (OSHA Form 300).

use std::io::Write;

use chrono::{Datelike, NaiveDate};
use safety_core::incident::{Incident, InjuryType, OutcomeSeverity};
use serde::Serialize;

use crate::Result;

/// Column headers of the exported log, in form order.
pub const LOG_HEADERS: [&str; 18] = [
  "Case No.",
  "Employee Name",
  "Job Title",
  "Date of Injury/Illness",
  "Where Event Occurred",
  "Description of Injury/Illness",
  "Death",
  "Days Away From Work",
  "Job Transfer or Restriction",
  "Other Recordable Cases",
  "Days Away From Work (Count)",
  "Days of Restricted Work (Count)",
  "Injury",
  "Skin Disorder",
  "Respiratory Condition",
  "Poisoning",
  "Hearing Loss",
  "All Other Illnesses",
];

/// One recordable case on the log.
///
/// Exactly one `outcome_*` flag and one `type_*` flag is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
  pub case_number:              i64,
  pub employee_name:            String,
  pub job_title:                String,
  pub incident_date:            NaiveDate,
  pub where_occurred:           String,
  pub description:              String,
  pub outcome_death:            bool,
  pub outcome_days_away:        bool,
  pub outcome_job_transfer:     bool,
  pub outcome_other_recordable: bool,
  pub days_away_count:          i64,
  pub days_restricted_count:    i64,
  pub type_injury:              bool,
  pub type_skin_disorder:       bool,
  pub type_respiratory:         bool,
  pub type_poisoning:           bool,
  pub type_hearing_loss:        bool,
  pub type_other_illness:       bool,
}

impl LogRow {
  pub fn from_incident(incident: &Incident) -> Self {
    let d = &incident.details;
    let severity = d.outcome_severity;
    let kind = d.injury_illness_type;

    Self {
      case_number:              incident.case_number,
      employee_name:            incident.display_name().to_owned(),
      job_title:                d.employee_job_title.clone().unwrap_or_default(),
      incident_date:            d.incident_date,
      where_occurred:           d.where_occurred.clone().unwrap_or_default(),
      description:              d.description.clone(),
      outcome_death:            severity == OutcomeSeverity::Death,
      outcome_days_away:        severity == OutcomeSeverity::DaysAway,
      outcome_job_transfer:     severity == OutcomeSeverity::JobTransferRestriction,
      outcome_other_recordable: severity == OutcomeSeverity::OtherRecordable,
      days_away_count:          d.days_away_count,
      days_restricted_count:    d.days_restricted_count,
      type_injury:              kind == InjuryType::Injury,
      type_skin_disorder:       kind == InjuryType::SkinDisorder,
      type_respiratory:         kind == InjuryType::Respiratory,
      type_poisoning:           kind == InjuryType::Poisoning,
      type_hearing_loss:        kind == InjuryType::HearingLoss,
      type_other_illness:       kind == InjuryType::OtherIllness,
    }
  }

  fn record(&self) -> [String; 18] {
    [
      self.case_number.to_string(),
      self.employee_name.clone(),
      self.job_title.clone(),
      self.incident_date.format("%Y-%m-%d").to_string(),
      self.where_occurred.clone(),
      self.description.clone(),
      mark(self.outcome_death),
      mark(self.outcome_days_away),
      mark(self.outcome_job_transfer),
      mark(self.outcome_other_recordable),
      self.days_away_count.to_string(),
      self.days_restricted_count.to_string(),
      mark(self.type_injury),
      mark(self.type_skin_disorder),
      mark(self.type_respiratory),
      mark(self.type_poisoning),
      mark(self.type_hearing_loss),
      mark(self.type_other_illness),
    ]
  }
}

fn mark(flag: bool) -> String {
  if flag { "X".to_owned() } else { String::new() }
}

/// Recordable incidents dated in `year`, ordered by case number. Status is
/// ignored.
pub fn log_rows(incidents: &[Incident], year: i32) -> Vec<LogRow> {
  let mut cases: Vec<&Incident> = incidents
    .iter()
    .filter(|i| i.details.is_recordable && i.details.incident_date.year() == year)
    .collect();
  cases.sort_by_key(|i| (i.case_year, i.case_number, i.id));
  cases.into_iter().map(LogRow::from_incident).collect()
}

/// Write the log as CSV with the form's column headers.
pub fn write_log_csv<W: Write>(rows: &[LogRow], writer: W) -> Result<()> {
  let mut wtr = csv::Writer::from_writer(writer);
  wtr.write_record(LOG_HEADERS)?;
  for row in rows {
    wtr.write_record(row.record())?;
  }
  wtr.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use safety_core::incident::PRIVACY_PLACEHOLDER;

  use super::*;
  use crate::test_helpers::incident;

  #[test]
  fn death_sets_only_the_death_flag() {
    let mut inc = incident(1, 2026, 3, 1);
    inc.details.outcome_severity = OutcomeSeverity::Death;
    let row = LogRow::from_incident(&inc);

    assert!(row.outcome_death);
    assert!(!row.outcome_days_away);
    assert!(!row.outcome_job_transfer);
    assert!(!row.outcome_other_recordable);
    assert!(row.type_injury);
  }

  #[test]
  fn filters_year_and_recordable_and_orders_by_case() {
    let mut not_recordable = incident(1, 2026, 1, 5);
    not_recordable.details.is_recordable = false;
    let mut closed = incident(3, 2026, 2, 5);
    closed.status = safety_core::incident::IncidentStatus::Closed;
    let incidents = vec![
      closed,
      incident(2, 2026, 6, 1),
      not_recordable,
      incident(4, 2025, 12, 31),
    ];

    let rows = log_rows(&incidents, 2026);
    let numbers: Vec<_> = rows.iter().map(|r| r.case_number).collect();
    assert_eq!(numbers, vec![2, 3]);
  }

  #[test]
  fn privacy_case_hides_name() {
    let mut inc = incident(1, 2026, 3, 1);
    inc.details.is_privacy_case = true;
    let row = LogRow::from_incident(&inc);
    assert_eq!(row.employee_name, PRIVACY_PLACEHOLDER);

    let mut out = Vec::new();
    write_log_csv(&[row], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("Worker 1"));
  }

  #[test]
  fn csv_has_headers_and_marks() {
    let mut inc = incident(7, 2026, 3, 1);
    inc.details.outcome_severity = OutcomeSeverity::DaysAway;
    inc.details.days_away_count = 4;
    let mut out = Vec::new();
    write_log_csv(&[LogRow::from_incident(&inc)], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();

    assert!(lines.next().unwrap().starts_with("Case No.,Employee Name,Job Title"));
    assert_eq!(
      lines.next().unwrap(),
      "7,Worker 7,,2026-03-01,,fell,,X,,,4,0,X,,,,,"
    );
    assert!(lines.next().is_none());
  }

  #[test]
  fn empty_log_is_header_only() {
    assert!(log_rows(&[], 2026).is_empty());
    let mut out = Vec::new();
    write_log_csv(&[], &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
  }
}
