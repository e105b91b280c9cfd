//! The annual summary (OSHA Form 300A) and the incident rate.

use chrono::{Datelike, NaiveDate};
use safety_core::{
  establishment::Establishment,
  incident::{Incident, InjuryType, OutcomeSeverity},
  stats::AnnualStats,
};
use serde::Serialize;

/// Hours worked by 100 full-time employees in a year.
pub const RATE_BASE_HOURS: f64 = 200_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
  pub year:                 i32,
  pub establishment_name:   String,
  pub street_address:       Option<String>,
  pub city:                 Option<String>,
  pub state:                Option<String>,
  pub zip_code:             Option<String>,
  pub industry_description: Option<String>,
  pub naics_code:           Option<String>,

  pub total_deaths:                     i64,
  pub total_days_away_cases:            i64,
  pub total_transfer_restriction_cases: i64,
  pub total_other_recordable_cases:     i64,
  pub total_days_away:                  i64,
  pub total_days_restricted:            i64,

  pub total_injuries:        i64,
  pub total_skin_disorders:  i64,
  pub total_respiratory:     i64,
  pub total_poisonings:      i64,
  pub total_hearing_loss:    i64,
  pub total_other_illnesses: i64,

  pub total_recordable: i64,
  pub incident_rate:    Option<f64>,

  pub avg_employees:      Option<i64>,
  pub total_hours_worked: Option<i64>,
  pub certifier_name:     Option<String>,
  pub certifier_title:    Option<String>,
  pub certifier_phone:    Option<String>,
  pub certification_date: Option<NaiveDate>,
}

/// Summarize the recordable incidents of `establishment` dated in `year`.
///
/// `incidents` may contain other years; they are skipped.
pub fn annual_summary(
  establishment: &Establishment,
  year: i32,
  incidents: &[Incident],
  stats: Option<&AnnualStats>,
) -> AnnualSummary {
  let recordable: Vec<&Incident> = incidents
    .iter()
    .filter(|i| i.details.is_recordable && i.details.incident_date.year() == year)
    .collect();

  let by_severity = |s: OutcomeSeverity| {
    recordable
      .iter()
      .filter(|i| i.details.outcome_severity == s)
      .count() as i64
  };
  let by_type = |t: InjuryType| {
    recordable
      .iter()
      .filter(|i| i.details.injury_illness_type == t)
      .count() as i64
  };

  let total_recordable = recordable.len() as i64;
  let hours = stats.map(|s| s.total_hours_worked);

  AnnualSummary {
    year,
    establishment_name: establishment.name.clone(),
    street_address: establishment.street_address.clone(),
    city: establishment.city.clone(),
    state: establishment.state.clone(),
    zip_code: establishment.zip_code.clone(),
    industry_description: establishment.industry_description.clone(),
    naics_code: establishment.naics_code.clone(),

    total_deaths: by_severity(OutcomeSeverity::Death),
    total_days_away_cases: by_severity(OutcomeSeverity::DaysAway),
    total_transfer_restriction_cases: by_severity(
      OutcomeSeverity::JobTransferRestriction,
    ),
    total_other_recordable_cases: by_severity(OutcomeSeverity::OtherRecordable),
    total_days_away: recordable.iter().map(|i| i.details.days_away_count).sum(),
    total_days_restricted: recordable
      .iter()
      .map(|i| i.details.days_restricted_count)
      .sum(),

    total_injuries: by_type(InjuryType::Injury),
    total_skin_disorders: by_type(InjuryType::SkinDisorder),
    total_respiratory: by_type(InjuryType::Respiratory),
    total_poisonings: by_type(InjuryType::Poisoning),
    total_hearing_loss: by_type(InjuryType::HearingLoss),
    total_other_illnesses: by_type(InjuryType::OtherIllness),

    total_recordable,
    incident_rate: incident_rate(total_recordable, hours),

    avg_employees: stats.map(|s| s.avg_employees),
    total_hours_worked: hours,
    certifier_name: stats.and_then(|s| s.certifier_name.clone()),
    certifier_title: stats.and_then(|s| s.certifier_title.clone()),
    certifier_phone: stats.and_then(|s| s.certifier_phone.clone()),
    certification_date: stats.and_then(|s| s.certification_date),
  }
}

/// Recordable cases per 100 full-time workers: `recordable × 200 000 /
/// hours`. `None` without a positive hours figure.
pub fn incident_rate(total_recordable: i64, hours_worked: Option<i64>) -> Option<f64> {
  hours_worked
    .filter(|h| *h > 0)
    .map(|h| total_recordable as f64 * RATE_BASE_HOURS / h as f64)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_helpers::{establishment, incident};

  fn stats(hours: i64) -> AnnualStats {
    AnnualStats {
      id:                 1,
      establishment_id:   1,
      year:               2026,
      avg_employees:      150,
      total_hours_worked: hours,
      certifier_name:     Some("Pat Lee".into()),
      certifier_title:    None,
      certifier_phone:    None,
      certification_date: None,
    }
  }

  #[test]
  fn rate_from_hours() {
    assert_eq!(incident_rate(3, Some(300_000)), Some(2.0));
    assert_eq!(incident_rate(3, Some(0)), None);
    assert_eq!(incident_rate(3, None), None);
    assert_eq!(incident_rate(0, Some(100_000)), Some(0.0));
  }

  #[test]
  fn zero_incidents_gives_zero_counts() {
    let s = annual_summary(&establishment(), 2026, &[], None);
    assert_eq!(s.total_recordable, 0);
    assert_eq!(s.total_deaths, 0);
    assert_eq!(s.total_days_away, 0);
    assert_eq!(s.total_injuries, 0);
    assert_eq!(s.incident_rate, None);
    assert_eq!(s.avg_employees, None);
    assert_eq!(s.establishment_name, "Plant 1");
  }

  #[test]
  fn counts_recordable_cases_in_year() {
    let mut death = incident(1, 2026, 1, 3);
    death.details.outcome_severity = OutcomeSeverity::Death;
    let mut away = incident(2, 2026, 2, 3);
    away.details.outcome_severity = OutcomeSeverity::DaysAway;
    away.details.days_away_count = 10;
    away.details.injury_illness_type = InjuryType::Respiratory;
    let mut restricted = incident(3, 2026, 3, 3);
    restricted.details.outcome_severity = OutcomeSeverity::JobTransferRestriction;
    restricted.details.days_restricted_count = 5;
    let mut excluded = incident(4, 2026, 4, 3);
    excluded.details.is_recordable = false;
    excluded.details.days_away_count = 99;
    let last_year = incident(5, 2025, 6, 1);

    let all = [death, away, restricted, excluded, last_year];
    let s = annual_summary(&establishment(), 2026, &all, Some(&stats(300_000)));

    assert_eq!(s.total_recordable, 3);
    assert_eq!(s.total_deaths, 1);
    assert_eq!(s.total_days_away_cases, 1);
    assert_eq!(s.total_transfer_restriction_cases, 1);
    assert_eq!(s.total_other_recordable_cases, 0);
    assert_eq!(s.total_days_away, 10);
    assert_eq!(s.total_days_restricted, 5);
    assert_eq!(s.total_injuries, 2);
    assert_eq!(s.total_respiratory, 1);
    assert_eq!(s.incident_rate, Some(2.0));
    assert_eq!(s.avg_employees, Some(150));
    assert_eq!(s.certifier_name.as_deref(), Some("Pat Lee"));
  }
}
