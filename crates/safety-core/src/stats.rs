//! Per-establishment annual figures used by the 300A summary and the
//! incident rate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Result, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualStats {
  pub id:                 i64,
  pub establishment_id:   i64,
  pub year:               i32,
  pub avg_employees:      i64,
  pub total_hours_worked: i64,
  pub certifier_name:     Option<String>,
  pub certifier_title:    Option<String>,
  pub certifier_phone:    Option<String>,
  pub certification_date: Option<NaiveDate>,
}

/// Body of an upsert. The establishment and year come from the route; a
/// second write for the same pair replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualStatsInput {
  pub avg_employees:      i64,
  pub total_hours_worked: i64,
  #[serde(default)]
  pub certifier_name:     Option<String>,
  #[serde(default)]
  pub certifier_title:    Option<String>,
  #[serde(default)]
  pub certifier_phone:    Option<String>,
  #[serde(default)]
  pub certification_date: Option<NaiveDate>,
}

impl AnnualStatsInput {
  pub fn new(avg_employees: i64, total_hours_worked: i64) -> Self {
    Self { avg_employees, total_hours_worked, ..Self::default() }
  }

  pub fn validate(&self, year: i32) -> Result<()> {
    validate::year(year)?;
    validate::employee_count(self.avg_employees)?;
    validate::hours_worked(self.total_hours_worked)?;
    if let Some(name) = &self.certifier_name {
      validate::max_length(name, validate::MAX_NAME_LENGTH, "certifier name")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_checks_year_and_bounds() {
    assert!(AnnualStatsInput::new(50, 100_000).validate(2026).is_ok());
    assert!(AnnualStatsInput::new(50, 100_000).validate(1900).is_err());
    assert!(AnnualStatsInput::new(-1, 100_000).validate(2026).is_err());
    assert!(AnnualStatsInput::new(50, -5).validate(2026).is_err());
  }
}
