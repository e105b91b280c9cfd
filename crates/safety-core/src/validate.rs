//! Field-level validation rules shared by the API, the importer and the
//! record types' own `validate` methods.

use chrono::{Datelike, NaiveDate};

use crate::{Error, Result};

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Regulatory cap on days away from work or on restricted duty.
pub const MAX_CASE_DAYS: i64 = 180;

pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 2100;

pub const MAX_EMPLOYEES: i64 = 1_000_000;
pub const MAX_HOURS_WORKED: i64 = 2_100_000_000;

pub fn not_empty(value: &str, field: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(format!("{field} cannot be empty")));
  }
  Ok(())
}

pub fn max_length(value: &str, max: usize, field: &str) -> Result<()> {
  let len = value.chars().count();
  if len > max {
    return Err(Error::validation(format!(
      "{field} exceeds maximum length of {max} characters (got: {len})"
    )));
  }
  Ok(())
}

/// A required, bounded name field.
pub fn name(value: &str, field: &str) -> Result<()> {
  not_empty(value, field)?;
  max_length(value, MAX_NAME_LENGTH, field)
}

pub fn days_count(days: i64, field: &str) -> Result<()> {
  if days < 0 {
    return Err(Error::validation(format!(
      "{field} cannot be negative (got: {days})"
    )));
  }
  if days > MAX_CASE_DAYS {
    return Err(Error::validation(format!(
      "{field} exceeds the maximum of {MAX_CASE_DAYS} days (got: {days})"
    )));
  }
  Ok(())
}

pub fn year(year: i32) -> Result<()> {
  if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
    return Err(Error::validation(format!(
      "year must be between {MIN_YEAR} and {MAX_YEAR} (got: {year})"
    )));
  }
  Ok(())
}

pub fn date(date: NaiveDate, field: &str) -> Result<()> {
  if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
    return Err(Error::validation(format!(
      "{field} must fall between {MIN_YEAR} and {MAX_YEAR} (got: {date})"
    )));
  }
  Ok(())
}

pub fn employee_count(count: i64) -> Result<()> {
  if count < 0 {
    return Err(Error::validation(format!(
      "employee count cannot be negative (got: {count})"
    )));
  }
  if count > MAX_EMPLOYEES {
    return Err(Error::validation(format!(
      "employee count seems unrealistic (got: {count})"
    )));
  }
  Ok(())
}

pub fn hours_worked(hours: i64) -> Result<()> {
  if hours < 0 {
    return Err(Error::validation(format!(
      "total hours worked cannot be negative (got: {hours})"
    )));
  }
  // 1M employees at 2080 hours each.
  if hours > MAX_HOURS_WORKED {
    return Err(Error::validation(format!(
      "total hours worked seems unrealistic (got: {hours})"
    )));
  }
  Ok(())
}

/// Strip path separators and shell-hostile characters from a file name stem.
pub fn sanitize_filename(name: &str) -> String {
  name
    .chars()
    .filter(|c| {
      !matches!(c, '/' | '\\' | '\0' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
    })
    .take(MAX_NAME_LENGTH)
    .collect::<String>()
    .replace("..", "")
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn days_count_bounds() {
    assert!(days_count(0, "days").is_ok());
    assert!(days_count(180, "days").is_ok());
    assert!(days_count(-1, "days").is_err());
    assert!(days_count(181, "days").is_err());
  }

  #[test]
  fn year_bounds() {
    assert!(year(2024).is_ok());
    assert!(year(1970).is_ok());
    assert!(year(2100).is_ok());
    assert!(year(1969).is_err());
    assert!(year(2101).is_err());
  }

  #[test]
  fn date_outside_range_is_rejected() {
    let early = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
    let ok = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    assert!(date(early, "incident date").is_err());
    assert!(date(ok, "incident date").is_ok());
  }

  #[test]
  fn name_rules() {
    assert!(name("Jane Doe", "employee name").is_ok());
    assert!(name("   ", "employee name").is_err());
    assert!(name(&"x".repeat(256), "employee name").is_err());
  }

  #[test]
  fn employee_and_hours_bounds() {
    assert!(employee_count(0).is_ok());
    assert!(employee_count(-1).is_err());
    assert!(employee_count(2_000_000).is_err());
    assert!(hours_worked(100_000).is_ok());
    assert!(hours_worked(-1).is_err());
    assert!(hours_worked(3_000_000_000).is_err());
  }

  #[test]
  fn sanitize_filename_strips_traversal() {
    assert_eq!(sanitize_filename("valid-name"), "valid-name");
    assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
    assert_eq!(sanitize_filename("test<>:|?*.txt"), "test.txt");
    assert_eq!(sanitize_filename("  spaces  "), "spaces");
  }
}
