//! Pure row → [`NewIncident`] conversion.

use chrono::NaiveDate;
use safety_core::{
  establishment::Location,
  incident::{InjuryType, NewIncident, OutcomeSeverity},
  label::Labeled,
  validate,
};

use crate::{
  error::RowError,
  mapping::{CanonicalField, ColumnMapping},
  table::{CsvTable, cell},
};

pub const DEFAULT_DESCRIPTION: &str = "Imported incident";

/// Accepted date layouts, tried in order. `%m` and `%d` also accept
/// single digits.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Everything a row needs besides its own cells.
#[derive(Debug, Clone, Default)]
pub struct RowContext {
  pub establishment_id:    i64,
  pub default_location_id: Option<i64>,
  /// Locations of the establishment, for resolving the `location` column.
  pub locations:           Vec<Location>,
}

impl RowContext {
  pub fn new(establishment_id: i64) -> Self {
    Self { establishment_id, ..Default::default() }
  }

  fn location_named(&self, name: &str) -> Option<i64> {
    self
      .locations
      .iter()
      .find(|l| l.name.trim().eq_ignore_ascii_case(name))
      .map(|l| l.id)
  }
}

/// Convert every data row, in order.
///
/// The mapping is assumed to have passed [`ColumnMapping::validate`]; a
/// mapped header missing from the table reads as blank.
pub fn convert_rows(
  table: &CsvTable,
  mapping: &ColumnMapping,
  ctx: &RowContext,
) -> Vec<Result<NewIncident, RowError>> {
  let columns = Columns::resolve(table, mapping);
  table
    .rows
    .iter()
    .enumerate()
    .map(|(i, row)| {
      if let Some(e) = table.unreadable_row(i + 1) {
        return Err(e.clone());
      }
      convert_row(&columns, row, ctx).map_err(|reason| RowError::new(i + 1, reason))
    })
    .collect()
}

/// Column index for each mapped field.
struct Columns(Vec<(CanonicalField, usize)>);

impl Columns {
  fn resolve(table: &CsvTable, mapping: &ColumnMapping) -> Self {
    Self(
      mapping
        .iter()
        .filter_map(|(field, header)| {
          table.column_index(header).map(|i| (field, i))
        })
        .collect(),
    )
  }

  /// The trimmed cell for `field`, or `None` when unmapped or blank.
  fn get<'r>(&self, row: &'r [String], field: CanonicalField) -> Option<&'r str> {
    self
      .0
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, i)| cell(row, *i).trim())
      .filter(|v| !v.is_empty())
  }
}

fn convert_row(
  cols: &Columns,
  row: &[String],
  ctx: &RowContext,
) -> Result<NewIncident, String> {
  use CanonicalField as F;

  let name = cols
    .get(row, F::EmployeeName)
    .ok_or("missing employee name")?;
  let date = cols
    .get(row, F::IncidentDate)
    .ok_or("missing incident date")?;
  let date = parse_date(date)?;
  let description = cols.get(row, F::Description).unwrap_or(DEFAULT_DESCRIPTION);

  let mut incident =
    NewIncident::new(ctx.establishment_id, name, date, description);
  let d = &mut incident.details;

  d.employee_job_title = cols.get(row, F::EmployeeJobTitle).map(str::to_owned);
  d.employee_gender = cols.get(row, F::EmployeeGender).map(str::to_owned);
  d.incident_time = cols.get(row, F::IncidentTime).map(str::to_owned);
  d.where_occurred = cols.get(row, F::WhereOccurred).map(str::to_owned);

  d.location_id = match cols.get(row, F::Location) {
    Some(name) => Some(
      ctx
        .location_named(name)
        .ok_or_else(|| format!("unknown location {name:?}"))?,
    ),
    None => ctx.default_location_id,
  };

  if let Some(v) = cols.get(row, F::OutcomeSeverity) {
    d.outcome_severity =
      OutcomeSeverity::parse_label(v).map_err(|e| e.to_string())?;
  }
  if let Some(v) = cols.get(row, F::InjuryIllnessType) {
    d.injury_illness_type =
      InjuryType::parse_label(v).map_err(|e| e.to_string())?;
  }
  if let Some(v) = cols.get(row, F::DaysAwayCount) {
    d.days_away_count = parse_days(v, "days away")?;
  }
  if let Some(v) = cols.get(row, F::DaysRestrictedCount) {
    d.days_restricted_count = parse_days(v, "days restricted")?;
  }
  if let Some(v) = cols.get(row, F::IsRecordable) {
    d.is_recordable = parse_bool(v, "recordable")?;
  }
  if let Some(v) = cols.get(row, F::IsPrivacyCase) {
    d.is_privacy_case = parse_bool(v, "privacy case")?;
  }

  incident.normalize();
  incident.validate().map_err(|e| e.to_string())?;
  Ok(incident)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
  let date = DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    .ok_or_else(|| format!("unrecognized date {value:?}"))?;
  validate::date(date, "incident date").map_err(|e| e.to_string())?;
  Ok(date)
}

pub fn parse_days(value: &str, field: &str) -> Result<i64, String> {
  let days: i64 = value
    .parse()
    .map_err(|_| format!("{field} is not a whole number: {value:?}"))?;
  validate::days_count(days, field).map_err(|e| e.to_string())?;
  Ok(days)
}

pub fn parse_bool(value: &str, field: &str) -> Result<bool, String> {
  match value.to_ascii_lowercase().as_str() {
    "yes" | "y" | "true" | "1" | "x" => Ok(true),
    "no" | "n" | "false" | "0" => Ok(false),
    _ => Err(format!("{field} is not a yes/no value: {value:?}")),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use safety_core::incident::PRIVACY_PLACEHOLDER;

  use super::*;

  fn table(text: &str) -> CsvTable { CsvTable::parse(text.as_bytes()).unwrap() }

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

  #[test]
  fn jane_doe_row_gets_defaults() {
    let t = table("Employee Name,Incident Date,Notes\nJane Doe,2026-03-01,fell\n");
    let m = ColumnMapping::new()
      .with(CanonicalField::EmployeeName, "Employee Name")
      .with(CanonicalField::IncidentDate, "Incident Date")
      .with(CanonicalField::Description, "Notes");

    let out = convert_rows(&t, &m, &RowContext::new(7));
    assert_eq!(out.len(), 1);
    let inc = out[0].as_ref().unwrap();

    assert_eq!(inc.establishment_id, 7);
    assert_eq!(inc.details.employee_name, "Jane Doe");
    assert_eq!(inc.details.description, "fell");
    assert_eq!(inc.details.outcome_severity, OutcomeSeverity::OtherRecordable);
    assert_eq!(inc.details.injury_illness_type, InjuryType::Injury);
    assert!(inc.details.is_recordable);
    assert_eq!(inc.details.days_away_count, 0);
    assert_eq!(inc.details.days_restricted_count, 0);
  }

  #[test]
  fn failures_name_their_row_and_others_succeed() {
    let t = table(
      "Name,Date\n\
       Alice,2026-01-02\n\
       ,2026-01-03\n\
       Bob,\n\
       Carol,not a date\n\
       Dan,1/9/2026\n",
    );
    let m = ColumnMapping::new()
      .with(CanonicalField::EmployeeName, "Name")
      .with(CanonicalField::IncidentDate, "Date");

    let out = convert_rows(&t, &m, &RowContext::new(1));
    let errors: Vec<_> = out.iter().filter_map(|r| r.as_ref().err()).collect();

    assert_eq!(out.iter().filter(|r| r.is_ok()).count(), 2);
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0].to_string(), "Row 2: missing employee name");
    assert_eq!(errors[1].to_string(), "Row 3: missing incident date");
    assert_eq!(errors[2].row, 4);
    assert_eq!(
      out[4].as_ref().unwrap().details.incident_date,
      NaiveDate::from_ymd_opt(2026, 1, 9).unwrap()
    );
  }

  #[test]
  fn labels_match_keys_and_display_text() {
    let t = table(
      "Name,Date,Outcome,Type,Away,Restricted\n\
       A,2026-02-01,Days Away From Work,HEARING_LOSS,12,30\n\
       B,2026-02-02,sprained,injury,0,0\n",
    );
    let m = ColumnMapping::new()
      .with(CanonicalField::EmployeeName, "Name")
      .with(CanonicalField::IncidentDate, "Date")
      .with(CanonicalField::OutcomeSeverity, "Outcome")
      .with(CanonicalField::InjuryIllnessType, "Type")
      .with(CanonicalField::DaysAwayCount, "Away")
      .with(CanonicalField::DaysRestrictedCount, "Restricted");

    let out = convert_rows(&t, &m, &RowContext::new(1));
    let a = out[0].as_ref().unwrap();
    assert_eq!(a.details.outcome_severity, OutcomeSeverity::DaysAway);
    assert_eq!(a.details.injury_illness_type, InjuryType::HearingLoss);
    assert_eq!(a.details.days_away_count, 12);
    // A days-away case may also have restricted days.
    assert_eq!(a.details.days_restricted_count, 30);

    let b = out[1].as_ref().unwrap_err();
    assert_eq!(b.row, 2);
    assert!(b.reason.contains("sprained"));
  }

  #[test]
  fn locations_resolve_by_name_or_default() {
    let t = table("Name,Date,Where\nA,2026-02-01,warehouse\nB,2026-02-01,\nC,2026-02-01,Roof\n");
    let m = ColumnMapping::new()
      .with(CanonicalField::EmployeeName, "Name")
      .with(CanonicalField::IncidentDate, "Date")
      .with(CanonicalField::Location, "Where");
    let ctx = RowContext {
      establishment_id:    1,
      default_location_id: Some(9),
      locations:           vec![location(3, "Warehouse"), location(9, "Office")],
    };

    let out = convert_rows(&t, &m, &ctx);
    assert_eq!(out[0].as_ref().unwrap().details.location_id, Some(3));
    assert_eq!(out[1].as_ref().unwrap().details.location_id, Some(9));
    assert!(out[2].as_ref().unwrap_err().reason.contains("Roof"));
  }

  #[test]
  fn booleans_and_privacy() {
    let t = table("Name,Date,Rec,Private\nA,2026-02-01,no,X\nB,2026-02-01,maybe,\n");
    let m = ColumnMapping::new()
      .with(CanonicalField::EmployeeName, "Name")
      .with(CanonicalField::IncidentDate, "Date")
      .with(CanonicalField::IsRecordable, "Rec")
      .with(CanonicalField::IsPrivacyCase, "Private");

    let out = convert_rows(&t, &m, &RowContext::new(1));
    let a = out[0].as_ref().unwrap();
    assert!(!a.details.is_recordable);
    assert!(a.details.is_privacy_case);
    assert_eq!(a.details.employee_name, "A");
    assert_ne!(a.details.employee_name, PRIVACY_PLACEHOLDER);
    assert!(out[1].is_err());
  }

  #[test]
  fn date_layouts_and_range() {
    let want = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    assert_eq!(parse_date("2026-03-01").unwrap(), want);
    assert_eq!(parse_date("03/01/2026").unwrap(), want);
    assert_eq!(parse_date("3/1/2026").unwrap(), want);
    assert_eq!(parse_date("2026/03/01").unwrap(), want);
    assert!(parse_date("1969-12-31").is_err());
    assert!(parse_date("March 1").is_err());
  }

  #[test]
  fn day_counts_are_bounded() {
    assert_eq!(parse_days("180", "days away").unwrap(), 180);
    assert!(parse_days("181", "days away").is_err());
    assert!(parse_days("-1", "days away").is_err());
    assert!(parse_days("2.5", "days away").is_err());
  }
}
