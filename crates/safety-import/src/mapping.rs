//! Canonical incident fields and the table mapping them to CSV headers.

use std::collections::BTreeMap;

use safety_core::label::normalize;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{ImportError, Result};

/// An incident field a CSV column can feed.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalField {
  EmployeeName,
  EmployeeJobTitle,
  IncidentDate,
  IncidentTime,
  Description,
  WhereOccurred,
  Location,
  OutcomeSeverity,
  InjuryIllnessType,
  DaysAwayCount,
  DaysRestrictedCount,
  IsRecordable,
  IsPrivacyCase,
  EmployeeGender,
}

impl CanonicalField {
  pub const REQUIRED: [Self; 2] = [Self::EmployeeName, Self::IncidentDate];

  pub fn is_required(self) -> bool { Self::REQUIRED.contains(&self) }
}

/// Canonical field → source column header.
///
/// Serialized as a plain JSON object, e.g.
/// `{"employee_name": "Employee Name"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<CanonicalField, String>);

impl ColumnMapping {
  pub fn new() -> Self { Self::default() }

  /// Match every canonical field against `headers` by normalized name.
  /// The first matching header wins; fields with no match stay unmapped.
  pub fn auto(headers: &[String]) -> Self {
    let normalized: Vec<String> =
      headers.iter().map(|h| normalize(h)).collect();

    let mut mapping = Self::new();
    for field in CanonicalField::iter() {
      let wanted = normalize(field.as_ref());
      if let Some(i) = normalized.iter().position(|h| *h == wanted) {
        mapping.set(field, headers[i].clone());
      }
    }
    mapping
  }

  pub fn set(&mut self, field: CanonicalField, header: impl Into<String>) {
    self.0.insert(field, header.into());
  }

  pub fn with(mut self, field: CanonicalField, header: impl Into<String>) -> Self {
    self.set(field, header);
    self
  }

  pub fn get(&self, field: CanonicalField) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn is_mapped(&self, field: CanonicalField) -> bool {
    self.0.contains_key(&field)
  }

  pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
    self.0.iter().map(|(f, h)| (*f, h.as_str()))
  }

  /// Check the mapping can be applied to a file with `headers`: both
  /// required fields are mapped and every mapped header exists.
  pub fn validate(&self, headers: &[String]) -> Result<()> {
    if let Some(field) =
      CanonicalField::REQUIRED.into_iter().find(|f| !self.is_mapped(*f))
    {
      return Err(ImportError::MissingRequired(field));
    }

    for (field, header) in self.iter() {
      if !headers.iter().any(|h| h == header) {
        return Err(ImportError::UnknownColumn {
          field,
          header: header.to_owned(),
        });
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headers(hs: &[&str]) -> Vec<String> {
    hs.iter().map(|h| h.to_string()).collect()
  }

  #[test]
  fn auto_maps_by_normalized_name() {
    let hs = headers(&["EMPLOYEE NAME", "Incident_Date", "Days Away Count", "Notes"]);
    let m = ColumnMapping::auto(&hs);

    assert_eq!(m.get(CanonicalField::EmployeeName), Some("EMPLOYEE NAME"));
    assert_eq!(m.get(CanonicalField::IncidentDate), Some("Incident_Date"));
    assert_eq!(m.get(CanonicalField::DaysAwayCount), Some("Days Away Count"));
    assert!(!m.is_mapped(CanonicalField::Description));
  }

  #[test]
  fn auto_first_match_wins() {
    let hs = headers(&["employee name", "Employee_Name"]);
    let m = ColumnMapping::auto(&hs);
    assert_eq!(m.get(CanonicalField::EmployeeName), Some("employee name"));
  }

  #[test]
  fn validate_requires_name_and_date() {
    let hs = headers(&["Name", "Date"]);
    let m = ColumnMapping::new().with(CanonicalField::IncidentDate, "Date");
    assert!(matches!(
      m.validate(&hs),
      Err(ImportError::MissingRequired(CanonicalField::EmployeeName))
    ));

    let m = m.with(CanonicalField::EmployeeName, "Name");
    assert!(m.validate(&hs).is_ok());
  }

  #[test]
  fn validate_rejects_absent_header() {
    let hs = headers(&["Name", "Date"]);
    let m = ColumnMapping::new()
      .with(CanonicalField::EmployeeName, "Name")
      .with(CanonicalField::IncidentDate, "Date")
      .with(CanonicalField::Description, "Notes");
    assert!(matches!(
      m.validate(&hs),
      Err(ImportError::UnknownColumn { field: CanonicalField::Description, .. })
    ));
  }

  #[test]
  fn field_names_parse_and_serialize() {
    assert_eq!(
      "days_away_count".parse::<CanonicalField>().unwrap(),
      CanonicalField::DaysAwayCount
    );
    assert_eq!(CanonicalField::IsPrivacyCase.to_string(), "is_privacy_case");

    let m: ColumnMapping =
      serde_json::from_str(r#"{"employee_name":"Who","incident_date":"When"}"#)
        .unwrap();
    assert_eq!(m.get(CanonicalField::EmployeeName), Some("Who"));
    assert!(serde_json::from_str::<ColumnMapping>(r#"{"bogus":"x"}"#).is_err());
  }
}
