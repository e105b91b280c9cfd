//! Incident records: the unit every regulatory report is built from.
//!
//! An incident is identified by a store-assigned row id and, for regulatory
//! purposes, by a case number that restarts at 1 for each establishment in
//! each calendar year. The case year is fixed when the incident is created.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{Error, Result, label::Labeled, validate};

/// Placeholder printed instead of the employee's name on privacy cases.
pub const PRIVACY_PLACEHOLDER: &str = "Privacy Case";

// ─── Classification ──────────────────────────────────────────────────────────

/// The most serious outcome of the case. Exactly one applies.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSeverity {
  Death,
  DaysAway,
  JobTransferRestriction,
  #[default]
  OtherRecordable,
}

impl Labeled for OutcomeSeverity {
  const KIND: &'static str = "outcome severity";

  fn key(self) -> &'static str {
    match self {
      Self::Death => "death",
      Self::DaysAway => "days_away",
      Self::JobTransferRestriction => "job_transfer_restriction",
      Self::OtherRecordable => "other_recordable",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Death => "Death",
      Self::DaysAway => "Days Away From Work",
      Self::JobTransferRestriction => "Job Transfer or Restriction",
      Self::OtherRecordable => "Other Recordable Cases",
    }
  }
}

impl OutcomeSeverity {
  /// Whether the severity carries days away from work.
  pub fn keeps_days_away(self) -> bool { matches!(self, Self::DaysAway) }

  /// Whether the severity carries days of restricted work.
  pub fn keeps_days_restricted(self) -> bool {
    matches!(self, Self::DaysAway | Self::JobTransferRestriction)
  }
}

/// Injury or illness column of the log.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum InjuryType {
  #[default]
  Injury,
  SkinDisorder,
  Respiratory,
  Poisoning,
  HearingLoss,
  OtherIllness,
}

impl Labeled for InjuryType {
  const KIND: &'static str = "injury/illness type";

  fn key(self) -> &'static str {
    match self {
      Self::Injury => "injury",
      Self::SkinDisorder => "skin_disorder",
      Self::Respiratory => "respiratory",
      Self::Poisoning => "poisoning",
      Self::HearingLoss => "hearing_loss",
      Self::OtherIllness => "other_illness",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Injury => "Injury",
      Self::SkinDisorder => "Skin Disorder",
      Self::Respiratory => "Respiratory Condition",
      Self::Poisoning => "Poisoning",
      Self::HearingLoss => "Hearing Loss",
      Self::OtherIllness => "All Other Illnesses",
    }
  }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
  #[default]
  Open,
  InReview,
  Closed,
}

impl Labeled for IncidentStatus {
  const KIND: &'static str = "incident status";

  fn key(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::InReview => "in_review",
      Self::Closed => "closed",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Open => "Open",
      Self::InReview => "In Review",
      Self::Closed => "Closed",
    }
  }
}

impl IncidentStatus {
  /// Forward moves and reopening are allowed. A closed case cannot go back
  /// into review without being reopened first.
  pub fn can_move_to(self, next: Self) -> bool {
    !matches!((self, next), (Self::Closed, Self::InReview))
  }

  pub fn transition(self, next: Self) -> Result<Self> {
    if self.can_move_to(next) {
      Ok(next)
    } else {
      Err(Error::InvalidTransition {
        entity: "incident",
        from:   self.key(),
        to:     next.key(),
      })
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

fn yes() -> bool { true }

/// Every caller-editable field of an incident.
///
/// Shared by [`Incident`] and [`NewIncident`]; the identity fields
/// (establishment, case number, case year) live outside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentDetails {
  #[serde(default)]
  pub location_id: Option<i64>,

  // Employee
  pub employee_name:       String,
  #[serde(default)]
  pub employee_job_title:  Option<String>,
  #[serde(default)]
  pub employee_address:    Option<String>,
  #[serde(default)]
  pub employee_city:       Option<String>,
  #[serde(default)]
  pub employee_state:      Option<String>,
  #[serde(default)]
  pub employee_zip:        Option<String>,
  #[serde(default)]
  pub employee_dob:        Option<NaiveDate>,
  #[serde(default)]
  pub employee_hire_date:  Option<NaiveDate>,
  #[serde(default)]
  pub employee_gender:     Option<String>,
  #[serde(default)]
  pub is_privacy_case:     bool,

  // Event
  pub incident_date:            NaiveDate,
  #[serde(default)]
  pub incident_time:            Option<String>,
  #[serde(default)]
  pub work_start_time:          Option<String>,
  #[serde(default)]
  pub where_occurred:           Option<String>,
  pub description:              String,
  #[serde(default)]
  pub activity_before_incident: Option<String>,
  #[serde(default)]
  pub how_injury_occurred:      Option<String>,
  #[serde(default)]
  pub injury_description:       Option<String>,
  #[serde(default)]
  pub object_substance:         Option<String>,

  // Treatment
  #[serde(default)]
  pub physician_name:          Option<String>,
  #[serde(default)]
  pub treatment_facility:      Option<String>,
  #[serde(default)]
  pub facility_address:        Option<String>,
  #[serde(default)]
  pub facility_city_state_zip: Option<String>,
  #[serde(default)]
  pub treated_in_er:           Option<bool>,
  #[serde(default)]
  pub hospitalized_overnight:  Option<bool>,

  // Classification
  #[serde(default)]
  pub outcome_severity:      OutcomeSeverity,
  #[serde(default)]
  pub days_away_count:       i64,
  #[serde(default)]
  pub days_restricted_count: i64,
  #[serde(default)]
  pub date_of_death:         Option<NaiveDate>,
  #[serde(default)]
  pub injury_illness_type:   InjuryType,
  #[serde(default = "yes")]
  pub is_recordable:         bool,

  // Completion
  #[serde(default)]
  pub completed_by:       Option<String>,
  #[serde(default)]
  pub completed_by_title: Option<String>,
  #[serde(default)]
  pub completed_by_phone: Option<String>,
  #[serde(default)]
  pub completed_date:     Option<NaiveDate>,
}

impl IncidentDetails {
  /// Details with the required fields set and every other field at its
  /// default.
  pub fn new(
    employee_name: impl Into<String>,
    incident_date: NaiveDate,
    description: impl Into<String>,
  ) -> Self {
    Self {
      location_id:              None,
      employee_name:            employee_name.into(),
      employee_job_title:       None,
      employee_address:         None,
      employee_city:            None,
      employee_state:           None,
      employee_zip:             None,
      employee_dob:             None,
      employee_hire_date:       None,
      employee_gender:          None,
      is_privacy_case:          false,
      incident_date,
      incident_time:            None,
      work_start_time:          None,
      where_occurred:           None,
      description:              description.into(),
      activity_before_incident: None,
      how_injury_occurred:      None,
      injury_description:       None,
      object_substance:         None,
      physician_name:           None,
      treatment_facility:       None,
      facility_address:         None,
      facility_city_state_zip:  None,
      treated_in_er:            None,
      hospitalized_overnight:   None,
      outcome_severity:         OutcomeSeverity::default(),
      days_away_count:          0,
      days_restricted_count:    0,
      date_of_death:            None,
      injury_illness_type:      InjuryType::default(),
      is_recordable:            true,
      completed_by:             None,
      completed_by_title:       None,
      completed_by_phone:       None,
      completed_date:           None,
    }
  }

  /// Zero the day counts the severity does not carry.
  pub fn normalize(&mut self) {
    if !self.outcome_severity.keeps_days_away() {
      self.days_away_count = 0;
    }
    if !self.outcome_severity.keeps_days_restricted() {
      self.days_restricted_count = 0;
    }
  }

  pub fn validate(&self) -> Result<()> {
    validate::name(&self.employee_name, "employee name")?;
    validate::not_empty(&self.description, "description")?;
    validate::max_length(
      &self.description,
      validate::MAX_DESCRIPTION_LENGTH,
      "description",
    )?;
    validate::date(self.incident_date, "incident date")?;
    validate::days_count(self.days_away_count, "days away from work")?;
    validate::days_count(self.days_restricted_count, "days of restricted work")?;
    if let Some(title) = &self.employee_job_title {
      validate::max_length(title, validate::MAX_NAME_LENGTH, "job title")?;
    }
    Ok(())
  }
}

/// A persisted incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
  pub id:               i64,
  pub establishment_id: i64,
  pub case_number:      i64,
  /// The calendar year the case number is scoped to.
  pub case_year:        i32,
  pub status:           IncidentStatus,
  #[serde(flatten)]
  pub details:          IncidentDetails,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl Incident {
  /// The name to print on a report: the placeholder for privacy cases.
  pub fn display_name(&self) -> &str {
    if self.details.is_privacy_case {
      PRIVACY_PLACEHOLDER
    } else {
      &self.details.employee_name
    }
  }
}

/// Input for [`SafetyStore::create_incident`](crate::store::SafetyStore::create_incident).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
  pub establishment_id: i64,
  #[serde(flatten)]
  pub details:          IncidentDetails,
}

impl NewIncident {
  pub fn new(
    establishment_id: i64,
    employee_name: impl Into<String>,
    incident_date: NaiveDate,
    description: impl Into<String>,
  ) -> Self {
    Self {
      establishment_id,
      details: IncidentDetails::new(employee_name, incident_date, description),
    }
  }

  /// The year the case number will be scoped to.
  pub fn case_year(&self) -> i32 { self.details.incident_date.year() }

  pub fn normalize(&mut self) { self.details.normalize() }

  pub fn validate(&self) -> Result<()> { self.details.validate() }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// A partial update. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentPatch {
  pub location_id:              Option<i64>,
  pub employee_name:            Option<String>,
  pub employee_job_title:       Option<String>,
  pub employee_address:         Option<String>,
  pub employee_city:            Option<String>,
  pub employee_state:           Option<String>,
  pub employee_zip:             Option<String>,
  pub employee_dob:             Option<NaiveDate>,
  pub employee_hire_date:       Option<NaiveDate>,
  pub employee_gender:          Option<String>,
  pub is_privacy_case:          Option<bool>,
  pub incident_date:            Option<NaiveDate>,
  pub incident_time:            Option<String>,
  pub work_start_time:          Option<String>,
  pub where_occurred:           Option<String>,
  pub description:              Option<String>,
  pub activity_before_incident: Option<String>,
  pub how_injury_occurred:      Option<String>,
  pub injury_description:       Option<String>,
  pub object_substance:         Option<String>,
  pub physician_name:           Option<String>,
  pub treatment_facility:       Option<String>,
  pub facility_address:         Option<String>,
  pub facility_city_state_zip:  Option<String>,
  pub treated_in_er:            Option<bool>,
  pub hospitalized_overnight:   Option<bool>,
  pub outcome_severity:         Option<OutcomeSeverity>,
  pub days_away_count:          Option<i64>,
  pub days_restricted_count:    Option<i64>,
  pub date_of_death:            Option<NaiveDate>,
  pub injury_illness_type:      Option<InjuryType>,
  pub is_recordable:            Option<bool>,
  pub status:                   Option<IncidentStatus>,
  pub completed_by:             Option<String>,
  pub completed_by_title:       Option<String>,
  pub completed_by_phone:       Option<String>,
  pub completed_date:           Option<NaiveDate>,
}

impl IncidentPatch {
  /// Apply the patch to `incident`, checking the status transition,
  /// re-normalizing day counts and validating the result.
  ///
  /// The incident is left untouched on error.
  pub fn apply(self, incident: &mut Incident) -> Result<()> {
    let status = match self.status {
      Some(next) => incident.status.transition(next)?,
      None => incident.status,
    };

    let mut d = incident.details.clone();

    macro_rules! set {
      ($($field:ident),* $(,)?) => {
        $(if let Some(v) = self.$field { d.$field = v; })*
      };
    }
    macro_rules! set_opt {
      ($($field:ident),* $(,)?) => {
        $(if let Some(v) = self.$field { d.$field = Some(v); })*
      };
    }

    set!(
      employee_name,
      is_privacy_case,
      incident_date,
      description,
      outcome_severity,
      days_away_count,
      days_restricted_count,
      injury_illness_type,
      is_recordable,
    );
    set_opt!(
      location_id,
      employee_job_title,
      employee_address,
      employee_city,
      employee_state,
      employee_zip,
      employee_dob,
      employee_hire_date,
      employee_gender,
      incident_time,
      work_start_time,
      where_occurred,
      activity_before_incident,
      how_injury_occurred,
      injury_description,
      object_substance,
      physician_name,
      treatment_facility,
      facility_address,
      facility_city_state_zip,
      treated_in_er,
      hospitalized_overnight,
      date_of_death,
      completed_by,
      completed_by_title,
      completed_by_phone,
      completed_date,
    );

    d.normalize();
    d.validate()?;

    incident.details = d;
    incident.status = status;
    Ok(())
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`SafetyStore::list_incidents`](crate::store::SafetyStore::list_incidents).
///
/// Every field narrows the result; the default matches every incident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentFilter {
  pub establishment_id: Option<i64>,
  pub location_id:      Option<i64>,
  pub status:           Option<IncidentStatus>,
  pub outcome_severity: Option<OutcomeSeverity>,
  /// Inclusive lower bound on the incident date.
  pub date_from:        Option<NaiveDate>,
  /// Inclusive upper bound on the incident date.
  pub date_to:          Option<NaiveDate>,
  /// Substring match over employee name and description.
  pub search:           Option<String>,
}

impl IncidentFilter {
  /// Every incident of an establishment dated within `year`.
  pub fn for_year(establishment_id: i64, year: i32) -> Self {
    Self {
      establishment_id: Some(establishment_id),
      date_from: NaiveDate::from_ymd_opt(year, 1, 1),
      date_to: NaiveDate::from_ymd_opt(year, 12, 31),
      ..Self::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn incident() -> Incident {
    let now = Utc::now();
    Incident {
      id:               1,
      establishment_id: 1,
      case_number:      1,
      case_year:        2026,
      status:           IncidentStatus::Open,
      details:          IncidentDetails::new(
        "Jane Doe",
        date(2026, 3, 1),
        "Slipped on wet floor",
      ),
      created_at:       now,
      updated_at:       now,
    }
  }

  #[test]
  fn severity_labels_round_trip() {
    assert_eq!(
      OutcomeSeverity::parse_label("Days Away From Work").unwrap(),
      OutcomeSeverity::DaysAway
    );
    assert_eq!(
      OutcomeSeverity::parse_label("DEATH").unwrap(),
      OutcomeSeverity::Death
    );
    assert_eq!(
      OutcomeSeverity::parse_label("job transfer restriction").unwrap(),
      OutcomeSeverity::JobTransferRestriction
    );
    assert!(OutcomeSeverity::parse_label("papercut").is_err());
  }

  #[test]
  fn injury_type_accepts_key_or_label() {
    assert_eq!(
      InjuryType::parse_label("Respiratory Condition").unwrap(),
      InjuryType::Respiratory
    );
    assert_eq!(
      InjuryType::parse_label("hearing_loss").unwrap(),
      InjuryType::HearingLoss
    );
    assert_eq!(InjuryType::from_key("poisoning"), Some(InjuryType::Poisoning));
    assert_eq!(InjuryType::from_key("Poisoning"), None);
  }

  #[test]
  fn normalize_keeps_days_by_severity() {
    let mut d = IncidentDetails::new("A", date(2026, 1, 1), "x");
    d.days_away_count = 5;
    d.days_restricted_count = 3;

    d.outcome_severity = OutcomeSeverity::DaysAway;
    d.normalize();
    assert_eq!((d.days_away_count, d.days_restricted_count), (5, 3));

    d.outcome_severity = OutcomeSeverity::JobTransferRestriction;
    d.normalize();
    assert_eq!((d.days_away_count, d.days_restricted_count), (0, 3));

    d.outcome_severity = OutcomeSeverity::OtherRecordable;
    d.normalize();
    assert_eq!((d.days_away_count, d.days_restricted_count), (0, 0));
  }

  #[test]
  fn new_incident_defaults_from_json() {
    let json = r#"{
      "establishment_id": 4,
      "employee_name": "Jane Doe",
      "incident_date": "2026-03-01",
      "description": "fell"
    }"#;
    let new: NewIncident = serde_json::from_str(json).unwrap();
    assert_eq!(new.establishment_id, 4);
    assert_eq!(new.details.outcome_severity, OutcomeSeverity::OtherRecordable);
    assert_eq!(new.details.injury_illness_type, InjuryType::Injury);
    assert!(new.details.is_recordable);
    assert!(!new.details.is_privacy_case);
    assert_eq!(new.case_year(), 2026);
  }

  #[test]
  fn validate_rejects_blank_name_and_excess_days() {
    let mut d = IncidentDetails::new(" ", date(2026, 1, 1), "x");
    assert!(d.validate().is_err());

    d.employee_name = "Jane".into();
    d.days_away_count = 181;
    assert!(d.validate().is_err());

    d.days_away_count = 180;
    assert!(d.validate().is_ok());
  }

  #[test]
  fn closed_cannot_return_to_review() {
    let mut inc = incident();
    inc.status = IncidentStatus::Closed;
    let patch = IncidentPatch {
      status: Some(IncidentStatus::InReview),
      employee_name: Some("Changed".into()),
      ..Default::default()
    };
    let err = patch.apply(&mut inc).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(inc.details.employee_name, "Jane Doe");

    let reopen = IncidentPatch {
      status: Some(IncidentStatus::Open),
      ..Default::default()
    };
    reopen.apply(&mut inc).unwrap();
    assert_eq!(inc.status, IncidentStatus::Open);
  }

  #[test]
  fn patch_renormalizes_days() {
    let mut inc = incident();
    IncidentPatch {
      outcome_severity: Some(OutcomeSeverity::DaysAway),
      days_away_count: Some(10),
      days_restricted_count: Some(2),
      ..Default::default()
    }
    .apply(&mut inc)
    .unwrap();
    assert_eq!(inc.details.days_away_count, 10);

    IncidentPatch {
      outcome_severity: Some(OutcomeSeverity::Death),
      ..Default::default()
    }
    .apply(&mut inc)
    .unwrap();
    assert_eq!(inc.details.days_away_count, 0);
    assert_eq!(inc.details.days_restricted_count, 0);
  }

  #[test]
  fn privacy_case_hides_name() {
    let mut inc = incident();
    assert_eq!(inc.display_name(), "Jane Doe");
    inc.details.is_privacy_case = true;
    assert_eq!(inc.display_name(), PRIVACY_PLACEHOLDER);
  }
}
