//! The individual incident report (OSHA Form 301).

use chrono::NaiveDate;
use safety_core::incident::Incident;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndividualReport {
  pub case_number: i64,
  pub case_year:   i32,

  // Employee
  pub employee_name:      String,
  pub employee_address:   Option<String>,
  pub employee_city:      Option<String>,
  pub employee_state:     Option<String>,
  pub employee_zip:       Option<String>,
  pub employee_dob:       Option<NaiveDate>,
  pub employee_hire_date: Option<NaiveDate>,
  pub employee_gender:    Option<String>,

  // Treatment
  pub physician_name:          Option<String>,
  pub treatment_facility:      Option<String>,
  pub facility_address:        Option<String>,
  pub facility_city_state_zip: Option<String>,
  pub treated_in_er:           bool,
  pub hospitalized_overnight:  bool,

  // Case
  pub incident_date:            NaiveDate,
  pub incident_time:            Option<String>,
  pub work_start_time:          Option<String>,
  pub where_occurred:           Option<String>,
  pub activity_before_incident: Option<String>,
  pub how_injury_occurred:      Option<String>,
  pub injury_description:       Option<String>,
  pub object_substance:         Option<String>,
  pub date_of_death:            Option<NaiveDate>,

  // Completed by
  pub completed_by:       Option<String>,
  pub completed_by_title: Option<String>,
  pub completed_by_phone: Option<String>,
  pub completed_date:     Option<NaiveDate>,
}

/// Build the report for one incident. Privacy cases print the placeholder
/// instead of the employee's name.
pub fn individual_report(incident: &Incident) -> IndividualReport {
  let d = incident.details.clone();
  IndividualReport {
    case_number:              incident.case_number,
    case_year:                incident.case_year,
    employee_name:            incident.display_name().to_owned(),
    employee_address:         d.employee_address,
    employee_city:            d.employee_city,
    employee_state:           d.employee_state,
    employee_zip:             d.employee_zip,
    employee_dob:             d.employee_dob,
    employee_hire_date:       d.employee_hire_date,
    employee_gender:          d.employee_gender,
    physician_name:           d.physician_name,
    treatment_facility:       d.treatment_facility,
    facility_address:         d.facility_address,
    facility_city_state_zip:  d.facility_city_state_zip,
    treated_in_er:            d.treated_in_er.unwrap_or(false),
    hospitalized_overnight:   d.hospitalized_overnight.unwrap_or(false),
    incident_date:            d.incident_date,
    incident_time:            d.incident_time,
    work_start_time:          d.work_start_time,
    where_occurred:           d.where_occurred,
    activity_before_incident: d.activity_before_incident,
    how_injury_occurred:      d.how_injury_occurred,
    injury_description:       d.injury_description,
    object_substance:         d.object_substance,
    date_of_death:            d.date_of_death,
    completed_by:             d.completed_by,
    completed_by_title:       d.completed_by_title,
    completed_by_phone:       d.completed_by_phone,
    completed_date:           d.completed_date,
  }
}

#[cfg(test)]
mod tests {
  use safety_core::incident::PRIVACY_PLACEHOLDER;

  use super::*;
  use crate::test_helpers::incident;

  #[test]
  fn copies_sections() {
    let mut inc = incident(3, 2026, 5, 2);
    inc.details.physician_name = Some("Dr. Ames".into());
    inc.details.treated_in_er = Some(true);
    let r = individual_report(&inc);

    assert_eq!(r.case_number, 3);
    assert_eq!(r.employee_name, "Worker 3");
    assert_eq!(r.physician_name.as_deref(), Some("Dr. Ames"));
    assert!(r.treated_in_er);
    assert!(!r.hospitalized_overnight);
  }

  #[test]
  fn privacy_case_hides_name() {
    let mut inc = incident(3, 2026, 5, 2);
    inc.details.is_privacy_case = true;
    assert_eq!(individual_report(&inc).employee_name, PRIVACY_PLACEHOLDER);
  }
}
