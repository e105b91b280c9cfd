//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. Enumerations are stored by their [`Labeled::key`].
//!
//! Rows are first read into `Raw*` structs inside the connection closure, then
//! decoded into domain types outside it so decode failures surface as
//! [`Error`] rather than as `rusqlite` errors.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use safety_core::{
  action::CorrectiveAction,
  establishment::{Establishment, Location},
  incident::{Incident, IncidentDetails},
  jsa::JsaInstance,
  label::Labeled,
  rca::RcaSession,
  stats::AnnualStats,
  toolbox::{Attendee, ToolboxTalk},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Labels ──────────────────────────────────────────────────────────────────

pub fn decode_label<T: Labeled>(s: &str) -> Result<T> {
  T::from_key(s)
    .ok_or_else(|| Error::Decode(format!("unknown {}: {s:?}", T::KIND)))
}

// ─── Establishment ───────────────────────────────────────────────────────────

pub const ESTABLISHMENT_COLUMNS: &str = "id, name, street_address, city, state, \
  zip_code, industry_description, naics_code, created_at, updated_at";

pub struct RawEstablishment {
  pub id:                   i64,
  pub name:                 String,
  pub street_address:       Option<String>,
  pub city:                 Option<String>,
  pub state:                Option<String>,
  pub zip_code:             Option<String>,
  pub industry_description: Option<String>,
  pub naics_code:           Option<String>,
  pub created_at:           String,
  pub updated_at:           String,
}

impl RawEstablishment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get("id")?,
      name:                 row.get("name")?,
      street_address:       row.get("street_address")?,
      city:                 row.get("city")?,
      state:                row.get("state")?,
      zip_code:             row.get("zip_code")?,
      industry_description: row.get("industry_description")?,
      naics_code:           row.get("naics_code")?,
      created_at:           row.get("created_at")?,
      updated_at:           row.get("updated_at")?,
    })
  }

  pub fn into_establishment(self) -> Result<Establishment> {
    Ok(Establishment {
      id:                   self.id,
      name:                 self.name,
      street_address:       self.street_address,
      city:                 self.city,
      state:                self.state,
      zip_code:             self.zip_code,
      industry_description: self.industry_description,
      naics_code:           self.naics_code,
      created_at:           decode_dt(&self.created_at)?,
      updated_at:           decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

pub const LOCATION_COLUMNS: &str = "id, establishment_id, name, address, city, \
  state, is_active, created_at, updated_at";

pub struct RawLocation {
  pub id:               i64,
  pub establishment_id: i64,
  pub name:             String,
  pub address:          Option<String>,
  pub city:             Option<String>,
  pub state:            Option<String>,
  pub is_active:        bool,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawLocation {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get("id")?,
      establishment_id: row.get("establishment_id")?,
      name:             row.get("name")?,
      address:          row.get("address")?,
      city:             row.get("city")?,
      state:            row.get("state")?,
      is_active:        row.get("is_active")?,
      created_at:       row.get("created_at")?,
      updated_at:       row.get("updated_at")?,
    })
  }

  pub fn into_location(self) -> Result<Location> {
    Ok(Location {
      id:               self.id,
      establishment_id: self.establishment_id,
      name:             self.name,
      address:          self.address,
      city:             self.city,
      state:            self.state,
      is_active:        self.is_active,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Incident ────────────────────────────────────────────────────────────────

pub const INCIDENT_COLUMNS: &str = "id, establishment_id, location_id, \
  case_number, case_year, status, \
  employee_name, employee_job_title, employee_address, employee_city, \
  employee_state, employee_zip, employee_dob, employee_hire_date, \
  employee_gender, is_privacy_case, \
  incident_date, incident_time, work_start_time, where_occurred, description, \
  activity_before_incident, how_injury_occurred, injury_description, \
  object_substance, \
  physician_name, treatment_facility, facility_address, \
  facility_city_state_zip, treated_in_er, hospitalized_overnight, \
  outcome_severity, days_away_count, days_restricted_count, date_of_death, \
  injury_illness_type, is_recordable, \
  completed_by, completed_by_title, completed_by_phone, completed_date, \
  created_at, updated_at";

/// Raw column values of an `incidents` row.
pub struct RawIncident {
  pub id:                       i64,
  pub establishment_id:         i64,
  pub location_id:              Option<i64>,
  pub case_number:              i64,
  pub case_year:                i32,
  pub status:                   String,
  pub employee_name:            String,
  pub employee_job_title:       Option<String>,
  pub employee_address:         Option<String>,
  pub employee_city:            Option<String>,
  pub employee_state:           Option<String>,
  pub employee_zip:             Option<String>,
  pub employee_dob:             Option<String>,
  pub employee_hire_date:       Option<String>,
  pub employee_gender:          Option<String>,
  pub is_privacy_case:          bool,
  pub incident_date:            String,
  pub incident_time:            Option<String>,
  pub work_start_time:          Option<String>,
  pub where_occurred:           Option<String>,
  pub description:              String,
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
  pub outcome_severity:         String,
  pub days_away_count:          i64,
  pub days_restricted_count:    i64,
  pub date_of_death:            Option<String>,
  pub injury_illness_type:      String,
  pub is_recordable:            bool,
  pub completed_by:             Option<String>,
  pub completed_by_title:       Option<String>,
  pub completed_by_phone:       Option<String>,
  pub completed_date:           Option<String>,
  pub created_at:               String,
  pub updated_at:               String,
}

impl RawIncident {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                       row.get("id")?,
      establishment_id:         row.get("establishment_id")?,
      location_id:              row.get("location_id")?,
      case_number:              row.get("case_number")?,
      case_year:                row.get("case_year")?,
      status:                   row.get("status")?,
      employee_name:            row.get("employee_name")?,
      employee_job_title:       row.get("employee_job_title")?,
      employee_address:         row.get("employee_address")?,
      employee_city:            row.get("employee_city")?,
      employee_state:           row.get("employee_state")?,
      employee_zip:             row.get("employee_zip")?,
      employee_dob:             row.get("employee_dob")?,
      employee_hire_date:       row.get("employee_hire_date")?,
      employee_gender:          row.get("employee_gender")?,
      is_privacy_case:          row.get("is_privacy_case")?,
      incident_date:            row.get("incident_date")?,
      incident_time:            row.get("incident_time")?,
      work_start_time:          row.get("work_start_time")?,
      where_occurred:           row.get("where_occurred")?,
      description:              row.get("description")?,
      activity_before_incident: row.get("activity_before_incident")?,
      how_injury_occurred:      row.get("how_injury_occurred")?,
      injury_description:       row.get("injury_description")?,
      object_substance:         row.get("object_substance")?,
      physician_name:           row.get("physician_name")?,
      treatment_facility:       row.get("treatment_facility")?,
      facility_address:         row.get("facility_address")?,
      facility_city_state_zip:  row.get("facility_city_state_zip")?,
      treated_in_er:            row.get("treated_in_er")?,
      hospitalized_overnight:   row.get("hospitalized_overnight")?,
      outcome_severity:         row.get("outcome_severity")?,
      days_away_count:          row.get("days_away_count")?,
      days_restricted_count:    row.get("days_restricted_count")?,
      date_of_death:            row.get("date_of_death")?,
      injury_illness_type:      row.get("injury_illness_type")?,
      is_recordable:            row.get("is_recordable")?,
      completed_by:             row.get("completed_by")?,
      completed_by_title:       row.get("completed_by_title")?,
      completed_by_phone:       row.get("completed_by_phone")?,
      completed_date:           row.get("completed_date")?,
      created_at:               row.get("created_at")?,
      updated_at:               row.get("updated_at")?,
    })
  }

  pub fn into_incident(self) -> Result<Incident> {
    let details = IncidentDetails {
      location_id:              self.location_id,
      employee_name:            self.employee_name,
      employee_job_title:       self.employee_job_title,
      employee_address:         self.employee_address,
      employee_city:            self.employee_city,
      employee_state:           self.employee_state,
      employee_zip:             self.employee_zip,
      employee_dob:             decode_opt_date(self.employee_dob)?,
      employee_hire_date:       decode_opt_date(self.employee_hire_date)?,
      employee_gender:          self.employee_gender,
      is_privacy_case:          self.is_privacy_case,
      incident_date:            decode_date(&self.incident_date)?,
      incident_time:            self.incident_time,
      work_start_time:          self.work_start_time,
      where_occurred:           self.where_occurred,
      description:              self.description,
      activity_before_incident: self.activity_before_incident,
      how_injury_occurred:      self.how_injury_occurred,
      injury_description:       self.injury_description,
      object_substance:         self.object_substance,
      physician_name:           self.physician_name,
      treatment_facility:       self.treatment_facility,
      facility_address:         self.facility_address,
      facility_city_state_zip:  self.facility_city_state_zip,
      treated_in_er:            self.treated_in_er,
      hospitalized_overnight:   self.hospitalized_overnight,
      outcome_severity:         decode_label(&self.outcome_severity)?,
      days_away_count:          self.days_away_count,
      days_restricted_count:    self.days_restricted_count,
      date_of_death:            decode_opt_date(self.date_of_death)?,
      injury_illness_type:      decode_label(&self.injury_illness_type)?,
      is_recordable:            self.is_recordable,
      completed_by:             self.completed_by,
      completed_by_title:       self.completed_by_title,
      completed_by_phone:       self.completed_by_phone,
      completed_date:           decode_opt_date(self.completed_date)?,
    };

    Ok(Incident {
      id: self.id,
      establishment_id: self.establishment_id,
      case_number: self.case_number,
      case_year: self.case_year,
      status: decode_label(&self.status)?,
      details,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column values of `IncidentDetails` in the order they appear in
/// [`INCIDENT_DETAIL_COLUMNS`], ready to bind.
pub struct EncodedDetails {
  pub location_id:              Option<i64>,
  pub employee_name:            String,
  pub employee_job_title:       Option<String>,
  pub employee_address:         Option<String>,
  pub employee_city:            Option<String>,
  pub employee_state:           Option<String>,
  pub employee_zip:             Option<String>,
  pub employee_dob:             Option<String>,
  pub employee_hire_date:       Option<String>,
  pub employee_gender:          Option<String>,
  pub is_privacy_case:          bool,
  pub incident_date:            String,
  pub incident_time:            Option<String>,
  pub work_start_time:          Option<String>,
  pub where_occurred:           Option<String>,
  pub description:              String,
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
  pub outcome_severity:         &'static str,
  pub days_away_count:          i64,
  pub days_restricted_count:    i64,
  pub date_of_death:            Option<String>,
  pub injury_illness_type:      &'static str,
  pub is_recordable:            bool,
  pub completed_by:             Option<String>,
  pub completed_by_title:       Option<String>,
  pub completed_by_phone:       Option<String>,
  pub completed_date:           Option<String>,
}

/// The caller-editable incident columns, in binding order.
pub const INCIDENT_DETAIL_COLUMNS: [&str; 36] = [
  "location_id",
  "employee_name",
  "employee_job_title",
  "employee_address",
  "employee_city",
  "employee_state",
  "employee_zip",
  "employee_dob",
  "employee_hire_date",
  "employee_gender",
  "is_privacy_case",
  "incident_date",
  "incident_time",
  "work_start_time",
  "where_occurred",
  "description",
  "activity_before_incident",
  "how_injury_occurred",
  "injury_description",
  "object_substance",
  "physician_name",
  "treatment_facility",
  "facility_address",
  "facility_city_state_zip",
  "treated_in_er",
  "hospitalized_overnight",
  "outcome_severity",
  "days_away_count",
  "days_restricted_count",
  "date_of_death",
  "injury_illness_type",
  "is_recordable",
  "completed_by",
  "completed_by_title",
  "completed_by_phone",
  "completed_date",
];

impl EncodedDetails {
  pub fn new(d: IncidentDetails) -> Self {
    Self {
      location_id:              d.location_id,
      employee_name:            d.employee_name,
      employee_job_title:       d.employee_job_title,
      employee_address:         d.employee_address,
      employee_city:            d.employee_city,
      employee_state:           d.employee_state,
      employee_zip:             d.employee_zip,
      employee_dob:             d.employee_dob.map(encode_date),
      employee_hire_date:       d.employee_hire_date.map(encode_date),
      employee_gender:          d.employee_gender,
      is_privacy_case:          d.is_privacy_case,
      incident_date:            encode_date(d.incident_date),
      incident_time:            d.incident_time,
      work_start_time:          d.work_start_time,
      where_occurred:           d.where_occurred,
      description:              d.description,
      activity_before_incident: d.activity_before_incident,
      how_injury_occurred:      d.how_injury_occurred,
      injury_description:       d.injury_description,
      object_substance:         d.object_substance,
      physician_name:           d.physician_name,
      treatment_facility:       d.treatment_facility,
      facility_address:         d.facility_address,
      facility_city_state_zip:  d.facility_city_state_zip,
      treated_in_er:            d.treated_in_er,
      hospitalized_overnight:   d.hospitalized_overnight,
      outcome_severity:         d.outcome_severity.key(),
      days_away_count:          d.days_away_count,
      days_restricted_count:    d.days_restricted_count,
      date_of_death:            d.date_of_death.map(encode_date),
      injury_illness_type:      d.injury_illness_type.key(),
      is_recordable:            d.is_recordable,
      completed_by:             d.completed_by,
      completed_by_title:       d.completed_by_title,
      completed_by_phone:       d.completed_by_phone,
      completed_date:           d.completed_date.map(encode_date),
    }
  }

  /// Bindable values, in [`INCIDENT_DETAIL_COLUMNS`] order.
  pub fn values(&self) -> [&dyn rusqlite::ToSql; 36] {
    [
      &self.location_id,
      &self.employee_name,
      &self.employee_job_title,
      &self.employee_address,
      &self.employee_city,
      &self.employee_state,
      &self.employee_zip,
      &self.employee_dob,
      &self.employee_hire_date,
      &self.employee_gender,
      &self.is_privacy_case,
      &self.incident_date,
      &self.incident_time,
      &self.work_start_time,
      &self.where_occurred,
      &self.description,
      &self.activity_before_incident,
      &self.how_injury_occurred,
      &self.injury_description,
      &self.object_substance,
      &self.physician_name,
      &self.treatment_facility,
      &self.facility_address,
      &self.facility_city_state_zip,
      &self.treated_in_er,
      &self.hospitalized_overnight,
      &self.outcome_severity,
      &self.days_away_count,
      &self.days_restricted_count,
      &self.date_of_death,
      &self.injury_illness_type,
      &self.is_recordable,
      &self.completed_by,
      &self.completed_by_title,
      &self.completed_by_phone,
      &self.completed_date,
    ]
  }
}

// ─── Annual stats ────────────────────────────────────────────────────────────

pub const STATS_COLUMNS: &str = "id, establishment_id, year, avg_employees, \
  total_hours_worked, certifier_name, certifier_title, certifier_phone, \
  certification_date";

pub struct RawStats {
  pub id:                 i64,
  pub establishment_id:   i64,
  pub year:               i32,
  pub avg_employees:      i64,
  pub total_hours_worked: i64,
  pub certifier_name:     Option<String>,
  pub certifier_title:    Option<String>,
  pub certifier_phone:    Option<String>,
  pub certification_date: Option<String>,
}

impl RawStats {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get("id")?,
      establishment_id:   row.get("establishment_id")?,
      year:               row.get("year")?,
      avg_employees:      row.get("avg_employees")?,
      total_hours_worked: row.get("total_hours_worked")?,
      certifier_name:     row.get("certifier_name")?,
      certifier_title:    row.get("certifier_title")?,
      certifier_phone:    row.get("certifier_phone")?,
      certification_date: row.get("certification_date")?,
    })
  }

  pub fn into_stats(self) -> Result<AnnualStats> {
    Ok(AnnualStats {
      id:                 self.id,
      establishment_id:   self.establishment_id,
      year:               self.year,
      avg_employees:      self.avg_employees,
      total_hours_worked: self.total_hours_worked,
      certifier_name:     self.certifier_name,
      certifier_title:    self.certifier_title,
      certifier_phone:    self.certifier_phone,
      certification_date: decode_opt_date(self.certification_date)?,
    })
  }
}

// ─── Corrective action ───────────────────────────────────────────────────────

pub const ACTION_COLUMNS: &str = "id, incident_id, rca_session_id, description, \
  assigned_to, due_date, state, completed_date, notes, created_at, updated_at";

pub struct RawAction {
  pub id:             i64,
  pub incident_id:    i64,
  pub rca_session_id: Option<i64>,
  pub description:    String,
  pub assigned_to:    Option<String>,
  pub due_date:       Option<String>,
  pub state:          String,
  pub completed_date: Option<String>,
  pub notes:          Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawAction {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get("id")?,
      incident_id:    row.get("incident_id")?,
      rca_session_id: row.get("rca_session_id")?,
      description:    row.get("description")?,
      assigned_to:    row.get("assigned_to")?,
      due_date:       row.get("due_date")?,
      state:          row.get("state")?,
      completed_date: row.get("completed_date")?,
      notes:          row.get("notes")?,
      created_at:     row.get("created_at")?,
      updated_at:     row.get("updated_at")?,
    })
  }

  pub fn into_action(self) -> Result<CorrectiveAction> {
    Ok(CorrectiveAction {
      id:             self.id,
      incident_id:    self.incident_id,
      rca_session_id: self.rca_session_id,
      description:    self.description,
      assigned_to:    self.assigned_to,
      due_date:       decode_opt_date(self.due_date)?,
      state:          decode_label(&self.state)?,
      completed_date: decode_opt_date(self.completed_date)?,
      notes:          self.notes,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

// ─── RCA session ─────────────────────────────────────────────────────────────

pub const RCA_COLUMNS: &str =
  "id, incident_id, method, status, root_cause_summary, created_at, updated_at";

pub struct RawRcaSession {
  pub id:                 i64,
  pub incident_id:        i64,
  pub method:             String,
  pub status:             String,
  pub root_cause_summary: Option<String>,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawRcaSession {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get("id")?,
      incident_id:        row.get("incident_id")?,
      method:             row.get("method")?,
      status:             row.get("status")?,
      root_cause_summary: row.get("root_cause_summary")?,
      created_at:         row.get("created_at")?,
      updated_at:         row.get("updated_at")?,
    })
  }

  pub fn into_session(self) -> Result<RcaSession> {
    Ok(RcaSession {
      id:                 self.id,
      incident_id:        self.incident_id,
      method:             decode_label(&self.method)?,
      status:             decode_label(&self.status)?,
      root_cause_summary: self.root_cause_summary,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// A fishbone category row before its causes are attached.
pub struct RawCategory {
  pub id:             i64,
  pub rca_session_id: i64,
  pub category:       String,
  pub sort_order:     i64,
}

// ─── Toolbox ─────────────────────────────────────────────────────────────────

pub const TALK_COLUMNS: &str = "id, topic_id, establishment_id, location_id, \
  title, date, conducted_by, notes, status";

pub struct RawTalk {
  pub id:               i64,
  pub topic_id:         Option<i64>,
  pub establishment_id: i64,
  pub location_id:      Option<i64>,
  pub title:            String,
  pub date:             String,
  pub conducted_by:     String,
  pub notes:            Option<String>,
  pub status:           String,
}

impl RawTalk {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get("id")?,
      topic_id:         row.get("topic_id")?,
      establishment_id: row.get("establishment_id")?,
      location_id:      row.get("location_id")?,
      title:            row.get("title")?,
      date:             row.get("date")?,
      conducted_by:     row.get("conducted_by")?,
      notes:            row.get("notes")?,
      status:           row.get("status")?,
    })
  }

  pub fn into_talk(self) -> Result<ToolboxTalk> {
    Ok(ToolboxTalk {
      id:               self.id,
      topic_id:         self.topic_id,
      establishment_id: self.establishment_id,
      location_id:      self.location_id,
      title:            self.title,
      date:             decode_date(&self.date)?,
      conducted_by:     self.conducted_by,
      notes:            self.notes,
      status:           decode_label(&self.status)?,
    })
  }
}

pub const ATTENDEE_COLUMNS: &str =
  "id, talk_id, employee_name, employee_id, signature_data, signed_at";

pub struct RawAttendee {
  pub id:             i64,
  pub talk_id:        i64,
  pub employee_name:  String,
  pub employee_id:    Option<String>,
  pub signature_data: Option<String>,
  pub signed_at:      Option<String>,
}

impl RawAttendee {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get("id")?,
      talk_id:        row.get("talk_id")?,
      employee_name:  row.get("employee_name")?,
      employee_id:    row.get("employee_id")?,
      signature_data: row.get("signature_data")?,
      signed_at:      row.get("signed_at")?,
    })
  }

  pub fn into_attendee(self) -> Result<Attendee> {
    Ok(Attendee {
      id:             self.id,
      talk_id:        self.talk_id,
      employee_name:  self.employee_name,
      employee_id:    self.employee_id,
      signature_data: self.signature_data,
      signed_at:      self.signed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

// ─── JSA ─────────────────────────────────────────────────────────────────────

pub const JSA_COLUMNS: &str = "id, template_id, establishment_id, location_id, \
  job_name, job_date, prepared_by, reviewed_by, approved_by, status";

pub struct RawJsa {
  pub id:               i64,
  pub template_id:      Option<i64>,
  pub establishment_id: i64,
  pub location_id:      Option<i64>,
  pub job_name:         String,
  pub job_date:         String,
  pub prepared_by:      String,
  pub reviewed_by:      Option<String>,
  pub approved_by:      Option<String>,
  pub status:           String,
}

impl RawJsa {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get("id")?,
      template_id:      row.get("template_id")?,
      establishment_id: row.get("establishment_id")?,
      location_id:      row.get("location_id")?,
      job_name:         row.get("job_name")?,
      job_date:         row.get("job_date")?,
      prepared_by:      row.get("prepared_by")?,
      reviewed_by:      row.get("reviewed_by")?,
      approved_by:      row.get("approved_by")?,
      status:           row.get("status")?,
    })
  }

  pub fn into_jsa(self) -> Result<JsaInstance> {
    Ok(JsaInstance {
      id:               self.id,
      template_id:      self.template_id,
      establishment_id: self.establishment_id,
      location_id:      self.location_id,
      job_name:         self.job_name,
      job_date:         decode_date(&self.job_date)?,
      prepared_by:      self.prepared_by,
      reviewed_by:      self.reviewed_by,
      approved_by:      self.approved_by,
      status:           decode_label(&self.status)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use safety_core::incident::OutcomeSeverity;

  use super::*;

  #[test]
  fn dates_round_trip_as_iso_text() {
    let d = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    assert_eq!(encode_date(d), "2026-03-01");
    assert_eq!(decode_date("2026-03-01").unwrap(), d);
    assert!(decode_date("03/01/2026").is_err());
  }

  #[test]
  fn unknown_label_is_a_decode_error() {
    let err = decode_label::<OutcomeSeverity>("Death").unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(
      decode_label::<OutcomeSeverity>("death").unwrap(),
      OutcomeSeverity::Death
    );
  }

  #[test]
  fn detail_columns_match_values() {
    let d = IncidentDetails::new(
      "Jane",
      NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
      "x",
    );
    let enc = EncodedDetails::new(d);
    assert_eq!(enc.values().len(), INCIDENT_DETAIL_COLUMNS.len());
  }
}
