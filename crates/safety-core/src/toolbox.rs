//! Toolbox talks: short safety briefings with a signed attendance sheet.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{Result, label::Labeled, validate};

/// An entry in the built-in topic library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkTopic {
  pub id:               i64,
  pub title:            String,
  pub description:      Option<String>,
  pub content:          String,
  pub category:         Option<String>,
  pub duration_minutes: i64,
  pub is_active:        bool,
}

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
pub enum TalkStatus {
  #[default]
  Scheduled,
  Completed,
}

impl Labeled for TalkStatus {
  const KIND: &'static str = "talk status";

  fn key(self) -> &'static str {
    match self {
      Self::Scheduled => "scheduled",
      Self::Completed => "completed",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Scheduled => "Scheduled",
      Self::Completed => "Completed",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolboxTalk {
  pub id:               i64,
  pub topic_id:         Option<i64>,
  pub establishment_id: i64,
  pub location_id:      Option<i64>,
  pub title:            String,
  pub date:             NaiveDate,
  pub conducted_by:     String,
  pub notes:            Option<String>,
  pub status:           TalkStatus,
}

/// Input for scheduling a talk. The establishment comes from the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewToolboxTalk {
  #[serde(default)]
  pub topic_id:     Option<i64>,
  #[serde(default)]
  pub location_id:  Option<i64>,
  pub title:        String,
  pub date:         NaiveDate,
  pub conducted_by: String,
  #[serde(default)]
  pub notes:        Option<String>,
}

impl NewToolboxTalk {
  pub fn validate(&self) -> Result<()> {
    validate::name(&self.title, "title")?;
    validate::name(&self.conducted_by, "conducted by")?;
    validate::date(self.date, "talk date")
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
  pub id:             i64,
  pub talk_id:        i64,
  pub employee_name:  String,
  pub employee_id:    Option<String>,
  pub signature_data: Option<String>,
  pub signed_at:      Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAttendee {
  pub employee_name: String,
  #[serde(default)]
  pub employee_id:   Option<String>,
}

impl NewAttendee {
  pub fn validate(&self) -> Result<()> {
    validate::name(&self.employee_name, "employee name")
  }
}

/// Body of the sign command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
  pub signature_data: String,
}

impl Signature {
  pub fn validate(&self) -> Result<()> {
    validate::not_empty(&self.signature_data, "signature")
  }
}
