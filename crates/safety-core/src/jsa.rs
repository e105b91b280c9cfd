//! Job-safety analyses: a job broken into steps, each checked off as the
//! crew works through it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{Result, label::Labeled, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsaTemplate {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub trade:       Option<String>,
  pub is_active:   bool,
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
pub enum JsaStatus {
  #[default]
  Draft,
  InReview,
  Approved,
  Archived,
}

impl Labeled for JsaStatus {
  const KIND: &'static str = "JSA status";

  fn key(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::InReview => "in_review",
      Self::Approved => "approved",
      Self::Archived => "archived",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Draft => "Draft",
      Self::InReview => "In Review",
      Self::Approved => "Approved",
      Self::Archived => "Archived",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsaInstance {
  pub id:               i64,
  pub template_id:      Option<i64>,
  pub establishment_id: i64,
  pub location_id:      Option<i64>,
  pub job_name:         String,
  pub job_date:         NaiveDate,
  pub prepared_by:      String,
  pub reviewed_by:      Option<String>,
  pub approved_by:      Option<String>,
  pub status:           JsaStatus,
}

/// Input for starting an analysis. The establishment comes from the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJsaInstance {
  #[serde(default)]
  pub template_id: Option<i64>,
  #[serde(default)]
  pub location_id: Option<i64>,
  pub job_name:    String,
  pub job_date:    NaiveDate,
  pub prepared_by: String,
}

impl NewJsaInstance {
  pub fn validate(&self) -> Result<()> {
    validate::name(&self.job_name, "job name")?;
    validate::name(&self.prepared_by, "prepared by")?;
    validate::date(self.job_date, "job date")
  }
}

/// Body of the status command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsaStatusUpdate {
  pub status: JsaStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsaStep {
  pub id:               i64,
  pub jsa_instance_id:  i64,
  pub step_number:      i64,
  pub task_description: String,
  pub is_completed:     bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJsaStep {
  pub step_number:      i64,
  pub task_description: String,
}

impl NewJsaStep {
  pub fn validate(&self) -> Result<()> {
    validate::not_empty(&self.task_description, "task description")?;
    validate::max_length(
      &self.task_description,
      validate::MAX_DESCRIPTION_LENGTH,
      "task description",
    )
  }
}
