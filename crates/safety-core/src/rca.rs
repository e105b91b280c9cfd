//! Root-cause analysis sessions: five-whys chains and fishbone diagrams.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{Result, label::Labeled, validate};

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum RcaMethod {
  FiveWhys,
  Fishbone,
}

impl Labeled for RcaMethod {
  const KIND: &'static str = "analysis method";

  fn key(self) -> &'static str {
    match self {
      Self::FiveWhys => "five_whys",
      Self::Fishbone => "fishbone",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::FiveWhys => "5 Whys",
      Self::Fishbone => "Fishbone",
    }
  }
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
pub enum RcaStatus {
  #[default]
  InProgress,
  Completed,
}

impl Labeled for RcaStatus {
  const KIND: &'static str = "analysis status";

  fn key(self) -> &'static str {
    match self {
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::InProgress => "In Progress",
      Self::Completed => "Completed",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcaSession {
  pub id:                 i64,
  pub incident_id:        i64,
  pub method:             RcaMethod,
  pub status:             RcaStatus,
  pub root_cause_summary: Option<String>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRcaSession {
  pub method: RcaMethod,
}

/// Body of the completion command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteRca {
  pub root_cause_summary: String,
}

impl CompleteRca {
  pub fn validate(&self) -> Result<()> {
    validate::not_empty(&self.root_cause_summary, "root cause summary")?;
    validate::max_length(
      &self.root_cause_summary,
      validate::MAX_DESCRIPTION_LENGTH,
      "root cause summary",
    )
  }
}

// ─── Five whys ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveWhysStep {
  pub id:             i64,
  pub rca_session_id: i64,
  pub step_number:    i64,
  pub question:       String,
  pub answer:         String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFiveWhysStep {
  pub step_number: i64,
  pub question:    String,
  pub answer:      String,
}

impl NewFiveWhysStep {
  pub fn validate(&self) -> Result<()> {
    if self.step_number < 1 {
      return Err(crate::Error::validation(format!(
        "step number must be positive (got: {})",
        self.step_number
      )));
    }
    validate::not_empty(&self.question, "question")
  }
}

/// Replacement text for a five-whys step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveWhysStepUpdate {
  pub question: String,
  pub answer:   String,
}

// ─── Fishbone ────────────────────────────────────────────────────────────────

/// The six standard branches of an Ishikawa diagram.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum FishboneBranch {
  Manpower,
  Methods,
  Materials,
  Machinery,
  Environment,
  Management,
}

impl Labeled for FishboneBranch {
  const KIND: &'static str = "fishbone category";

  fn key(self) -> &'static str {
    match self {
      Self::Manpower => "manpower",
      Self::Methods => "methods",
      Self::Materials => "materials",
      Self::Machinery => "machinery",
      Self::Environment => "environment",
      Self::Management => "management",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Manpower => "Manpower",
      Self::Methods => "Methods",
      Self::Materials => "Materials",
      Self::Machinery => "Machinery",
      Self::Environment => "Environment",
      Self::Management => "Management",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishboneCategory {
  pub id:             i64,
  pub rca_session_id: i64,
  pub category:       FishboneBranch,
  pub sort_order:     i64,
  pub causes:         Vec<FishboneCause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishboneCause {
  pub id:            i64,
  pub category_id:   i64,
  pub cause_text:    String,
  pub is_root_cause: bool,
  pub sort_order:    i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFishboneCategory {
  pub category:   FishboneBranch,
  #[serde(default)]
  pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFishboneCause {
  pub cause_text:    String,
  #[serde(default)]
  pub is_root_cause: bool,
  #[serde(default)]
  pub sort_order:    i64,
}

impl NewFishboneCause {
  pub fn validate(&self) -> Result<()> {
    validate::not_empty(&self.cause_text, "cause")?;
    validate::max_length(
      &self.cause_text,
      validate::MAX_DESCRIPTION_LENGTH,
      "cause",
    )
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FishboneCausePatch {
  pub cause_text:    Option<String>,
  pub is_root_cause: Option<bool>,
}

impl FishboneCausePatch {
  pub fn apply(self, cause: &mut FishboneCause) -> Result<()> {
    if let Some(text) = self.cause_text {
      validate::not_empty(&text, "cause")?;
      cause.cause_text = text;
    }
    if let Some(root) = self.is_root_cause {
      cause.is_root_cause = root;
    }
    Ok(())
  }
}
