//! Corrective actions raised against an incident.
//!
//! Only progress is stored ([`ActionState`]). Whether an action is overdue
//! depends on the day it is looked at, so [`ActionStatus`] is always derived.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{Result, label::Labeled, validate};

/// Stored progress of a corrective action.
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
pub enum ActionState {
  #[default]
  Open,
  InProgress,
  Completed,
}

impl Labeled for ActionState {
  const KIND: &'static str = "action state";

  fn key(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Open => "Open",
      Self::InProgress => "In Progress",
      Self::Completed => "Completed",
    }
  }
}

/// Status as presented to users: the stored state, or `Overdue` when the due
/// date has passed and the action is not completed.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
  Open,
  InProgress,
  Completed,
  Overdue,
}

impl Labeled for ActionStatus {
  const KIND: &'static str = "action status";

  fn key(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
      Self::Overdue => "overdue",
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Open => "Open",
      Self::InProgress => "In Progress",
      Self::Completed => "Completed",
      Self::Overdue => "Overdue",
    }
  }
}

impl ActionStatus {
  pub fn of(action: &CorrectiveAction, today: NaiveDate) -> Self {
    match action.state {
      ActionState::Completed => Self::Completed,
      _ if action.due_date.is_some_and(|due| due < today) => Self::Overdue,
      ActionState::Open => Self::Open,
      ActionState::InProgress => Self::InProgress,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectiveAction {
  pub id:             i64,
  pub incident_id:    i64,
  pub rca_session_id: Option<i64>,
  pub description:    String,
  pub assigned_to:    Option<String>,
  pub due_date:       Option<NaiveDate>,
  pub state:          ActionState,
  pub completed_date: Option<NaiveDate>,
  pub notes:          Option<String>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl CorrectiveAction {
  pub fn status(&self, today: NaiveDate) -> ActionStatus {
    ActionStatus::of(self, today)
  }
}

/// A corrective action paired with its derived status, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionView {
  #[serde(flatten)]
  pub action: CorrectiveAction,
  pub status: ActionStatus,
}

impl ActionView {
  pub fn new(action: CorrectiveAction, today: NaiveDate) -> Self {
    let status = action.status(today);
    Self { action, status }
  }
}

/// Input for creating a corrective action. The incident comes from the route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCorrectiveAction {
  #[serde(default)]
  pub rca_session_id: Option<i64>,
  pub description:    String,
  #[serde(default)]
  pub assigned_to:    Option<String>,
  #[serde(default)]
  pub due_date:       Option<NaiveDate>,
}

impl NewCorrectiveAction {
  pub fn validate(&self) -> Result<()> {
    validate::not_empty(&self.description, "description")?;
    validate::max_length(
      &self.description,
      validate::MAX_DESCRIPTION_LENGTH,
      "description",
    )
  }
}

/// A partial update. `state` accepts only stored states, so a request that
/// names `"overdue"` is rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrectiveActionPatch {
  pub description:    Option<String>,
  pub assigned_to:    Option<String>,
  pub due_date:       Option<NaiveDate>,
  #[serde(alias = "status")]
  pub state:          Option<ActionState>,
  pub completed_date: Option<NaiveDate>,
  pub notes:          Option<String>,
}

impl CorrectiveActionPatch {
  /// Apply the patch. Completing an action without a completion date stamps
  /// `today`; moving it back out of completed clears the date.
  pub fn apply(self, a: &mut CorrectiveAction, today: NaiveDate) -> Result<()> {
    if let Some(d) = &self.description {
      validate::not_empty(d, "description")?;
      validate::max_length(d, validate::MAX_DESCRIPTION_LENGTH, "description")?;
    }
    if let Some(v) = self.description {
      a.description = v;
    }
    if let Some(v) = self.assigned_to {
      a.assigned_to = Some(v);
    }
    if let Some(v) = self.due_date {
      a.due_date = Some(v);
    }
    if let Some(v) = self.notes {
      a.notes = Some(v);
    }
    if let Some(v) = self.completed_date {
      a.completed_date = Some(v);
    }
    if let Some(state) = self.state {
      a.state = state;
      match state {
        ActionState::Completed if a.completed_date.is_none() => {
          a.completed_date = Some(today);
        }
        ActionState::Completed => {}
        _ => a.completed_date = None,
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn action(state: ActionState, due: Option<NaiveDate>) -> CorrectiveAction {
    let now = Utc::now();
    CorrectiveAction {
      id: 1,
      incident_id: 1,
      rca_session_id: None,
      description: "Install guard rail".into(),
      assigned_to: None,
      due_date: due,
      state,
      completed_date: None,
      notes: None,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn overdue_is_derived_from_due_date() {
    let today = date(2026, 6, 1);
    let past = Some(date(2026, 5, 1));
    let future = Some(date(2026, 7, 1));

    assert_eq!(
      action(ActionState::Open, past).status(today),
      ActionStatus::Overdue
    );
    assert_eq!(
      action(ActionState::InProgress, past).status(today),
      ActionStatus::Overdue
    );
    assert_eq!(
      action(ActionState::Completed, past).status(today),
      ActionStatus::Completed
    );
    assert_eq!(
      action(ActionState::Open, future).status(today),
      ActionStatus::Open
    );
    assert_eq!(action(ActionState::Open, None).status(today), ActionStatus::Open);
    // Due today is not yet overdue.
    assert_eq!(
      action(ActionState::Open, Some(today)).status(today),
      ActionStatus::Open
    );
  }

  #[test]
  fn overdue_cannot_be_assigned() {
    let res: std::result::Result<CorrectiveActionPatch, _> =
      serde_json::from_str(r#"{"status": "overdue"}"#);
    assert!(res.is_err());

    let patch: CorrectiveActionPatch =
      serde_json::from_str(r#"{"status": "in_progress"}"#).unwrap();
    assert_eq!(patch.state, Some(ActionState::InProgress));
  }

  #[test]
  fn completing_stamps_today() {
    let today = date(2026, 6, 1);
    let mut a = action(ActionState::Open, None);
    CorrectiveActionPatch {
      state: Some(ActionState::Completed),
      ..Default::default()
    }
    .apply(&mut a, today)
    .unwrap();
    assert_eq!(a.completed_date, Some(today));

    CorrectiveActionPatch {
      state: Some(ActionState::Open),
      ..Default::default()
    }
    .apply(&mut a, today)
    .unwrap();
    assert_eq!(a.completed_date, None);
  }
}
