//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use safety_core::{
  action::{ActionState, CorrectiveActionPatch, NewCorrectiveAction},
  establishment::{EstablishmentPatch, NewEstablishment, NewLocation},
  incident::{
    IncidentFilter,
    IncidentPatch,
    IncidentStatus,
    InjuryType,
    NewIncident,
    OutcomeSeverity,
  },
  jsa::{JsaStatus, NewJsaInstance, NewJsaStep},
  rca::{FishboneBranch, FiveWhysStepUpdate, NewFishboneCategory, NewFishboneCause, NewFiveWhysStep, RcaMethod, RcaStatus},
  stats::AnnualStatsInput,
  store::{SafetyStore, StoreError},
  toolbox::{NewAttendee, NewToolboxTalk, Signature, TalkStatus},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn establishment(s: &SqliteStore, name: &str) -> i64 {
  s.create_establishment(NewEstablishment::named(name))
    .await
    .unwrap()
    .id
}

// ─── Establishments & locations ──────────────────────────────────────────────

#[tokio::test]
async fn create_get_update_establishment() {
  let s = store().await;
  let id = establishment(&s, "Plant 1").await;

  let mut e = s.get_establishment(id).await.unwrap().unwrap();
  assert_eq!(e.name, "Plant 1");

  EstablishmentPatch { naics_code: Some("332710".into()), ..Default::default() }
    .apply(&mut e)
    .unwrap();
  let updated = s.update_establishment(e).await.unwrap();
  assert_eq!(updated.naics_code.as_deref(), Some("332710"));
  assert_eq!(s.list_establishments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_records_are_none_or_not_found() {
  let s = store().await;
  assert!(s.get_establishment(99).await.unwrap().is_none());
  assert!(s.get_incident(99).await.unwrap().is_none());

  let err = s.delete_establishment(99).await.unwrap_err();
  assert!(err.is_not_found());

  let err = s
    .create_location(99, NewLocation::named("Dock"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "establishment", id: 99 }));
}

#[tokio::test]
async fn blank_name_is_a_domain_error() {
  let s = store().await;
  let err = s
    .create_establishment(NewEstablishment::named("  "))
    .await
    .unwrap_err();
  assert!(matches!(err.domain(), Some(safety_core::Error::Validation(_))));
}

#[tokio::test]
async fn locations_are_scoped_to_establishment() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let b = establishment(&s, "B").await;
  let dock = s.create_location(a, NewLocation::named("Dock")).await.unwrap();
  s.create_location(b, NewLocation::named("Yard")).await.unwrap();

  let locs = s.list_locations(a).await.unwrap();
  assert_eq!(locs.len(), 1);
  assert!(locs[0].is_active);

  // An incident at establishment B cannot reference A's location.
  let mut input = NewIncident::new(b, "Jane", date(2026, 1, 5), "cut");
  input.details.location_id = Some(dock.id);
  let err = s.create_incident(input).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "location", .. }));
}

// ─── Incidents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn case_numbers_restart_per_establishment_and_year() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let b = establishment(&s, "B").await;

  let a1 = s
    .create_incident(NewIncident::new(a, "One", date(2025, 12, 30), "x"))
    .await
    .unwrap();
  let a2 = s
    .create_incident(NewIncident::new(a, "Two", date(2026, 1, 2), "x"))
    .await
    .unwrap();
  let a3 = s
    .create_incident(NewIncident::new(a, "Three", date(2026, 2, 2), "x"))
    .await
    .unwrap();
  let b1 = s
    .create_incident(NewIncident::new(b, "Four", date(2026, 2, 2), "x"))
    .await
    .unwrap();

  assert_eq!((a1.case_year, a1.case_number), (2025, 1));
  assert_eq!((a2.case_year, a2.case_number), (2026, 1));
  assert_eq!((a3.case_year, a3.case_number), (2026, 2));
  assert_eq!((b1.case_year, b1.case_number), (2026, 1));
}

#[tokio::test]
async fn case_number_survives_date_edit() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let mut inc = s
    .create_incident(NewIncident::new(a, "Jane", date(2026, 3, 1), "x"))
    .await
    .unwrap();

  IncidentPatch { incident_date: Some(date(2025, 11, 1)), ..Default::default() }
    .apply(&mut inc)
    .unwrap();
  let updated = s.update_incident(inc).await.unwrap();
  assert_eq!(updated.details.incident_date, date(2025, 11, 1));
  assert_eq!((updated.case_year, updated.case_number), (2026, 1));

  // The next 2026 case still gets number 2.
  let next = s
    .create_incident(NewIncident::new(a, "Joe", date(2026, 4, 1), "y"))
    .await
    .unwrap();
  assert_eq!(next.case_number, 2);
}

#[tokio::test]
async fn create_normalizes_days_and_round_trips_fields() {
  let s = store().await;
  let a = establishment(&s, "A").await;

  let mut input = NewIncident::new(a, "Jane Doe", date(2026, 3, 1), "fell");
  input.details.outcome_severity = OutcomeSeverity::JobTransferRestriction;
  input.details.injury_illness_type = InjuryType::HearingLoss;
  input.details.days_away_count = 4;
  input.details.days_restricted_count = 9;
  input.details.is_privacy_case = true;
  input.details.treated_in_er = Some(true);
  input.details.employee_dob = Some(date(1990, 5, 17));
  input.details.incident_time = Some("14:30".into());

  let inc = s.create_incident(input).await.unwrap();
  assert_eq!(inc.status, IncidentStatus::Open);
  assert_eq!(inc.details.days_away_count, 0);
  assert_eq!(inc.details.days_restricted_count, 9);

  let fetched = s.get_incident(inc.id).await.unwrap().unwrap();
  assert_eq!(fetched, inc);
  assert_eq!(fetched.details.injury_illness_type, InjuryType::HearingLoss);
  assert_eq!(fetched.details.treated_in_er, Some(true));
  assert_eq!(fetched.details.employee_dob, Some(date(1990, 5, 17)));
  assert_eq!(fetched.details.incident_time.as_deref(), Some("14:30"));
}

#[tokio::test]
async fn list_incidents_applies_filters() {
  let s = store().await;
  let a = establishment(&s, "A").await;

  let mut death = NewIncident::new(a, "Alice", date(2026, 1, 10), "crush");
  death.details.outcome_severity = OutcomeSeverity::Death;
  s.create_incident(death).await.unwrap();
  s.create_incident(NewIncident::new(a, "Bob", date(2026, 6, 1), "burned hand"))
    .await
    .unwrap();
  s.create_incident(NewIncident::new(a, "Carol", date(2025, 6, 1), "strain"))
    .await
    .unwrap();

  let year = s
    .list_incidents(IncidentFilter::for_year(a, 2026))
    .await
    .unwrap();
  assert_eq!(year.len(), 2);
  // Newest first.
  assert_eq!(year[0].details.employee_name, "Bob");

  let deaths = s
    .list_incidents(IncidentFilter {
      outcome_severity: Some(OutcomeSeverity::Death),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(deaths.len(), 1);

  let search = s
    .list_incidents(IncidentFilter {
      search: Some("burn".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(search.len(), 1);
  assert_eq!(search[0].details.employee_name, "Bob");
}

#[tokio::test]
async fn update_status_persists() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let mut inc = s
    .create_incident(NewIncident::new(a, "Jane", date(2026, 3, 1), "x"))
    .await
    .unwrap();

  IncidentPatch { status: Some(IncidentStatus::Closed), ..Default::default() }
    .apply(&mut inc)
    .unwrap();
  let updated = s.update_incident(inc).await.unwrap();
  assert_eq!(updated.status, IncidentStatus::Closed);
}

#[tokio::test]
async fn deleting_establishment_cascades() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let inc = s
    .create_incident(NewIncident::new(a, "Jane", date(2026, 3, 1), "x"))
    .await
    .unwrap();
  let action = s
    .create_corrective_action(
      inc.id,
      NewCorrectiveAction { description: "Fix rail".into(), ..Default::default() },
    )
    .await
    .unwrap();
  s.upsert_annual_stats(a, 2026, AnnualStatsInput::new(10, 20_000))
    .await
    .unwrap();

  s.delete_establishment(a).await.unwrap();

  assert!(s.get_incident(inc.id).await.unwrap().is_none());
  assert!(s.get_corrective_action(action.id).await.unwrap().is_none());
  assert!(s.get_annual_stats(a, 2026).await.unwrap().is_none());
}

// ─── Annual stats ────────────────────────────────────────────────────────────

#[tokio::test]
async fn annual_stats_upsert_overwrites() {
  let s = store().await;
  let a = establishment(&s, "A").await;

  let first = s
    .upsert_annual_stats(a, 2026, AnnualStatsInput::new(10, 20_000))
    .await
    .unwrap();
  let mut second_input = AnnualStatsInput::new(12, 25_000);
  second_input.certifier_name = Some("Pat Lee".into());
  let second = s.upsert_annual_stats(a, 2026, second_input).await.unwrap();

  assert_eq!(first.id, second.id);
  assert_eq!(second.avg_employees, 12);
  assert_eq!(second.total_hours_worked, 25_000);
  assert_eq!(second.certifier_name.as_deref(), Some("Pat Lee"));
  assert!(s.get_annual_stats(a, 2025).await.unwrap().is_none());
}

#[tokio::test]
async fn annual_stats_rejects_out_of_range_year() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let err = s
    .upsert_annual_stats(a, 1900, AnnualStatsInput::new(10, 20_000))
    .await
    .unwrap_err();
  assert!(err.domain().is_some());
}

// ─── Corrective actions ──────────────────────────────────────────────────────

#[tokio::test]
async fn corrective_action_lifecycle() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let inc = s
    .create_incident(NewIncident::new(a, "Jane", date(2026, 3, 1), "x"))
    .await
    .unwrap();

  let mut action = s
    .create_corrective_action(
      inc.id,
      NewCorrectiveAction {
        description: "Replace mat".into(),
        due_date: Some(date(2026, 4, 1)),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(action.state, ActionState::Open);

  CorrectiveActionPatch { state: Some(ActionState::Completed), ..Default::default() }
    .apply(&mut action, date(2026, 3, 20))
    .unwrap();
  let saved = s.update_corrective_action(action).await.unwrap();
  assert_eq!(saved.state, ActionState::Completed);
  assert_eq!(saved.completed_date, Some(date(2026, 3, 20)));

  assert_eq!(s.list_corrective_actions(inc.id).await.unwrap().len(), 1);
  assert_eq!(s.list_establishment_actions(a).await.unwrap().len(), 1);

  s.delete_corrective_action(saved.id).await.unwrap();
  assert!(s.delete_corrective_action(saved.id).await.unwrap_err().is_not_found());
}

// ─── RCA ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rca_five_whys_and_fishbone() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let inc = s
    .create_incident(NewIncident::new(a, "Jane", date(2026, 3, 1), "x"))
    .await
    .unwrap();

  let session = s.create_rca_session(inc.id, RcaMethod::FiveWhys).await.unwrap();
  assert_eq!(session.status, RcaStatus::InProgress);

  let step = s
    .add_five_whys_step(
      session.id,
      NewFiveWhysStep {
        step_number: 1,
        question:    "Why did she slip?".into(),
        answer:      "Floor was wet".into(),
      },
    )
    .await
    .unwrap();
  let step = s
    .update_five_whys_step(
      step.id,
      FiveWhysStepUpdate {
        question: "Why did she slip?".into(),
        answer:   "Leaking pipe".into(),
      },
    )
    .await
    .unwrap();
  assert_eq!(step.answer, "Leaking pipe");

  let cat = s
    .add_fishbone_category(
      session.id,
      NewFishboneCategory { category: FishboneBranch::Environment, sort_order: 0 },
    )
    .await
    .unwrap();
  s.add_fishbone_cause(
    cat.id,
    NewFishboneCause {
      cause_text:    "Poor drainage".into(),
      is_root_cause: true,
      sort_order:    0,
    },
  )
  .await
  .unwrap();

  let fishbone = s.list_fishbone(session.id).await.unwrap();
  assert_eq!(fishbone.len(), 1);
  assert_eq!(fishbone[0].category, FishboneBranch::Environment);
  assert_eq!(fishbone[0].causes.len(), 1);
  assert!(fishbone[0].causes[0].is_root_cause);

  assert!(
    s.complete_rca_session(session.id, " ".into())
      .await
      .is_err()
  );
  let done = s
    .complete_rca_session(session.id, "Leaking pipe".into())
    .await
    .unwrap();
  assert_eq!(done.status, RcaStatus::Completed);
  assert_eq!(done.root_cause_summary.as_deref(), Some("Leaking pipe"));

  s.delete_rca_session(session.id).await.unwrap();
  assert!(s.list_five_whys_steps(session.id).await.unwrap().is_empty());
}

// ─── Toolbox talks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn topics_are_seeded_once() {
  let s = store().await;
  let topics = s.list_topics(false).await.unwrap();
  assert!(!topics.is_empty());
  assert!(s.get_topic(topics[0].id).await.unwrap().is_some());
}

#[tokio::test]
async fn talk_attendance_and_signing() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let talk = s
    .create_talk(
      a,
      NewToolboxTalk {
        topic_id:     None,
        location_id:  None,
        title:        "Ladder Safety".into(),
        date:         date(2026, 5, 4),
        conducted_by: "Sam".into(),
        notes:        None,
      },
    )
    .await
    .unwrap();
  assert_eq!(talk.status, TalkStatus::Scheduled);

  let att = s
    .add_attendee(talk.id, NewAttendee { employee_name: "Jane".into(), employee_id: None })
    .await
    .unwrap();
  assert!(att.signed_at.is_none());

  let signed = s
    .sign_attendee(att.id, Signature { signature_data: "data:image/png;base64,AAA".into() })
    .await
    .unwrap();
  assert!(signed.signed_at.is_some());

  let done = s.complete_talk(talk.id).await.unwrap();
  assert_eq!(done.status, TalkStatus::Completed);
  assert_eq!(s.list_talks(a).await.unwrap().len(), 1);
}

// ─── JSA ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn jsa_steps_toggle() {
  let s = store().await;
  let a = establishment(&s, "A").await;
  let templates = s.list_jsa_templates().await.unwrap();
  assert!(!templates.is_empty());

  let jsa = s
    .create_jsa(
      a,
      NewJsaInstance {
        template_id: Some(templates[0].id),
        location_id: None,
        job_name:    "Replace roof fan".into(),
        job_date:    date(2026, 7, 1),
        prepared_by: "Sam".into(),
      },
    )
    .await
    .unwrap();
  assert_eq!(jsa.status, JsaStatus::Draft);

  let step = s
    .add_jsa_step(
      jsa.id,
      NewJsaStep { step_number: 1, task_description: "Lock out fan".into() },
    )
    .await
    .unwrap();
  assert!(!step.is_completed);
  assert!(s.toggle_jsa_step(step.id).await.unwrap().is_completed);
  assert!(!s.toggle_jsa_step(step.id).await.unwrap().is_completed);

  let approved = s.set_jsa_status(jsa.id, JsaStatus::Approved).await.unwrap();
  assert_eq!(approved.status, JsaStatus::Approved);
  assert!(s.toggle_jsa_step(999).await.unwrap_err().is_not_found());
}
