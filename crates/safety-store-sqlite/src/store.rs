//! [`SqliteStore`] — the SQLite implementation of [`SafetyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, Row, ToSql, TransactionBehavior};
use tracing::debug;

use safety_core::{
  action::{CorrectiveAction, NewCorrectiveAction},
  establishment::{Establishment, Location, NewEstablishment, NewLocation},
  incident::{Incident, IncidentFilter, IncidentStatus, NewIncident},
  jsa::{JsaInstance, JsaStatus, JsaStep, JsaTemplate, NewJsaInstance, NewJsaStep},
  label::Labeled,
  rca::{
    FishboneCategory,
    FishboneCause,
    FiveWhysStep,
    FiveWhysStepUpdate,
    NewFishboneCategory,
    NewFishboneCause,
    NewFiveWhysStep,
    RcaMethod,
    RcaSession,
    RcaStatus,
  },
  stats::{AnnualStats, AnnualStatsInput},
  store::SafetyStore,
  toolbox::{Attendee, NewAttendee, NewToolboxTalk, Signature, TalkStatus, TalkTopic, ToolboxTalk},
  validate,
};

use crate::{
  Error,
  Result,
  encode::{
    ACTION_COLUMNS,
    ATTENDEE_COLUMNS,
    ESTABLISHMENT_COLUMNS,
    EncodedDetails,
    INCIDENT_COLUMNS,
    INCIDENT_DETAIL_COLUMNS,
    JSA_COLUMNS,
    LOCATION_COLUMNS,
    RCA_COLUMNS,
    RawAction,
    RawAttendee,
    RawCategory,
    RawEstablishment,
    RawIncident,
    RawJsa,
    RawLocation,
    RawRcaSession,
    RawStats,
    RawTalk,
    STATS_COLUMNS,
    TALK_COLUMNS,
    decode_label,
    encode_date,
    encode_dt,
  },
  schema::SCHEMA,
};

type RowFn<R> = fn(&Row<'_>) -> rusqlite::Result<R>;

fn five_whys_from_row(row: &Row<'_>) -> rusqlite::Result<FiveWhysStep> {
  Ok(FiveWhysStep {
    id:             row.get("id")?,
    rca_session_id: row.get("rca_session_id")?,
    step_number:    row.get("step_number")?,
    question:       row.get("question")?,
    answer:         row.get("answer")?,
  })
}

fn cause_from_row(row: &Row<'_>) -> rusqlite::Result<FishboneCause> {
  Ok(FishboneCause {
    id:            row.get("id")?,
    category_id:   row.get("category_id")?,
    cause_text:    row.get("cause_text")?,
    is_root_cause: row.get("is_root_cause")?,
    sort_order:    row.get("sort_order")?,
  })
}

fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<TalkTopic> {
  Ok(TalkTopic {
    id:               row.get("id")?,
    title:            row.get("title")?,
    description:      row.get("description")?,
    content:          row.get("content")?,
    category:         row.get("category")?,
    duration_minutes: row.get("duration_minutes")?,
    is_active:        row.get("is_active")?,
  })
}

fn jsa_step_from_row(row: &Row<'_>) -> rusqlite::Result<JsaStep> {
  Ok(JsaStep {
    id:               row.get("id")?,
    jsa_instance_id:  row.get("jsa_instance_id")?,
    step_number:      row.get("step_number")?,
    task_description: row.get("task_description")?,
    is_completed:     row.get("is_completed")?,
  })
}

const FIVE_WHYS_COLUMNS: &str = "id, rca_session_id, step_number, question, answer";
const CAUSE_COLUMNS: &str = "id, category_id, cause_text, is_root_cause, sort_order";
const TOPIC_COLUMNS: &str =
  "id, title, description, content, category, duration_minutes, is_active";
const JSA_STEP_COLUMNS: &str =
  "id, jsa_instance_id, step_number, task_description, is_completed";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A safety tracker store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!("schema initialised");
    Ok(())
  }

  /// Fail with `NotFound` unless a row with `id` exists in `table`.
  async fn require(
    &self,
    table: &'static str,
    entity: &'static str,
    id: i64,
  ) -> Result<()> {
    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
          [id],
          |r| r.get(0),
        )?)
      })
      .await?;
    if found { Ok(()) } else { Err(Error::not_found(entity, id)) }
  }

  /// Fail with `NotFound` unless `location_id` belongs to the establishment.
  async fn require_location_in(
    &self,
    establishment_id: i64,
    location_id: Option<i64>,
  ) -> Result<()> {
    let Some(location_id) = location_id else {
      return Ok(());
    };
    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(SELECT 1 FROM locations
             WHERE id = ?1 AND establishment_id = ?2)",
          [location_id, establishment_id],
          |r| r.get(0),
        )?)
      })
      .await?;
    if found {
      Ok(())
    } else {
      Err(Error::not_found("location", location_id))
    }
  }

  /// Run a single-row query keyed by `id`.
  async fn query_one<R: Send + 'static>(
    &self,
    sql: String,
    id: i64,
    from_row: RowFn<R>,
  ) -> Result<Option<R>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.query_row(&sql, [id], from_row).optional()?))
        .await?,
    )
  }

  /// Run a multi-row query keyed by a single id parameter.
  async fn query_many<R: Send + 'static>(
    &self,
    sql: String,
    id: i64,
    from_row: RowFn<R>,
  ) -> Result<Vec<R>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map([id], from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  /// Delete a row by id, failing with `NotFound` if nothing was deleted.
  async fn delete_row(
    &self,
    table: &'static str,
    entity: &'static str,
    id: i64,
  ) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::not_found(entity, id));
    }
    Ok(())
  }

  /// Execute a write that must touch exactly one row identified by `id`.
  async fn execute_on(
    &self,
    entity: &'static str,
    id: i64,
    sql: &'static str,
    params: Vec<Box<dyn ToSql + Send>>,
  ) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        let refs: Vec<&dyn ToSql> =
          params.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
        Ok(conn.execute(sql, refs.as_slice())?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::not_found(entity, id));
    }
    Ok(())
  }
}

// ─── SafetyStore impl ────────────────────────────────────────────────────────

impl SafetyStore for SqliteStore {
  type Error = Error;

  // ── Establishments ────────────────────────────────────────────────────────

  async fn create_establishment(
    &self,
    input: NewEstablishment,
  ) -> Result<Establishment> {
    input.validate()?;
    let now = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO establishments (
             name, street_address, city, state, zip_code,
             industry_description, naics_code, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            input.name,
            input.street_address,
            input.city,
            input.state,
            input.zip_code,
            input.industry_description,
            input.naics_code,
            now,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .get_establishment(id)
      .await?
      .ok_or(Error::not_found("establishment", id))
  }

  async fn get_establishment(&self, id: i64) -> Result<Option<Establishment>> {
    self
      .query_one(
        format!("SELECT {ESTABLISHMENT_COLUMNS} FROM establishments WHERE id = ?1"),
        id,
        RawEstablishment::from_row,
      )
      .await?
      .map(RawEstablishment::into_establishment)
      .transpose()
  }

  async fn list_establishments(&self) -> Result<Vec<Establishment>> {
    let raws: Vec<RawEstablishment> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ESTABLISHMENT_COLUMNS} FROM establishments ORDER BY name, id"
        ))?;
        let rows = stmt
          .query_map([], RawEstablishment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawEstablishment::into_establishment)
      .collect()
  }

  async fn update_establishment(&self, e: Establishment) -> Result<Establishment> {
    validate::name(&e.name, "establishment name")?;
    let id = e.id;
    self
      .execute_on(
        "establishment",
        id,
        "UPDATE establishments SET
           name = ?1, street_address = ?2, city = ?3, state = ?4,
           zip_code = ?5, industry_description = ?6, naics_code = ?7,
           updated_at = ?8
         WHERE id = ?9",
        vec![
          Box::new(e.name),
          Box::new(e.street_address),
          Box::new(e.city),
          Box::new(e.state),
          Box::new(e.zip_code),
          Box::new(e.industry_description),
          Box::new(e.naics_code),
          Box::new(encode_dt(Utc::now())),
          Box::new(id),
        ],
      )
      .await?;

    self
      .get_establishment(id)
      .await?
      .ok_or(Error::not_found("establishment", id))
  }

  async fn delete_establishment(&self, id: i64) -> Result<()> {
    self.delete_row("establishments", "establishment", id).await
  }

  // ── Locations ─────────────────────────────────────────────────────────────

  async fn create_location(
    &self,
    establishment_id: i64,
    input: NewLocation,
  ) -> Result<Location> {
    input.validate()?;
    self
      .require("establishments", "establishment", establishment_id)
      .await?;
    let now = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO locations (
             establishment_id, name, address, city, state, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![
            establishment_id,
            input.name,
            input.address,
            input.city,
            input.state,
            now,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .get_location(id)
      .await?
      .ok_or(Error::not_found("location", id))
  }

  async fn get_location(&self, id: i64) -> Result<Option<Location>> {
    self
      .query_one(
        format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1"),
        id,
        RawLocation::from_row,
      )
      .await?
      .map(RawLocation::into_location)
      .transpose()
  }

  async fn list_locations(&self, establishment_id: i64) -> Result<Vec<Location>> {
    self
      .query_many(
        format!(
          "SELECT {LOCATION_COLUMNS} FROM locations
           WHERE establishment_id = ?1 ORDER BY name, id"
        ),
        establishment_id,
        RawLocation::from_row,
      )
      .await?
      .into_iter()
      .map(RawLocation::into_location)
      .collect()
  }

  async fn update_location(&self, l: Location) -> Result<Location> {
    validate::name(&l.name, "location name")?;
    let id = l.id;
    self
      .execute_on(
        "location",
        id,
        "UPDATE locations SET
           name = ?1, address = ?2, city = ?3, state = ?4, is_active = ?5,
           updated_at = ?6
         WHERE id = ?7",
        vec![
          Box::new(l.name),
          Box::new(l.address),
          Box::new(l.city),
          Box::new(l.state),
          Box::new(l.is_active),
          Box::new(encode_dt(Utc::now())),
          Box::new(id),
        ],
      )
      .await?;

    self
      .get_location(id)
      .await?
      .ok_or(Error::not_found("location", id))
  }

  async fn delete_location(&self, id: i64) -> Result<()> {
    self.delete_row("locations", "location", id).await
  }

  // ── Incidents ─────────────────────────────────────────────────────────────

  async fn create_incident(&self, mut input: NewIncident) -> Result<Incident> {
    input.normalize();
    input.validate()?;

    let establishment_id = input.establishment_id;
    self
      .require("establishments", "establishment", establishment_id)
      .await?;
    self
      .require_location_in(establishment_id, input.details.location_id)
      .await?;

    let case_year = input.case_year();
    let status    = IncidentStatus::default().key();
    let now       = encode_dt(Utc::now());
    let details   = EncodedDetails::new(input.details);

    let (id, case_number) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let case_number: i64 = tx.query_row(
          "SELECT COALESCE(MAX(case_number), 0) + 1 FROM incidents
           WHERE establishment_id = ?1 AND case_year = ?2",
          rusqlite::params![establishment_id, case_year],
          |r| r.get(0),
        )?;

        let columns = INCIDENT_DETAIL_COLUMNS.join(", ");
        let placeholders = (1..=INCIDENT_DETAIL_COLUMNS.len() + 6)
          .map(|i| format!("?{i}"))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!(
          "INSERT INTO incidents (
             establishment_id, case_number, case_year, status,
             created_at, updated_at, {columns}
           ) VALUES ({placeholders})"
        );

        let mut values: Vec<&dyn ToSql> =
          vec![&establishment_id, &case_number, &case_year, &status, &now, &now];
        values.extend(details.values());
        tx.execute(&sql, values.as_slice())?;

        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok((id, case_number))
      })
      .await?;

    debug!(incident_id = id, establishment_id, case_year, case_number, "incident created");

    self
      .get_incident(id)
      .await?
      .ok_or(Error::not_found("incident", id))
  }

  async fn get_incident(&self, id: i64) -> Result<Option<Incident>> {
    self
      .query_one(
        format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = ?1"),
        id,
        RawIncident::from_row,
      )
      .await?
      .map(RawIncident::into_incident)
      .transpose()
  }

  async fn list_incidents(&self, filter: IncidentFilter) -> Result<Vec<Incident>> {
    let raws: Vec<RawIncident> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        let mut values: Vec<Box<dyn ToSql>> = vec![];

        if let Some(id) = filter.establishment_id {
          conds.push("establishment_id = ?");
          values.push(Box::new(id));
        }
        if let Some(id) = filter.location_id {
          conds.push("location_id = ?");
          values.push(Box::new(id));
        }
        if let Some(status) = filter.status {
          conds.push("status = ?");
          values.push(Box::new(status.key()));
        }
        if let Some(sev) = filter.outcome_severity {
          conds.push("outcome_severity = ?");
          values.push(Box::new(sev.key()));
        }
        if let Some(from) = filter.date_from {
          conds.push("incident_date >= ?");
          values.push(Box::new(encode_date(from)));
        }
        if let Some(to) = filter.date_to {
          conds.push("incident_date <= ?");
          values.push(Box::new(encode_date(to)));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
          conds.push("(employee_name LIKE ? OR description LIKE ?)");
          let pattern = format!("%{}%", search.trim());
          values.push(Box::new(pattern.clone()));
          values.push(Box::new(pattern));
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {INCIDENT_COLUMNS} FROM incidents {where_clause}
           ORDER BY incident_date DESC, id DESC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt
          .query_map(params.as_slice(), RawIncident::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIncident::into_incident).collect()
  }

  async fn update_incident(&self, mut incident: Incident) -> Result<Incident> {
    incident.details.normalize();
    incident.details.validate()?;
    self
      .require_location_in(incident.establishment_id, incident.details.location_id)
      .await?;

    let id      = incident.id;
    let status  = incident.status.key();
    let now     = encode_dt(Utc::now());
    let details = EncodedDetails::new(incident.details);

    let changed = self
      .conn
      .call(move |conn| {
        let sets = INCIDENT_DETAIL_COLUMNS
          .iter()
          .enumerate()
          .map(|(i, col)| format!("{col} = ?{}", i + 3))
          .collect::<Vec<_>>()
          .join(", ");
        let id_slot = INCIDENT_DETAIL_COLUMNS.len() + 3;
        let sql = format!(
          "UPDATE incidents SET status = ?1, updated_at = ?2, {sets}
           WHERE id = ?{id_slot}"
        );

        let mut values: Vec<&dyn ToSql> = vec![&status, &now];
        values.extend(details.values());
        values.push(&id);
        Ok(conn.execute(&sql, values.as_slice())?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::not_found("incident", id));
    }

    self
      .get_incident(id)
      .await?
      .ok_or(Error::not_found("incident", id))
  }

  async fn delete_incident(&self, id: i64) -> Result<()> {
    self.delete_row("incidents", "incident", id).await
  }

  // ── Annual statistics ─────────────────────────────────────────────────────

  async fn upsert_annual_stats(
    &self,
    establishment_id: i64,
    year: i32,
    input: AnnualStatsInput,
  ) -> Result<AnnualStats> {
    input.validate(year)?;
    self
      .require("establishments", "establishment", establishment_id)
      .await?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO annual_stats (
             establishment_id, year, avg_employees, total_hours_worked,
             certifier_name, certifier_title, certifier_phone, certification_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(establishment_id, year) DO UPDATE SET
             avg_employees      = excluded.avg_employees,
             total_hours_worked = excluded.total_hours_worked,
             certifier_name     = excluded.certifier_name,
             certifier_title    = excluded.certifier_title,
             certifier_phone    = excluded.certifier_phone,
             certification_date = excluded.certification_date",
          rusqlite::params![
            establishment_id,
            year,
            input.avg_employees,
            input.total_hours_worked,
            input.certifier_name,
            input.certifier_title,
            input.certifier_phone,
            input.certification_date.map(encode_date),
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_annual_stats(establishment_id, year)
      .await?
      .ok_or(Error::not_found("annual stats for establishment", establishment_id))
  }

  async fn get_annual_stats(
    &self,
    establishment_id: i64,
    year: i32,
  ) -> Result<Option<AnnualStats>> {
    let raw: Option<RawStats> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {STATS_COLUMNS} FROM annual_stats
                 WHERE establishment_id = ?1 AND year = ?2"
              ),
              rusqlite::params![establishment_id, year],
              RawStats::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStats::into_stats).transpose()
  }

  // ── Corrective actions ────────────────────────────────────────────────────

  async fn create_corrective_action(
    &self,
    incident_id: i64,
    input: NewCorrectiveAction,
  ) -> Result<CorrectiveAction> {
    input.validate()?;
    self.require("incidents", "incident", incident_id).await?;
    if let Some(session_id) = input.rca_session_id {
      self.require("rca_sessions", "RCA session", session_id).await?;
    }
    let now = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO corrective_actions (
             incident_id, rca_session_id, description, assigned_to, due_date,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![
            incident_id,
            input.rca_session_id,
            input.description,
            input.assigned_to,
            input.due_date.map(encode_date),
            now,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .get_corrective_action(id)
      .await?
      .ok_or(Error::not_found("corrective action", id))
  }

  async fn get_corrective_action(&self, id: i64) -> Result<Option<CorrectiveAction>> {
    self
      .query_one(
        format!("SELECT {ACTION_COLUMNS} FROM corrective_actions WHERE id = ?1"),
        id,
        RawAction::from_row,
      )
      .await?
      .map(RawAction::into_action)
      .transpose()
  }

  async fn list_corrective_actions(
    &self,
    incident_id: i64,
  ) -> Result<Vec<CorrectiveAction>> {
    self
      .query_many(
        format!(
          "SELECT {ACTION_COLUMNS} FROM corrective_actions
           WHERE incident_id = ?1 ORDER BY id"
        ),
        incident_id,
        RawAction::from_row,
      )
      .await?
      .into_iter()
      .map(RawAction::into_action)
      .collect()
  }

  async fn list_establishment_actions(
    &self,
    establishment_id: i64,
  ) -> Result<Vec<CorrectiveAction>> {
    self
      .query_many(
        format!(
          "SELECT {ACTION_COLUMNS} FROM corrective_actions
           WHERE incident_id IN (
             SELECT id FROM incidents WHERE establishment_id = ?1
           )
           ORDER BY id"
        ),
        establishment_id,
        RawAction::from_row,
      )
      .await?
      .into_iter()
      .map(RawAction::into_action)
      .collect()
  }

  async fn update_corrective_action(
    &self,
    a: CorrectiveAction,
  ) -> Result<CorrectiveAction> {
    validate::not_empty(&a.description, "description")?;
    let id = a.id;
    self
      .execute_on(
        "corrective action",
        id,
        "UPDATE corrective_actions SET
           description = ?1, assigned_to = ?2, due_date = ?3, state = ?4,
           completed_date = ?5, notes = ?6, updated_at = ?7
         WHERE id = ?8",
        vec![
          Box::new(a.description),
          Box::new(a.assigned_to),
          Box::new(a.due_date.map(encode_date)),
          Box::new(a.state.key()),
          Box::new(a.completed_date.map(encode_date)),
          Box::new(a.notes),
          Box::new(encode_dt(Utc::now())),
          Box::new(id),
        ],
      )
      .await?;

    self
      .get_corrective_action(id)
      .await?
      .ok_or(Error::not_found("corrective action", id))
  }

  async fn delete_corrective_action(&self, id: i64) -> Result<()> {
    self
      .delete_row("corrective_actions", "corrective action", id)
      .await
  }

  // ── Root-cause analysis ───────────────────────────────────────────────────

  async fn create_rca_session(
    &self,
    incident_id: i64,
    method: RcaMethod,
  ) -> Result<RcaSession> {
    self.require("incidents", "incident", incident_id).await?;
    let now = encode_dt(Utc::now());
    let method = method.key();
    let status = RcaStatus::default().key();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO rca_sessions (incident_id, method, status, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![incident_id, method, status, now],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .get_rca_session(id)
      .await?
      .ok_or(Error::not_found("RCA session", id))
  }

  async fn get_rca_session(&self, id: i64) -> Result<Option<RcaSession>> {
    self
      .query_one(
        format!("SELECT {RCA_COLUMNS} FROM rca_sessions WHERE id = ?1"),
        id,
        RawRcaSession::from_row,
      )
      .await?
      .map(RawRcaSession::into_session)
      .transpose()
  }

  async fn list_rca_sessions(&self, incident_id: i64) -> Result<Vec<RcaSession>> {
    self
      .query_many(
        format!(
          "SELECT {RCA_COLUMNS} FROM rca_sessions
           WHERE incident_id = ?1 ORDER BY created_at DESC, id DESC"
        ),
        incident_id,
        RawRcaSession::from_row,
      )
      .await?
      .into_iter()
      .map(RawRcaSession::into_session)
      .collect()
  }

  async fn complete_rca_session(
    &self,
    id: i64,
    root_cause_summary: String,
  ) -> Result<RcaSession> {
    validate::not_empty(&root_cause_summary, "root cause summary")?;
    self
      .execute_on(
        "RCA session",
        id,
        "UPDATE rca_sessions SET status = ?1, root_cause_summary = ?2, updated_at = ?3
         WHERE id = ?4",
        vec![
          Box::new(RcaStatus::Completed.key()),
          Box::new(root_cause_summary),
          Box::new(encode_dt(Utc::now())),
          Box::new(id),
        ],
      )
      .await?;

    self
      .get_rca_session(id)
      .await?
      .ok_or(Error::not_found("RCA session", id))
  }

  async fn delete_rca_session(&self, id: i64) -> Result<()> {
    self.delete_row("rca_sessions", "RCA session", id).await
  }

  async fn add_five_whys_step(
    &self,
    rca_session_id: i64,
    input: NewFiveWhysStep,
  ) -> Result<FiveWhysStep> {
    input.validate()?;
    self
      .require("rca_sessions", "RCA session", rca_session_id)
      .await?;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO five_whys_steps (rca_session_id, step_number, question, answer)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            rca_session_id,
            input.step_number,
            input.question,
            input.answer
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .query_one(
        format!("SELECT {FIVE_WHYS_COLUMNS} FROM five_whys_steps WHERE id = ?1"),
        id,
        five_whys_from_row,
      )
      .await?
      .ok_or(Error::not_found("five whys step", id))
  }

  async fn list_five_whys_steps(
    &self,
    rca_session_id: i64,
  ) -> Result<Vec<FiveWhysStep>> {
    self
      .query_many(
        format!(
          "SELECT {FIVE_WHYS_COLUMNS} FROM five_whys_steps
           WHERE rca_session_id = ?1 ORDER BY step_number, id"
        ),
        rca_session_id,
        five_whys_from_row,
      )
      .await
  }

  async fn update_five_whys_step(
    &self,
    id: i64,
    update: FiveWhysStepUpdate,
  ) -> Result<FiveWhysStep> {
    validate::not_empty(&update.question, "question")?;
    self
      .execute_on(
        "five whys step",
        id,
        "UPDATE five_whys_steps SET question = ?1, answer = ?2 WHERE id = ?3",
        vec![Box::new(update.question), Box::new(update.answer), Box::new(id)],
      )
      .await?;

    self
      .query_one(
        format!("SELECT {FIVE_WHYS_COLUMNS} FROM five_whys_steps WHERE id = ?1"),
        id,
        five_whys_from_row,
      )
      .await?
      .ok_or(Error::not_found("five whys step", id))
  }

  async fn add_fishbone_category(
    &self,
    rca_session_id: i64,
    input: NewFishboneCategory,
  ) -> Result<FishboneCategory> {
    self
      .require("rca_sessions", "RCA session", rca_session_id)
      .await?;
    let category = input.category.key();
    let sort_order = input.sort_order;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fishbone_categories (rca_session_id, category, sort_order)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![rca_session_id, category, sort_order],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(FishboneCategory {
      id,
      rca_session_id,
      category: input.category,
      sort_order,
      causes: vec![],
    })
  }

  async fn list_fishbone(&self, rca_session_id: i64) -> Result<Vec<FishboneCategory>> {
    let (raw_categories, causes): (Vec<RawCategory>, Vec<FishboneCause>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, rca_session_id, category, sort_order
           FROM fishbone_categories
           WHERE rca_session_id = ?1
           ORDER BY sort_order, id",
        )?;
        let categories = stmt
          .query_map([rca_session_id], |row| {
            Ok(RawCategory {
              id:             row.get(0)?,
              rca_session_id: row.get(1)?,
              category:       row.get(2)?,
              sort_order:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT c.id, c.category_id, c.cause_text, c.is_root_cause, c.sort_order
           FROM fishbone_causes c
           JOIN fishbone_categories k ON k.id = c.category_id
           WHERE k.rca_session_id = ?1
           ORDER BY c.sort_order, c.id",
        )?;
        let causes = stmt
          .query_map([rca_session_id], cause_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((categories, causes))
      })
      .await?;

    raw_categories
      .into_iter()
      .map(|raw| {
        Ok(FishboneCategory {
          id:             raw.id,
          rca_session_id: raw.rca_session_id,
          category:       decode_label(&raw.category)?,
          sort_order:     raw.sort_order,
          causes:         causes
            .iter()
            .filter(|c| c.category_id == raw.id)
            .cloned()
            .collect(),
        })
      })
      .collect()
  }

  async fn add_fishbone_cause(
    &self,
    category_id: i64,
    input: NewFishboneCause,
  ) -> Result<FishboneCause> {
    input.validate()?;
    self
      .require("fishbone_categories", "fishbone category", category_id)
      .await?;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fishbone_causes (category_id, cause_text, is_root_cause, sort_order)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            category_id,
            input.cause_text,
            input.is_root_cause,
            input.sort_order
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .get_fishbone_cause(id)
      .await?
      .ok_or(Error::not_found("fishbone cause", id))
  }

  async fn get_fishbone_cause(&self, id: i64) -> Result<Option<FishboneCause>> {
    self
      .query_one(
        format!("SELECT {CAUSE_COLUMNS} FROM fishbone_causes WHERE id = ?1"),
        id,
        cause_from_row,
      )
      .await
  }

  async fn update_fishbone_cause(&self, cause: FishboneCause) -> Result<FishboneCause> {
    validate::not_empty(&cause.cause_text, "cause")?;
    let id = cause.id;
    self
      .execute_on(
        "fishbone cause",
        id,
        "UPDATE fishbone_causes SET cause_text = ?1, is_root_cause = ?2, sort_order = ?3
         WHERE id = ?4",
        vec![
          Box::new(cause.cause_text),
          Box::new(cause.is_root_cause),
          Box::new(cause.sort_order),
          Box::new(id),
        ],
      )
      .await?;

    self
      .get_fishbone_cause(id)
      .await?
      .ok_or(Error::not_found("fishbone cause", id))
  }

  async fn delete_fishbone_cause(&self, id: i64) -> Result<()> {
    self
      .delete_row("fishbone_causes", "fishbone cause", id)
      .await
  }

  // ── Toolbox talks ─────────────────────────────────────────────────────────

  async fn list_topics(&self, include_inactive: bool) -> Result<Vec<TalkTopic>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let filter = if include_inactive { "" } else { "WHERE is_active = 1" };
          let mut stmt = conn.prepare(&format!(
            "SELECT {TOPIC_COLUMNS} FROM toolbox_topics {filter}
             ORDER BY category, title"
          ))?;
          let rows = stmt
            .query_map([], topic_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_topic(&self, id: i64) -> Result<Option<TalkTopic>> {
    self
      .query_one(
        format!("SELECT {TOPIC_COLUMNS} FROM toolbox_topics WHERE id = ?1"),
        id,
        topic_from_row,
      )
      .await
  }

  async fn create_talk(
    &self,
    establishment_id: i64,
    input: NewToolboxTalk,
  ) -> Result<ToolboxTalk> {
    input.validate()?;
    self
      .require("establishments", "establishment", establishment_id)
      .await?;
    self
      .require_location_in(establishment_id, input.location_id)
      .await?;
    if let Some(topic_id) = input.topic_id {
      self.require("toolbox_topics", "topic", topic_id).await?;
    }
    let status = TalkStatus::default().key();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO toolbox_talks (
             topic_id, establishment_id, location_id, title, date,
             conducted_by, notes, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            input.topic_id,
            establishment_id,
            input.location_id,
            input.title,
            encode_date(input.date),
            input.conducted_by,
            input.notes,
            status,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .get_talk(id)
      .await?
      .ok_or(Error::not_found("toolbox talk", id))
  }

  async fn get_talk(&self, id: i64) -> Result<Option<ToolboxTalk>> {
    self
      .query_one(
        format!("SELECT {TALK_COLUMNS} FROM toolbox_talks WHERE id = ?1"),
        id,
        RawTalk::from_row,
      )
      .await?
      .map(RawTalk::into_talk)
      .transpose()
  }

  async fn list_talks(&self, establishment_id: i64) -> Result<Vec<ToolboxTalk>> {
    self
      .query_many(
        format!(
          "SELECT {TALK_COLUMNS} FROM toolbox_talks
           WHERE establishment_id = ?1 ORDER BY date DESC, id DESC"
        ),
        establishment_id,
        RawTalk::from_row,
      )
      .await?
      .into_iter()
      .map(RawTalk::into_talk)
      .collect()
  }

  async fn complete_talk(&self, id: i64) -> Result<ToolboxTalk> {
    self
      .execute_on(
        "toolbox talk",
        id,
        "UPDATE toolbox_talks SET status = ?1 WHERE id = ?2",
        vec![Box::new(TalkStatus::Completed.key()), Box::new(id)],
      )
      .await?;

    self
      .get_talk(id)
      .await?
      .ok_or(Error::not_found("toolbox talk", id))
  }

  async fn add_attendee(&self, talk_id: i64, input: NewAttendee) -> Result<Attendee> {
    input.validate()?;
    self.require("toolbox_talks", "toolbox talk", talk_id).await?;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO toolbox_attendees (talk_id, employee_name, employee_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![talk_id, input.employee_name, input.employee_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .query_one(
        format!("SELECT {ATTENDEE_COLUMNS} FROM toolbox_attendees WHERE id = ?1"),
        id,
        RawAttendee::from_row,
      )
      .await?
      .ok_or(Error::not_found("attendee", id))?
      .into_attendee()
  }

  async fn list_attendees(&self, talk_id: i64) -> Result<Vec<Attendee>> {
    self
      .query_many(
        format!(
          "SELECT {ATTENDEE_COLUMNS} FROM toolbox_attendees
           WHERE talk_id = ?1 ORDER BY employee_name, id"
        ),
        talk_id,
        RawAttendee::from_row,
      )
      .await?
      .into_iter()
      .map(RawAttendee::into_attendee)
      .collect()
  }

  async fn sign_attendee(&self, id: i64, signature: Signature) -> Result<Attendee> {
    signature.validate()?;
    self
      .execute_on(
        "attendee",
        id,
        "UPDATE toolbox_attendees SET signature_data = ?1, signed_at = ?2
         WHERE id = ?3",
        vec![
          Box::new(signature.signature_data),
          Box::new(encode_dt(Utc::now())),
          Box::new(id),
        ],
      )
      .await?;

    self
      .query_one(
        format!("SELECT {ATTENDEE_COLUMNS} FROM toolbox_attendees WHERE id = ?1"),
        id,
        RawAttendee::from_row,
      )
      .await?
      .ok_or(Error::not_found("attendee", id))?
      .into_attendee()
  }

  async fn delete_attendee(&self, id: i64) -> Result<()> {
    self.delete_row("toolbox_attendees", "attendee", id).await
  }

  // ── Job-safety analyses ───────────────────────────────────────────────────

  async fn list_jsa_templates(&self) -> Result<Vec<JsaTemplate>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT id, name, description, trade, is_active
             FROM jsa_templates WHERE is_active = 1 ORDER BY name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(JsaTemplate {
                id:          row.get(0)?,
                name:        row.get(1)?,
                description: row.get(2)?,
                trade:       row.get(3)?,
                is_active:   row.get(4)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn create_jsa(
    &self,
    establishment_id: i64,
    input: NewJsaInstance,
  ) -> Result<JsaInstance> {
    input.validate()?;
    self
      .require("establishments", "establishment", establishment_id)
      .await?;
    self
      .require_location_in(establishment_id, input.location_id)
      .await?;
    if let Some(template_id) = input.template_id {
      self.require("jsa_templates", "JSA template", template_id).await?;
    }
    let status = JsaStatus::default().key();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO jsa_instances (
             template_id, establishment_id, location_id, job_name, job_date,
             prepared_by, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            input.template_id,
            establishment_id,
            input.location_id,
            input.job_name,
            encode_date(input.job_date),
            input.prepared_by,
            status,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self.get_jsa(id).await?.ok_or(Error::not_found("JSA", id))
  }

  async fn get_jsa(&self, id: i64) -> Result<Option<JsaInstance>> {
    self
      .query_one(
        format!("SELECT {JSA_COLUMNS} FROM jsa_instances WHERE id = ?1"),
        id,
        RawJsa::from_row,
      )
      .await?
      .map(RawJsa::into_jsa)
      .transpose()
  }

  async fn list_jsas(&self, establishment_id: i64) -> Result<Vec<JsaInstance>> {
    self
      .query_many(
        format!(
          "SELECT {JSA_COLUMNS} FROM jsa_instances
           WHERE establishment_id = ?1 ORDER BY job_date DESC, id DESC"
        ),
        establishment_id,
        RawJsa::from_row,
      )
      .await?
      .into_iter()
      .map(RawJsa::into_jsa)
      .collect()
  }

  async fn set_jsa_status(&self, id: i64, status: JsaStatus) -> Result<JsaInstance> {
    self
      .execute_on(
        "JSA",
        id,
        "UPDATE jsa_instances SET status = ?1 WHERE id = ?2",
        vec![Box::new(status.key()), Box::new(id)],
      )
      .await?;

    self.get_jsa(id).await?.ok_or(Error::not_found("JSA", id))
  }

  async fn add_jsa_step(&self, jsa_id: i64, input: NewJsaStep) -> Result<JsaStep> {
    input.validate()?;
    self.require("jsa_instances", "JSA", jsa_id).await?;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO jsa_steps (jsa_instance_id, step_number, task_description)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![jsa_id, input.step_number, input.task_description],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .query_one(
        format!("SELECT {JSA_STEP_COLUMNS} FROM jsa_steps WHERE id = ?1"),
        id,
        jsa_step_from_row,
      )
      .await?
      .ok_or(Error::not_found("JSA step", id))
  }

  async fn list_jsa_steps(&self, jsa_id: i64) -> Result<Vec<JsaStep>> {
    self
      .query_many(
        format!(
          "SELECT {JSA_STEP_COLUMNS} FROM jsa_steps
           WHERE jsa_instance_id = ?1 ORDER BY step_number, id"
        ),
        jsa_id,
        jsa_step_from_row,
      )
      .await
  }

  async fn toggle_jsa_step(&self, id: i64) -> Result<JsaStep> {
    self
      .execute_on(
        "JSA step",
        id,
        "UPDATE jsa_steps SET is_completed = NOT is_completed WHERE id = ?1",
        vec![Box::new(id)],
      )
      .await?;

    self
      .query_one(
        format!("SELECT {JSA_STEP_COLUMNS} FROM jsa_steps WHERE id = ?1"),
        id,
        jsa_step_from_row,
      )
      .await?
      .ok_or(Error::not_found("JSA step", id))
  }
}
