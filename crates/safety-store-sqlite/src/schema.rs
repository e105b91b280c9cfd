//! SQL schema for the safety tracker SQLite store.
//!
//! Executed at every connection startup. Idempotent: tables are created with
//! `IF NOT EXISTS` and seed rows are inserted with `INSERT OR IGNORE` against
//! a unique column.

/// Full schema DDL plus seed data.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS establishments (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    name                 TEXT NOT NULL,
    street_address       TEXT,
    city                 TEXT,
    state                TEXT,
    zip_code             TEXT,
    industry_description TEXT,
    naics_code           TEXT,
    created_at           TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS locations (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    establishment_id INTEGER NOT NULL REFERENCES establishments(id) ON DELETE CASCADE,
    name             TEXT NOT NULL,
    address          TEXT,
    city             TEXT,
    state            TEXT,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

-- case_number is assigned per (establishment, case_year) inside the insert
-- transaction and never rewritten.
CREATE TABLE IF NOT EXISTS incidents (
    id                       INTEGER PRIMARY KEY AUTOINCREMENT,
    establishment_id         INTEGER NOT NULL REFERENCES establishments(id) ON DELETE CASCADE,
    location_id              INTEGER REFERENCES locations(id) ON DELETE SET NULL,
    case_number              INTEGER NOT NULL,
    case_year                INTEGER NOT NULL,
    status                   TEXT NOT NULL DEFAULT 'open',

    employee_name            TEXT NOT NULL,
    employee_job_title       TEXT,
    employee_address         TEXT,
    employee_city            TEXT,
    employee_state           TEXT,
    employee_zip             TEXT,
    employee_dob             TEXT,            -- YYYY-MM-DD
    employee_hire_date       TEXT,
    employee_gender          TEXT,
    is_privacy_case          INTEGER NOT NULL DEFAULT 0,

    incident_date            TEXT NOT NULL,
    incident_time            TEXT,
    work_start_time          TEXT,
    where_occurred           TEXT,
    description              TEXT NOT NULL,
    activity_before_incident TEXT,
    how_injury_occurred      TEXT,
    injury_description       TEXT,
    object_substance         TEXT,

    physician_name           TEXT,
    treatment_facility       TEXT,
    facility_address         TEXT,
    facility_city_state_zip  TEXT,
    treated_in_er            INTEGER,
    hospitalized_overnight   INTEGER,

    outcome_severity         TEXT NOT NULL DEFAULT 'other_recordable',
    days_away_count          INTEGER NOT NULL DEFAULT 0,
    days_restricted_count    INTEGER NOT NULL DEFAULT 0,
    date_of_death            TEXT,
    injury_illness_type      TEXT NOT NULL DEFAULT 'injury',
    is_recordable            INTEGER NOT NULL DEFAULT 1,

    completed_by             TEXT,
    completed_by_title       TEXT,
    completed_by_phone       TEXT,
    completed_date           TEXT,

    created_at               TEXT NOT NULL,
    updated_at               TEXT NOT NULL,
    UNIQUE (establishment_id, case_year, case_number)
);

CREATE TABLE IF NOT EXISTS annual_stats (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    establishment_id   INTEGER NOT NULL REFERENCES establishments(id) ON DELETE CASCADE,
    year               INTEGER NOT NULL,
    avg_employees      INTEGER NOT NULL,
    total_hours_worked INTEGER NOT NULL,
    certifier_name     TEXT,
    certifier_title    TEXT,
    certifier_phone    TEXT,
    certification_date TEXT,
    UNIQUE (establishment_id, year)
);

CREATE TABLE IF NOT EXISTS rca_sessions (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    incident_id        INTEGER NOT NULL REFERENCES incidents(id) ON DELETE CASCADE,
    method             TEXT NOT NULL,     -- 'five_whys' | 'fishbone'
    status             TEXT NOT NULL DEFAULT 'in_progress',
    root_cause_summary TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS five_whys_steps (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    rca_session_id INTEGER NOT NULL REFERENCES rca_sessions(id) ON DELETE CASCADE,
    step_number    INTEGER NOT NULL,
    question       TEXT NOT NULL,
    answer         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS fishbone_categories (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    rca_session_id INTEGER NOT NULL REFERENCES rca_sessions(id) ON DELETE CASCADE,
    category       TEXT NOT NULL,
    sort_order     INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS fishbone_causes (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id   INTEGER NOT NULL REFERENCES fishbone_categories(id) ON DELETE CASCADE,
    cause_text    TEXT NOT NULL,
    is_root_cause INTEGER NOT NULL DEFAULT 0,
    sort_order    INTEGER NOT NULL DEFAULT 0
);

-- Only the stored progress lives here; overdue is derived on read.
CREATE TABLE IF NOT EXISTS corrective_actions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    incident_id    INTEGER NOT NULL REFERENCES incidents(id) ON DELETE CASCADE,
    rca_session_id INTEGER REFERENCES rca_sessions(id) ON DELETE SET NULL,
    description    TEXT NOT NULL,
    assigned_to    TEXT,
    due_date       TEXT,
    state          TEXT NOT NULL DEFAULT 'open',
    completed_date TEXT,
    notes          TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS toolbox_topics (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            TEXT NOT NULL UNIQUE,
    description      TEXT,
    content          TEXT NOT NULL,
    category         TEXT,
    duration_minutes INTEGER NOT NULL DEFAULT 10,
    is_active        INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS toolbox_talks (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id         INTEGER REFERENCES toolbox_topics(id) ON DELETE SET NULL,
    establishment_id INTEGER NOT NULL REFERENCES establishments(id) ON DELETE CASCADE,
    location_id      INTEGER REFERENCES locations(id) ON DELETE SET NULL,
    title            TEXT NOT NULL,
    date             TEXT NOT NULL,
    conducted_by     TEXT NOT NULL,
    notes            TEXT,
    status           TEXT NOT NULL DEFAULT 'scheduled'
);

CREATE TABLE IF NOT EXISTS toolbox_attendees (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    talk_id        INTEGER NOT NULL REFERENCES toolbox_talks(id) ON DELETE CASCADE,
    employee_name  TEXT NOT NULL,
    employee_id    TEXT,
    signature_data TEXT,
    signed_at      TEXT
);

CREATE TABLE IF NOT EXISTS jsa_templates (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT,
    trade       TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS jsa_instances (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    template_id      INTEGER REFERENCES jsa_templates(id) ON DELETE SET NULL,
    establishment_id INTEGER NOT NULL REFERENCES establishments(id) ON DELETE CASCADE,
    location_id      INTEGER REFERENCES locations(id) ON DELETE SET NULL,
    job_name         TEXT NOT NULL,
    job_date         TEXT NOT NULL,
    prepared_by      TEXT NOT NULL,
    reviewed_by      TEXT,
    approved_by      TEXT,
    status           TEXT NOT NULL DEFAULT 'draft'
);

CREATE TABLE IF NOT EXISTS jsa_steps (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    jsa_instance_id  INTEGER NOT NULL REFERENCES jsa_instances(id) ON DELETE CASCADE,
    step_number      INTEGER NOT NULL,
    task_description TEXT NOT NULL,
    is_completed     INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS incidents_establishment_idx ON incidents(establishment_id, incident_date);
CREATE INDEX IF NOT EXISTS locations_establishment_idx ON locations(establishment_id);
CREATE INDEX IF NOT EXISTS actions_incident_idx        ON corrective_actions(incident_id);
CREATE INDEX IF NOT EXISTS rca_incident_idx            ON rca_sessions(incident_id);

-- Seed library.
INSERT OR IGNORE INTO toolbox_topics (title, description, content, category, duration_minutes) VALUES
    ('Slips, Trips and Falls',
     'Preventing same-level falls in work areas.',
     'Keep walkways clear. Clean up spills immediately and mark wet floors. Report damaged flooring, loose mats and poor lighting. Use handrails on stairs.',
     'General Safety', 10),
    ('Ladder Safety',
     'Selecting, inspecting and using portable ladders.',
     'Inspect the ladder before each use. Keep three points of contact. Set extension ladders at a 4:1 angle and extend 3 feet above the landing. Never stand on the top two rungs.',
     'Fall Protection', 15),
    ('Lockout/Tagout Basics',
     'Controlling hazardous energy during maintenance.',
     'Notify affected employees, shut down the equipment, isolate every energy source, apply your own lock and tag, release stored energy and verify zero energy before starting work.',
     'Energy Control', 15),
    ('Personal Protective Equipment',
     'Choosing and caring for PPE.',
     'Wear the PPE the task requires. Inspect it before use and replace damaged items. PPE is the last line of defence after engineering and administrative controls.',
     'General Safety', 10),
    ('Heat Stress',
     'Recognising and preventing heat illness.',
     'Drink water every 15 minutes, take breaks in shade, and watch co-workers for dizziness, confusion or heavy sweating. New workers need time to acclimatise.',
     'Health', 10),
    ('Forklift Pedestrian Safety',
     'Working safely around powered industrial trucks.',
     'Make eye contact with the operator before crossing. Stay out of aisles marked for trucks. Never walk under a raised load.',
     'Equipment', 10);

INSERT OR IGNORE INTO jsa_templates (name, description, trade) VALUES
    ('Working at Heights', 'Tasks performed above 6 feet on scaffolds, ladders or lifts.', 'General'),
    ('Hot Work', 'Welding, cutting, brazing and grinding near combustibles.', 'Welding'),
    ('Confined Space Entry', 'Entry into tanks, vaults, pits and similar spaces.', 'General'),
    ('Electrical Panel Work', 'Maintenance on energised or de-energised electrical equipment.', 'Electrical'),
    ('Excavation and Trenching', 'Digging, shoring and working in trenches.', 'Civil');
";
