//! SQL schema for the job-board SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,      -- 'Writer' | 'PM' | 'Client'
    status        TEXT NOT NULL,      -- 'new' | 'active' | 'inactive' | 'ban'
    level         INTEGER NOT NULL,   -- 1 limited, 2 normal, 3 classified
    display_name  TEXT NOT NULL,
    country       TEXT NOT NULL,
    last_active   TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organisations (
    organisation_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL
);

-- Writers and PMs.
CREATE TABLE IF NOT EXISTS applicants (
    account_id TEXT PRIMARY KEY REFERENCES accounts(account_id)
);

-- Clients and PMs.
CREATE TABLE IF NOT EXISTS posters (
    account_id            TEXT PRIMARY KEY REFERENCES accounts(account_id),
    organisation_id       TEXT REFERENCES organisations(organisation_id),
    studio_name           TEXT,
    is_posting_first_time INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS pages (
    page_id  TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES accounts(account_id),
    name     TEXT NOT NULL,
    slug     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    project_id      TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL REFERENCES accounts(account_id),
    title           TEXT NOT NULL,
    kind            TEXT NOT NULL,    -- 'LongForm' | 'ShortForm' | 'Design' | 'PDF'
    long_form_state TEXT,             -- 'init' | 'saved'; long forms only
    public          INTEGER NOT NULL DEFAULT 0,
    cover_image     TEXT
);

CREATE TABLE IF NOT EXISTS imported_projects (
    pm_id      TEXT NOT NULL REFERENCES accounts(account_id),
    project_id TEXT NOT NULL REFERENCES projects(project_id),
    PRIMARY KEY (pm_id, project_id)
);

-- Never deleted; `draft` holds the poster-controlled fields as JSON.
CREATE TABLE IF NOT EXISTS opportunities (
    opportunity_id        TEXT PRIMARY KEY,
    poster_id             TEXT NOT NULL REFERENCES accounts(account_id),
    poster_role           TEXT NOT NULL,   -- 'Client' | 'PM'
    status                TEXT NOT NULL,
    pm_required           INTEGER NOT NULL DEFAULT 0,
    draft                 TEXT NOT NULL,
    deadline              TEXT,            -- copy of draft.deadline, sortable
    application_count     INTEGER NOT NULL DEFAULT 0,
    new_application_count INTEGER NOT NULL DEFAULT 0,
    trending              INTEGER NOT NULL DEFAULT 0,
    close_reason          TEXT,
    closed_at             TEXT,
    is_opportunity_close  INTEGER NOT NULL DEFAULT 0,
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS applications (
    application_id  TEXT PRIMARY KEY,
    opportunity_id  TEXT NOT NULL REFERENCES opportunities(opportunity_id),
    applicant_id    TEXT NOT NULL REFERENCES accounts(account_id),
    poster_id       TEXT NOT NULL REFERENCES accounts(account_id),
    applicant_role  TEXT NOT NULL,   -- 'Writer' | 'PM'
    status          TEXT NOT NULL,
    answer1         TEXT NOT NULL,
    answer2         TEXT NOT NULL,
    page_ids        TEXT NOT NULL DEFAULT '[]',
    content_samples TEXT NOT NULL DEFAULT '[]',
    suggested       INTEGER NOT NULL DEFAULT 0,
    applied_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (applicant_id, opportunity_id)
);

CREATE TABLE IF NOT EXISTS saved_jobs (
    applicant_id   TEXT NOT NULL REFERENCES accounts(account_id),
    opportunity_id TEXT NOT NULL REFERENCES opportunities(opportunity_id),
    saved_at       TEXT NOT NULL,
    PRIMARY KEY (applicant_id, opportunity_id)
);

-- Reports are strictly append-only.
CREATE TABLE IF NOT EXISTS reports (
    report_id   TEXT PRIMARY KEY,
    reporter_id TEXT NOT NULL,
    against_id  TEXT,
    post_id     TEXT,
    report_type TEXT NOT NULL,   -- 'post' | 'profile' | 'message'
    reason      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS studio_requests (
    sender_id   TEXT NOT NULL REFERENCES accounts(account_id),
    receiver_id TEXT NOT NULL REFERENCES accounts(account_id),
    created_at  TEXT NOT NULL,
    PRIMARY KEY (sender_id, receiver_id)
);

CREATE INDEX IF NOT EXISTS opportunities_poster_idx   ON opportunities(poster_id);
CREATE INDEX IF NOT EXISTS opportunities_status_idx   ON opportunities(status);
CREATE INDEX IF NOT EXISTS applications_opp_idx       ON applications(opportunity_id);
CREATE INDEX IF NOT EXISTS applications_poster_idx    ON applications(poster_id);
CREATE INDEX IF NOT EXISTS reports_reporter_idx       ON reports(reporter_id);
CREATE INDEX IF NOT EXISTS studio_requests_recv_idx   ON studio_requests(receiver_id);

PRAGMA user_version = 1;
";
