//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that string order is time order. Id lists and the opportunity draft are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase strings.
//! Enums are stored under their wire names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use jobboard_core::{
  account::{Account, CreatorLevel},
  application::{Application, ApplicationListing, ReceivedApplication, ApplicantSummary},
  opportunity::{ClientStats, Opportunity, OpportunityListing},
  portfolio::{Page, Project},
  report::Report,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

/// Parse an enum column through its `FromStr` (strum) implementation.
pub fn decode_enum<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownValue { kind, value: s.to_owned() })
}

pub fn decode_level(rank: i64) -> Result<CreatorLevel> {
  CreatorLevel::from_rank(rank).ok_or_else(|| Error::UnknownValue {
    kind:  "creator level",
    value: rank.to_string(),
  })
}

// ─── JSON lists ──────────────────────────────────────────────────────────────

/// Encode any serialisable list as a JSON array, e.g. for `json_each(?)`.
pub fn encode_list<T: serde::Serialize>(items: &[T]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_uuids(s: &str) -> Result<Vec<Uuid>> { Ok(serde_json::from_str(s)?) }

// ─── Accounts ────────────────────────────────────────────────────────────────

pub const ACCOUNT_COLUMNS: &str = "a.account_id, a.username, a.role, a.status, a.level, \
                                   a.display_name, a.country, a.last_active, a.created_at";

pub struct RawAccount {
  pub account_id:   String,
  pub username:     String,
  pub role:         String,
  pub status:       String,
  pub level:        i64,
  pub display_name: String,
  pub country:      String,
  pub last_active:  Option<String>,
  pub created_at:   String,
}

impl RawAccount {
  /// Read the [`ACCOUNT_COLUMNS`] starting at column `at`.
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:   row.get(at)?,
      username:     row.get(at + 1)?,
      role:         row.get(at + 2)?,
      status:       row.get(at + 3)?,
      level:        row.get(at + 4)?,
      display_name: row.get(at + 5)?,
      country:      row.get(at + 6)?,
      last_active:  row.get(at + 7)?,
      created_at:   row.get(at + 8)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:   decode_uuid(&self.account_id)?,
      username:     self.username,
      role:         decode_enum("role", &self.role)?,
      status:       decode_enum("account status", &self.status)?,
      level:        decode_level(self.level)?,
      display_name: self.display_name,
      country:      self.country,
      last_active:  decode_opt_dt(self.last_active)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

// ─── Opportunities ───────────────────────────────────────────────────────────

const OPPORTUNITY_FIELDS: [&str; 14] = [
  "opportunity_id",
  "poster_id",
  "poster_role",
  "status",
  "pm_required",
  "draft",
  "application_count",
  "new_application_count",
  "trending",
  "close_reason",
  "closed_at",
  "is_opportunity_close",
  "created_at",
  "updated_at",
];

/// The opportunity column list, qualified with `alias` when non-empty.
pub fn opportunity_columns(alias: &str) -> String {
  OPPORTUNITY_FIELDS
    .iter()
    .map(|f| if alias.is_empty() { (*f).to_owned() } else { format!("{alias}.{f}") })
    .collect::<Vec<_>>()
    .join(", ")
}

pub struct RawOpportunity {
  pub opportunity_id:        String,
  pub poster_id:             String,
  pub poster_role:           String,
  pub status:                String,
  pub pm_required:           bool,
  pub draft:                 String,
  pub application_count:     i64,
  pub new_application_count: i64,
  pub trending:              bool,
  pub close_reason:          Option<String>,
  pub closed_at:             Option<String>,
  pub is_opportunity_close:  bool,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawOpportunity {
  /// Read the [`opportunity_columns`] starting at column 0.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      opportunity_id:        row.get(0)?,
      poster_id:             row.get(1)?,
      poster_role:           row.get(2)?,
      status:                row.get(3)?,
      pm_required:           row.get(4)?,
      draft:                 row.get(5)?,
      application_count:     row.get(6)?,
      new_application_count: row.get(7)?,
      trending:              row.get(8)?,
      close_reason:          row.get(9)?,
      closed_at:             row.get(10)?,
      is_opportunity_close:  row.get(11)?,
      created_at:            row.get(12)?,
      updated_at:            row.get(13)?,
    })
  }

  pub fn into_opportunity(self) -> Result<Opportunity> {
    Ok(Opportunity {
      opportunity_id:        decode_uuid(&self.opportunity_id)?,
      poster_id:             decode_uuid(&self.poster_id)?,
      poster_role:           decode_enum("poster role", &self.poster_role)?,
      status:                decode_enum("opportunity status", &self.status)?,
      pm_required:           self.pm_required,
      draft:                 serde_json::from_str(&self.draft)?,
      application_count:     self.application_count,
      new_application_count: self.new_application_count,
      trending:              self.trending,
      close_reason:          self.close_reason,
      closed_at:             decode_opt_dt(self.closed_at)?,
      is_opportunity_close:  self.is_opportunity_close,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

/// An opportunity row followed by the listing enrichment columns.
pub struct RawListing {
  pub opportunity:        RawOpportunity,
  pub organisation_name:  Option<String>,
  pub organisation_id:    Option<String>,
  pub total_job_posts:    i64,
  pub total_hires:        i64,
  pub client_last_active: Option<String>,
  pub shortlisted:        i64,
}

impl RawListing {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let n = OPPORTUNITY_FIELDS.len();
    Ok(Self {
      opportunity:        RawOpportunity::from_row(row)?,
      organisation_name:  row.get(n)?,
      organisation_id:    row.get(n + 1)?,
      total_job_posts:    row.get(n + 2)?,
      total_hires:        row.get(n + 3)?,
      client_last_active: row.get(n + 4)?,
      shortlisted:        row.get(n + 5)?,
    })
  }

  pub fn into_listing(self) -> Result<OpportunityListing> {
    let opportunity = self.opportunity.into_opportunity()?;
    Ok(OpportunityListing {
      client_id: opportunity.poster_id,
      opportunity,
      organisation_name: self.organisation_name,
      organisation_id: self.organisation_id.as_deref().map(decode_uuid).transpose()?,
      client_stats: ClientStats {
        total_job_posts:    self.total_job_posts,
        total_hires:        self.total_hires,
        client_last_active: decode_opt_dt(self.client_last_active)?,
      },
      shortlisted: self.shortlisted,
      is_requested: false,
    })
  }
}

// ─── Applications ────────────────────────────────────────────────────────────

const APPLICATION_FIELDS: [&str; 13] = [
  "application_id",
  "opportunity_id",
  "applicant_id",
  "poster_id",
  "applicant_role",
  "status",
  "answer1",
  "answer2",
  "page_ids",
  "content_samples",
  "suggested",
  "applied_at",
  "updated_at",
];

pub fn application_columns(alias: &str) -> String {
  APPLICATION_FIELDS
    .iter()
    .map(|f| if alias.is_empty() { (*f).to_owned() } else { format!("{alias}.{f}") })
    .collect::<Vec<_>>()
    .join(", ")
}

pub struct RawApplication {
  pub application_id:  String,
  pub opportunity_id:  String,
  pub applicant_id:    String,
  pub poster_id:       String,
  pub applicant_role:  String,
  pub status:          String,
  pub answer1:         String,
  pub answer2:         String,
  pub page_ids:        String,
  pub content_samples: String,
  pub suggested:       bool,
  pub applied_at:      String,
  pub updated_at:      String,
}

impl RawApplication {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      application_id:  row.get(0)?,
      opportunity_id:  row.get(1)?,
      applicant_id:    row.get(2)?,
      poster_id:       row.get(3)?,
      applicant_role:  row.get(4)?,
      status:          row.get(5)?,
      answer1:         row.get(6)?,
      answer2:         row.get(7)?,
      page_ids:        row.get(8)?,
      content_samples: row.get(9)?,
      suggested:       row.get(10)?,
      applied_at:      row.get(11)?,
      updated_at:      row.get(12)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    Ok(Application {
      application_id:  decode_uuid(&self.application_id)?,
      opportunity_id:  decode_uuid(&self.opportunity_id)?,
      applicant_id:    decode_uuid(&self.applicant_id)?,
      poster_id:       decode_uuid(&self.poster_id)?,
      applicant_role:  decode_enum("applicant role", &self.applicant_role)?,
      status:          decode_enum("application status", &self.status)?,
      answer1:         self.answer1,
      answer2:         self.answer2,
      page_ids:        decode_uuids(&self.page_ids)?,
      content_samples: decode_uuids(&self.content_samples)?,
      suggested:       self.suggested,
      applied_at:      decode_dt(&self.applied_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// An application row followed by the applicant's name and country.
pub struct RawReceived {
  pub application:  RawApplication,
  pub display_name: String,
  pub country:      String,
}

impl RawReceived {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let n = APPLICATION_FIELDS.len();
    Ok(Self {
      application:  RawApplication::from_row(row)?,
      display_name: row.get(n)?,
      country:      row.get(n + 1)?,
    })
  }

  pub fn into_received(self) -> Result<ReceivedApplication> {
    let application = self.application.into_application()?;
    Ok(ReceivedApplication {
      applicant: ApplicantSummary {
        account_id:   application.applicant_id,
        display_name: self.display_name,
        country:      self.country,
      },
      application,
    })
  }
}

pub struct RawApplicationListing {
  pub application_id:    String,
  pub applied_on:        String,
  pub status:            String,
  pub job_id:            String,
  pub title:             String,
  pub employment_type:   String,
  pub application_count: i64,
  pub company:           Option<String>,
}

impl RawApplicationListing {
  pub fn into_listing(self) -> Result<ApplicationListing> {
    Ok(ApplicationListing {
      application_id:    decode_uuid(&self.application_id)?,
      applied_on:        decode_dt(&self.applied_on)?,
      status:            decode_enum("application status", &self.status)?,
      job_id:            decode_uuid(&self.job_id)?,
      title:             self.title,
      employment_type:   decode_enum("employment type", &self.employment_type)?,
      application_count: self.application_count,
      company:           self.company,
    })
  }
}

// ─── Portfolio ───────────────────────────────────────────────────────────────

pub struct RawPage {
  pub page_id:  String,
  pub owner_id: String,
  pub name:     String,
  pub slug:     String,
}

impl RawPage {
  pub fn into_page(self) -> Result<Page> {
    Ok(Page {
      page_id:  decode_uuid(&self.page_id)?,
      owner_id: decode_uuid(&self.owner_id)?,
      name:     self.name,
      slug:     self.slug,
    })
  }
}

pub struct RawProject {
  pub project_id:      String,
  pub owner_id:        String,
  pub title:           String,
  pub kind:            String,
  pub long_form_state: Option<String>,
  pub public:          bool,
  pub cover_image:     Option<String>,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      project_id:      decode_uuid(&self.project_id)?,
      owner_id:        decode_uuid(&self.owner_id)?,
      title:           self.title,
      kind:            decode_enum("project kind", &self.kind)?,
      long_form_state: self
        .long_form_state
        .as_deref()
        .map(|s| decode_enum("long form state", s))
        .transpose()?,
      public:          self.public,
      cover_image:     self.cover_image,
    })
  }
}

// ─── Reports ─────────────────────────────────────────────────────────────────

pub struct RawReport {
  pub report_id:   String,
  pub reporter_id: String,
  pub against_id:  Option<String>,
  pub post_id:     Option<String>,
  pub report_type: String,
  pub reason:      String,
  pub created_at:  String,
}

impl RawReport {
  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      report_id:   decode_uuid(&self.report_id)?,
      reporter_id: decode_uuid(&self.reporter_id)?,
      against_id:  self.against_id.as_deref().map(decode_uuid).transpose()?,
      post_id:     self.post_id.as_deref().map(decode_uuid).transpose()?,
      report_type: decode_enum("report type", &self.report_type)?,
      reason:      self.reason,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
