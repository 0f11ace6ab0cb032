//! [`SqliteStore`], the SQLite implementation of [`JobBoardStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use jobboard_core::{
  account::{
    Account, Applicant, Credentials, NewAccount, Organisation, Poster, Profile,
  },
  application::{
    Application, ApplicationDraft, ApplicationListing, ApplicationQuery, ApplicationStatus,
    ReceivedApplication, Submitted,
  },
  opportunity::{
    NewOpportunity, Opportunity, OpportunityDraft, OpportunityListing, OpportunityStatus,
  },
  paging::{PageDetails, PageRequest, Paged},
  portfolio::{NewPage, NewProject, Page, Project},
  report::{NewReport, Report},
  store::{JobBoardStore, OpportunityFilter, SortField, SortOrder, Transition},
};

use crate::{
  Error, Result,
  encode::{
    ACCOUNT_COLUMNS, RawAccount, RawApplication, RawApplicationListing, RawListing,
    RawOpportunity, RawPage, RawProject, RawReceived, RawReport, application_columns,
    decode_uuid, encode_dt, encode_list, encode_uuid, opportunity_columns,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A job-board store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Run `sql` with a single text parameter and collect the first column.
fn select_strings(
  conn: &rusqlite::Connection,
  sql: &str,
  key: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(rusqlite::params![key], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(rows)
}

fn decode_ids(raw: Vec<String>) -> Result<Vec<Uuid>> {
  raw.iter().map(|s| decode_uuid(s)).collect()
}

/// Match `text` literally inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// `LIMIT` and `OFFSET` bind values; SQLite reads a negative offset as zero.
fn sql_window(page: PageRequest) -> (i64, i64) {
  let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
  let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
  (limit, offset)
}

fn sort_clause(field: SortField, order: SortOrder) -> String {
  let column = match field {
    SortField::UpdatedAt => "o.updated_at",
    SortField::ApplicationCount => "o.application_count",
    SortField::CreatedAt => "o.created_at",
  };
  let dir = match order {
    SortOrder::Ascending => "ASC",
    SortOrder::Descending => "DESC",
  };
  format!("ORDER BY {column} {dir}, o.rowid {dir}")
}

/// Translate an [`OpportunityFilter`] into a WHERE clause over `o` plus its
/// positional parameters.
fn filter_clause(filter: &OpportunityFilter) -> Result<(String, Vec<Value>)> {
  let mut conds: Vec<&'static str> = vec![
    "o.status NOT IN (SELECT value FROM json_each(?))",
    "NOT EXISTS (
       SELECT 1 FROM applications x
       WHERE x.opportunity_id = o.opportunity_id
         AND x.application_id IN (SELECT value FROM json_each(?)))",
    "o.opportunity_id NOT IN (SELECT value FROM json_each(?))",
    "o.poster_role = ?",
    "json_extract(o.draft, '$.country') = ?",
  ];
  let mut params = vec![
    Value::Text(encode_list(&filter.exclude_statuses)?),
    Value::Text(encode_list(&filter.exclude_applications)?),
    Value::Text(encode_list(&filter.exclude_ids)?),
    Value::Text(filter.poster_role.as_ref().to_owned()),
    Value::Text(filter.country.clone()),
  ];

  if filter.hide_pm_required {
    conds.push("o.pm_required = 0");
  }
  if let Some(types) = &filter.employment_types {
    conds.push("json_extract(o.draft, '$.employmentType') IN (SELECT value FROM json_each(?))");
    params.push(Value::Text(encode_list(types)?));
  }
  if let Some(remote) = filter.remote_friendly {
    conds.push("json_extract(o.draft, '$.remoteFriendly') = ?");
    params.push(Value::Integer(remote as i64));
  }
  if let Some(text) = &filter.search {
    conds.push(
      "(json_extract(o.draft, '$.title') LIKE ? ESCAPE '\\'
        OR json_extract(o.draft, '$.description') LIKE ? ESCAPE '\\'
        OR json_extract(o.draft, '$.category') LIKE ? ESCAPE '\\'
        OR json_extract(o.draft, '$.tags') LIKE ? ESCAPE '\\')",
    );
    let pattern = format!("%{}%", escape_like(text));
    params.extend(std::iter::repeat(Value::Text(pattern)).take(4));
  }
  if let Some(min) = filter.min_application_count {
    conds.push("o.application_count >= ?");
    params.push(Value::Integer(min));
  }
  if filter.trending_only {
    conds.push("o.trending = 1");
  }

  Ok((conds.join(" AND "), params))
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
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
    Ok(())
  }

  /// Run an `UPDATE opportunities ... RETURNING` statement expected to touch
  /// at most one row.
  async fn update_one_opportunity(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Option<Opportunity>> {
    let raw: Option<RawOpportunity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &sql,
            rusqlite::params_from_iter(params.iter()),
            RawOpportunity::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawOpportunity::into_opportunity).transpose()
  }
}

// ─── JobBoardStore impl ──────────────────────────────────────────────────────

impl JobBoardStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let now = Utc::now();
    let account = Account {
      account_id:   Uuid::new_v4(),
      username:     input.username,
      role:         input.profile.role(),
      status:       input.status,
      level:        input.level,
      display_name: input.display_name,
      country:      input.country,
      last_active:  Some(now),
      created_at:   now,
    };

    let id_str     = encode_uuid(account.account_id);
    let username   = account.username.clone();
    let hash       = input.password_hash;
    let role_str   = account.role.as_ref().to_owned();
    let status_str = account.status.as_ref().to_owned();
    let level      = account.level.rank();
    let display    = account.display_name.clone();
    let country    = account.country.clone();
    let at_str     = encode_dt(now);

    // (organisation_id, studio_name, is_posting_first_time)
    type PosterRow = (Option<String>, Option<String>, bool);
    let (is_applicant, poster): (bool, Option<PosterRow>) = match input.profile {
      Profile::Writer => (true, None),
      Profile::Pm { studio_name } => (true, Some((None, Some(studio_name), false))),
      Profile::Client { organisation_id, is_posting_first_time } => {
        (false, Some((organisation_id.map(encode_uuid), None, is_posting_first_time)))
      }
    };

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO accounts (
             account_id, username, password_hash, role, status, level,
             display_name, country, last_active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str, username, hash, role_str, status_str, level, display, country, at_str,
          ],
        )?;
        if is_applicant {
          tx.execute(
            "INSERT INTO applicants (account_id) VALUES (?1)",
            rusqlite::params![id_str],
          )?;
        }
        if let Some((org, studio, first)) = poster {
          tx.execute(
            "INSERT INTO posters (account_id, organisation_id, studio_name, is_posting_first_time)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id_str, org, studio, first],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(account)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.account_id = ?1"),
            rusqlite::params![id_str],
            |row| RawAccount::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
    let username = username.to_owned();
    let raw: Option<(RawAccount, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {ACCOUNT_COLUMNS}, a.password_hash FROM accounts a WHERE a.username = ?1"
            ),
            rusqlite::params![username],
            |row| Ok((RawAccount::from_row(row, 0)?, row.get(9)?)),
          )
          .optional()?)
      })
      .await?;

    match raw {
      Some((account, password_hash)) => Ok(Some(Credentials {
        account: account.into_account()?,
        password_hash,
      })),
      None => Ok(None),
    }
  }

  async fn create_organisation(&self, name: String) -> Result<Organisation> {
    let organisation = Organisation { organisation_id: Uuid::new_v4(), name };
    let id_str = encode_uuid(organisation.organisation_id);
    let name = organisation.name.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO organisations (organisation_id, name) VALUES (?1, ?2)",
          rusqlite::params![id_str, name],
        )?;
        Ok(())
      })
      .await?;
    Ok(organisation)
  }

  async fn complete_client_profile(&self, client_id: Uuid, organisation_id: Uuid) -> Result<bool> {
    let client_str = encode_uuid(client_id);
    let org_str = encode_uuid(organisation_id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE posters SET organisation_id = ?2, is_posting_first_time = 0
           WHERE account_id = ?1
             AND EXISTS (SELECT 1 FROM accounts WHERE account_id = ?1 AND role = 'Client')",
          rusqlite::params![client_str, org_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn get_applicant(&self, id: Uuid) -> Result<Option<Applicant>> {
    let id_str = encode_uuid(id);
    type Row = (RawAccount, Vec<String>, Vec<String>, Vec<String>);
    let raw: Option<Row> = self
      .conn
      .call(move |conn| {
        let account = conn
          .query_row(
            &format!(
              "SELECT {ACCOUNT_COLUMNS} FROM accounts a
               JOIN applicants x ON x.account_id = a.account_id
               WHERE a.account_id = ?1"
            ),
            rusqlite::params![id_str],
            |row| RawAccount::from_row(row, 0),
          )
          .optional()?;
        let Some(account) = account else {
          return Ok(None);
        };
        let applications = select_strings(
          conn,
          "SELECT application_id FROM applications WHERE applicant_id = ?1 ORDER BY rowid",
          &id_str,
        )?;
        let saved = select_strings(
          conn,
          "SELECT opportunity_id FROM saved_jobs WHERE applicant_id = ?1 ORDER BY rowid",
          &id_str,
        )?;
        let imported = select_strings(
          conn,
          "SELECT project_id FROM imported_projects WHERE pm_id = ?1 ORDER BY rowid",
          &id_str,
        )?;
        Ok(Some((account, applications, saved, imported)))
      })
      .await?;

    let Some((account, applications, saved, imported)) = raw else {
      return Ok(None);
    };
    let account = account.into_account()?;
    let role = account.role.applicant_role().ok_or_else(|| Error::UnknownValue {
      kind:  "applicant role",
      value: account.role.to_string(),
    })?;
    Ok(Some(Applicant {
      account,
      role,
      applications: decode_ids(applications)?,
      saved_jobs: decode_ids(saved)?,
      imported_projects: decode_ids(imported)?,
    }))
  }

  async fn get_poster(&self, id: Uuid) -> Result<Option<Poster>> {
    let id_str = encode_uuid(id);
    type Extra = (Option<String>, bool, Option<String>, Option<String>);
    let raw: Option<(RawAccount, Extra, Vec<String>)> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!(
              "SELECT {ACCOUNT_COLUMNS},
                      p.studio_name, p.is_posting_first_time,
                      org.organisation_id, org.name
               FROM accounts a
               JOIN posters p ON p.account_id = a.account_id
               LEFT JOIN organisations org ON org.organisation_id = p.organisation_id
               WHERE a.account_id = ?1"
            ),
            rusqlite::params![id_str],
            |row| {
              Ok((
                RawAccount::from_row(row, 0)?,
                (row.get(9)?, row.get(10)?, row.get(11)?, row.get(12)?),
              ))
            },
          )
          .optional()?;
        let Some((account, extra)) = row else {
          return Ok(None);
        };
        let opportunities = select_strings(
          conn,
          "SELECT opportunity_id FROM opportunities WHERE poster_id = ?1 ORDER BY rowid",
          &id_str,
        )?;
        Ok(Some((account, extra, opportunities)))
      })
      .await?;

    let Some((account, (studio_name, first_time, org_id, org_name), opportunities)) = raw else {
      return Ok(None);
    };
    let account = account.into_account()?;
    let role = account.role.poster_role().ok_or_else(|| Error::UnknownValue {
      kind:  "poster role",
      value: account.role.to_string(),
    })?;
    let organisation = match (org_id, org_name) {
      (Some(id), Some(name)) => Some(Organisation { organisation_id: decode_uuid(&id)?, name }),
      _ => None,
    };
    Ok(Some(Poster {
      account,
      role,
      organisation,
      studio_name,
      is_posting_first_time: first_time,
      opportunities: decode_ids(opportunities)?,
    }))
  }

  // ── Saved jobs ────────────────────────────────────────────────────────────

  async fn add_saved_job(&self, applicant_id: Uuid, opportunity_id: Uuid) -> Result<bool> {
    let applicant = encode_uuid(applicant_id);
    let opportunity = encode_uuid(opportunity_id);
    let at_str = encode_dt(Utc::now());
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO saved_jobs (applicant_id, opportunity_id, saved_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![applicant, opportunity, at_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn remove_saved_job(&self, applicant_id: Uuid, opportunity_id: Uuid) -> Result<bool> {
    let applicant = encode_uuid(applicant_id);
    let opportunity = encode_uuid(opportunity_id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM saved_jobs WHERE applicant_id = ?1 AND opportunity_id = ?2",
          rusqlite::params![applicant, opportunity],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list_saved_jobs(&self, applicant_id: Uuid) -> Result<Vec<Opportunity>> {
    let applicant = encode_uuid(applicant_id);
    let sql = format!(
      "SELECT {} FROM saved_jobs s
       JOIN opportunities o ON o.opportunity_id = s.opportunity_id
       WHERE s.applicant_id = ?1
       ORDER BY s.rowid",
      opportunity_columns("o")
    );
    let raws: Vec<RawOpportunity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![applicant], RawOpportunity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawOpportunity::into_opportunity).collect()
  }

  // ── Portfolio ─────────────────────────────────────────────────────────────

  async fn create_page(&self, input: NewPage) -> Result<Page> {
    let page = Page {
      page_id:  Uuid::new_v4(),
      owner_id: input.owner_id,
      name:     input.name,
      slug:     input.slug,
    };
    let id_str = encode_uuid(page.page_id);
    let owner_str = encode_uuid(page.owner_id);
    let name = page.name.clone();
    let slug = page.slug.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pages (page_id, owner_id, name, slug) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, owner_str, name, slug],
        )?;
        Ok(())
      })
      .await?;
    Ok(page)
  }

  async fn get_pages(&self, ids: &[Uuid]) -> Result<Vec<Page>> {
    if ids.is_empty() {
      return Ok(vec![]);
    }
    let ids_json = encode_list(ids)?;
    let raws: Vec<RawPage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT page_id, owner_id, name, slug FROM pages
           WHERE page_id IN (SELECT value FROM json_each(?1))
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![ids_json], |row| {
            Ok(RawPage {
              page_id:  row.get(0)?,
              owner_id: row.get(1)?,
              name:     row.get(2)?,
              slug:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawPage::into_page).collect()
  }

  async fn count_owned_pages(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<usize> {
    let owner = encode_uuid(owner_id);
    let ids_json = encode_list(ids)?;
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM pages
           WHERE owner_id = ?1 AND page_id IN (SELECT value FROM json_each(?2))",
          rusqlite::params![owner, ids_json],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as usize)
  }

  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let project = Project {
      project_id:      Uuid::new_v4(),
      owner_id:        input.owner_id,
      title:           input.title,
      kind:            input.kind,
      long_form_state: input.long_form_state,
      public:          input.public,
      cover_image:     input.cover_image,
    };
    let id_str = encode_uuid(project.project_id);
    let owner_str = encode_uuid(project.owner_id);
    let title = project.title.clone();
    let kind = project.kind.as_ref().to_owned();
    let state = project.long_form_state.map(|s| s.as_ref().to_owned());
    let public = project.public;
    let cover = project.cover_image.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO projects (
             project_id, owner_id, title, kind, long_form_state, public, cover_image
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, owner_str, title, kind, state, public, cover],
        )?;
        Ok(())
      })
      .await?;
    Ok(project)
  }

  async fn get_projects(&self, ids: &[Uuid]) -> Result<Vec<Project>> {
    if ids.is_empty() {
      return Ok(vec![]);
    }
    let ids_json = encode_list(ids)?;
    let raws: Vec<RawProject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT project_id, owner_id, title, kind, long_form_state, public, cover_image
           FROM projects
           WHERE project_id IN (SELECT value FROM json_each(?1))
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![ids_json], |row| {
            Ok(RawProject {
              project_id:      row.get(0)?,
              owner_id:        row.get(1)?,
              title:           row.get(2)?,
              kind:            row.get(3)?,
              long_form_state: row.get(4)?,
              public:          row.get(5)?,
              cover_image:     row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn import_project(&self, pm_id: Uuid, project_id: Uuid) -> Result<()> {
    let pm = encode_uuid(pm_id);
    let project = encode_uuid(project_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO imported_projects (pm_id, project_id) VALUES (?1, ?2)",
          rusqlite::params![pm, project],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Opportunities ─────────────────────────────────────────────────────────

  async fn insert_opportunity(&self, input: NewOpportunity) -> Result<Opportunity> {
    let now = Utc::now();
    let opportunity = Opportunity {
      opportunity_id:        Uuid::new_v4(),
      poster_id:             input.poster_id,
      poster_role:           input.poster_role,
      status:                OpportunityStatus::UnderReview,
      pm_required:           input.pm_required,
      draft:                 input.draft,
      application_count:     0,
      new_application_count: 0,
      trending:              false,
      close_reason:          None,
      closed_at:             None,
      is_opportunity_close:  false,
      created_at:            now,
      updated_at:            now,
    };

    let id_str       = encode_uuid(opportunity.opportunity_id);
    let poster_str   = encode_uuid(opportunity.poster_id);
    let role_str     = opportunity.poster_role.as_ref().to_owned();
    let status_str   = opportunity.status.as_ref().to_owned();
    let pm_required  = opportunity.pm_required;
    let draft_json   = serde_json::to_string(&opportunity.draft)?;
    let deadline_str = opportunity.draft.deadline.map(encode_dt);
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO opportunities (
             opportunity_id, poster_id, poster_role, status, pm_required,
             draft, deadline, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            id_str, poster_str, role_str, status_str, pm_required, draft_json, deadline_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(opportunity)
  }

  async fn update_opportunity(
    &self,
    id: Uuid,
    draft: OpportunityDraft,
  ) -> Result<Option<Opportunity>> {
    let sql = format!(
      "UPDATE opportunities SET draft = ?2, deadline = ?3, updated_at = ?4
       WHERE opportunity_id = ?1
       RETURNING {}",
      opportunity_columns("")
    );
    let params = vec![
      Value::Text(encode_uuid(id)),
      Value::Text(serde_json::to_string(&draft)?),
      draft.deadline.map(encode_dt).map_or(Value::Null, Value::Text),
      Value::Text(encode_dt(Utc::now())),
    ];
    self.update_one_opportunity(sql, params).await
  }

  async fn get_opportunity(&self, id: Uuid) -> Result<Option<Opportunity>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM opportunities WHERE opportunity_id = ?1",
      opportunity_columns("")
    );
    let raw: Option<RawOpportunity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str], RawOpportunity::from_row)
          .optional()?)
      })
      .await?;
    raw.map(RawOpportunity::into_opportunity).transpose()
  }

  async fn list_opportunities(
    &self,
    filter: &OpportunityFilter,
    page: PageRequest,
  ) -> Result<Paged<OpportunityListing>> {
    let (where_clause, params) = filter_clause(filter)?;
    let order = sort_clause(filter.sort_field, filter.sort_order);
    let count_sql = format!("SELECT COUNT(*) FROM opportunities o WHERE {where_clause}");
    let page_sql = format!(
      "SELECT {},
              CASE WHEN o.poster_role = 'PM' THEN p.studio_name ELSE org.name END,
              CASE WHEN o.poster_role = 'Client' THEN org.organisation_id END,
              (SELECT COUNT(*) FROM opportunities y WHERE y.poster_id = o.poster_id),
              (SELECT COUNT(*) FROM applications h
                 WHERE h.poster_id = o.poster_id AND h.status = 'hired'),
              acc.last_active,
              (SELECT COUNT(*) FROM applications s
                 WHERE s.opportunity_id = o.opportunity_id AND s.status = 'shortlisted')
       FROM opportunities o
       JOIN accounts acc ON acc.account_id = o.poster_id
       LEFT JOIN posters p ON p.account_id = o.poster_id
       LEFT JOIN organisations org ON org.organisation_id = p.organisation_id
       WHERE {where_clause}
       {order}
       LIMIT ? OFFSET ?",
      opportunity_columns("o")
    );
    let (limit, offset) = sql_window(page);

    let (total, raws): (i64, Vec<RawListing>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &count_sql,
          rusqlite::params_from_iter(params.iter()),
          |row| row.get(0),
        )?;
        let mut paged = params;
        paged.push(Value::Integer(limit));
        paged.push(Value::Integer(offset));
        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(paged.iter()), RawListing::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawListing::into_listing)
      .collect::<Result<Vec<_>>>()?;
    Ok(Paged { items, page_details: PageDetails::new(total as u64, page) })
  }

  async fn list_poster_opportunities(
    &self,
    poster_id: Uuid,
    status: Option<OpportunityStatus>,
  ) -> Result<Vec<Opportunity>> {
    let poster = encode_uuid(poster_id);
    let status_str = status.map(|s| s.as_ref().to_owned());
    let sql = format!(
      "SELECT {} FROM opportunities
       WHERE poster_id = ?1 AND (?2 IS NULL OR status = ?2)
       ORDER BY created_at DESC, rowid DESC",
      opportunity_columns("")
    );
    let raws: Vec<RawOpportunity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![poster, status_str], RawOpportunity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawOpportunity::into_opportunity).collect()
  }

  async fn transition_opportunity(&self, transition: &Transition) -> Result<Option<Opportunity>> {
    let closing = transition.to == OpportunityStatus::Closed;
    let sql = format!(
      "UPDATE opportunities
       SET status       = ?1,
           updated_at   = ?2,
           close_reason = CASE WHEN ?3 THEN COALESCE(?4, close_reason) ELSE close_reason END,
           closed_at    = CASE WHEN ?3 THEN ?2 ELSE closed_at END
       WHERE opportunity_id = ?5
         AND status IN (SELECT value FROM json_each(?6))
         AND (?7 IS NULL OR poster_id = ?7)
       RETURNING {}",
      opportunity_columns("")
    );
    let params = vec![
      Value::Text(transition.to.as_ref().to_owned()),
      Value::Text(encode_dt(Utc::now())),
      Value::Integer(closing as i64),
      transition.reason.clone().map_or(Value::Null, Value::Text),
      Value::Text(encode_uuid(transition.opportunity_id)),
      Value::Text(encode_list(&transition.from)?),
      transition.poster_id.map(encode_uuid).map_or(Value::Null, Value::Text),
    ];
    self.update_one_opportunity(sql, params).await
  }

  async fn reset_unseen(&self, id: Uuid, poster_id: Uuid) -> Result<Option<Opportunity>> {
    let sql = format!(
      "UPDATE opportunities SET new_application_count = 0
       WHERE opportunity_id = ?1 AND poster_id = ?2
       RETURNING {}",
      opportunity_columns("")
    );
    let params = vec![Value::Text(encode_uuid(id)), Value::Text(encode_uuid(poster_id))];
    self.update_one_opportunity(sql, params).await
  }

  async fn set_trending(&self, id: Uuid, trending: bool) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE opportunities SET trending = ?2 WHERE opportunity_id = ?1",
          rusqlite::params![id_str, trending],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn close_expired(&self, now: DateTime<Utc>) -> Result<Vec<Opportunity>> {
    let now_str = encode_dt(now);
    let from = encode_list(&OpportunityStatus::EXPIRABLE)?;
    let sql = format!(
      "UPDATE opportunities
       SET status = 'closed', closed_at = ?1, updated_at = ?1
       WHERE deadline IS NOT NULL
         AND deadline < ?1
         AND status IN (SELECT value FROM json_each(?2))
       RETURNING {}",
      opportunity_columns("")
    );
    let raws: Vec<RawOpportunity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![now_str, from], RawOpportunity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawOpportunity::into_opportunity).collect()
  }

  async fn end_review_windows(&self, closed_before: DateTime<Utc>) -> Result<Vec<Opportunity>> {
    let cutoff = encode_dt(closed_before);
    let now_str = encode_dt(Utc::now());
    let sql = format!(
      "UPDATE opportunities
       SET is_opportunity_close = 1, updated_at = ?2
       WHERE status = 'closed'
         AND is_opportunity_close = 0
         AND closed_at IS NOT NULL
         AND closed_at < ?1
       RETURNING {}",
      opportunity_columns("")
    );
    let raws: Vec<RawOpportunity> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let rows = {
          let mut stmt = tx.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![cutoff, now_str], RawOpportunity::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        for row in &rows {
          tx.execute(
            "UPDATE applications SET status = 'rejected', updated_at = ?2
             WHERE opportunity_id = ?1 AND status = 'pending'",
            rusqlite::params![row.opportunity_id, now_str],
          )?;
        }
        tx.commit()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawOpportunity::into_opportunity).collect()
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn submit_application(&self, draft: ApplicationDraft) -> Result<Submitted> {
    let now = Utc::now();
    let application = Application {
      application_id:  Uuid::new_v4(),
      opportunity_id:  draft.opportunity_id,
      applicant_id:    draft.applicant_id,
      poster_id:       draft.poster_id,
      applicant_role:  draft.applicant_role,
      status:          if draft.suggested {
        ApplicationStatus::Suggested
      } else {
        ApplicationStatus::Pending
      },
      answer1:         draft.answer1,
      answer2:         draft.answer2,
      page_ids:        draft.page_ids,
      content_samples: draft.content_samples,
      suggested:       draft.suggested,
      applied_at:      now,
      updated_at:      now,
    };

    let id_str      = encode_uuid(application.application_id);
    let opp_str     = encode_uuid(application.opportunity_id);
    let applicant   = encode_uuid(application.applicant_id);
    let poster      = encode_uuid(application.poster_id);
    let role_str    = application.applicant_role.as_ref().to_owned();
    let status_str  = application.status.as_ref().to_owned();
    let answer1     = application.answer1.clone();
    let answer2     = application.answer2.clone();
    let pages_json  = encode_list(&application.page_ids)?;
    let samples     = encode_list(&application.content_samples)?;
    let suggested   = application.suggested;
    let at_str      = encode_dt(now);
    let bump_sql = format!(
      "UPDATE opportunities
       SET application_count     = application_count + 1,
           new_application_count = new_application_count + 1,
           updated_at            = ?2
       WHERE opportunity_id = ?1
       RETURNING {}",
      opportunity_columns("")
    );

    // Insert and counter bump commit together or not at all.
    let raw: RawOpportunity = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO applications (
             application_id, opportunity_id, applicant_id, poster_id, applicant_role,
             status, answer1, answer2, page_ids, content_samples, suggested,
             applied_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
          rusqlite::params![
            id_str, opp_str, applicant, poster, role_str, status_str, answer1, answer2,
            pages_json, samples, suggested, at_str,
          ],
        )?;
        let raw = tx.query_row(
          &bump_sql,
          rusqlite::params![opp_str, at_str],
          RawOpportunity::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    Ok(Submitted { application, opportunity: raw.into_opportunity()? })
  }

  async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM applications WHERE application_id = ?1",
      application_columns("")
    );
    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str], RawApplication::from_row)
          .optional()?)
      })
      .await?;
    raw.map(RawApplication::into_application).transpose()
  }

  async fn find_application(
    &self,
    applicant_id: Uuid,
    opportunity_id: Uuid,
  ) -> Result<Option<Application>> {
    let applicant = encode_uuid(applicant_id);
    let opportunity = encode_uuid(opportunity_id);
    let sql = format!(
      "SELECT {} FROM applications WHERE applicant_id = ?1 AND opportunity_id = ?2",
      application_columns("")
    );
    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &sql,
            rusqlite::params![applicant, opportunity],
            RawApplication::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawApplication::into_application).transpose()
  }

  async fn list_applicant_applications(
    &self,
    query: &ApplicationQuery,
    page: PageRequest,
  ) -> Result<Paged<ApplicationListing>> {
    let applicant = encode_uuid(query.applicant_id);
    let status_str = query.status.map(|s| s.as_ref().to_owned());
    let order = if query.sort_by_last_applied {
      "ORDER BY a.applied_at DESC, a.rowid DESC"
    } else {
      "ORDER BY a.rowid"
    };
    let page_sql = format!(
      "SELECT a.application_id, a.applied_at, a.status, o.opportunity_id,
              json_extract(o.draft, '$.title'),
              json_extract(o.draft, '$.employmentType'),
              o.application_count,
              CASE WHEN o.poster_role = 'Client' THEN org.name END
       FROM applications a
       JOIN opportunities o ON o.opportunity_id = a.opportunity_id
       LEFT JOIN posters p ON p.account_id = o.poster_id
       LEFT JOIN organisations org ON org.organisation_id = p.organisation_id
       WHERE a.applicant_id = ?1 AND (?2 IS NULL OR a.status = ?2)
       {order}
       LIMIT ?3 OFFSET ?4"
    );
    let (limit, offset) = sql_window(page);

    let (total, raws): (i64, Vec<RawApplicationListing>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM applications a
           WHERE a.applicant_id = ?1 AND (?2 IS NULL OR a.status = ?2)",
          rusqlite::params![applicant, status_str],
          |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(rusqlite::params![applicant, status_str, limit, offset], |row| {
            Ok(RawApplicationListing {
              application_id:    row.get(0)?,
              applied_on:        row.get(1)?,
              status:            row.get(2)?,
              job_id:            row.get(3)?,
              title:             row.get(4)?,
              employment_type:   row.get(5)?,
              application_count: row.get(6)?,
              company:           row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawApplicationListing::into_listing)
      .collect::<Result<Vec<_>>>()?;
    Ok(Paged { items, page_details: PageDetails::new(total as u64, page) })
  }

  async fn list_received_applications(
    &self,
    opportunity_id: Uuid,
  ) -> Result<Vec<ReceivedApplication>> {
    let opportunity = encode_uuid(opportunity_id);
    let sql = format!(
      "SELECT {}, acc.display_name, acc.country
       FROM applications a
       JOIN accounts acc ON acc.account_id = a.applicant_id
       WHERE a.opportunity_id = ?1
       ORDER BY a.rowid",
      application_columns("a")
    );
    let raws: Vec<RawReceived> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![opportunity], RawReceived::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawReceived::into_received).collect()
  }

  async fn set_application_status(
    &self,
    id: Uuid,
    status: ApplicationStatus,
  ) -> Result<Option<Application>> {
    let id_str = encode_uuid(id);
    let status_str = status.as_ref().to_owned();
    let at_str = encode_dt(Utc::now());
    let sql = format!(
      "UPDATE applications SET status = ?2, updated_at = ?3
       WHERE application_id = ?1
       RETURNING {}",
      application_columns("")
    );
    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &sql,
            rusqlite::params![id_str, status_str, at_str],
            RawApplication::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawApplication::into_application).transpose()
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn insert_report(&self, input: NewReport) -> Result<Report> {
    let report = Report {
      report_id:   Uuid::new_v4(),
      reporter_id: input.reporter_id,
      against_id:  input.against_id,
      post_id:     input.post_id,
      report_type: input.report_type,
      reason:      input.reason,
      created_at:  Utc::now(),
    };
    let id_str = encode_uuid(report.report_id);
    let reporter = encode_uuid(report.reporter_id);
    let against = report.against_id.map(encode_uuid);
    let post = report.post_id.map(encode_uuid);
    let kind = report.report_type.as_ref().to_owned();
    let reason = report.reason.clone();
    let at_str = encode_dt(report.created_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports (
             report_id, reporter_id, against_id, post_id, report_type, reason, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, reporter, against, post, kind, reason, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(report)
  }

  async fn find_post_report(&self, reporter_id: Uuid, post_id: Uuid) -> Result<Option<Report>> {
    let reporter = encode_uuid(reporter_id);
    let post = encode_uuid(post_id);
    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT report_id, reporter_id, against_id, post_id, report_type, reason, created_at
             FROM reports
             WHERE reporter_id = ?1 AND post_id = ?2 AND report_type = 'post'
             ORDER BY rowid
             LIMIT 1",
            rusqlite::params![reporter, post],
            |row| {
              Ok(RawReport {
                report_id:   row.get(0)?,
                reporter_id: row.get(1)?,
                against_id:  row.get(2)?,
                post_id:     row.get(3)?,
                report_type: row.get(4)?,
                reason:      row.get(5)?,
                created_at:  row.get(6)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    raw.map(RawReport::into_report).transpose()
  }

  async fn profile_report_exists(&self, reporter_id: Uuid, against_id: Uuid) -> Result<bool> {
    let reporter = encode_uuid(reporter_id);
    let against = encode_uuid(against_id);
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM reports
             WHERE reporter_id = ?1 AND against_id = ?2 AND report_type = 'profile')",
          rusqlite::params![reporter, against],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(exists)
  }

  async fn reported_post_ids(&self, reporter_id: Uuid) -> Result<Vec<Uuid>> {
    let reporter = encode_uuid(reporter_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(select_strings(
          conn,
          "SELECT DISTINCT post_id FROM reports
           WHERE reporter_id = ?1 AND report_type = 'post' AND post_id IS NOT NULL",
          &reporter,
        )?)
      })
      .await?;
    decode_ids(raw)
  }

  async fn reported_among(&self, reporter_id: Uuid, candidates: &[Uuid]) -> Result<Vec<Uuid>> {
    if candidates.is_empty() {
      return Ok(vec![]);
    }
    let reporter = encode_uuid(reporter_id);
    let candidates_json = encode_list(candidates)?;
    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT against_id FROM reports
           WHERE reporter_id = ?1
             AND against_id IN (SELECT value FROM json_each(?2))",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![reporter, candidates_json], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    decode_ids(raw)
  }

  // ── Studio requests ───────────────────────────────────────────────────────

  async fn add_studio_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool> {
    let sender = encode_uuid(sender_id);
    let receiver = encode_uuid(receiver_id);
    let at_str = encode_dt(Utc::now());
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO studio_requests (sender_id, receiver_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![sender, receiver, at_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn studio_request_peers(&self, account_id: Uuid) -> Result<Vec<Uuid>> {
    let account = encode_uuid(account_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(select_strings(
          conn,
          "SELECT receiver_id FROM studio_requests WHERE sender_id = ?1
           UNION
           SELECT sender_id FROM studio_requests WHERE receiver_id = ?1",
          &account,
        )?)
      })
      .await?;
    decode_ids(raw)
  }
}
