//! Applicant-side handlers, mounted under `/job-board`.
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | POST   | `/job-board` | Browse the board |
//! | GET    | `/job-board/suggested` | Jobs with many applications |
//! | GET    | `/job-board/trending` | Trending jobs |
//! | GET    | `/job-board/{jobId}` | Opportunity detail |
//! | POST   | `/job-board/{jobId}/applications` | Apply |
//! | POST   | `/job-board/{jobId}/report` | Report a job |
//! | POST   | `/job-board/applications` | Own applications |
//! | GET    | `/job-board/applications/{applId}` | One own application |
//! | PUT    | `/job-board/studio-requests/{studioId}` | Connect with a studio |
//! | GET    | `/job-board/saved/all` | Saved jobs |
//! | PUT    | `/job-board/saved/save/{jobId}` | Save a job |
//! | DELETE | `/job-board/saved/delete/{jobId}` | Unsave a job |

use axum::{Extension, extract::State};
use jobboard_core::{
  account::Applicant,
  application::{ApplicationStatus, Submission},
  detail,
  eligibility::{self, ListingParams, SpecialListing},
  gate,
  notify::Notifier,
  opportunity::EmploymentType,
  saved,
  store::{JobBoardStore, SortField, SortOrder},
  studio, workflow,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use super::{PageQuery, not_blank, optional_status};
use crate::{
  AppState,
  envelope::Reply,
  error::ApiError,
  extract::{Json, Path, Query, Valid},
};

type Handled = Result<Reply<Value>, ApiError>;

// ─── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum SortBy {
  #[serde(rename = "ac")]
  ApplicationCount,
  #[serde(rename = "createdAt")]
  CreatedAt,
}

impl From<SortBy> for SortField {
  fn from(s: SortBy) -> Self {
    match s {
      SortBy::ApplicationCount => Self::ApplicationCount,
      SortBy::CreatedAt => Self::CreatedAt,
    }
  }
}

/// `1` ascending, `-1` descending.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "i8")]
pub struct Direction(SortOrder);

impl TryFrom<i8> for Direction {
  type Error = String;

  fn try_from(v: i8) -> Result<Self, Self::Error> {
    match v {
      1 => Ok(Self(SortOrder::Ascending)),
      -1 => Ok(Self(SortOrder::Descending)),
      other => Err(format!("sortOrder must be 1 or -1, got {other}")),
    }
  }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListBody {
  pub employment_type: Option<Vec<EmploymentType>>,
  pub remote_friendly: Option<bool>,
  pub sort_by:         Option<SortBy>,
  pub sort_order:      Option<Direction>,
  #[validate(length(max = 100))]
  pub location:        Option<String>,
  pub page:            Option<i64>,
  #[validate(length(max = 100))]
  pub search_query:    Option<String>,
  #[serde(default)]
  pub studio_jobs:     bool,
}

impl From<ListBody> for ListingParams {
  fn from(b: ListBody) -> Self {
    Self {
      employment_types: b.employment_type.filter(|t| !t.is_empty()),
      remote_friendly:  b.remote_friendly,
      location:         b.location.filter(|l| !l.trim().is_empty()),
      sort_by:          b.sort_by.map(SortField::from),
      sort_order:       b.sort_order.map(|d| d.0),
      page:             b.page,
      search_query:     b.search_query,
      studio_jobs:      b.studio_jobs,
    }
  }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyBody {
  #[validate(length(max = 300), custom(function = "not_blank"))]
  pub answer1:         String,
  #[serde(default)]
  #[validate(length(max = 300))]
  pub answer2:         String,
  pub page_ids:        Option<Vec<Uuid>>,
  pub content_samples: Option<Vec<Uuid>>,
}

impl From<ApplyBody> for Submission {
  fn from(b: ApplyBody) -> Self {
    Self {
      answer1:         b.answer1.trim().to_owned(),
      answer2:         b.answer2.trim().to_owned(),
      page_ids:        b.page_ids,
      content_samples: b.content_samples,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsBody {
  pub status:  Option<String>,
  /// `"last_applied"` sorts newest first.
  pub sort_by: Option<String>,
  pub page:    Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReportBody {
  #[validate(length(max = 600), custom(function = "not_blank"))]
  pub reason: String,
}

// ─── Browsing ────────────────────────────────────────────────────────────────

pub async fn list<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Valid(body): Valid<ListBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let params = ListingParams::from(body);
  let page = eligibility::browse(&*state.store, &applicant, &params).await?;
  Ok(Reply::ok(json!({
    "jobs":        page.items,
    "pageDetails": page.page_details,
  })))
}

pub async fn suggested<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Query(q): Query<PageQuery>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let page =
    eligibility::browse_special(&*state.store, &applicant, SpecialListing::Suggested, q.page)
      .await?;
  Ok(Reply::ok(json!({
    "suggested":   page.items,
    "pageDetails": page.page_details,
  })))
}

pub async fn trending<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Query(q): Query<PageQuery>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let page =
    eligibility::browse_special(&*state.store, &applicant, SpecialListing::Trending, q.page)
      .await?;
  Ok(Reply::ok(json!({
    "trendingJobs": page.items,
    "pageDetails":  page.page_details,
  })))
}

pub async fn opportunity<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Path(job_id): Path<Uuid>,
) -> Result<Reply<detail::DetailView>, ApiError>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let view = detail::opportunity_detail(&*state.store, &applicant, job_id).await?;
  Ok(Reply::ok(view))
}

// ─── Applying ────────────────────────────────────────────────────────────────

pub async fn apply<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Path(job_id): Path<Uuid>,
  Valid(body): Valid<ApplyBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let submitted = workflow::apply(
    &*state.store,
    &*state.notifier,
    &applicant,
    job_id,
    Submission::from(body),
  )
  .await?;
  Ok(Reply::with_message(
    "Applied successfully",
    json!({ "application": submitted.application }),
  ))
}

pub async fn report<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Path(job_id): Path<Uuid>,
  Valid(body): Valid<ReportBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let report =
    gate::report_opportunity(&*state.store, applicant.id(), job_id, body.reason).await?;
  Ok(Reply::with_message("Reported", json!({ "report": report })))
}

pub async fn applications<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Json(body): Json<ApplicationsBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let status = optional_status::<ApplicationStatus>("status", body.status)?;
  let newest_first = body.sort_by.as_deref() == Some("last_applied");
  let page =
    detail::own_applications(&*state.store, applicant.id(), status, newest_first, body.page)
      .await?;
  Ok(Reply::ok(json!({
    "applications": page.items,
    "pageDetails":  page.page_details,
  })))
}

pub async fn application<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Path(appl_id): Path<Uuid>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let details = detail::application_detail(&*state.store, applicant.id(), appl_id).await?;
  Ok(Reply::ok(json!({ "details": details })))
}

pub async fn request_studio<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Path(studio_id): Path<Uuid>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  studio::request_studio(&*state.store, applicant.id(), studio_id).await?;
  Ok(Reply::with_message("success", json!({})))
}

// ─── Saved jobs ──────────────────────────────────────────────────────────────

pub async fn saved_list<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let jobs = saved::saved_jobs(&*state.store, applicant.id()).await?;
  Ok(Reply::ok(json!({ "sj": jobs })))
}

pub async fn save<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Path(job_id): Path<Uuid>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let ids = saved::save_job(&*state.store, applicant.id(), job_id).await?;
  Ok(Reply::with_message("saved", json!({ "jobs": ids })))
}

pub async fn unsave<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(applicant): Extension<Applicant>,
  Path(job_id): Path<Uuid>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  saved::unsave_job(&*state.store, applicant.id(), job_id).await?;
  Ok(Reply::with_message("success", json!({})))
}
