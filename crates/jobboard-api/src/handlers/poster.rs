//! Poster-side handlers. The same set is mounted under `/client/job-board`
//! for clients and `/pm/job-board/studio` for PM studios.
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | POST   | `/` | Post, or update `existingJobId` |
//! | POST   | `/close` | Close an opportunity |
//! | POST   | `/opportunities` | Own opportunities |
//! | GET    | `/{jobId}/applications` | Applications received |
//! | PUT    | `/application-status` | Move an application |
//! | POST   | `/application` | One application |
//! | GET    | `/application/pages/{applId}` | Pages attached to it |
//! | POST   | `/report/{applicantId}` | Report an applicant |

use axum::{Extension, extract::State};
use chrono::{DateTime, Duration, Utc};
use jobboard_core::{
  account::Poster,
  application::ApplicationStatus,
  gate,
  notify::Notifier,
  opportunity::{
    ContentType, Currency, DurationUnit, EmploymentType, OpportunityDraft, OpportunityStatus,
    RemunerationUnit, Seniority,
  },
  posting::{self, JobApplications, PostRequest, PosterApplicationDetail},
  store::JobBoardStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{not_blank, optional_status};
use crate::{
  AppState,
  envelope::Reply,
  error::ApiError,
  extract::{Json, Path, Valid},
};

type Handled = Result<Reply<Value>, ApiError>;

/// Deadlines must fall inside this window, counted in days from now.
const DEADLINE_MIN_DAYS: i64 = 1;
const DEADLINE_MAX_DAYS: i64 = 45;

// ─── Request bodies ──────────────────────────────────────────────────────────

fn default_true() -> bool { true }

fn default_openings() -> i64 { 1 }

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "check_post"))]
pub struct PostBody {
  #[serde(default = "default_employment")]
  pub employment_type:          EmploymentType,
  pub content_type:             ContentType,
  #[validate(custom(function = "not_blank"))]
  pub category:                 String,
  #[validate(custom(function = "not_blank"))]
  pub title:                    String,
  #[validate(length(max = 600), custom(function = "not_blank"))]
  pub description:              String,
  #[validate(custom(function = "not_blank"))]
  pub country:                  String,
  pub city:                     Option<String>,
  #[serde(default = "default_true")]
  pub remote_friendly:          bool,
  #[validate(range(min = 1.0))]
  pub remuneration:             f64,
  #[serde(default)]
  pub remuneration_unit:        RemunerationUnit,
  pub currency:                 Currency,
  pub duration:                 Option<i64>,
  pub duration_unit:            Option<DurationUnit>,
  #[validate(range(min = 1))]
  pub content_pieces:           Option<i64>,
  #[serde(default)]
  pub word_count:               i64,
  #[serde(default)]
  pub samples_provided:         bool,
  pub deadline:                 Option<DateTime<Utc>>,
  #[serde(default)]
  pub tags:                     Vec<String>,
  #[validate(custom(function = "not_blank"))]
  pub question1:                String,
  #[serde(default)]
  pub question2:                String,
  #[validate(range(min = 1))]
  #[serde(default = "default_openings")]
  pub openings:                 i64,
  pub seniority:                Option<Seniority>,
  #[validate(length(max = 600))]
  pub preferred_qualifications: Option<String>,
  pub existing_job_id:          Option<Uuid>,
  /// Only honoured for client posts.
  #[serde(default)]
  pub pm_required:              bool,
}

fn default_employment() -> EmploymentType { EmploymentType::Project }

/// Rules that span more than one field.
fn check_post(body: &PostBody) -> Result<(), ValidationError> {
  match body.employment_type {
    EmploymentType::Project => {
      if body.content_pieces.is_none() {
        return Err(ValidationError::new("content_pieces_required"));
      }
    }
    other => {
      if other == EmploymentType::FullTime && body.seniority.is_none() {
        return Err(ValidationError::new("seniority_required"));
      }
      let qualifications = body.preferred_qualifications.as_deref().unwrap_or_default();
      if qualifications.trim().is_empty() {
        return Err(ValidationError::new("preferred_qualifications_required"));
      }
    }
  }
  if let Some(deadline) = body.deadline {
    let now = Utc::now();
    if deadline <= now + Duration::days(DEADLINE_MIN_DAYS)
      || deadline >= now + Duration::days(DEADLINE_MAX_DAYS)
    {
      return Err(ValidationError::new("deadline_out_of_range"));
    }
  }
  Ok(())
}

impl From<PostBody> for PostRequest {
  fn from(b: PostBody) -> Self {
    let project = b.employment_type == EmploymentType::Project;
    Self {
      existing_job_id: b.existing_job_id,
      pm_required:     b.pm_required,
      draft:           OpportunityDraft {
        title:                    b.title.trim().to_owned(),
        description:              b.description.trim().to_owned(),
        employment_type:          b.employment_type,
        content_type:             b.content_type,
        category:                 b.category,
        tags:                     b.tags,
        remote_friendly:          b.remote_friendly,
        country:                  b.country,
        city:                     b.city,
        remuneration:             b.remuneration,
        remuneration_unit:        b.remuneration_unit,
        currency:                 b.currency,
        duration:                 b.duration,
        duration_unit:            b.duration_unit,
        openings:                 b.openings,
        word_count:               b.word_count,
        samples_provided:         b.samples_provided,
        content_pieces:           b.content_pieces.filter(|_| project),
        seniority:                b.seniority,
        preferred_qualifications: b
          .preferred_qualifications
          .map(|q| q.trim().to_owned())
          .unwrap_or_default(),
        question1:                b.question1,
        question2:                b.question2,
        deadline:                 b.deadline,
      },
    }
  }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CloseBody {
  pub job_id: Uuid,
  #[validate(length(min = 5))]
  pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct OpportunitiesBody {
  pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
  pub appl_id: Uuid,
  pub status:  ApplicationStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationBody {
  pub appl_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReportBody {
  #[validate(length(max = 600), custom(function = "not_blank"))]
  pub reason: String,
}

// ─── Opportunities ───────────────────────────────────────────────────────────

pub async fn post<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Valid(body): Valid<PostBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let job = posting::post_opportunity(
    &*state.store,
    &*state.notifier,
    &poster,
    PostRequest::from(body),
  )
  .await?;
  Ok(Reply::with_message("Opportunity is saved/updated.", json!({ "job": job })))
}

pub async fn close<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Valid(body): Valid<CloseBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  posting::close_opportunity(&*state.store, &*state.notifier, &poster, body.job_id, body.reason)
    .await?;
  Ok(Reply::with_message("Opportunity is closed.", json!({})))
}

pub async fn opportunities<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Json(body): Json<OpportunitiesBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let status = optional_status::<OpportunityStatus>("status", body.status)?;
  let list = posting::poster_opportunities(&*state.store, poster.id(), status).await?;
  Ok(Reply::ok(json!({ "opportunities": list })))
}

// ─── Applications ────────────────────────────────────────────────────────────

pub async fn job_applications<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Path(job_id): Path<Uuid>,
) -> Result<Reply<JobApplications>, ApiError>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let received = posting::job_applications(&*state.store, &poster, job_id).await?;
  Ok(Reply::ok(received))
}

pub async fn application_status<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Json(body): Json<StatusBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let application = posting::update_application_status(
    &*state.store,
    &*state.notifier,
    &poster,
    body.appl_id,
    body.status,
  )
  .await?;
  Ok(Reply::with_message(
    "Status updated successfully",
    json!({ "application": application }),
  ))
}

pub async fn application<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Json(body): Json<ApplicationBody>,
) -> Result<Reply<PosterApplicationDetail>, ApiError>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let detail = posting::poster_application_detail(&*state.store, &poster, body.appl_id).await?;
  Ok(Reply::ok(detail))
}

pub async fn application_pages<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Path(appl_id): Path<Uuid>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let page_ids = posting::application_pages(&*state.store, &poster, appl_id).await?;
  Ok(Reply::ok(json!({ "pageIds": page_ids })))
}

pub async fn report<S, N>(
  State(state): State<AppState<S, N>>,
  Extension(poster): Extension<Poster>,
  Path(applicant_id): Path<Uuid>,
  Valid(body): Valid<ReportBody>,
) -> Handled
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let report =
    gate::report_applicant(&*state.store, poster.id(), applicant_id, body.reason).await?;
  Ok(Reply::with_message("Reported", json!({ "report": report })))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn body(extra: Value) -> PostBody {
    let mut raw = json!({
      "contentType":   "Copywriting",
      "category":      "Blogs",
      "title":         " Launch post ",
      "description":   "Write our launch post",
      "country":       "India",
      "remuneration":  100,
      "currency":      "usd",
      "contentPieces": 2,
      "question1":     "Why you?",
    });
    if let (Some(base), Some(extra)) = (raw.as_object_mut(), extra.as_object()) {
      base.extend(extra.clone());
    }
    serde_json::from_value(raw).unwrap()
  }

  #[test]
  fn defaults_fill_optional_fields() {
    let b = body(json!({}));
    assert!(b.validate().is_ok());
    let req = PostRequest::from(b);
    assert_eq!(req.draft.title, "Launch post");
    assert_eq!(req.draft.employment_type, EmploymentType::Project);
    assert_eq!(req.draft.remuneration_unit, RemunerationUnit::TotalCompensation);
    assert!(req.draft.remote_friendly);
    assert_eq!(req.draft.openings, 1);
    assert_eq!(req.draft.content_pieces, Some(2));
  }

  #[test]
  fn projects_need_content_pieces() {
    assert!(body(json!({ "contentPieces": null })).validate().is_err());
    assert!(body(json!({ "contentPieces": 0 })).validate().is_err());
  }

  #[test]
  fn full_time_needs_seniority_and_qualifications() {
    let b = body(json!({ "employmentType": "full_time", "preferredQualifications": "5 years" }));
    assert!(b.validate().is_err());
    let b = body(json!({
      "employmentType": "full_time",
      "seniority": "Senior",
      "preferredQualifications": "5 years",
    }));
    assert!(b.validate().is_ok());
    assert_eq!(PostRequest::from(b).draft.content_pieces, None);
    let b = body(json!({ "employmentType": "part_time" }));
    assert!(b.validate().is_err());
  }

  #[test]
  fn deadline_window() {
    let soon = Utc::now() + Duration::hours(2);
    let later = Utc::now() + Duration::days(10);
    let far = Utc::now() + Duration::days(60);
    assert!(body(json!({ "deadline": soon })).validate().is_err());
    assert!(body(json!({ "deadline": later })).validate().is_ok());
    assert!(body(json!({ "deadline": far })).validate().is_err());
  }

  #[test]
  fn description_and_remuneration_bounds() {
    assert!(body(json!({ "description": "x".repeat(601) })).validate().is_err());
    assert!(body(json!({ "remuneration": 0.5 })).validate().is_err());
    assert!(body(json!({ "openings": 0 })).validate().is_err());
  }

  #[test]
  fn close_reason_needs_five_chars() {
    let b: CloseBody =
      serde_json::from_value(json!({ "jobId": Uuid::new_v4(), "reason": "meh" })).unwrap();
    assert!(b.validate().is_err());
  }
}
