//! Poster-side operations: posting, closing and listing opportunities, and
//! reviewing the applications they receive.
//!
//! Every operation is scoped to the calling poster; ids belonging to someone
//! else behave exactly like absent ones.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  account::{ApplicantRole, Poster},
  application::{Application, ApplicationStatus, ReceivedApplication},
  notify::{Notification, Notifier},
  opportunity::{NewOpportunity, Opportunity, OpportunityDraft, OpportunityStatus, PosterRole},
  portfolio::{Project, ProjectKind},
  store::{JobBoardStore, Transition},
};

// ─── Posting ─────────────────────────────────────────────────────────────────

/// Create a new opportunity, or update `existing_job_id` when set.
#[derive(Debug, Clone)]
pub struct PostRequest {
  pub existing_job_id: Option<Uuid>,
  /// Ignored for PM posters.
  pub pm_required:     bool,
  pub draft:           OpportunityDraft,
}

pub async fn post_opportunity<S, N>(
  store: &S,
  notifier: &N,
  poster: &Poster,
  request: PostRequest,
) -> Result<Opportunity>
where
  S: JobBoardStore,
  N: Notifier,
{
  if poster.role == PosterRole::Client && poster.is_posting_first_time {
    return Err(Error::ProfileIncomplete);
  }

  if let Some(id) = request.existing_job_id {
    let existing = store
      .get_opportunity(id)
      .await
      .map_err(Error::store)?
      .filter(|o| o.poster_id == poster.id())
      .ok_or(Error::NoSuchJob(id))?;
    if existing.status == OpportunityStatus::Ban {
      return Err(Error::OpportunityBanned(id));
    }
    let updated = store
      .update_opportunity(id, request.draft)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NoSuchJob(id))?;
    tracing::info!(opportunity_id = %id, "opportunity updated");
    return Ok(updated);
  }

  let first_post = poster.opportunities.is_empty();
  let created = store
    .insert_opportunity(NewOpportunity {
      poster_id:   poster.id(),
      poster_role: poster.role,
      pm_required: poster.role == PosterRole::Client && request.pm_required,
      draft:       request.draft,
    })
    .await
    .map_err(Error::store)?;
  tracing::info!(
    opportunity_id = %created.opportunity_id,
    poster_id = %poster.id(),
    "opportunity posted"
  );

  if first_post && poster.role == PosterRole::Client {
    notifier
      .notify(Notification::FirstOpportunityPosted { poster_id: poster.id() })
      .await;
  }
  notifier
    .notify(Notification::OpportunityPosted {
      poster_id:      poster.id(),
      opportunity_id: created.opportunity_id,
      title:          created.draft.title.clone(),
    })
    .await;

  Ok(created)
}

/// Close an `active` or `under_review` opportunity.
pub async fn close_opportunity<S, N>(
  store: &S,
  notifier: &N,
  poster: &Poster,
  opportunity_id: Uuid,
  reason: String,
) -> Result<Opportunity>
where
  S: JobBoardStore,
  N: Notifier,
{
  let transition = Transition {
    opportunity_id,
    poster_id: Some(poster.id()),
    from: OpportunityStatus::CLOSABLE.to_vec(),
    to: OpportunityStatus::Closed,
    reason: Some(reason),
  };
  let closed = store
    .transition_opportunity(&transition)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CannotClose(opportunity_id))?;

  notifier
    .notify(Notification::OpportunityClosed {
      poster_id:         closed.poster_id,
      opportunity_id,
      title:             closed.draft.title.clone(),
      application_count: closed.application_count,
    })
    .await;
  Ok(closed)
}

pub async fn poster_opportunities<S: JobBoardStore>(
  store: &S,
  poster_id: Uuid,
  status: Option<OpportunityStatus>,
) -> Result<Vec<Opportunity>> {
  store
    .list_poster_opportunities(poster_id, status)
    .await
    .map_err(Error::store)
}

// ─── Reviewing applications ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplications {
  pub job:          Opportunity,
  pub company:      Option<String>,
  pub applications: Vec<ReceivedApplication>,
  /// Applicants among `applications` the poster has reported.
  pub reports:      Vec<Uuid>,
}

/// The applications of one of the poster's opportunities. Opening the list
/// marks every application as seen.
pub async fn job_applications<S: JobBoardStore>(
  store: &S,
  poster: &Poster,
  opportunity_id: Uuid,
) -> Result<JobApplications> {
  let job = store
    .reset_unseen(opportunity_id, poster.id())
    .await
    .map_err(Error::store)?
    .ok_or(Error::PosterJobNotFound(opportunity_id))?;
  let applications = store
    .list_received_applications(opportunity_id)
    .await
    .map_err(Error::store)?;
  let applicants: Vec<Uuid> = applications
    .iter()
    .map(|a| a.application.applicant_id)
    .collect();
  let reports = store
    .reported_among(poster.id(), &applicants)
    .await
    .map_err(Error::store)?;

  Ok(JobApplications {
    job,
    company: poster.company_name().map(str::to_owned),
    applications,
    reports,
  })
}

async fn owned_application<S: JobBoardStore>(
  store: &S,
  poster: &Poster,
  application_id: Uuid,
) -> Result<Application> {
  store
    .get_application(application_id)
    .await
    .map_err(Error::store)?
    .filter(|a| a.poster_id == poster.id())
    .ok_or(Error::PosterApplicationNotFound(application_id))
}

/// Move an application to `status`.
///
/// Suggested applications can never return to `pending`, and only suggested
/// applications may be marked `suggested`. Statuses freeze once the
/// opportunity's review window is over.
pub async fn update_application_status<S, N>(
  store: &S,
  notifier: &N,
  poster: &Poster,
  application_id: Uuid,
  status: ApplicationStatus,
) -> Result<Application>
where
  S: JobBoardStore,
  N: Notifier,
{
  let application = owned_application(store, poster, application_id).await?;
  let job_id = application.opportunity_id;
  let job = store
    .get_opportunity(job_id)
    .await
    .map_err(Error::store)?
    .filter(|o| o.poster_id == poster.id() && !o.is_opportunity_close)
    .ok_or(Error::JobExpired(job_id))?;
  if matches!(job.status, OpportunityStatus::Inactive | OpportunityStatus::Ban) {
    return Err(Error::BannedOrInactive(job_id));
  }

  let suggested = application.suggested;
  if (suggested && status == ApplicationStatus::Pending)
    || (!suggested && status == ApplicationStatus::Suggested)
  {
    return Err(Error::StatusNotAllowed(status));
  }

  let updated = store
    .set_application_status(application_id, status)
    .await
    .map_err(Error::store)?
    .ok_or(Error::PosterApplicationNotFound(application_id))?;
  tracing::info!(%application_id, %status, "application status updated");

  if status != ApplicationStatus::Pending && !suggested {
    notifier
      .notify(Notification::ApplicationStatusChanged {
        applicant_id: updated.applicant_id,
        application_id,
        opportunity_id: job_id,
        title: job.draft.title.clone(),
        status,
      })
      .await;
  }
  Ok(updated)
}

/// A content sample as shown to the poster; long forms carry only their
/// cover image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCard {
  pub project_id: Uuid,
  pub title:      String,
  pub kind:       ProjectKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image:      Option<String>,
}

impl From<Project> for SampleCard {
  fn from(p: Project) -> Self {
    let image = match p.kind {
      ProjectKind::LongForm => Some(p.cover_image.unwrap_or_default()),
      _ => None,
    };
    Self {
      project_id: p.project_id,
      title: p.title,
      kind: p.kind,
      image,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioDetails {
  pub studio_id: Uuid,
  pub name:      Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterApplicationDetail {
  pub status:          ApplicationStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub content_samples: Option<Vec<SampleCard>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub studio_details:  Option<StudioDetails>,
}

/// An application's status, plus the samples and studio of PM applicants.
pub async fn poster_application_detail<S: JobBoardStore>(
  store: &S,
  poster: &Poster,
  application_id: Uuid,
) -> Result<PosterApplicationDetail> {
  let application = owned_application(store, poster, application_id).await?;
  let mut detail = PosterApplicationDetail {
    status:          application.status,
    content_samples: None,
    studio_details:  None,
  };
  if application.applicant_role == ApplicantRole::Pm {
    let projects = store
      .get_projects(&application.content_samples)
      .await
      .map_err(Error::store)?;
    let studio = store
      .get_poster(application.applicant_id)
      .await
      .map_err(Error::store)?;
    detail.content_samples = Some(projects.into_iter().map(SampleCard::from).collect());
    detail.studio_details = Some(StudioDetails {
      studio_id: application.applicant_id,
      name:      studio.and_then(|s| s.studio_name),
    });
  }
  Ok(detail)
}

/// The portfolio page ids attached to an application.
pub async fn application_pages<S: JobBoardStore>(
  store: &S,
  poster: &Poster,
  application_id: Uuid,
) -> Result<Vec<Uuid>> {
  let application = owned_application(store, poster, application_id).await?;
  Ok(application.page_ids)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::portfolio::LongFormState;

  fn project(kind: ProjectKind) -> Project {
    Project {
      project_id:      Uuid::new_v4(),
      owner_id:        Uuid::new_v4(),
      title:           "Essay".into(),
      kind,
      long_form_state: Some(LongFormState::Saved),
      public:          true,
      cover_image:     Some("cover.png".into()),
    }
  }

  #[test]
  fn long_form_cards_carry_cover_only() {
    let card = SampleCard::from(project(ProjectKind::LongForm));
    assert_eq!(card.image.as_deref(), Some("cover.png"));
    let card = SampleCard::from(project(ProjectKind::Design));
    assert_eq!(card.image, None);
  }
}
