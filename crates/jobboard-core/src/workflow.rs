//! The application workflow.
//!
//! Pre-conditions are checked strictly in order and the first failure wins:
//!
//! 1. the applicant has not reported the opportunity;
//! 2. the poster has not reported the applicant;
//! 3. the opportunity exists;
//! 4. it is `active`;
//! 5. the applicant's role may apply to it;
//! 6. the attached samples or pages check out.
//!
//! The application insert and the counter bump then commit as one unit of
//! work in the store, after which the poster is notified.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
  Error, Result,
  account::{Applicant, ApplicantRole, CreatorLevel},
  application::{ApplicationDraft, Submission, Submitted},
  gate,
  notify::{Notification, Notifier},
  opportunity::{Opportunity, OpportunityStatus, PosterRole},
  store::{JobBoardStore, StoreError},
};

impl ApplicantRole {
  /// Turn a submission into a storable draft, validating whatever this role
  /// attaches: content samples for PMs, portfolio pages for creators applying
  /// to direct-client jobs.
  pub async fn build_application<S: JobBoardStore>(
    self,
    store: &S,
    applicant: &Applicant,
    opportunity: &Opportunity,
    submission: Submission,
  ) -> Result<ApplicationDraft> {
    let mut page_ids = Vec::new();
    let mut content_samples = Vec::new();

    match self {
      ApplicantRole::Pm => {
        if let Some(samples) = submission.content_samples {
          check_samples(store, applicant, &samples).await?;
          content_samples = samples;
        }
      }
      ApplicantRole::Writer if opportunity.poster_role == PosterRole::Client => {
        let pages = submission.page_ids.unwrap_or_default();
        if pages.is_empty() {
          return Err(Error::PageRequired);
        }
        let owned = store
          .count_owned_pages(applicant.id(), &pages)
          .await
          .map_err(Error::store)?;
        if owned != pages.len() {
          return Err(Error::InvalidPages);
        }
        page_ids = pages;
      }
      ApplicantRole::Writer => {}
    }

    Ok(ApplicationDraft {
      opportunity_id: opportunity.opportunity_id,
      applicant_id: applicant.id(),
      poster_id: opportunity.poster_id,
      applicant_role: self,
      answer1: submission.answer1,
      answer2: submission.answer2,
      page_ids,
      content_samples,
      suggested: applicant.account.level == CreatorLevel::Classified,
    })
  }
}

/// Samples the PM imported are accepted as they are. Anything else must be
/// the PM's own project and shareable.
async fn check_samples<S: JobBoardStore>(
  store: &S,
  applicant: &Applicant,
  samples: &[Uuid],
) -> Result<()> {
  let imported: HashSet<&Uuid> = applicant.imported_projects.iter().collect();
  let own: Vec<Uuid> = samples
    .iter()
    .filter(|id| !imported.contains(id))
    .copied()
    .collect();
  if own.is_empty() {
    return Ok(());
  }

  let projects = store.get_projects(&own).await.map_err(Error::store)?;
  let valid: HashSet<Uuid> = projects
    .iter()
    .filter(|p| p.owner_id == applicant.id() && p.is_shareable())
    .map(|p| p.project_id)
    .collect();
  if own.iter().all(|id| valid.contains(id)) {
    Ok(())
  } else {
    Err(Error::InvalidSamples)
  }
}

/// Submit an application from `applicant` to `opportunity_id`.
pub async fn apply<S, N>(
  store: &S,
  notifier: &N,
  applicant: &Applicant,
  opportunity_id: Uuid,
  submission: Submission,
) -> Result<Submitted>
where
  S: JobBoardStore,
  N: Notifier,
{
  let applicant_id = applicant.id();

  if gate::has_applicant_reported(store, applicant_id, opportunity_id).await? {
    return Err(Error::ReportedByApplicant);
  }
  if gate::has_poster_reported_applicant(store, applicant_id, opportunity_id).await? {
    return Err(Error::ReportedByPoster);
  }

  let opportunity = store
    .get_opportunity(opportunity_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::OpportunityNotFound(opportunity_id))?;
  if opportunity.status != OpportunityStatus::Active {
    return Err(Error::OpportunityInactive(opportunity_id));
  }
  applicant.role.eligible_for(&opportunity)?;

  let draft = applicant
    .role
    .build_application(store, applicant, &opportunity, submission)
    .await?;

  let submitted = store.submit_application(draft).await.map_err(|e| {
    if e.is_unique_violation() {
      Error::AlreadyApplied
    } else {
      tracing::error!(error = %e, %opportunity_id, "application insert failed");
      Error::ApplyFailed(Box::new(e))
    }
  })?;

  tracing::info!(
    %applicant_id,
    %opportunity_id,
    application_id = %submitted.application.application_id,
    "application submitted"
  );

  let updated = &submitted.opportunity;
  if updated.new_application_count >= 1 {
    notifier
      .notify(Notification::NewApplications {
        poster_id:      updated.poster_id,
        opportunity_id: updated.opportunity_id,
        title:          updated.draft.title.clone(),
        unseen:         updated.new_application_count,
      })
      .await;
  }

  Ok(submitted)
}
