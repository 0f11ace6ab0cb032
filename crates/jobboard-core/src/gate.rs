//! The reporting gate: two independent block checks consulted before an
//! application is accepted, plus filing the reports that feed them.
//!
//! Both checks hit the store on every call; nothing is cached.

use uuid::Uuid;

use crate::{
  Error, Result,
  report::{NewReport, Report},
  store::JobBoardStore,
};

/// Whether the applicant filed a post report against the opportunity.
pub async fn has_applicant_reported<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  opportunity_id: Uuid,
) -> Result<bool> {
  let report = store
    .find_post_report(applicant_id, opportunity_id)
    .await
    .map_err(Error::store)?;
  Ok(report.is_some())
}

/// Whether the poster of the opportunity filed a profile report against the
/// applicant. An unknown opportunity answers `false`; the workflow reports
/// the missing opportunity itself.
pub async fn has_poster_reported_applicant<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  opportunity_id: Uuid,
) -> Result<bool> {
  let Some(opportunity) = store
    .get_opportunity(opportunity_id)
    .await
    .map_err(Error::store)?
  else {
    return Ok(false);
  };
  store
    .profile_report_exists(opportunity.poster_id, applicant_id)
    .await
    .map_err(Error::store)
}

/// File a post report by an applicant against an opportunity.
pub async fn report_opportunity<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  opportunity_id: Uuid,
  reason: String,
) -> Result<Report> {
  if store
    .get_opportunity(opportunity_id)
    .await
    .map_err(Error::store)?
    .is_none()
  {
    return Err(Error::OpportunityNotFound(opportunity_id));
  }
  let report = store
    .insert_report(NewReport::post(applicant_id, opportunity_id, reason))
    .await
    .map_err(Error::store)?;
  tracing::info!(%applicant_id, %opportunity_id, "opportunity reported");
  Ok(report)
}

/// File a profile report by a poster against an applicant.
pub async fn report_applicant<S: JobBoardStore>(
  store: &S,
  poster_id: Uuid,
  applicant_id: Uuid,
  reason: String,
) -> Result<Report> {
  if store
    .get_applicant(applicant_id)
    .await
    .map_err(Error::store)?
    .is_none()
  {
    return Err(Error::UserNotFound(applicant_id));
  }
  let report = store
    .insert_report(NewReport::profile(poster_id, applicant_id, reason))
    .await
    .map_err(Error::store)?;
  tracing::info!(%poster_id, %applicant_id, "applicant reported");
  Ok(report)
}
