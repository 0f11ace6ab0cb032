//! Applicant-side reads: opportunity detail, own applications, and a single
//! application.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  account::Applicant,
  application::{Application, ApplicationListing, ApplicationQuery, ApplicationStatus},
  opportunity::Opportunity,
  paging::{APPLICATIONS_LIMIT, PageRequest, Paged},
  portfolio::Page,
  report::Report,
  store::JobBoardStore,
};

/// An opportunity as shown to one applicant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDetail {
  #[serde(flatten)]
  pub opportunity:  Opportunity,
  pub company:      Option<String>,
  /// Number of applications received.
  pub applications: i64,
  /// The applicant's own answers, once applied.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub answer1:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub answer2:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page_ids:     Option<Vec<Page>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
  pub details: OpportunityDetail,
  /// The applicant's application id, if they applied.
  pub applied: Option<Uuid>,
  /// The applicant's post report against this opportunity, if any.
  pub report:  Option<Report>,
}

pub async fn opportunity_detail<S: JobBoardStore>(
  store: &S,
  applicant: &Applicant,
  opportunity_id: Uuid,
) -> Result<DetailView> {
  let opportunity = store
    .get_opportunity(opportunity_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::OpportunityNotFound(opportunity_id))?;
  let report = store
    .find_post_report(applicant.id(), opportunity_id)
    .await
    .map_err(Error::store)?;
  let company = store
    .get_poster(opportunity.poster_id)
    .await
    .map_err(Error::store)?
    .and_then(|p| p.company_name().map(str::to_owned));
  let application = store
    .find_application(applicant.id(), opportunity_id)
    .await
    .map_err(Error::store)?;

  let mut details = OpportunityDetail {
    applications: opportunity.application_count,
    opportunity,
    company,
    answer1: None,
    answer2: None,
    page_ids: None,
  };
  let applied = match application {
    Some(application) => {
      let pages = store
        .get_pages(&application.page_ids)
        .await
        .map_err(Error::store)?;
      details.answer1 = Some(application.answer1);
      details.answer2 = Some(application.answer2);
      details.page_ids = Some(pages);
      Some(application.application_id)
    }
    None => None,
  };

  Ok(DetailView { details, applied, report })
}

/// A page of the applicant's own applications.
pub async fn own_applications<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  status: Option<ApplicationStatus>,
  sort_by_last_applied: bool,
  page: Option<i64>,
) -> Result<Paged<ApplicationListing>> {
  let query = ApplicationQuery { applicant_id, status, sort_by_last_applied };
  store
    .list_applicant_applications(&query, PageRequest::new(page, APPLICATIONS_LIMIT))
    .await
    .map_err(Error::store)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
  #[serde(flatten)]
  pub application: Application,
  pub job:         Opportunity,
  pub company:     Option<String>,
  /// The attached portfolio pages, resolved.
  pub pages:       Vec<Page>,
}

/// One of the applicant's applications; absent and foreign ids are rejected
/// alike.
pub async fn application_detail<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  application_id: Uuid,
) -> Result<ApplicationDetail> {
  let application = store
    .get_application(application_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ApplicationNotFound(application_id))?;
  if application.applicant_id != applicant_id {
    return Err(Error::NotApplicationOwner(application_id));
  }
  let job = store
    .get_opportunity(application.opportunity_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::OpportunityNotFound(application.opportunity_id))?;
  let company = store
    .get_poster(job.poster_id)
    .await
    .map_err(Error::store)?
    .and_then(|p| p.company_name().map(str::to_owned));
  let pages = store
    .get_pages(&application.page_ids)
    .await
    .map_err(Error::store)?;
  Ok(ApplicationDetail { application, job, company, pages })
}
