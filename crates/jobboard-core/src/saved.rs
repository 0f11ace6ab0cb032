//! The applicant's saved-job list.

use uuid::Uuid;

use crate::{Error, Result, opportunity::Opportunity, store::JobBoardStore};

/// Bookmark an opportunity; returns the saved list afterwards.
pub async fn save_job<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  opportunity_id: Uuid,
) -> Result<Vec<Uuid>> {
  if store
    .get_opportunity(opportunity_id)
    .await
    .map_err(Error::store)?
    .is_none()
  {
    return Err(Error::OpportunityNotFound(opportunity_id));
  }
  let added = store
    .add_saved_job(applicant_id, opportunity_id)
    .await
    .map_err(Error::store)?;
  if !added {
    return Err(Error::AlreadySaved(opportunity_id));
  }
  let applicant = store
    .get_applicant(applicant_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::UserNotFound(applicant_id))?;
  Ok(applicant.saved_jobs)
}

pub async fn unsave_job<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  opportunity_id: Uuid,
) -> Result<()> {
  let removed = store
    .remove_saved_job(applicant_id, opportunity_id)
    .await
    .map_err(Error::store)?;
  if removed {
    Ok(())
  } else {
    Err(Error::NotSaved(opportunity_id))
  }
}

/// The saved opportunities, in the order they were saved.
pub async fn saved_jobs<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
) -> Result<Vec<Opportunity>> {
  if store
    .get_applicant(applicant_id)
    .await
    .map_err(Error::store)?
    .is_none()
  {
    return Err(Error::UserNotFound(applicant_id));
  }
  store
    .list_saved_jobs(applicant_id)
    .await
    .map_err(Error::store)
}
