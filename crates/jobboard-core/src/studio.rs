//! Connection requests between creators and PM studios.

use uuid::Uuid;

use crate::{Error, Result, opportunity::PosterRole, store::JobBoardStore};

/// Send a connection request from an applicant to a PM studio. Sending the
/// same request twice is a no-op.
pub async fn request_studio<S: JobBoardStore>(
  store: &S,
  applicant_id: Uuid,
  studio_id: Uuid,
) -> Result<()> {
  let studio = store
    .get_poster(studio_id)
    .await
    .map_err(Error::store)?
    .filter(|p| p.role == PosterRole::Pm)
    .ok_or(Error::UserNotFound(studio_id))?;
  let added = store
    .add_studio_request(applicant_id, studio.id())
    .await
    .map_err(Error::store)?;
  if added {
    tracing::info!(%applicant_id, %studio_id, "studio request sent");
  }
  Ok(())
}
