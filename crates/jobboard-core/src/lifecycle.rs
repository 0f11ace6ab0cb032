//! Time- and admin-driven opportunity status changes.
//!
//! Two things happen with time alone: an opportunity whose deadline passes is
//! closed, and [`REVIEW_WINDOW_DAYS`] after closing its statuses freeze and
//! any still-pending applications are rejected. [`sweep`] performs both and is
//! meant to be called periodically.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  notify::{Notification, Notifier},
  opportunity::{Opportunity, OpportunityStatus},
  store::{JobBoardStore, Transition},
};

/// Days a poster may keep reviewing applications after closing.
pub const REVIEW_WINDOW_DAYS: i64 = 14;

/// What one sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
  /// Opportunities closed because their deadline passed.
  pub closed:    usize,
  /// Opportunities whose review window ended.
  pub finalised: usize,
}

pub async fn sweep<S, N>(store: &S, notifier: &N, now: DateTime<Utc>) -> Result<SweepReport>
where
  S: JobBoardStore,
  N: Notifier,
{
  let closed = store.close_expired(now).await.map_err(Error::store)?;
  for opportunity in &closed {
    notifier
      .notify(Notification::DeadlinePassed {
        poster_id:      opportunity.poster_id,
        opportunity_id: opportunity.opportunity_id,
        title:          opportunity.draft.title.clone(),
      })
      .await;
  }

  let cutoff = now - Duration::days(REVIEW_WINDOW_DAYS);
  let finalised = store.end_review_windows(cutoff).await.map_err(Error::store)?;

  let report = SweepReport {
    closed:    closed.len(),
    finalised: finalised.len(),
  };
  if report != SweepReport::default() {
    tracing::info!(closed = report.closed, finalised = report.finalised, "lifecycle sweep");
  }
  Ok(report)
}

/// Apply an administrator's status decision, e.g. approving a post that is
/// under review.
pub async fn review_opportunity<S: JobBoardStore>(
  store: &S,
  opportunity_id: Uuid,
  to: OpportunityStatus,
) -> Result<Opportunity> {
  let current = store
    .get_opportunity(opportunity_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::OpportunityNotFound(opportunity_id))?;
  let from = current.status;
  if !from.can_transition_to(to) {
    return Err(Error::IllegalTransition { from, to });
  }
  let transition = Transition {
    opportunity_id,
    poster_id: None,
    from: vec![from],
    to,
    reason: None,
  };
  store
    .transition_opportunity(&transition)
    .await
    .map_err(Error::store)?
    .ok_or(Error::IllegalTransition { from, to })
}
