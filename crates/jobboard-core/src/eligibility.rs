//! Which opportunities an applicant may see.
//!
//! Listing is a two-step affair: a pure builder turns the requester and their
//! listing parameters into an [`OpportunityFilter`], then the store evaluates
//! it. Keeping the builder pure lets the visibility rules be tested without a
//! backend.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
  Error, Result,
  account::Applicant,
  opportunity::{EmploymentType, OpportunityListing, OpportunityStatus, PosterRole},
  paging::{LISTING_LIMIT, PageRequest, Paged},
  store::{JobBoardStore, OpportunityFilter, SortField, SortOrder},
};

/// Optional narrowing supplied with a listing request.
#[derive(Debug, Clone, Default)]
pub struct ListingParams {
  pub employment_types: Option<Vec<EmploymentType>>,
  pub remote_friendly:  Option<bool>,
  /// Country to list; the requester's own country when absent.
  pub location:         Option<String>,
  pub sort_by:          Option<SortField>,
  pub sort_order:       Option<SortOrder>,
  pub page:             Option<i64>,
  pub search_query:     Option<String>,
  /// List jobs posted by PM studios instead of direct clients.
  pub studio_jobs:      bool,
}

/// The curated listings shown beside the main board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialListing {
  /// Opportunities with at least [`SUGGESTED_MIN_APPLICATIONS`] applications.
  Suggested,
  /// Opportunities flagged as trending.
  Trending,
}

pub const SUGGESTED_MIN_APPLICATIONS: i64 = 5;

// ─── Filter builders ─────────────────────────────────────────────────────────

fn base_filter(applicant: &Applicant, reported: Vec<Uuid>) -> OpportunityFilter {
  OpportunityFilter {
    exclude_statuses:      OpportunityStatus::HIDDEN.to_vec(),
    exclude_applications:  applicant.applications.clone(),
    exclude_ids:           reported,
    hide_pm_required:      applicant.role.hides_pm_required(),
    poster_role:           PosterRole::Client,
    country:               applicant.account.country.clone(),
    employment_types:      None,
    remote_friendly:       None,
    search:                None,
    min_application_count: None,
    trending_only:         false,
    sort_field:            SortField::UpdatedAt,
    sort_order:            SortOrder::Descending,
  }
}

/// The main board filter. `reported` are the opportunity ids the applicant has
/// filed post reports against.
pub fn listing_filter(
  applicant: &Applicant,
  reported: Vec<Uuid>,
  params: &ListingParams,
) -> OpportunityFilter {
  let mut filter = base_filter(applicant, reported);
  if params.studio_jobs {
    filter.poster_role = PosterRole::Pm;
  }
  if let Some(location) = &params.location {
    filter.country = location.clone();
  }
  filter.employment_types = params.employment_types.clone();
  filter.remote_friendly = params.remote_friendly;
  filter.search = params
    .search_query
    .as_deref()
    .map(str::trim)
    .filter(|q| !q.is_empty())
    .map(str::to_owned);
  if let Some(field) = params.sort_by {
    filter.sort_field = field;
    filter.sort_order = params.sort_order.unwrap_or_default();
  }
  filter
}

/// Filter for a special listing; always direct-client jobs in the
/// requester's own country.
pub fn special_filter(
  applicant: &Applicant,
  reported: Vec<Uuid>,
  kind: SpecialListing,
) -> OpportunityFilter {
  let mut filter = base_filter(applicant, reported);
  match kind {
    SpecialListing::Suggested => {
      filter.min_application_count = Some(SUGGESTED_MIN_APPLICATIONS)
    }
    SpecialListing::Trending => filter.trending_only = true,
  }
  filter
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// One page of the main board for `applicant`.
pub async fn browse<S: JobBoardStore>(
  store: &S,
  applicant: &Applicant,
  params: &ListingParams,
) -> Result<Paged<OpportunityListing>> {
  let reported = store
    .reported_post_ids(applicant.id())
    .await
    .map_err(Error::store)?;
  let filter = listing_filter(applicant, reported, params);
  let page = PageRequest::new(params.page, LISTING_LIMIT);
  let listings = store
    .list_opportunities(&filter, page)
    .await
    .map_err(Error::store)?;
  mark_requested(store, applicant, listings).await
}

/// One page of a special listing for `applicant`.
pub async fn browse_special<S: JobBoardStore>(
  store: &S,
  applicant: &Applicant,
  kind: SpecialListing,
  page: Option<i64>,
) -> Result<Paged<OpportunityListing>> {
  let reported = store
    .reported_post_ids(applicant.id())
    .await
    .map_err(Error::store)?;
  let filter = special_filter(applicant, reported, kind);
  store
    .list_opportunities(&filter, PageRequest::new(page, LISTING_LIMIT))
    .await
    .map_err(Error::store)
}

/// Flag studio jobs whose poster already has a connection request with the
/// applicant.
async fn mark_requested<S: JobBoardStore>(
  store: &S,
  applicant: &Applicant,
  mut listings: Paged<OpportunityListing>,
) -> Result<Paged<OpportunityListing>> {
  let has_studio_jobs = listings
    .items
    .iter()
    .any(|l| l.opportunity.poster_role == PosterRole::Pm);
  if !has_studio_jobs {
    return Ok(listings);
  }
  let peers: HashSet<Uuid> = store
    .studio_request_peers(applicant.id())
    .await
    .map_err(Error::store)?
    .into_iter()
    .collect();
  for listing in &mut listings.items {
    listing.is_requested = listing.opportunity.poster_role == PosterRole::Pm
      && peers.contains(&listing.opportunity.poster_id);
  }
  Ok(listings)
}
