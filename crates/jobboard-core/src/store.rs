//! The `JobBoardStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `jobboard-store-sqlite`). The workflows in this crate and the HTTP layer
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  account::{Account, Applicant, Credentials, NewAccount, Organisation, Poster},
  application::{
    Application, ApplicationDraft, ApplicationListing, ApplicationQuery, ApplicationStatus,
    ReceivedApplication, Submitted,
  },
  opportunity::{
    EmploymentType, NewOpportunity, Opportunity, OpportunityDraft, OpportunityListing,
    OpportunityStatus, PosterRole,
  },
  paging::{PageRequest, Paged},
  portfolio::{NewPage, NewProject, Page, Project},
  report::{NewReport, Report},
};

// ─── Error contract ──────────────────────────────────────────────────────────

/// What the workflows need to know about a backend error beyond its message.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The write was rejected by a uniqueness constraint.
  fn is_unique_violation(&self) -> bool;
}

// ─── Query types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
  #[default]
  UpdatedAt,
  ApplicationCount,
  CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  Ascending,
  #[default]
  Descending,
}

/// Predicate for [`JobBoardStore::list_opportunities`]. Built by the
/// eligibility filter; every populated field narrows the result.
#[derive(Debug, Clone)]
pub struct OpportunityFilter {
  pub exclude_statuses:      Vec<OpportunityStatus>,
  /// Drop opportunities holding any of these application ids.
  pub exclude_applications:  Vec<Uuid>,
  pub exclude_ids:           Vec<Uuid>,
  pub hide_pm_required:      bool,
  pub poster_role:           PosterRole,
  pub country:               String,
  pub employment_types:      Option<Vec<EmploymentType>>,
  pub remote_friendly:       Option<bool>,
  /// Case-insensitive substring over title, description, category and tags.
  pub search:                Option<String>,
  pub min_application_count: Option<i64>,
  pub trending_only:         bool,
  pub sort_field:            SortField,
  pub sort_order:            SortOrder,
}

/// A guarded status change for [`JobBoardStore::transition_opportunity`].
/// Applies only when the opportunity is currently in one of `from` (and owned
/// by `poster_id`, when given).
#[derive(Debug, Clone)]
pub struct Transition {
  pub opportunity_id: Uuid,
  pub poster_id:      Option<Uuid>,
  pub from:           Vec<OpportunityStatus>,
  pub to:             OpportunityStatus,
  /// Recorded as the close reason when `to` is `closed`.
  pub reason:         Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a job-board storage backend.
///
/// Opportunities and applications are never deleted; reports are append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait JobBoardStore: Send + Sync {
  type Error: StoreError;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create an account together with its role record.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Look up an account and its password hash by username.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  fn create_organisation(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Organisation, Self::Error>> + Send + '_;

  /// Attach an organisation to a client and clear its first-post flag.
  /// Returns `false` if `client_id` is not a client.
  fn complete_client_profile(
    &self,
    client_id: Uuid,
    organisation_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The applicant view of a Writer or PM account.
  fn get_applicant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Applicant>, Self::Error>> + Send + '_;

  /// The poster view of a Client or PM account.
  fn get_poster(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Poster>, Self::Error>> + Send + '_;

  // ── Saved jobs ────────────────────────────────────────────────────────

  /// Append to the saved list. Returns `false` if it was already there.
  fn add_saved_job(
    &self,
    applicant_id: Uuid,
    opportunity_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove from the saved list. Returns `false` if it was not there.
  fn remove_saved_job(
    &self,
    applicant_id: Uuid,
    opportunity_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Saved opportunities in saved order.
  fn list_saved_jobs(
    &self,
    applicant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Opportunity>, Self::Error>> + Send + '_;

  // ── Portfolio ─────────────────────────────────────────────────────────

  fn create_page(
    &self,
    input: NewPage,
  ) -> impl Future<Output = Result<Page, Self::Error>> + Send + '_;

  fn get_pages<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Page>, Self::Error>> + Send + 'a;

  /// How many distinct ids in `ids` name pages owned by `owner_id`.
  fn count_owned_pages<'a>(
    &'a self,
    owner_id: Uuid,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn get_projects<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + 'a;

  /// Record that a PM imported a team member's project.
  fn import_project(
    &self,
    pm_id: Uuid,
    project_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Opportunities ─────────────────────────────────────────────────────

  /// Persist a new opportunity in `under_review` and append it to the
  /// poster's list.
  fn insert_opportunity(
    &self,
    input: NewOpportunity,
  ) -> impl Future<Output = Result<Opportunity, Self::Error>> + Send + '_;

  /// Overwrite the poster-controlled fields. Returns `None` if absent.
  fn update_opportunity(
    &self,
    id: Uuid,
    draft: OpportunityDraft,
  ) -> impl Future<Output = Result<Option<Opportunity>, Self::Error>> + Send + '_;

  fn get_opportunity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Opportunity>, Self::Error>> + Send + '_;

  /// One page of listings matching `filter`, enriched with poster details.
  /// `is_requested` is left `false`.
  fn list_opportunities<'a>(
    &'a self,
    filter: &'a OpportunityFilter,
    page: PageRequest,
  ) -> impl Future<Output = Result<Paged<OpportunityListing>, Self::Error>> + Send + 'a;

  /// A poster's own opportunities, newest first.
  fn list_poster_opportunities(
    &self,
    poster_id: Uuid,
    status: Option<OpportunityStatus>,
  ) -> impl Future<Output = Result<Vec<Opportunity>, Self::Error>> + Send + '_;

  /// Apply a guarded status change. Returns `None` if the guard matched no
  /// opportunity.
  fn transition_opportunity<'a>(
    &'a self,
    transition: &'a Transition,
  ) -> impl Future<Output = Result<Option<Opportunity>, Self::Error>> + Send + 'a;

  /// Zero the unseen-application counter of a poster's opportunity, returning
  /// it. `None` if the poster does not own it.
  fn reset_unseen(
    &self,
    id: Uuid,
    poster_id: Uuid,
  ) -> impl Future<Output = Result<Option<Opportunity>, Self::Error>> + Send + '_;

  fn set_trending(
    &self,
    id: Uuid,
    trending: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Close every expirable opportunity whose deadline is before `now`.
  fn close_expired(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Opportunity>, Self::Error>> + Send + '_;

  /// End the review window of opportunities closed before `closed_before`:
  /// set `is_opportunity_close` and reject their pending applications, in one
  /// unit of work.
  fn end_review_windows(
    &self,
    closed_before: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Opportunity>, Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  /// Insert the application and bump the opportunity's total and unseen
  /// counters, atomically. A second application by the same applicant to the
  /// same opportunity fails with a unique violation.
  fn submit_application(
    &self,
    draft: ApplicationDraft,
  ) -> impl Future<Output = Result<Submitted, Self::Error>> + Send + '_;

  fn get_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  fn find_application(
    &self,
    applicant_id: Uuid,
    opportunity_id: Uuid,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  fn list_applicant_applications<'a>(
    &'a self,
    query: &'a ApplicationQuery,
    page: PageRequest,
  ) -> impl Future<Output = Result<Paged<ApplicationListing>, Self::Error>> + Send + 'a;

  /// Every application of an opportunity, oldest first.
  fn list_received_applications(
    &self,
    opportunity_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReceivedApplication>, Self::Error>> + Send + '_;

  fn set_application_status(
    &self,
    id: Uuid,
    status: ApplicationStatus,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn insert_report(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  /// The `post` report filed by `reporter_id` against `post_id`, if any.
  fn find_post_report(
    &self,
    reporter_id: Uuid,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;

  /// Whether a `profile` report by `reporter_id` against `against_id` exists.
  fn profile_report_exists(
    &self,
    reporter_id: Uuid,
    against_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Opportunity ids `reporter_id` has filed `post` reports against.
  fn reported_post_ids(
    &self,
    reporter_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// The subset of `candidates` that `reporter_id` has reported (any type).
  fn reported_among<'a>(
    &'a self,
    reporter_id: Uuid,
    candidates: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + 'a;

  // ── Studio requests ───────────────────────────────────────────────────

  /// Returns `false` if the request already exists.
  fn add_studio_request(
    &self,
    sender_id: Uuid,
    receiver_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Accounts with a studio request to or from `account_id`.
  fn studio_request_peers(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;
}
