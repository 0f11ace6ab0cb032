//! Error types for `jobboard-core`.
//!
//! Every business-rule rejection is a variant here. The HTTP layer reads
//! [`Error::rejection`] for the status class and [`Error::code`] for the
//! `errorCode` field of the error envelope.

use thiserror::Error;
use uuid::Uuid;

use crate::{application::ApplicationStatus, opportunity::OpportunityStatus};

/// Broad class of a rejection; maps onto an HTTP status in the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
  BadRequest,
  NotAuthorized,
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  // ── Opportunity lookups ────────────────────────────────────────────────
  #[error("No such job found")]
  OpportunityNotFound(Uuid),

  #[error("Opportunity not active")]
  OpportunityInactive(Uuid),

  // ── Reporting gate ─────────────────────────────────────────────────────
  #[error("CANT_APPLY_REPORTED")]
  ReportedByApplicant,

  #[error("CLIENT_REPORTED_CREATOR")]
  ReportedByPoster,

  // ── Role pairing ───────────────────────────────────────────────────────
  #[error("This job is for PMs")]
  PmRequired,

  #[error("Can't Apply. This job is for creators from PMs")]
  CreatorsOnly,

  // ── Application contents ───────────────────────────────────────────────
  #[error(
    "Invalid samples added. Project is either not yours, not imported from \
     members or is a private LongForm"
  )]
  InvalidSamples,

  #[error("Select at least one page from your portfolio for applying")]
  PageRequired,

  #[error("One or more pageIds are invalid or do not belong to this creator")]
  InvalidPages,

  // ── Persistence outcomes ───────────────────────────────────────────────
  #[error("Already Applied")]
  AlreadyApplied,

  #[error("Unable to apply for this job")]
  ApplyFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

  // ── Applications ───────────────────────────────────────────────────────
  #[error("No such application found")]
  ApplicationNotFound(Uuid),

  #[error("Application doesn't belong to you")]
  NotApplicationOwner(Uuid),

  // ── Saved jobs ─────────────────────────────────────────────────────────
  #[error("ALREADY_SAVED")]
  AlreadySaved(Uuid),

  #[error("NO_SUCH_JOB")]
  NotSaved(Uuid),

  // ── Accounts and access ────────────────────────────────────────────────
  #[error("NO_SUCH_USER")]
  UserNotFound(Uuid),

  #[error("Access Denied to Job Board")]
  JobBoardAccessDenied,

  #[error("not a valid account status")]
  InvalidAccountStatus,

  // ── Poster-side operations ─────────────────────────────────────────────
  #[error("Update your profile before floating opportunities")]
  ProfileIncomplete,

  #[error("OPPORTUNITY_BANNED")]
  OpportunityBanned(Uuid),

  #[error("NO_SUCH_JOB")]
  NoSuchJob(Uuid),

  #[error("Can't close opportunity.")]
  CannotClose(Uuid),

  #[error("Job not found")]
  PosterJobNotFound(Uuid),

  #[error("Application not found")]
  PosterApplicationNotFound(Uuid),

  #[error("NO_SUCH_JOB/JOB_EXPIRED")]
  JobExpired(Uuid),

  #[error("BANNED_OR_INACTIVE_OPPORTUNITY")]
  BannedOrInactive(Uuid),

  #[error("{0} status not allowed for this application")]
  StatusNotAllowed(ApplicationStatus),

  #[error("cannot move opportunity from {from} to {to}")]
  IllegalTransition {
    from: OpportunityStatus,
    to:   OpportunityStatus,
  },

  // ── Infrastructure ─────────────────────────────────────────────────────
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// The application-specific `errorCode`; `CND` ("code not defined") when
  /// the rejection carries no dedicated code.
  pub fn code(&self) -> &'static str {
    match self {
      Self::OpportunityNotFound(_) => "CRJB100",
      Self::ReportedByApplicant => "CRJB101",
      Self::ReportedByPoster => "CRJB102",
      Self::AlreadyApplied | Self::ApplyFailed(_) => "CRJB103",
      Self::OpportunityInactive(_) => "CRJB104",
      Self::ApplicationNotFound(_) | Self::NotApplicationOwner(_) => "CRJB105",
      Self::JobBoardAccessDenied => "CRPL112",
      _ => "CND",
    }
  }

  pub fn rejection(&self) -> Rejection {
    match self {
      Self::JobBoardAccessDenied => Rejection::NotAuthorized,
      Self::Store(_) => Rejection::Internal,
      _ => Rejection::BadRequest,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
