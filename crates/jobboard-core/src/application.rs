//! Applications: an applicant's submission against an opportunity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{account::ApplicantRole, opportunity::{EmploymentType, Opportunity}};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Pending,
  /// Reserved for applications from curated creators.
  Suggested,
  Shortlisted,
  Hired,
  Rejected,
}

/// A stored application. At most one exists per (applicant, opportunity).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
  pub application_id:  Uuid,
  pub opportunity_id:  Uuid,
  pub applicant_id:    Uuid,
  /// Copied from the opportunity when the application is created.
  pub poster_id:       Uuid,
  pub applicant_role:  ApplicantRole,
  pub status:          ApplicationStatus,
  pub answer1:         String,
  pub answer2:         String,
  /// Portfolio pages attached by a creator applying to a direct-client job.
  pub page_ids:        Vec<Uuid>,
  /// Projects attached by a PM applicant.
  pub content_samples: Vec<Uuid>,
  pub suggested:       bool,
  pub applied_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Input to [`crate::store::JobBoardStore::submit_application`]; built by
/// [`ApplicantRole::build_application`].
#[derive(Debug, Clone)]
pub struct ApplicationDraft {
  pub opportunity_id:  Uuid,
  pub applicant_id:    Uuid,
  pub poster_id:       Uuid,
  pub applicant_role:  ApplicantRole,
  pub answer1:         String,
  pub answer2:         String,
  pub page_ids:        Vec<Uuid>,
  pub content_samples: Vec<Uuid>,
  /// Stored with status `suggested` instead of `pending`.
  pub suggested:       bool,
}

/// What an applicant sends when applying.
#[derive(Debug, Clone, Default)]
pub struct Submission {
  pub answer1:         String,
  pub answer2:         String,
  pub page_ids:        Option<Vec<Uuid>>,
  pub content_samples: Option<Vec<Uuid>>,
}

/// The committed result of an application submission.
#[derive(Debug, Clone)]
pub struct Submitted {
  pub application: Application,
  /// The opportunity with its counters already incremented.
  pub opportunity: Opportunity,
}

/// A row of the applicant's own application list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListing {
  pub application_id:    Uuid,
  pub applied_on:        DateTime<Utc>,
  pub status:            ApplicationStatus,
  pub job_id:            Uuid,
  pub title:             String,
  pub employment_type:   EmploymentType,
  pub application_count: i64,
  /// Organisation name, for direct-client jobs only.
  pub company:           Option<String>,
}

/// Filter for [`crate::store::JobBoardStore::list_applicant_applications`].
#[derive(Debug, Clone)]
pub struct ApplicationQuery {
  pub applicant_id:        Uuid,
  pub status:              Option<ApplicationStatus>,
  /// Newest application first; otherwise storage order.
  pub sort_by_last_applied: bool,
}

/// The applicant fields a poster sees beside each received application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
  pub account_id:   Uuid,
  pub display_name: String,
  pub country:      String,
}

/// An application as listed to the poster of its opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedApplication {
  #[serde(flatten)]
  pub application: Application,
  pub applicant:   ApplicantSummary,
}
