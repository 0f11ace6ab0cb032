//! Opportunities, the job postings on the board.
//!
//! Opportunities are never deleted. Their lifecycle is a status enum whose
//! transitions only move toward the terminal states (`closed`, `ban`), with
//! the single exception of `active <-> under_review`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OpportunityStatus {
  UnderReview,
  Active,
  Inactive,
  Closed,
  Ban,
}

impl OpportunityStatus {
  /// Statuses that never appear in applicant listings.
  pub const HIDDEN: [Self; 4] = [Self::Inactive, Self::Ban, Self::Closed, Self::UnderReview];

  /// States a poster may close from.
  pub const CLOSABLE: [Self; 2] = [Self::Active, Self::UnderReview];

  /// States the deadline sweep closes from.
  pub const EXPIRABLE: [Self; 3] = [Self::Active, Self::Inactive, Self::UnderReview];

  pub fn is_terminal(self) -> bool { matches!(self, Self::Closed | Self::Ban) }

  pub fn is_hidden(self) -> bool { Self::HIDDEN.contains(&self) }

  /// Whether a status change from `self` to `to` respects the lifecycle.
  pub fn can_transition_to(self, to: Self) -> bool {
    use OpportunityStatus::*;
    match (self, to) {
      _ if self == to => false,
      (Closed | Ban, _) => false,
      (_, Closed | Ban) => true,
      (UnderReview, Active) | (Active, UnderReview) => true,
      (UnderReview | Active, Inactive) => true,
      _ => false,
    }
  }
}

// ─── Attribute enums ─────────────────────────────────────────────────────────

/// Who posted an opportunity: a direct client, or a PM acting as a studio.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum PosterRole {
  Client,
  #[serde(rename = "PM")]
  #[strum(serialize = "PM")]
  Pm,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmploymentType {
  Project,
  FullTime,
  PartTime,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ContentType {
  Design,
  Copywriting,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Currency {
  Usd,
  Inr,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum RemunerationUnit {
  #[serde(rename = "per month")]
  #[strum(serialize = "per month")]
  PerMonth,
  #[serde(rename = "per week")]
  #[strum(serialize = "per week")]
  PerWeek,
  #[serde(rename = "per hour")]
  #[strum(serialize = "per hour")]
  PerHour,
  #[serde(rename = "per word")]
  #[strum(serialize = "per word")]
  PerWord,
  #[default]
  #[serde(rename = "total compensation")]
  #[strum(serialize = "total compensation")]
  TotalCompensation,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DurationUnit {
  Month,
  Week,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Seniority {
  #[serde(rename = "Entry Level")]
  #[strum(serialize = "Entry Level")]
  EntryLevel,
  #[serde(rename = "Mid Senior")]
  #[strum(serialize = "Mid Senior")]
  MidSenior,
  Senior,
}

// ─── Opportunity ─────────────────────────────────────────────────────────────

/// The poster-controlled fields of an opportunity, used both for new posts
/// and for updates to an existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDraft {
  pub title:                    String,
  pub description:              String,
  pub employment_type:          EmploymentType,
  pub content_type:             ContentType,
  pub category:                 String,
  pub tags:                     Vec<String>,
  pub remote_friendly:          bool,
  pub country:                  String,
  pub city:                     Option<String>,
  pub remuneration:             f64,
  pub remuneration_unit:        RemunerationUnit,
  pub currency:                 Currency,
  pub duration:                 Option<i64>,
  pub duration_unit:            Option<DurationUnit>,
  pub openings:                 i64,
  pub word_count:               i64,
  pub samples_provided:         bool,
  pub content_pieces:           Option<i64>,
  pub seniority:                Option<Seniority>,
  pub preferred_qualifications: String,
  pub question1:                String,
  pub question2:                String,
  pub deadline:                 Option<DateTime<Utc>>,
}

/// A stored job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
  pub opportunity_id:           Uuid,
  pub poster_id:                Uuid,
  pub poster_role:              PosterRole,
  pub status:                   OpportunityStatus,
  /// Only PM applicants may apply.
  pub pm_required:              bool,
  #[serde(flatten)]
  pub draft:                    OpportunityDraft,
  /// Total applications received; never decreases.
  pub application_count:        i64,
  /// Applications received since the poster last opened the list.
  pub new_application_count:    i64,
  pub trending:                 bool,
  pub close_reason:             Option<String>,
  pub closed_at:                Option<DateTime<Utc>>,
  /// The post-close review window is over; statuses are frozen.
  pub is_opportunity_close:     bool,
  pub created_at:               DateTime<Utc>,
  pub updated_at:               DateTime<Utc>,
}

impl Opportunity {
  /// A job posted by a direct client for plain creators.
  pub fn is_direct_creator_job(&self) -> bool {
    self.poster_role == PosterRole::Client && !self.pm_required
  }
}

/// Input to [`crate::store::JobBoardStore::insert_opportunity`].
#[derive(Debug, Clone)]
pub struct NewOpportunity {
  pub poster_id:   Uuid,
  pub poster_role: PosterRole,
  pub pm_required: bool,
  pub draft:       OpportunityDraft,
}

// ─── Listing rows ────────────────────────────────────────────────────────────

/// Aggregate numbers about the poster shown beside each listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
  pub total_job_posts:    i64,
  /// Hired applications across all of the poster's opportunities.
  pub total_hires:        i64,
  pub client_last_active: Option<DateTime<Utc>>,
}

/// An opportunity enriched for the applicant-facing board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityListing {
  #[serde(flatten)]
  pub opportunity:       Opportunity,
  pub organisation_name: Option<String>,
  pub organisation_id:   Option<Uuid>,
  pub client_id:         Uuid,
  pub client_stats:      ClientStats,
  /// Applications of this opportunity currently shortlisted.
  pub shortlisted:       i64,
  /// Studio jobs only: a connection request exists with the posting studio.
  pub is_requested:      bool,
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) fn draft() -> OpportunityDraft {
    OpportunityDraft {
      title:                    "Blog writer".into(),
      description:              "Weekly long-form posts".into(),
      employment_type:          EmploymentType::Project,
      content_type:             ContentType::Copywriting,
      category:                 "Tech".into(),
      tags:                     vec!["rust".into()],
      remote_friendly:          true,
      country:                  "India".into(),
      city:                     None,
      remuneration:             500.0,
      remuneration_unit:        RemunerationUnit::TotalCompensation,
      currency:                 Currency::Usd,
      duration:                 None,
      duration_unit:            None,
      openings:                 1,
      word_count:               0,
      samples_provided:         false,
      content_pieces:           Some(4),
      seniority:                None,
      preferred_qualifications: String::new(),
      question1:                "Why you?".into(),
      question2:                String::new(),
      deadline:                 None,
    }
  }

  pub(crate) fn opportunity(poster_role: PosterRole, pm_required: bool) -> Opportunity {
    let now = Utc::now();
    Opportunity {
      opportunity_id: Uuid::new_v4(),
      poster_id: Uuid::new_v4(),
      poster_role,
      status: OpportunityStatus::Active,
      pm_required,
      draft: draft(),
      application_count: 0,
      new_application_count: 0,
      trending: false,
      close_reason: None,
      closed_at: None,
      is_opportunity_close: false,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn terminal_states_are_final() {
    for to in [
      OpportunityStatus::Active,
      OpportunityStatus::UnderReview,
      OpportunityStatus::Inactive,
    ] {
      assert!(!OpportunityStatus::Closed.can_transition_to(to));
      assert!(!OpportunityStatus::Ban.can_transition_to(to));
    }
    assert!(!OpportunityStatus::Closed.can_transition_to(OpportunityStatus::Ban));
  }

  #[test]
  fn review_is_bidirectional() {
    assert!(OpportunityStatus::UnderReview.can_transition_to(OpportunityStatus::Active));
    assert!(OpportunityStatus::Active.can_transition_to(OpportunityStatus::UnderReview));
    assert!(!OpportunityStatus::Inactive.can_transition_to(OpportunityStatus::Active));
    assert!(OpportunityStatus::Inactive.can_transition_to(OpportunityStatus::Closed));
  }

  #[test]
  fn only_active_is_listed() {
    assert!(!OpportunityStatus::Active.is_hidden());
    assert!(OpportunityStatus::UnderReview.is_hidden());
    assert!(OpportunityStatus::Ban.is_hidden());
  }

  #[test]
  fn wire_names() {
    assert_eq!(OpportunityStatus::UnderReview.as_ref(), "under_review");
    assert_eq!(EmploymentType::FullTime.as_ref(), "full_time");
    assert_eq!(
      serde_json::to_string(&RemunerationUnit::PerWord).unwrap(),
      "\"per word\""
    );
    assert_eq!("PM".parse::<PosterRole>().unwrap(), PosterRole::Pm);
  }

  #[test]
  fn pm_required_rejects_writers() {
    use crate::{Error, account::ApplicantRole};

    let job = opportunity(PosterRole::Client, true);
    assert!(matches!(
      ApplicantRole::Writer.eligible_for(&job),
      Err(Error::PmRequired)
    ));
    assert!(ApplicantRole::Pm.eligible_for(&job).is_ok());
  }

  #[test]
  fn studio_jobs_reject_pms() {
    use crate::{Error, account::ApplicantRole};

    let job = opportunity(PosterRole::Pm, false);
    assert!(matches!(
      ApplicantRole::Pm.eligible_for(&job),
      Err(Error::CreatorsOnly)
    ));
    assert!(ApplicantRole::Writer.eligible_for(&job).is_ok());

    let direct = opportunity(PosterRole::Client, false);
    assert!(direct.is_direct_creator_job());
    assert!(ApplicantRole::Writer.eligible_for(&direct).is_ok());
    assert!(ApplicantRole::Pm.eligible_for(&direct).is_ok());
  }
}
