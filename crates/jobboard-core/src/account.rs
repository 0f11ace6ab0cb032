//! Accounts and the role-specific records joined onto them.
//!
//! An account carries identity and gating metadata only. What an account can
//! do on the job board depends on which role record hangs off it: an
//! [`Applicant`] (Writer, or PM acting as a creator) or a [`Poster`] (Client,
//! or PM acting as a studio client).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  opportunity::{Opportunity, PosterRole},
};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The account discriminator.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Role {
  Writer,
  #[serde(rename = "PM")]
  #[strum(serialize = "PM")]
  Pm,
  Client,
}

impl Role {
  /// The role this account applies to opportunities as, if any.
  pub fn applicant_role(self) -> Option<ApplicantRole> {
    match self {
      Self::Writer => Some(ApplicantRole::Writer),
      Self::Pm => Some(ApplicantRole::Pm),
      Self::Client => None,
    }
  }

  /// The role this account posts opportunities as, if any.
  pub fn poster_role(self) -> Option<PosterRole> {
    match self {
      Self::Client => Some(PosterRole::Client),
      Self::Pm => Some(PosterRole::Pm),
      Self::Writer => None,
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccountStatus {
  New,
  Active,
  Inactive,
  Ban,
}

/// Creator level; only `Normal` creators see the job board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorLevel {
  Limited,
  #[default]
  Normal,
  /// Curated creators; their applications arrive as `suggested`.
  Classified,
}

impl CreatorLevel {
  pub fn rank(self) -> i64 {
    match self {
      Self::Limited => 1,
      Self::Normal => 2,
      Self::Classified => 3,
    }
  }

  pub fn from_rank(rank: i64) -> Option<Self> {
    match rank {
      1 => Some(Self::Limited),
      2 => Some(Self::Normal),
      3 => Some(Self::Classified),
      _ => None,
    }
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub account_id:   Uuid,
  pub username:     String,
  pub role:         Role,
  pub status:       AccountStatus,
  pub level:        CreatorLevel,
  pub display_name: String,
  /// Country used as the default job-board location filter.
  pub country:      String,
  pub last_active:  Option<DateTime<Utc>>,
  pub created_at:   DateTime<Utc>,
}

/// The role-specific record created alongside an account.
#[derive(Debug, Clone)]
pub enum Profile {
  Writer,
  Pm { studio_name: String },
  Client {
    organisation_id:       Option<Uuid>,
    is_posting_first_time: bool,
  },
}

impl Profile {
  pub fn role(&self) -> Role {
    match self {
      Self::Writer => Role::Writer,
      Self::Pm { .. } => Role::Pm,
      Self::Client { .. } => Role::Client,
    }
  }
}

/// Input to [`crate::store::JobBoardStore::create_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:      String,
  /// argon2 PHC string.
  pub password_hash: String,
  pub display_name:  String,
  pub country:       String,
  pub status:        AccountStatus,
  pub level:         CreatorLevel,
  pub profile:       Profile,
}

/// An account together with its stored password hash; only read by the
/// authentication layer.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub account:       Account,
  pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
  pub organisation_id: Uuid,
  pub name:            String,
}

// ─── Applicant ───────────────────────────────────────────────────────────────

/// The role an applicant applies as. Role-specific application rules hang
/// off this type rather than off string comparisons.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ApplicantRole {
  Writer,
  #[serde(rename = "PM")]
  #[strum(serialize = "PM")]
  Pm,
}

impl ApplicantRole {
  /// Whether this role may apply to `opportunity` at all.
  ///
  /// PM-required jobs take PM applicants only; studio jobs (posted by a PM)
  /// take plain creators only.
  pub fn eligible_for(self, opportunity: &Opportunity) -> Result<()> {
    if opportunity.pm_required && self != Self::Pm {
      return Err(Error::PmRequired);
    }
    if opportunity.poster_role == PosterRole::Pm && self != Self::Writer {
      return Err(Error::CreatorsOnly);
    }
    Ok(())
  }

  /// Whether listings for this role hide PM-required opportunities.
  pub fn hides_pm_required(self) -> bool { self == Self::Writer }

  pub fn as_role(self) -> Role {
    match self {
      Self::Writer => Role::Writer,
      Self::Pm => Role::Pm,
    }
  }
}

/// The applicant aggregate: an account plus its job-board lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
  pub account:           Account,
  pub role:              ApplicantRole,
  /// Submitted application ids, oldest first.
  pub applications:      Vec<Uuid>,
  /// Bookmarked opportunity ids, oldest first.
  pub saved_jobs:        Vec<Uuid>,
  /// Projects imported from team members; always valid as content samples.
  pub imported_projects: Vec<Uuid>,
}

impl Applicant {
  pub fn id(&self) -> Uuid { self.account.account_id }
}

// ─── Poster ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poster {
  pub account:               Account,
  pub role:                  PosterRole,
  pub organisation:          Option<Organisation>,
  pub studio_name:           Option<String>,
  /// Clients must finish their organisation profile before posting.
  pub is_posting_first_time: bool,
  /// Posted opportunity ids, oldest first.
  pub opportunities:         Vec<Uuid>,
}

impl Poster {
  pub fn id(&self) -> Uuid { self.account.account_id }

  /// The company name shown next to this poster's jobs.
  pub fn company_name(&self) -> Option<&str> {
    match self.role {
      PosterRole::Client => self.organisation.as_ref().map(|o| o.name.as_str()),
      PosterRole::Pm => self.studio_name.as_deref(),
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) fn applicant(role: ApplicantRole) -> Applicant {
    Applicant {
      account: Account {
        account_id:   Uuid::new_v4(),
        username:     "ana".into(),
        role:         role.as_role(),
        status:       AccountStatus::Active,
        level:        CreatorLevel::Normal,
        display_name: "Ana".into(),
        country:      "India".into(),
        last_active:  None,
        created_at:   Utc::now(),
      },
      role,
      applications: vec![],
      saved_jobs: vec![],
      imported_projects: vec![],
    }
  }

  #[test]
  fn role_strings_match_wire_names() {
    assert_eq!(Role::Pm.as_ref(), "PM");
    assert_eq!("Writer".parse::<Role>().unwrap(), Role::Writer);
    assert_eq!(serde_json::to_string(&Role::Pm).unwrap(), "\"PM\"");
  }

  #[test]
  fn role_splits_into_applicant_and_poster() {
    assert_eq!(Role::Writer.poster_role(), None);
    assert_eq!(Role::Client.applicant_role(), None);
    assert_eq!(Role::Pm.applicant_role(), Some(ApplicantRole::Pm));
    assert_eq!(Role::Pm.poster_role(), Some(PosterRole::Pm));
  }

  #[test]
  fn level_ranks_round_trip() {
    for level in [CreatorLevel::Limited, CreatorLevel::Normal, CreatorLevel::Classified] {
      assert_eq!(CreatorLevel::from_rank(level.rank()), Some(level));
    }
    assert_eq!(CreatorLevel::from_rank(7), None);
  }
}
