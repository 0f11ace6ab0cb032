//! Reports: user-submitted flags used purely as exclusion filters.
//!
//! A report is written once and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportType {
  /// Against an opportunity.
  Post,
  /// Against another user.
  Profile,
  Message,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub report_id:   Uuid,
  pub reporter_id: Uuid,
  pub against_id:  Option<Uuid>,
  pub post_id:     Option<Uuid>,
  pub report_type: ReportType,
  pub reason:      String,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::JobBoardStore::insert_report`].
#[derive(Debug, Clone)]
pub struct NewReport {
  pub reporter_id: Uuid,
  pub against_id:  Option<Uuid>,
  pub post_id:     Option<Uuid>,
  pub report_type: ReportType,
  pub reason:      String,
}

impl NewReport {
  /// An applicant flagging an opportunity.
  pub fn post(reporter_id: Uuid, post_id: Uuid, reason: impl Into<String>) -> Self {
    Self {
      reporter_id,
      against_id: None,
      post_id: Some(post_id),
      report_type: ReportType::Post,
      reason: reason.into(),
    }
  }

  /// A user flagging another user's profile.
  pub fn profile(reporter_id: Uuid, against_id: Uuid, reason: impl Into<String>) -> Self {
    Self {
      reporter_id,
      against_id: Some(against_id),
      post_id: None,
      report_type: ReportType::Profile,
      reason: reason.into(),
    }
  }
}
