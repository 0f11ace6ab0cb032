//! Outbound notifications.
//!
//! The job board only decides *that* someone should be told something; the
//! delivery channel (e-mail, web push) is whatever [`Notifier`] the caller
//! injects. Delivery is fire-and-forget: a notifier cannot fail a request.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::application::ApplicationStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "usecase", rename_all = "kebab-case")]
pub enum Notification {
  /// A poster has applications they have not opened yet.
  NewApplications {
    poster_id:      Uuid,
    opportunity_id: Uuid,
    title:          String,
    unseen:         i64,
  },
  /// A client floated their first opportunity.
  FirstOpportunityPosted { poster_id: Uuid },
  OpportunityPosted {
    poster_id:      Uuid,
    opportunity_id: Uuid,
    title:          String,
  },
  OpportunityClosed {
    poster_id:         Uuid,
    opportunity_id:    Uuid,
    title:             String,
    application_count: i64,
  },
  /// The deadline sweep closed an opportunity.
  DeadlinePassed {
    poster_id:      Uuid,
    opportunity_id: Uuid,
    title:          String,
  },
  ApplicationStatusChanged {
    applicant_id:   Uuid,
    application_id: Uuid,
    opportunity_id: Uuid,
    title:          String,
    status:         ApplicationStatus,
  },
}

pub trait Notifier: Send + Sync {
  fn notify(&self, notification: Notification) -> impl Future<Output = ()> + Send + '_;
}

/// Emits each notification as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  async fn notify(&self, notification: Notification) {
    tracing::info!(?notification, "notification dispatched");
  }
}
