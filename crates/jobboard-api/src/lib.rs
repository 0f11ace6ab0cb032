//! HTTP layer for the job board.
//!
//! Exposes an axum [`Router`] backed by any [`JobBoardStore`] and
//! [`Notifier`]. Every route requires HTTP Basic credentials; route groups are
//! gated by role:
//!
//! | Prefix | Roles |
//! |--------|-------|
//! | `/job-board` | Writer, PM (as applicant) |
//! | `/client/job-board` | Client |
//! | `/pm/job-board/studio` | PM (as poster) |

pub mod auth;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router, middleware,
  routing::{delete, get, post, put},
};
use chrono::Utc;
use jobboard_core::{lifecycle, notify::Notifier, store::JobBoardStore};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use handlers::{applicant, poster};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Seconds between two lifecycle sweeps.
  #[serde(default = "default_sweep_interval")]
  pub sweep_interval_secs: u64,
}

fn default_sweep_interval() -> u64 { 3600 }

impl ServerConfig {
  /// Time between sweeps, never shorter than a second.
  pub fn sweep_interval(&self) -> Duration {
    Duration::from_secs(self.sweep_interval_secs.max(1))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, N> {
  pub store:    Arc<S>,
  pub notifier: Arc<N>,
  pub config:   Arc<ServerConfig>,
}

impl<S, N> Clone for AppState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: Arc::clone(&self.notifier),
      config:   Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the job-board [`Router`].
pub fn router<S, N>(state: AppState<S, N>) -> Router
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  // Saved-job routes only need an applicant; the access guard is skipped.
  let saved = Router::new()
    .route("/job-board/saved/all",             get(applicant::saved_list::<S, N>))
    .route("/job-board/saved/save/{jobId}",     put(applicant::save::<S, N>))
    .route("/job-board/saved/delete/{jobId}",   delete(applicant::unsave::<S, N>))
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      auth::applicant::<S, N>,
    ));

  let board = Router::new()
    .route("/job-board",                        post(applicant::list::<S, N>))
    .route("/job-board/suggested",              get(applicant::suggested::<S, N>))
    .route("/job-board/trending",               get(applicant::trending::<S, N>))
    .route("/job-board/applications",           post(applicant::applications::<S, N>))
    .route("/job-board/applications/{applId}",  get(applicant::application::<S, N>))
    .route("/job-board/studio-requests/{studioId}", put(applicant::request_studio::<S, N>))
    .route("/job-board/{jobId}",                get(applicant::opportunity::<S, N>))
    .route("/job-board/{jobId}/applications",   post(applicant::apply::<S, N>))
    .route("/job-board/{jobId}/report",         post(applicant::report::<S, N>))
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      auth::guarded_applicant::<S, N>,
    ));

  let client = poster_routes::<S, N>("/client/job-board").route_layer(
    middleware::from_fn_with_state(state.clone(), auth::client::<S, N>),
  );
  let studio = poster_routes::<S, N>("/pm/job-board/studio").route_layer(
    middleware::from_fn_with_state(state.clone(), auth::studio::<S, N>),
  );

  Router::new()
    .merge(saved)
    .merge(board)
    .merge(client)
    .merge(studio)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// The poster route set, mounted once per poster prefix.
fn poster_routes<S, N>(prefix: &str) -> Router<AppState<S, N>>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    .route(prefix,                                         post(poster::post::<S, N>))
    .route(&format!("{prefix}/close"),                     post(poster::close::<S, N>))
    .route(&format!("{prefix}/opportunities"),             post(poster::opportunities::<S, N>))
    .route(&format!("{prefix}/{{jobId}}/applications"),    get(poster::job_applications::<S, N>))
    .route(&format!("{prefix}/application-status"),        put(poster::application_status::<S, N>))
    .route(&format!("{prefix}/application"),               post(poster::application::<S, N>))
    .route(&format!("{prefix}/application/pages/{{applId}}"), get(poster::application_pages::<S, N>))
    .route(&format!("{prefix}/report/{{applicantId}}"),    post(poster::report::<S, N>))
}

// ─── Lifecycle sweep ─────────────────────────────────────────────────────────

/// Run [`lifecycle::sweep`] on the configured interval, for as long as the
/// runtime lives. The first sweep runs immediately.
pub fn spawn_sweeper<S, N>(state: &AppState<S, N>) -> JoinHandle<()>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let store = Arc::clone(&state.store);
  let notifier = Arc::clone(&state.notifier);
  let every = state.config.sweep_interval();
  tracing::info!(every_secs = every.as_secs(), "starting lifecycle sweeper");

  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    loop {
      ticker.tick().await;
      if let Err(e) = lifecycle::sweep(&*store, &*notifier, Utc::now()).await {
        tracing::error!(error = %e, "lifecycle sweep failed");
      }
    }
  })
}

#[cfg(test)]
mod tests;
