//! HTTP Basic authentication and the per-role route gates.
//!
//! Each gate authenticates the caller, loads the role record the route group
//! needs and stores it in the request extensions, where handlers pick it up
//! with `Extension<Applicant>` or `Extension<Poster>`.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use jobboard_core::{
  Error,
  access::check_job_board_access,
  account::{Account, Applicant, Poster},
  notify::Notifier,
  opportunity::PosterRole,
  store::JobBoardStore,
};

use crate::{AppState, error::ApiError};

/// Split a `Basic` authorization header into username and password.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((username.to_owned(), password.to_owned()))
}

/// Resolve the calling account from its Basic credentials.
pub async fn authenticate<S: JobBoardStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Account, ApiError> {
  let (username, password) = basic_credentials(headers)?;

  let creds = store
    .find_credentials(&username)
    .await
    .map_err(Error::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&creds.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(creds.account)
}

// ─── Gates ───────────────────────────────────────────────────────────────────

async fn load_applicant<S: JobBoardStore>(
  store: &S,
  headers: &HeaderMap,
) -> Result<Applicant, ApiError> {
  let account = authenticate(headers, store).await?;
  store
    .get_applicant(account.account_id)
    .await
    .map_err(Error::store)?
    .ok_or(ApiError::Forbidden("Only creators can use the job board"))
}

/// Writers and PMs, without the job-board access check.
pub async fn applicant<S, N>(
  State(state): State<AppState<S, N>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let applicant = load_applicant(&*state.store, req.headers()).await?;
  req.extensions_mut().insert(applicant);
  Ok(next.run(req).await)
}

/// Writers and PMs who pass [`check_job_board_access`].
pub async fn guarded_applicant<S, N>(
  State(state): State<AppState<S, N>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  let applicant = load_applicant(&*state.store, req.headers()).await?;
  check_job_board_access(&applicant.account)?;
  req.extensions_mut().insert(applicant);
  Ok(next.run(req).await)
}

async fn poster_gate<S, N>(
  state: AppState<S, N>,
  role: PosterRole,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: JobBoardStore,
  N: Notifier,
{
  let account = authenticate(req.headers(), &*state.store).await?;
  let poster: Poster = state
    .store
    .get_poster(account.account_id)
    .await
    .map_err(Error::store)?
    .filter(|p| p.role == role)
    .ok_or(ApiError::Forbidden("Not allowed for this role"))?;
  req.extensions_mut().insert(poster);
  Ok(next.run(req).await)
}

/// Clients posting direct opportunities.
pub async fn client<S, N>(
  State(state): State<AppState<S, N>>,
  req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  poster_gate(state, PosterRole::Client, req, next).await
}

/// PMs posting studio opportunities.
pub async fn studio<S, N>(
  State(state): State<AppState<S, N>>,
  req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: JobBoardStore + 'static,
  N: Notifier + 'static,
{
  poster_gate(state, PosterRole::Pm, req, next).await
}
