//! Router tests: every request goes through `router(..).oneshot(..)` against an
//! in-memory SQLite store.

use std::{path::PathBuf, sync::Arc};

use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version, password_hash::SaltString};
use axum::{
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use jobboard_core::{
  account::{AccountStatus, CreatorLevel, NewAccount, Profile},
  lifecycle,
  notify::LogNotifier,
  opportunity::OpportunityStatus,
  portfolio::NewPage,
  posting::{self, PostRequest},
  store::JobBoardStore,
};
use jobboard_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use super::*;

type State = AppState<SqliteStore, LogNotifier>;

const PASSWORD: &str = "secret";

async fn make_state() -> State {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState {
    store:    Arc::new(store),
    notifier: Arc::new(LogNotifier),
    config:   Arc::new(ServerConfig {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      store_path:          PathBuf::from(":memory:"),
      sweep_interval_secs: 3600,
    }),
  }
}

/// A deliberately cheap hash; verification reads the cost from the PHC string.
fn cheap_hash(password: &str) -> String {
  let params = Params::new(8, 1, 1, None).unwrap();
  let salt = SaltString::generate(&mut OsRng);
  Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    .hash_password(password.as_bytes(), &salt)
    .unwrap()
    .to_string()
}

async fn account(state: &State, username: &str, level: CreatorLevel, profile: Profile) -> Uuid {
  let created = state
    .store
    .create_account(NewAccount {
      username: username.into(),
      password_hash: cheap_hash(PASSWORD),
      display_name: username.to_uppercase(),
      country: "India".into(),
      status: AccountStatus::Active,
      level,
      profile,
    })
    .await
    .unwrap();
  created.account_id
}

async fn writer(state: &State, username: &str) -> Uuid {
  account(state, username, CreatorLevel::Normal, Profile::Writer).await
}

/// A client with a completed organisation profile.
async fn client(state: &State, username: &str) -> Uuid {
  let profile = Profile::Client { organisation_id: None, is_posting_first_time: true };
  let id = account(state, username, CreatorLevel::Normal, profile).await;
  let org = state.store.create_organisation(format!("{username} corp")).await.unwrap();
  assert!(state.store.complete_client_profile(id, org.organisation_id).await.unwrap());
  id
}

async fn page_of(state: &State, owner: Uuid) -> Uuid {
  state
    .store
    .create_page(NewPage { owner_id: owner, name: "Portfolio".into(), slug: "portfolio".into() })
    .await
    .unwrap()
    .page_id
}

fn auth_header(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{pass}")))
}

async fn call(
  state: &State,
  method: Method,
  uri: &str,
  user: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(user) = user {
    builder = builder.header(header::AUTHORIZATION, auth_header(user, PASSWORD));
  }
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let res = router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = res.status();
  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn job_body(title: &str) -> Value {
  json!({
    "contentType":   "Copywriting",
    "category":      "Tech",
    "title":         title,
    "description":   "Weekly long-form posts",
    "country":       "India",
    "remuneration":  500,
    "currency":      "usd",
    "contentPieces": 4,
    "question1":     "Why you?",
  })
}

/// Post through `prefix` as `user` and approve the post.
async fn post_active(state: &State, prefix: &str, user: &str, body: Value) -> Uuid {
  let (status, res) = call(state, Method::POST, prefix, Some(user), Some(body)).await;
  assert_eq!(status, StatusCode::OK, "{res}");
  assert_eq!(res["message"], "Opportunity is saved/updated.");
  let id: Uuid = serde_json::from_value(res["data"]["job"]["opportunityId"].clone()).unwrap();
  lifecycle::review_opportunity(&*state.store, id, OpportunityStatus::Active).await.unwrap();
  id
}

// ── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_are_challenged() {
  let state = make_state().await;
  let req = Request::builder().uri("/job-board/saved/all").body(Body::empty()).unwrap();
  let res = router(state).oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
  let state = make_state().await;
  writer(&state, "wren").await;
  let req = Request::builder()
    .uri("/job-board/saved/all")
    .header(header::AUTHORIZATION, auth_header("wren", "nope"))
    .body(Body::empty())
    .unwrap();
  let res = router(state).oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_are_gated_per_route_group() {
  let state = make_state().await;
  writer(&state, "wren").await;
  client(&state, "acme").await;

  let (status, body) = call(&state, Method::POST, "/job-board", Some("acme"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "ForbiddenRequest");

  let (status, _) =
    call(&state, Method::POST, "/client/job-board", Some("wren"), Some(job_body("x"))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = call(
    &state,
    Method::POST,
    "/pm/job-board/studio/opportunities",
    Some("acme"),
    Some(json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn limited_writers_keep_their_saved_jobs() {
  let state = make_state().await;
  client(&state, "acme").await;
  account(&state, "lim", CreatorLevel::Limited, Profile::Writer).await;
  let job = post_active(&state, "/client/job-board", "acme", job_body("Blog")).await;

  let (status, body) = call(&state, Method::POST, "/job-board", Some("lim"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["errorCode"], "CRPL112");
  assert_eq!(body["message"], "Access Denied to Job Board");

  let uri = format!("/job-board/saved/save/{job}");
  let (status, body) = call(&state, Method::PUT, &uri, Some("lim"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "saved");
  assert_eq!(body["data"]["jobs"], json!([job]));

  let (_, body) = call(&state, Method::GET, "/job-board/saved/all", Some("lim"), None).await;
  assert_eq!(body["data"]["sj"].as_array().unwrap().len(), 1);

  let uri = format!("/job-board/saved/delete/{job}");
  let (status, body) = call(&state, Method::DELETE, &uri, Some("lim"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "success");
}

// ── Request shape ───────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_requests_are_gl100() {
  let state = make_state().await;
  writer(&state, "wren").await;

  let (status, body) = call(&state, Method::GET, "/job-board/not-a-uuid", Some("wren"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "GL100");

  let uri = format!("/job-board/{}/applications", Uuid::new_v4());
  let answer = json!({ "answer1": "x".repeat(301) });
  let (status, body) = call(&state, Method::POST, &uri, Some("wren"), Some(answer)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "GL100");

  let bad_sort = json!({ "sortBy": "ac", "sortOrder": 0 });
  let (status, body) = call(&state, Method::POST, "/job-board", Some("wren"), Some(bad_sort)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "GL100");
}

#[tokio::test]
async fn unknown_job_is_crjb100() {
  let state = make_state().await;
  writer(&state, "wren").await;
  let uri = format!("/job-board/{}", Uuid::new_v4());
  let (status, body) = call(&state, Method::GET, &uri, Some("wren"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "CRJB100");
}

// ── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_browse_apply_and_review() {
  let state = make_state().await;
  client(&state, "acme").await;
  let wren = writer(&state, "wren").await;
  let job = post_active(&state, "/client/job-board", "acme", job_body("Blog")).await;

  let (status, body) = call(&state, Method::POST, "/job-board", Some("wren"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  assert_eq!(body["message"], "OK");
  assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);
  assert_eq!(body["data"]["pageDetails"]["totalDocs"], 1);

  let page = page_of(&state, wren).await;
  let uri = format!("/job-board/{job}/applications");
  let answers = json!({ "answer1": " Because ", "answer2": "", "pageIds": [page] });
  let (status, body) = call(&state, Method::POST, &uri, Some("wren"), Some(answers.clone())).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["message"], "Applied successfully");
  assert_eq!(body["data"]["application"]["answer1"], "Because");
  let appl = body["data"]["application"]["applicationId"].clone();

  let (status, body) = call(&state, Method::POST, &uri, Some("wren"), Some(answers)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "CRJB103");

  // Applied jobs leave the board but stay readable.
  let (_, body) = call(&state, Method::POST, "/job-board", Some("wren"), Some(json!({}))).await;
  assert!(body["data"]["jobs"].as_array().unwrap().is_empty());
  let (_, body) = call(&state, Method::GET, &format!("/job-board/{job}"), Some("wren"), None).await;
  assert_eq!(body["data"]["applied"], appl);
  assert_eq!(body["data"]["details"]["answer1"], "Because");

  let (_, body) = call(
    &state,
    Method::POST,
    "/job-board/applications",
    Some("wren"),
    Some(json!({ "status": "", "sortBy": "last_applied" })),
  )
  .await;
  assert_eq!(body["data"]["applications"].as_array().unwrap().len(), 1);

  let uri = format!("/client/job-board/{job}/applications");
  let (status, body) = call(&state, Method::GET, &uri, Some("acme"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["applications"].as_array().unwrap().len(), 1);

  let (status, body) = call(
    &state,
    Method::PUT,
    "/client/job-board/application-status",
    Some("acme"),
    Some(json!({ "applId": appl, "status": "shortlisted" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["message"], "Status updated successfully");
  assert_eq!(body["data"]["application"]["status"], "shortlisted");

  let uri = format!("/client/job-board/application/pages/{}", appl.as_str().unwrap());
  let (_, body) = call(&state, Method::GET, &uri, Some("acme"), None).await;
  assert_eq!(body["data"]["pageIds"], json!([page]));
}

#[tokio::test]
async fn first_time_clients_must_complete_their_profile() {
  let state = make_state().await;
  let profile = Profile::Client { organisation_id: None, is_posting_first_time: true };
  account(&state, "fresh", CreatorLevel::Normal, profile).await;
  let (status, body) =
    call(&state, Method::POST, "/client/job-board", Some("fresh"), Some(job_body("Blog"))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Update your profile before floating opportunities");
}

#[tokio::test]
async fn studio_jobs_are_listed_separately() {
  let state = make_state().await;
  writer(&state, "wren").await;
  let profile = Profile::Pm { studio_name: "Ink Studio".into() };
  account(&state, "pm", CreatorLevel::Normal, profile).await;
  post_active(&state, "/pm/job-board/studio", "pm", job_body("Studio gig")).await;

  let (_, body) = call(&state, Method::POST, "/job-board", Some("wren"), Some(json!({}))).await;
  assert!(body["data"]["jobs"].as_array().unwrap().is_empty());

  let studio = json!({ "studioJobs": true });
  let (_, body) = call(&state, Method::POST, "/job-board", Some("wren"), Some(studio)).await;
  let jobs = body["data"]["jobs"].as_array().unwrap();
  assert_eq!(jobs.len(), 1);
  assert_eq!(jobs[0]["title"], "Studio gig");

  let (_, body) = call(
    &state,
    Method::POST,
    "/pm/job-board/studio/opportunities",
    Some("pm"),
    Some(json!({ "status": "active" })),
  )
  .await;
  assert_eq!(body["data"]["opportunities"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn closing_and_reporting() {
  let state = make_state().await;
  client(&state, "acme").await;
  writer(&state, "wren").await;
  let job = post_active(&state, "/client/job-board", "acme", job_body("Blog")).await;

  let uri = format!("/job-board/{job}/report");
  let (status, body) =
    call(&state, Method::POST, &uri, Some("wren"), Some(json!({ "reason": "spam" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["report"]["reportType"], "post");

  let uri = format!("/job-board/{job}/applications");
  let (status, body) =
    call(&state, Method::POST, &uri, Some("wren"), Some(json!({ "answer1": "hi" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errorCode"], "CRJB101");

  let close = json!({ "jobId": job, "reason": "hired elsewhere" });
  let (status, body) =
    call(&state, Method::POST, "/client/job-board/close", Some("acme"), Some(close.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Opportunity is closed.");

  let (status, body) =
    call(&state, Method::POST, "/client/job-board/close", Some("acme"), Some(close)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Can't close opportunity.");
}

// ── Lifecycle sweeper ───────────────────────────────────────────────────────

#[test]
fn sweep_interval_comes_from_config() {
  let cfg: ServerConfig = serde_json::from_value(json!({
    "host":       "127.0.0.1",
    "port":       8080,
    "store_path": "jobs.db",
  }))
  .unwrap();
  assert_eq!(cfg.sweep_interval(), Duration::from_secs(3600));

  let cfg = ServerConfig { sweep_interval_secs: 0, ..cfg };
  assert_eq!(cfg.sweep_interval(), Duration::from_secs(1));
}

#[tokio::test]
async fn sweeper_closes_expired_jobs() {
  let state = make_state().await;
  let acme = client(&state, "acme").await;
  let job = post_active(&state, "/client/job-board", "acme", job_body("Blog")).await;

  let poster = state.store.get_poster(acme).await.unwrap().unwrap();
  let mut draft = state.store.get_opportunity(job).await.unwrap().unwrap().draft;
  draft.deadline = Some(Utc::now() - chrono::Duration::hours(1));
  let request = PostRequest { existing_job_id: Some(job), pm_required: false, draft };
  posting::post_opportunity(&*state.store, &*state.notifier, &poster, request).await.unwrap();

  let sweeper = spawn_sweeper(&state);
  let mut status = OpportunityStatus::Active;
  for _ in 0..100 {
    status = state.store.get_opportunity(job).await.unwrap().unwrap().status;
    if status == OpportunityStatus::Closed {
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  sweeper.abort();
  assert_eq!(status, OpportunityStatus::Closed);
}
