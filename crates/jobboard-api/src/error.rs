//! HTTP error type and the JSON error envelope.
//!
//! Every failure renders as
//! `{"success": false, "status", "error", "message", "errorCode"}`.

use axum::{
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use jobboard_core::Rejection;
use serde_json::json;
use thiserror::Error;

/// `errorCode` of request-shape failures.
const VALIDATION_CODE: &str = "GL100";

#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or wrong credentials.
  #[error("Not Authorized.")]
  Unauthorized,

  /// Authenticated, but the account's role cannot use this route.
  #[error("{0}")]
  Forbidden(&'static str),

  /// The request body, path or query failed to parse or validate.
  #[error("{0}")]
  Validation(String),

  #[error(transparent)]
  Domain(#[from] jobboard_core::Error),
}

impl ApiError {
  fn parts(&self) -> (StatusCode, &'static str, &'static str) {
    match self {
      Self::Unauthorized => (StatusCode::UNAUTHORIZED, "NotAuthorized", "CND"),
      Self::Forbidden(_) => (StatusCode::FORBIDDEN, "ForbiddenRequest", "CND"),
      Self::Validation(_) => (StatusCode::BAD_REQUEST, "BadRequest", VALIDATION_CODE),
      Self::Domain(e) => match e.rejection() {
        Rejection::BadRequest => (StatusCode::BAD_REQUEST, "BadRequest", e.code()),
        Rejection::NotAuthorized => (StatusCode::UNAUTHORIZED, "NotAuthorized", e.code()),
        Rejection::Internal => {
          (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", e.code())
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, name, code) = self.parts();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %self, "request failed");
      "Something went wrong.".to_owned()
    } else {
      tracing::debug!(error = %self, code, "request rejected");
      self.to_string()
    };

    let body = json!({
      "success":   false,
      "status":    status.as_u16(),
      "error":     name,
      "message":   message,
      "errorCode": code,
    });
    let mut res = (status, axum::Json(body)).into_response();
    if matches!(self, Self::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"job-board\""),
      );
    }
    res
  }
}

// ─── Extractor rejections ────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::Validation(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::Validation(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::Validation(rejection.body_text()) }
}

impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self { Self::Validation(errors.to_string()) }
}
