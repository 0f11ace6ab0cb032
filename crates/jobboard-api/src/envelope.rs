//! The success envelope: `{"success": true, "status": 200, "message", "data"}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

pub struct Reply<T> {
  message: &'static str,
  data:    T,
}

impl<T: Serialize> Reply<T> {
  pub fn ok(data: T) -> Self { Self { message: "OK", data } }

  pub fn with_message(message: &'static str, data: T) -> Self { Self { message, data } }
}

#[derive(Serialize)]
struct Body<T> {
  success: bool,
  status:  u16,
  message: &'static str,
  data:    T,
}

impl<T: Serialize> IntoResponse for Reply<T> {
  fn into_response(self) -> Response {
    let body = Body {
      success: true,
      status:  StatusCode::OK.as_u16(),
      message: self.message,
      data:    self.data,
    };
    (StatusCode::OK, Json(body)).into_response()
  }
}
