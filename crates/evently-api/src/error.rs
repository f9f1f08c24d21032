//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Identity required but absent or invalid.
  #[error("Authentication credentials were not provided or are invalid.")]
  Unauthenticated,

  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  #[error("not found: {0}")]
  NotFound(String),

  /// Field-level client error, including uniqueness violations.
  #[error("{field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Convert a backend error, keeping conflicts and bad references as
  /// client errors.
  pub fn store<E: Into<evently_core::Error>>(e: E) -> Self {
    let core: evently_core::Error = e.into();
    core.into()
  }
}

impl From<evently_core::Error> for ApiError {
  fn from(e: evently_core::Error) -> Self {
    use evently_core::Error as Core;
    match e {
      Core::Validation { field, message } | Core::Conflict { field, message } => {
        ApiError::Validation { field, message }
      }
      Core::UserNotFound(id) => ApiError::NotFound(format!("user {id} not found")),
      Core::EventNotFound(id) => ApiError::NotFound(format!("event {id} not found")),
      Core::Storage(e) => ApiError::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    tracing::debug!(reason = %rejection.body_text(), "unmatched path parameter");
    ApiError::NotFound("Not found.".to_owned())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Unauthenticated => {
        (StatusCode::UNAUTHORIZED, json!({ "error": self.to_string() }))
      }
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, json!({ "error": m })),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Validation { field, message } => (
        StatusCode::BAD_REQUEST,
        json!({ "error": message, "field": field }),
      ),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal server error." }))
      }
    };

    let mut res = (status, Json(body)).into_response();
    if matches!(self, ApiError::Unauthenticated) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"evently\""),
      );
    }
    res
  }
}
