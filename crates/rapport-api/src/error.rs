//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rapport_core::ErrorKind;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] rapport_core::Error),
}

impl ApiError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ApiError::BadRequest(_) => ErrorKind::InvalidRequest,
      ApiError::Core(e) => e.kind(),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
    ErrorKind::Forbidden => StatusCode::FORBIDDEN,
    ErrorKind::InvalidState => StatusCode::CONFLICT,
    ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let kind = self.kind();
    if kind == ErrorKind::Internal {
      error!(error = %self, "request failed");
    }
    let body = json!({ "error": self.to_string(), "kind": kind });
    (status_for(kind), Json(body)).into_response()
  }
}
