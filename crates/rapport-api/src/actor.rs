//! The acting user, taken from the `X-User-ID` request header.
//!
//! Authentication happens upstream of this service; the header is trusted.

use axum::{extract::FromRequestParts, http::request::Parts};
use rapport_core::user::UserId;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the caller's [`UserId`]. Rejects with 400 when the header is
/// missing or not an integer.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(USER_ID_HEADER)
      .ok_or_else(|| ApiError::BadRequest("missing X-User-ID header".into()))?;

    raw
      .to_str()
      .ok()
      .and_then(|s| s.parse().ok())
      .map(ActingUser)
      .ok_or_else(|| ApiError::BadRequest("X-User-ID must be an integer user id".into()))
  }
}
