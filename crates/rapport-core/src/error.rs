//! Error types for `rapport-core`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{matching::MatchStatus, user::UserId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("match not found: {0}")]
  MatchNotFound(Uuid),

  #[error("user {0} cannot request a match with themselves")]
  SelfMatch(UserId),

  #[error("user {user} is not the target of match {match_id}")]
  NotTarget { user: UserId, match_id: Uuid },

  #[error("match {match_id} is already {status}")]
  NotPending { match_id: Uuid, status: MatchStatus },

  /// Live resolution failed and nothing was cached for the user.
  #[error("user details unavailable for user {0}")]
  UpstreamUnavailable(UserId),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a store implementation.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// The taxonomy bucket this error belongs to.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::MatchNotFound(_) => ErrorKind::NotFound,
      Self::SelfMatch(_) => ErrorKind::InvalidRequest,
      Self::NotTarget { .. } => ErrorKind::Forbidden,
      Self::NotPending { .. } => ErrorKind::InvalidState,
      Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
      Self::Store(_) => ErrorKind::Internal,
    }
  }
}

/// Coarse classification that lets callers choose between retrying and
/// surfacing an error without inspecting its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  InvalidRequest,
  Forbidden,
  InvalidState,
  UpstreamUnavailable,
  /// A store backend failed.
  Internal,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::NotFound => "not_found",
      Self::InvalidRequest => "invalid_request",
      Self::Forbidden => "forbidden",
      Self::InvalidState => "invalid_state",
      Self::UpstreamUnavailable => "upstream_unavailable",
      Self::Internal => "internal",
    })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
