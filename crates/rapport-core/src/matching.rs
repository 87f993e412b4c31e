//! The `Match` entity — a directed request from one user to another.
//!
//! Matches are keyed by the *ordered* pair `(source, target)`. The reverse
//! pair is a separate row that the lifecycle keeps in step on acceptance.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::{UserDetails, UserId, UserSummary};

/// Where a match sits in its state machine. `Accepted` and `Rejected` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
  Pending,
  Accepted,
  Rejected,
}

impl MatchStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Accepted => "accepted",
      Self::Rejected => "rejected",
    }
  }
}

impl fmt::Display for MatchStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A persisted match row. `score` never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
  pub match_id:       Uuid,
  pub source_user_id: UserId,
  pub target_user_id: UserId,
  pub score:          f64,
  pub status:         MatchStatus,
  pub created_at:     DateTime<Utc>,
}

impl Match {
  /// A fresh request from `source` to `target`.
  pub fn pending(source: UserId, target: UserId, score: f64) -> Self {
    Self {
      match_id: Uuid::new_v4(),
      source_user_id: source,
      target_user_id: target,
      score,
      status: MatchStatus::Pending,
      created_at: Utc::now(),
    }
  }

  /// The reverse-ordered row created when this match is accepted and no
  /// reverse request exists yet. It skips `Pending`.
  pub fn accepted_reciprocal(&self) -> Self {
    Self {
      match_id:       Uuid::new_v4(),
      source_user_id: self.target_user_id,
      target_user_id: self.source_user_id,
      score:          self.score,
      status:         MatchStatus::Accepted,
      created_at:     Utc::now(),
    }
  }
}

/// Which side of a match a user is on when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// The user sent the request (`source_user_id`).
  Outgoing,
  /// The user received the request (`target_user_id`).
  Incoming,
}

/// Result of [`crate::store::MatchStore::insert_if_absent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
  Created(Match),
  /// A row already held the ordered pair; it is returned untouched.
  Existing(Match),
}

impl Insertion {
  pub fn into_match(self) -> Match {
    match self {
      Self::Created(m) | Self::Existing(m) => m,
    }
  }
}

/// Result of [`crate::store::MatchStore::transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
  /// The row was `Pending` and now holds the requested status.
  Applied(Match),
  /// The row had already left `Pending`; nothing was written.
  NotPending(Match),
  Missing,
}

/// A match with both parties resolved, as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
  pub match_id:    Uuid,
  pub source_user: UserSummary,
  pub target_user: UserSummary,
  pub score:       f64,
  pub status:      MatchStatus,
  pub created_at:  DateTime<Utc>,
}

impl MatchView {
  pub fn new(m: &Match, source: &UserDetails, target: &UserDetails) -> Self {
    Self {
      match_id:    m.match_id,
      source_user: source.summary(),
      target_user: target.summary(),
      score:       m.score,
      status:      m.status,
      created_at:  m.created_at,
    }
  }
}
