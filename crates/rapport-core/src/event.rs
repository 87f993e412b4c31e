//! Domain events emitted on match state transitions.
//!
//! Events are published after the transition is persisted. The core never
//! consumes them; notification and audit collaborators do.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::matching::Match;

/// One per state transition, carrying the full match snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "match", rename_all = "snake_case")]
pub enum MatchEvent {
  MatchRequested(Match),
  MatchAccepted(Match),
  MatchRejected(Match),
}

impl MatchEvent {
  pub fn name(&self) -> &'static str {
    match self {
      Self::MatchRequested(_) => "match_requested",
      Self::MatchAccepted(_) => "match_accepted",
      Self::MatchRejected(_) => "match_rejected",
    }
  }

  pub fn snapshot(&self) -> &Match {
    match self {
      Self::MatchRequested(m) | Self::MatchAccepted(m) | Self::MatchRejected(m) => m,
    }
  }
}

/// Receiver of [`MatchEvent`]s. Publishing must not block or fail the
/// transition that produced the event.
pub trait EventSink: Send + Sync {
  fn publish(&self, event: MatchEvent);
}

/// Discards every event.
impl EventSink for () {
  fn publish(&self, _event: MatchEvent) {}
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
  fn publish(&self, event: MatchEvent) {
    let m = event.snapshot();
    info!(
      event = event.name(),
      match_id = %m.match_id,
      source_user_id = %m.source_user_id,
      target_user_id = %m.target_user_id,
      status = %m.status,
      score = m.score,
      "match event"
    );
  }
}
