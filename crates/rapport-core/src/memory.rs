//! [`MemoryStore`] — a process-local implementation of both store traits.
//!
//! Used by tests and by servers configured without a database. State lives
//! behind one async mutex, so every trait method is atomic with respect to the
//! others.

use std::{collections::BTreeMap, convert::Infallible, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
  matching::{Direction, Insertion, Match, MatchStatus, Transition},
  store::{MatchStore, ProfileStore},
  user::{UserDetails, UserId},
};

#[derive(Default)]
struct State {
  profiles: BTreeMap<UserId, UserDetails>,
  /// Rows in insertion order; that order is the store order for listings.
  matches:  Vec<Match>,
}

impl State {
  fn position_of_pair(&self, source: UserId, target: UserId) -> Option<usize> {
    self
      .matches
      .iter()
      .position(|m| m.source_user_id == source && m.target_user_id == target)
  }

  /// Keyed by ordered pair; an existing row only takes the new status.
  fn upsert(&mut self, m: Match) {
    match self.position_of_pair(m.source_user_id, m.target_user_id) {
      Some(i) => self.matches[i].status = m.status,
      None => self.matches.push(m),
    }
  }
}

/// Cloning is cheap — clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<State>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl ProfileStore for MemoryStore {
  type Error = Infallible;

  async fn list_profiles(&self) -> Result<Vec<UserDetails>, Infallible> {
    Ok(self.state.lock().await.profiles.values().cloned().collect())
  }

  async fn get_profile(&self, id: UserId) -> Result<Option<UserDetails>, Infallible> {
    Ok(self.state.lock().await.profiles.get(&id).cloned())
  }

  async fn put_profile(&self, details: UserDetails) -> Result<(), Infallible> {
    self.state.lock().await.profiles.insert(details.id, details);
    Ok(())
  }
}

impl MatchStore for MemoryStore {
  type Error = Infallible;

  async fn get_match(&self, id: Uuid) -> Result<Option<Match>, Infallible> {
    let state = self.state.lock().await;
    Ok(state.matches.iter().find(|m| m.match_id == id).cloned())
  }

  async fn get_by_pair(
    &self,
    source: UserId,
    target: UserId,
  ) -> Result<Option<Match>, Infallible> {
    let state = self.state.lock().await;
    Ok(state.position_of_pair(source, target).map(|i| state.matches[i].clone()))
  }

  async fn list_by_user_and_status(
    &self,
    user: UserId,
    status: MatchStatus,
    direction: Direction,
  ) -> Result<Vec<Match>, Infallible> {
    let state = self.state.lock().await;
    Ok(
      state
        .matches
        .iter()
        .filter(|m| m.status == status)
        .filter(|m| match direction {
          Direction::Outgoing => m.source_user_id == user,
          Direction::Incoming => m.target_user_id == user,
        })
        .cloned()
        .collect(),
    )
  }

  async fn insert_if_absent(&self, candidate: Match) -> Result<Insertion, Infallible> {
    let mut state = self.state.lock().await;
    if let Some(i) = state.position_of_pair(candidate.source_user_id, candidate.target_user_id) {
      return Ok(Insertion::Existing(state.matches[i].clone()));
    }
    state.matches.push(candidate.clone());
    Ok(Insertion::Created(candidate))
  }

  async fn transition(
    &self,
    match_id: Uuid,
    status: MatchStatus,
    companions: Vec<Match>,
  ) -> Result<Transition, Infallible> {
    let mut state = self.state.lock().await;
    let Some(i) = state.matches.iter().position(|m| m.match_id == match_id) else {
      return Ok(Transition::Missing);
    };
    if state.matches[i].status.is_terminal() {
      return Ok(Transition::NotPending(state.matches[i].clone()));
    }

    state.matches[i].status = status;
    let applied = state.matches[i].clone();
    for m in companions {
      state.upsert(m);
    }
    Ok(Transition::Applied(applied))
  }

  async fn upsert_all(&self, matches: Vec<Match>) -> Result<(), Infallible> {
    let mut state = self.state.lock().await;
    for m in matches {
      state.upsert(m);
    }
    Ok(())
  }
}
