//! The `ProfileStore` and `MatchStore` traits.
//!
//! Both are implemented by storage backends (`rapport-store-sqlite`, and the
//! in-memory [`crate::memory::MemoryStore`]). The engine depends on these
//! abstractions, never on a concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  matching::{Direction, Insertion, Match, MatchStatus, Transition},
  user::{UserDetails, UserId},
};

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Keyed store of resolved [`UserDetails`].
///
/// It doubles as the resolver's fallback cache and as the population the
/// recommendation engine ranks against.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Snapshot of every stored profile, in store order.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<UserDetails>, Self::Error>> + Send + '_;

  /// Retrieve one profile. Returns `None` if the user was never cached.
  fn get_profile(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<UserDetails>, Self::Error>> + Send + '_;

  /// Replace the stored profile for `details.id`. The write is atomic per key;
  /// readers never observe a partially written record.
  fn put_profile(
    &self,
    details: UserDetails,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Matches ─────────────────────────────────────────────────────────────────

/// Durable store of [`Match`] rows with at most one row per ordered
/// `(source, target)` pair.
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a match by id. Returns `None` if not found.
  fn get_match(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// Retrieve the match for the ordered pair, if any.
  fn get_by_pair(
    &self,
    source: UserId,
    target: UserId,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// Matches where `user` is the source ([`Direction::Outgoing`]) or the
  /// target ([`Direction::Incoming`]) and the status equals `status`.
  fn list_by_user_and_status(
    &self,
    user: UserId,
    status: MatchStatus,
    direction: Direction,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Insert `candidate` unless its ordered pair is already taken.
  ///
  /// The existence check and the insert are a single atomic step, so
  /// concurrent callers for the same pair observe exactly one `Created`.
  fn insert_if_absent(
    &self,
    candidate: Match,
  ) -> impl Future<Output = Result<Insertion, Self::Error>> + Send + '_;

  /// Move `match_id` from `Pending` to `status` and upsert `companions` by
  /// ordered pair, as one atomic step.
  ///
  /// The status check and the write cannot be interleaved with another
  /// transition: of two racing calls on one pending row exactly one sees
  /// [`Transition::Applied`]. Companions are written only when it applies.
  fn transition(
    &self,
    match_id: Uuid,
    status: MatchStatus,
    companions: Vec<Match>,
  ) -> impl Future<Output = Result<Transition, Self::Error>> + Send + '_;

  /// Write every row in `matches` as one transaction, keyed by ordered pair.
  ///
  /// A row whose pair already exists only has its `status` updated; its id,
  /// score, and creation time are kept.
  fn upsert_all(
    &self,
    matches: Vec<Match>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Single-row form of [`MatchStore::upsert_all`].
  fn upsert(
    &self,
    m: Match,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    self.upsert_all(vec![m])
  }
}
