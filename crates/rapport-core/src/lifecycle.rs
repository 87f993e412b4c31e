//! [`MatchLifecycle`] — the match state machine.
//!
//! ```text
//!            accept            (reverse row forced to Accepted)
//!   Pending ───────▶ Accepted
//!      │
//!      └───────────▶ Rejected  (reverse row untouched)
//!            reject
//! ```
//!
//! Both end states are terminal. Only the target of a match may move it out
//! of `Pending`. Both parties are resolved before anything is written, so a
//! failed resolution never leaves a row behind.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  event::{EventSink, MatchEvent},
  matching::{Direction, Insertion, Match, MatchStatus, MatchView, Transition},
  recommend::RecommendationEngine,
  resolver::Directory,
  store::MatchStore,
  user::{UserDetails, UserId},
};

/// Score given to a new match when the target does not appear in the
/// requester's ranked recommendations.
pub const DEFAULT_MATCH_SCORE: f64 = 0.5;

/// Both resolved parties of a match.
struct Parties {
  source: UserDetails,
  target: UserDetails,
}

impl Parties {
  fn view(&self, m: &Match) -> MatchView { MatchView::new(m, &self.source, &self.target) }
}

pub struct MatchLifecycle<D, M> {
  engine:        RecommendationEngine<D>,
  matches:       M,
  events:        Arc<dyn EventSink>,
  /// Cap on the ranked list consulted when scoring a request; `None` ranks the
  /// whole population.
  scoring_limit: Option<usize>,
}

impl<D, M> MatchLifecycle<D, M>
where
  D: Directory,
  M: MatchStore,
{
  pub fn new(engine: RecommendationEngine<D>, matches: M) -> Self {
    Self { engine, matches, events: Arc::new(()), scoring_limit: None }
  }

  pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
    self.events = Arc::new(sink);
    self
  }

  pub fn with_scoring_limit(mut self, limit: Option<usize>) -> Self {
    self.scoring_limit = limit;
    self
  }

  pub fn engine(&self) -> &RecommendationEngine<D> { &self.engine }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// Request a match from `source` to `target`.
  ///
  /// Idempotent: if the ordered pair already has a row it is returned as-is,
  /// whatever its status, without re-scoring.
  pub async fn request_match(&self, source: UserId, target: UserId) -> Result<Match> {
    Ok(self.request(source, target).await?.0)
  }

  /// [`Self::request_match`], returning the match with both parties.
  pub async fn request_match_view(&self, source: UserId, target: UserId) -> Result<MatchView> {
    let (m, parties) = self.request(source, target).await?;
    Ok(parties.view(&m))
  }

  /// Accept a pending match as its target. Both ordered rows for the pair end
  /// up `Accepted`, written in one transaction.
  pub async fn accept_match(&self, actor: UserId, match_id: Uuid) -> Result<Match> {
    Ok(self.accept(actor, match_id).await?.0)
  }

  pub async fn accept_match_view(&self, actor: UserId, match_id: Uuid) -> Result<MatchView> {
    let (m, parties) = self.accept(actor, match_id).await?;
    Ok(parties.view(&m))
  }

  /// Reject a pending match as its target. The reverse row is not touched.
  pub async fn reject_match(&self, actor: UserId, match_id: Uuid) -> Result<Match> {
    Ok(self.reject(actor, match_id).await?.0)
  }

  pub async fn reject_match_view(&self, actor: UserId, match_id: Uuid) -> Result<MatchView> {
    let (m, parties) = self.reject(actor, match_id).await?;
    Ok(parties.view(&m))
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  /// Pending requests `user` has sent.
  pub async fn outgoing_pending(&self, user: UserId) -> Result<Vec<Match>> {
    self.list(user, MatchStatus::Pending, Direction::Outgoing).await
  }

  /// Pending requests `user` has received.
  pub async fn incoming_pending(&self, user: UserId) -> Result<Vec<Match>> {
    self.list(user, MatchStatus::Pending, Direction::Incoming).await
  }

  /// Accepted matches on either side of `user`: outgoing rows first, then
  /// incoming, each in store order.
  pub async fn connections(&self, user: UserId) -> Result<Vec<Match>> {
    let mut all = self.list(user, MatchStatus::Accepted, Direction::Outgoing).await?;
    all.extend(self.list(user, MatchStatus::Accepted, Direction::Incoming).await?);
    Ok(all)
  }

  /// Resolve both parties of `m` for presentation.
  pub async fn describe(&self, m: &Match) -> Result<MatchView> {
    Ok(self.parties(m).await?.view(m))
  }

  pub async fn describe_all(&self, matches: &[Match]) -> Result<Vec<MatchView>> {
    let mut views = Vec::with_capacity(matches.len());
    for m in matches {
      views.push(self.describe(m).await?);
    }
    Ok(views)
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  async fn request(&self, source: UserId, target: UserId) -> Result<(Match, Parties)> {
    if source == target {
      return Err(Error::SelfMatch(source));
    }

    if let Some(existing) = self.matches.get_by_pair(source, target).await.map_err(Error::store)? {
      info!(
        match_id = %existing.match_id,
        status = %existing.status,
        "match already exists for pair"
      );
      let parties = self.parties(&existing).await?;
      return Ok((existing, parties));
    }

    let directory = self.engine.directory();
    let source_details = directory.resolve(source).await?;
    // Scored against the population as it stood before the target resolved.
    let score = self.score_for(&source_details, target).await?;
    let parties = Parties { source: source_details, target: directory.resolve(target).await? };

    let insertion = self
      .matches
      .insert_if_absent(Match::pending(source, target, score))
      .await
      .map_err(Error::store)?;

    match insertion {
      Insertion::Created(m) => {
        info!(
          match_id = %m.match_id,
          source_user_id = %source,
          target_user_id = %target,
          score = m.score,
          "match requested"
        );
        self.events.publish(MatchEvent::MatchRequested(m.clone()));
        Ok((m, parties))
      }
      // Lost a race with a concurrent request for the same pair.
      Insertion::Existing(m) => Ok((m, parties)),
    }
  }

  async fn accept(&self, actor: UserId, match_id: Uuid) -> Result<(Match, Parties)> {
    let pending = self.pending_for_target(actor, match_id).await?;
    let parties = self.parties(&pending).await?;

    let reciprocal = match self
      .matches
      .get_by_pair(pending.target_user_id, pending.source_user_id)
      .await
      .map_err(Error::store)?
    {
      Some(mut existing) => {
        existing.status = MatchStatus::Accepted;
        existing
      }
      None => pending.accepted_reciprocal(),
    };

    let accepted = self.settle(match_id, MatchStatus::Accepted, vec![reciprocal]).await?;

    info!(match_id = %match_id, user_id = %actor, "match accepted");
    self.events.publish(MatchEvent::MatchAccepted(accepted.clone()));
    Ok((accepted, parties))
  }

  async fn reject(&self, actor: UserId, match_id: Uuid) -> Result<(Match, Parties)> {
    let pending = self.pending_for_target(actor, match_id).await?;
    let parties = self.parties(&pending).await?;

    let rejected = self.settle(match_id, MatchStatus::Rejected, Vec::new()).await?;

    info!(match_id = %match_id, user_id = %actor, "match rejected");
    self.events.publish(MatchEvent::MatchRejected(rejected.clone()));
    Ok((rejected, parties))
  }

  /// Score from the requester's ranked recommendations, or
  /// [`DEFAULT_MATCH_SCORE`] when the target is not among them.
  async fn score_for(&self, source: &UserDetails, target: UserId) -> Result<f64> {
    let limit = self.scoring_limit.unwrap_or(usize::MAX);
    let ranked = self.engine.recommend_for(source, limit).await?;
    Ok(
      ranked
        .iter()
        .find(|r| r.user.id == target)
        .map_or(DEFAULT_MATCH_SCORE, |r| r.score),
    )
  }

  async fn parties(&self, m: &Match) -> Result<Parties> {
    let directory = self.engine.directory();
    Ok(Parties {
      source: directory.resolve(m.source_user_id).await?,
      target: directory.resolve(m.target_user_id).await?,
    })
  }

  /// Load `match_id` and check that `actor` may move it out of `Pending`.
  async fn pending_for_target(&self, actor: UserId, match_id: Uuid) -> Result<Match> {
    let m = self
      .matches
      .get_match(match_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MatchNotFound(match_id))?;

    if m.target_user_id != actor {
      return Err(Error::NotTarget { user: actor, match_id });
    }
    if m.status.is_terminal() {
      return Err(Error::NotPending { match_id, status: m.status });
    }
    Ok(m)
  }

  /// Apply the status change in the store, which re-checks `Pending` under its
  /// own lock; a concurrent transition that got there first surfaces here.
  async fn settle(&self, match_id: Uuid, status: MatchStatus, companions: Vec<Match>) -> Result<Match> {
    match self
      .matches
      .transition(match_id, status, companions)
      .await
      .map_err(Error::store)?
    {
      Transition::Applied(m) => Ok(m),
      Transition::NotPending(m) => Err(Error::NotPending { match_id, status: m.status }),
      Transition::Missing => Err(Error::MatchNotFound(match_id)),
    }
  }

  async fn list(&self, user: UserId, status: MatchStatus, direction: Direction) -> Result<Vec<Match>> {
    self
      .matches
      .list_by_user_and_status(user, status, direction)
      .await
      .map_err(Error::store)
  }
}
