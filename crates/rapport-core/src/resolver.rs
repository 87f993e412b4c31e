//! [`UserDetailsResolver`] — merges the two upstream lookups and falls back to
//! the last cached record when either lookup fails.
//!
//! The cache is written only on a successful live resolution, and read only
//! when live resolution fails. Entries never expire.

use std::{future::Future, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  store::ProfileStore,
  upstream::{IdentityLookup, ProfileLookup},
  user::{UserDetails, UserId},
};

/// Bound applied to each upstream call unless overridden.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

// ─── Directory ───────────────────────────────────────────────────────────────

/// Source of resolved users for the recommendation engine and the lifecycle.
pub trait Directory: Send + Sync {
  /// Resolve one user, live or from the fallback cache.
  fn resolve(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<UserDetails>> + Send + '_;

  /// Snapshot of every known profile, in store order.
  fn population(&self) -> impl Future<Output = Result<Vec<UserDetails>>> + Send + '_;
}

// ─── Live failure ────────────────────────────────────────────────────────────

/// Why a live resolution did not produce a record. Only ever logged; callers
/// see either the cached value or [`Error::UpstreamUnavailable`].
#[derive(Debug, Error)]
enum LiveFailure {
  #[error("{lookup} lookup timed out after {after:?}")]
  Timeout { lookup: &'static str, after: Duration },

  #[error("{lookup} lookup failed: {source}")]
  Lookup {
    lookup: &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

/// Await `call` for at most `after`, flattening both failure modes.
async fn bounded<T, E, F>(lookup: &'static str, after: Duration, call: F) -> Result<T, LiveFailure>
where
  F: Future<Output = Result<T, E>>,
  E: std::error::Error + Send + Sync + 'static,
{
  match tokio::time::timeout(after, call).await {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(e)) => Err(LiveFailure::Lookup { lookup, source: Box::new(e) }),
    Err(_) => Err(LiveFailure::Timeout { lookup, after }),
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Two-source resolver with an injected fallback cache.
pub struct UserDetailsResolver<I, P, S> {
  identity: I,
  profiles: P,
  cache:    S,
  timeout:  Duration,
}

impl<I, P, S> UserDetailsResolver<I, P, S>
where
  I: IdentityLookup,
  P: ProfileLookup,
  S: ProfileStore,
{
  pub fn new(identity: I, profiles: P, cache: S) -> Self {
    Self { identity, profiles, cache, timeout: DEFAULT_LOOKUP_TIMEOUT }
  }

  /// Override the per-lookup timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn cache(&self) -> &S { &self.cache }

  /// Resolve `id`, preferring live data and falling back to the cache.
  pub async fn resolve(&self, id: UserId) -> Result<UserDetails> {
    match self.fetch_live(id).await {
      Ok(details) => {
        // A failed cache write must not hide fresh upstream data.
        if let Err(e) = self.cache.put_profile(details.clone()).await {
          warn!(user_id = %id, error = %e, "failed to cache user details");
        }
        Ok(details)
      }
      Err(failure) => {
        warn!(user_id = %id, error = %failure, "live resolution failed, using cache");
        match self.cache.get_profile(id).await {
          Ok(Some(cached)) => Ok(cached),
          Ok(None) => Err(Error::UpstreamUnavailable(id)),
          Err(e) => {
            warn!(user_id = %id, error = %e, "cache read failed");
            Err(Error::UpstreamUnavailable(id))
          }
        }
      }
    }
  }

  async fn fetch_live(&self, id: UserId) -> Result<UserDetails, LiveFailure> {
    let info = bounded("identity", self.timeout, self.identity.basic_info(id)).await?;
    let profile = bounded("profile", self.timeout, self.profiles.profile(id)).await?;
    debug!(user_id = %id, "resolved user details from upstream");
    Ok(UserDetails::merge(id, info, profile))
  }
}

impl<I, P, S> Directory for UserDetailsResolver<I, P, S>
where
  I: IdentityLookup,
  P: ProfileLookup,
  S: ProfileStore,
{
  async fn resolve(&self, id: UserId) -> Result<UserDetails> {
    UserDetailsResolver::resolve(self, id).await
  }

  async fn population(&self) -> Result<Vec<UserDetails>> {
    self.cache.list_profiles().await.map_err(Error::store)
  }
}
