//! HTTP server for Rapport.
//!
//! Mounts the JSON API under `/api` next to a `/health` check, and wires the
//! resolver, stores and upstream clients together from a [`ServerConfig`].

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use rapport_core::{
  event::LogSink,
  lifecycle::MatchLifecycle,
  recommend::RecommendationEngine,
  resolver::{Directory, UserDetailsResolver},
  store::{MatchStore, ProfileStore},
  upstream::{IdentityLookup, ProfileLookup},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which backend holds profiles and matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
  #[default]
  Sqlite,
  Memory,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  #[serde(default)]
  pub store:               StoreKind,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  pub identity_url:        String,
  pub profile_url:         String,
  #[serde(default = "default_upstream_timeout_ms")]
  pub upstream_timeout_ms: u64,
  /// Cap on the ranked list consulted when scoring a match request.
  #[serde(default)]
  pub scoring_limit:       Option<usize>,
}

fn default_store_path() -> PathBuf { PathBuf::from("rapport.db") }

fn default_upstream_timeout_ms() -> u64 { 3000 }

impl ServerConfig {
  pub fn upstream_timeout(&self) -> Duration { Duration::from_millis(self.upstream_timeout_ms) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

/// Assemble the match lifecycle over `store`, which serves as both the
/// resolver's cache and the match store.
pub fn lifecycle<I, P, S>(
  config: &ServerConfig,
  identity: I,
  profiles: P,
  store: S,
) -> MatchLifecycle<UserDetailsResolver<I, P, S>, S>
where
  I: IdentityLookup,
  P: ProfileLookup,
  S: ProfileStore + MatchStore + Clone,
{
  let resolver = UserDetailsResolver::new(identity, profiles, store.clone())
    .with_timeout(config.upstream_timeout());
  MatchLifecycle::new(RecommendationEngine::new(resolver), store)
    .with_events(LogSink)
    .with_scoring_limit(config.scoring_limit)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level axum [`Router`].
pub fn router<D, M>(lifecycle: Arc<MatchLifecycle<D, M>>) -> Router
where
  D: Directory + 'static,
  M: MatchStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", rapport_api::api_router(lifecycle))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
