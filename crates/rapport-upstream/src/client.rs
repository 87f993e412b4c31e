//! Async HTTP clients for the identity and profile services.

use std::time::Duration;

use rapport_core::{
  upstream::{IdentityLookup, ProfileLookup},
  user::{BasicInfo, Profile, UserId},
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Error, Result};

/// Connection settings shared by both clients.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl UpstreamConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), timeout: Duration::from_secs(3) }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }
}

/// JSON-over-HTTP plumbing common to both services.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
struct JsonService {
  client:   Client,
  base_url: String,
}

impl JsonService {
  fn new(config: UpstreamConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, base_url: config.base_url })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn get<T: DeserializeOwned>(&self, id: UserId, path: &str) -> Result<T> {
    let url = self.url(path);
    debug!(%url, "upstream lookup");

    let resp = self.client.get(&url).send().await?;
    match resp.status() {
      s if s.is_success() => Ok(resp.json().await?),
      StatusCode::NOT_FOUND => Err(Error::NotFound(id)),
      status => Err(Error::Status { url, status }),
    }
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// Client for the identity service: `GET /api/auth/users/{id}/basic`.
#[derive(Clone)]
pub struct HttpIdentityLookup {
  service: JsonService,
}

impl HttpIdentityLookup {
  pub fn new(config: UpstreamConfig) -> Result<Self> {
    Ok(Self { service: JsonService::new(config)? })
  }
}

impl IdentityLookup for HttpIdentityLookup {
  type Error = Error;

  async fn basic_info(&self, id: UserId) -> Result<BasicInfo> {
    self.service.get(id, &format!("/api/auth/users/{id}/basic")).await
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Client for the profile service: `GET /api/profiles/{id}`.
#[derive(Clone)]
pub struct HttpProfileLookup {
  service: JsonService,
}

impl HttpProfileLookup {
  pub fn new(config: UpstreamConfig) -> Result<Self> {
    Ok(Self { service: JsonService::new(config)? })
  }
}

impl ProfileLookup for HttpProfileLookup {
  type Error = Error;

  async fn profile(&self, id: UserId) -> Result<Profile> {
    self.service.get(id, &format!("/api/profiles/{id}")).await
  }
}
