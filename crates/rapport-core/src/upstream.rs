//! Read-only lookups against the identity and profile services.
//!
//! Implemented over HTTP by `rapport-upstream`; tests substitute fakes.

use std::future::Future;

use crate::user::{BasicInfo, Profile, UserId};

/// Name and email for a user. Fails on not-found or when unreachable.
pub trait IdentityLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn basic_info(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<BasicInfo, Self::Error>> + Send + '_;
}

/// Department, skills, interests and career stage for a user. Fails on
/// not-found or when unreachable.
pub trait ProfileLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn profile(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;
}
