//! Test doubles shared by the core unit tests.

use std::{
  collections::{BTreeSet, HashMap},
  sync::{
    Arc, RwLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
  },
  time::Duration,
};

use thiserror::Error;

use crate::{
  store::ProfileStore,
  upstream::{IdentityLookup, ProfileLookup},
  user::{BasicInfo, Profile, UserDetails, UserId},
};

pub fn set(items: &[&str]) -> BTreeSet<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// A user named `user-<id>`.
pub fn details(
  id: i64,
  department: &str,
  skills: &[&str],
  interests: &[&str],
  career_stage: &str,
) -> UserDetails {
  UserDetails {
    id:           UserId(id),
    name:         format!("user-{id}"),
    department:   department.to_string(),
    skills:       set(skills),
    interests:    set(interests),
    career_stage: career_stage.to_string(),
  }
}

#[derive(Debug, Error)]
pub enum LookupError {
  #[error("user {0} not found")]
  NotFound(UserId),
  #[error("upstream unreachable")]
  Unreachable,
}

/// In-process stand-in for both upstream services.
#[derive(Clone, Default)]
pub struct Lookups {
  users:    Arc<RwLock<HashMap<UserId, UserDetails>>>,
  failing:  Arc<AtomicBool>,
  delay_ms: Arc<AtomicU64>,
}

impl Lookups {
  pub fn add(&self, user: UserDetails) {
    self.users.write().unwrap().insert(user.id, user);
  }

  pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

  pub fn set_delay(&self, delay: Duration) {
    self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
  }

  async fn find(&self, id: UserId) -> Result<UserDetails, LookupError> {
    let delay = self.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
      tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if self.failing.load(Ordering::SeqCst) {
      return Err(LookupError::Unreachable);
    }
    self.users.read().unwrap().get(&id).cloned().ok_or(LookupError::NotFound(id))
  }
}

impl IdentityLookup for Lookups {
  type Error = LookupError;

  async fn basic_info(&self, id: UserId) -> Result<BasicInfo, LookupError> {
    let user = self.find(id).await?;
    Ok(BasicInfo { id, name: user.name, email: format!("user-{id}@example.com") })
  }
}

impl ProfileLookup for Lookups {
  type Error = LookupError;

  async fn profile(&self, id: UserId) -> Result<Profile, LookupError> {
    let user = self.find(id).await?;
    Ok(Profile {
      user_id:      id,
      department:   user.department,
      skills:       user.skills,
      interests:    user.interests,
      career_stage: user.career_stage,
    })
  }
}

/// A profile store whose every call fails.
#[derive(Clone, Copy, Default)]
pub struct BrokenCache;

impl ProfileStore for BrokenCache {
  type Error = LookupError;

  async fn list_profiles(&self) -> Result<Vec<UserDetails>, LookupError> {
    Err(LookupError::Unreachable)
  }

  async fn get_profile(&self, _id: UserId) -> Result<Option<UserDetails>, LookupError> {
    Err(LookupError::Unreachable)
  }

  async fn put_profile(&self, _details: UserDetails) -> Result<(), LookupError> {
    Err(LookupError::Unreachable)
  }
}
