//! User records as seen by the matching engine.
//!
//! Two upstream services own the raw data: the identity service knows a
//! user's name and email, the profile service knows what they work on. The
//! engine only ever works with the merged [`UserDetails`].

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Identifier assigned to a user by the identity service.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for UserId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
}

impl From<i64> for UserId {
  fn from(id: i64) -> Self { Self(id) }
}

// ─── Upstream payloads ───────────────────────────────────────────────────────

/// Identity-service view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
  pub id:    UserId,
  pub name:  String,
  pub email: String,
}

/// Profile-service view of a user. Fields the engine does not score on are
/// ignored during deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub user_id:      UserId,
  pub department:   String,
  #[serde(default)]
  pub skills:       BTreeSet<String>,
  #[serde(default)]
  pub interests:    BTreeSet<String>,
  pub career_stage: String,
}

// ─── Merged record ───────────────────────────────────────────────────────────

/// The merged identity + profile record. Always replaced wholesale; no field
/// is updated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
  pub id:           UserId,
  pub name:         String,
  pub department:   String,
  pub skills:       BTreeSet<String>,
  pub interests:    BTreeSet<String>,
  pub career_stage: String,
}

impl UserDetails {
  /// Merge the two upstream responses for `id`.
  pub fn merge(id: UserId, info: BasicInfo, profile: Profile) -> Self {
    Self {
      id,
      name: info.name,
      department: profile.department,
      skills: profile.skills,
      interests: profile.interests,
      career_stage: profile.career_stage,
    }
  }

  pub fn summary(&self) -> UserSummary {
    UserSummary {
      id:         self.id,
      name:       self.name.clone(),
      department: self.department.clone(),
      skills:     self.skills.clone(),
    }
  }
}

/// The public-facing slice of [`UserDetails`] embedded in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
  pub id:         UserId,
  pub name:       String,
  pub department: String,
  pub skills:     BTreeSet<String>,
}
