//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, string sets as compact JSON
//! arrays, and UUIDs as hyphenated lowercase strings.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rapport_core::{
  matching::{Match, MatchStatus},
  user::{UserDetails, UserId},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── MatchStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: MatchStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<MatchStatus> {
  match s {
    "pending" => Ok(MatchStatus::Pending),
    "accepted" => Ok(MatchStatus::Accepted),
    "rejected" => Ok(MatchStatus::Rejected),
    other => Err(Error::UnknownStatus(other.to_string())),
  }
}

// ─── String sets ──────────────────────────────────────────────────────────────

pub fn encode_set(set: &BTreeSet<String>) -> Result<String> { Ok(serde_json::to_string(set)?) }

pub fn decode_set(s: &str) -> Result<BTreeSet<String>> { Ok(serde_json::from_str(s)?) }

// ─── Raw row types ────────────────────────────────────────────────────────────

/// Column values of a `profiles` row, before decoding.
pub struct RawProfile {
  pub user_id:      i64,
  pub name:         String,
  pub department:   String,
  pub skills:       String,
  pub interests:    String,
  pub career_stage: String,
}

impl RawProfile {
  pub const COLUMNS: &'static str =
    "user_id, name, department, skills, interests, career_stage";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      name:         row.get(1)?,
      department:   row.get(2)?,
      skills:       row.get(3)?,
      interests:    row.get(4)?,
      career_stage: row.get(5)?,
    })
  }

  pub fn into_details(self) -> Result<UserDetails> {
    Ok(UserDetails {
      id:           UserId(self.user_id),
      name:         self.name,
      department:   self.department,
      skills:       decode_set(&self.skills)?,
      interests:    decode_set(&self.interests)?,
      career_stage: self.career_stage,
    })
  }
}

/// Column values of a `matches` row, before decoding.
pub struct RawMatch {
  pub match_id:       String,
  pub source_user_id: i64,
  pub target_user_id: i64,
  pub score:          f64,
  pub status:         String,
  pub created_at:     String,
}

impl RawMatch {
  pub const COLUMNS: &'static str =
    "match_id, source_user_id, target_user_id, score, status, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      match_id:       row.get(0)?,
      source_user_id: row.get(1)?,
      target_user_id: row.get(2)?,
      score:          row.get(3)?,
      status:         row.get(4)?,
      created_at:     row.get(5)?,
    })
  }

  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      match_id:       decode_uuid(&self.match_id)?,
      source_user_id: UserId(self.source_user_id),
      target_user_id: UserId(self.target_user_id),
      score:          self.score,
      status:         decode_status(&self.status)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}
