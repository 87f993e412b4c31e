//! [`SqliteStore`] — the SQLite implementation of [`ProfileStore`] and
//! [`MatchStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rapport_core::{
  matching::{Direction, Insertion, Match, MatchStatus, Transition},
  store::{MatchStore, ProfileStore},
  user::{UserDetails, UserId},
};

use crate::{
  Result,
  encode::{RawMatch, RawProfile, encode_dt, encode_set, encode_status, encode_uuid},
  schema::SCHEMA,
};

/// Insert a `matches` row, or only move the status of the row already holding
/// its ordered pair.
const UPSERT_BY_PAIR: &str = "
  INSERT INTO matches (
    match_id, source_user_id, target_user_id, score, status, created_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
  ON CONFLICT (source_user_id, target_user_id) DO UPDATE SET
    status = excluded.status";

/// Bound parameters for one `matches` row.
type MatchParams = (String, i64, i64, f64, &'static str, String);

fn match_params(m: &Match) -> MatchParams {
  (
    encode_uuid(m.match_id),
    m.source_user_id.0,
    m.target_user_id.0,
    m.score,
    encode_status(m.status),
    encode_dt(m.created_at),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rapport store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = crate::Error;

  async fn list_profiles(&self) -> Result<Vec<UserDetails>> {
    let sql = format!("SELECT {} FROM profiles ORDER BY user_id", RawProfile::COLUMNS);

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_details).collect()
  }

  async fn get_profile(&self, id: UserId) -> Result<Option<UserDetails>> {
    let sql = format!("SELECT {} FROM profiles WHERE user_id = ?1", RawProfile::COLUMNS);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id.0], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_details).transpose()
  }

  async fn put_profile(&self, details: UserDetails) -> Result<()> {
    let skills_str    = encode_set(&details.skills)?;
    let interests_str = encode_set(&details.interests)?;
    let cached_at_str = encode_dt(Utc::now());

    // A single upsert statement: readers see the old row or the new one.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             user_id, name, department, skills, interests, career_stage, cached_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (user_id) DO UPDATE SET
             name         = excluded.name,
             department   = excluded.department,
             skills       = excluded.skills,
             interests    = excluded.interests,
             career_stage = excluded.career_stage,
             cached_at    = excluded.cached_at",
          rusqlite::params![
            details.id.0,
            details.name,
            details.department,
            skills_str,
            interests_str,
            details.career_stage,
            cached_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = crate::Error;

  async fn get_match(&self, id: Uuid) -> Result<Option<Match>> {
    let id_str = encode_uuid(id);
    let sql = format!("SELECT {} FROM matches WHERE match_id = ?1", RawMatch::COLUMNS);

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawMatch::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn get_by_pair(&self, source: UserId, target: UserId) -> Result<Option<Match>> {
    let sql = format!(
      "SELECT {} FROM matches WHERE source_user_id = ?1 AND target_user_id = ?2",
      RawMatch::COLUMNS
    );

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![source.0, target.0], RawMatch::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn list_by_user_and_status(
    &self,
    user: UserId,
    status: MatchStatus,
    direction: Direction,
  ) -> Result<Vec<Match>> {
    let column = match direction {
      Direction::Outgoing => "source_user_id",
      Direction::Incoming => "target_user_id",
    };
    let sql = format!(
      "SELECT {} FROM matches WHERE {column} = ?1 AND status = ?2 ORDER BY rowid",
      RawMatch::COLUMNS
    );
    let status_str = encode_status(status);

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user.0, status_str], RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn insert_if_absent(&self, candidate: Match) -> Result<Insertion> {
    let (id, source, target, score, status, created_at) = match_params(&candidate);
    let select = format!(
      "SELECT {} FROM matches WHERE source_user_id = ?1 AND target_user_id = ?2",
      RawMatch::COLUMNS
    );

    // The unique (source, target) constraint makes the insert a no-op when the
    // pair is taken; the follow-up read returns whichever row won.
    let (inserted, raw): (bool, RawMatch) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "INSERT INTO matches (
             match_id, source_user_id, target_user_id, score, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (source_user_id, target_user_id) DO NOTHING",
          rusqlite::params![id, source, target, score, status, created_at],
        )?;
        let raw = tx.query_row(&select, rusqlite::params![source, target], RawMatch::from_row)?;
        tx.commit()?;
        Ok((changed == 1, raw))
      })
      .await?;

    let stored = raw.into_match()?;
    Ok(if inserted { Insertion::Created(stored) } else { Insertion::Existing(stored) })
  }

  async fn transition(
    &self,
    match_id: Uuid,
    status: MatchStatus,
    companions: Vec<Match>,
  ) -> Result<Transition> {
    let id_str = encode_uuid(match_id);
    let status_str = encode_status(status);
    let pending_str = encode_status(MatchStatus::Pending);
    let rows: Vec<MatchParams> = companions.iter().map(match_params).collect();
    let select = format!("SELECT {} FROM matches WHERE match_id = ?1", RawMatch::COLUMNS);

    // The status guard in the WHERE clause makes the check and the write one
    // statement; companions follow only if it changed a row.
    let (applied, raw): (bool, Option<RawMatch>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE matches SET status = ?2 WHERE match_id = ?1 AND status = ?3",
          rusqlite::params![id_str, status_str, pending_str],
        )?;
        if changed == 1 {
          let mut stmt = tx.prepare(UPSERT_BY_PAIR)?;
          for (id, source, target, score, status, created_at) in &rows {
            stmt.execute(rusqlite::params![id, source, target, score, status, created_at])?;
          }
        }
        let raw = tx
          .query_row(&select, rusqlite::params![id_str], RawMatch::from_row)
          .optional()?;
        tx.commit()?;
        Ok((changed == 1, raw))
      })
      .await?;

    Ok(match raw {
      None => Transition::Missing,
      Some(raw) if applied => Transition::Applied(raw.into_match()?),
      Some(raw) => Transition::NotPending(raw.into_match()?),
    })
  }

  async fn upsert_all(&self, matches: Vec<Match>) -> Result<()> {
    let rows: Vec<MatchParams> = matches.iter().map(match_params).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(UPSERT_BY_PAIR)?;
          for (id, source, target, score, status, created_at) in &rows {
            stmt.execute(rusqlite::params![id, source, target, score, status, created_at])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
