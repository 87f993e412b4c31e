//! SQL schema for the Rapport SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Last successfully resolved details per user. Doubles as the fallback
-- cache and the recommendation population.
CREATE TABLE IF NOT EXISTS profiles (
    user_id       INTEGER PRIMARY KEY,
    name          TEXT NOT NULL,
    department    TEXT NOT NULL,
    skills        TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    interests     TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    career_stage  TEXT NOT NULL,
    cached_at     TEXT NOT NULL                -- ISO 8601 UTC
);

-- One row per ordered (source, target) pair. The reverse pair is its own row.
CREATE TABLE IF NOT EXISTS matches (
    match_id        TEXT PRIMARY KEY,
    source_user_id  INTEGER NOT NULL,
    target_user_id  INTEGER NOT NULL,
    score           REAL NOT NULL,             -- never updated
    status          TEXT NOT NULL,             -- 'pending' | 'accepted' | 'rejected'
    created_at      TEXT NOT NULL,
    UNIQUE (source_user_id, target_user_id),
    CHECK  (source_user_id != target_user_id),
    CHECK  (status IN ('pending', 'accepted', 'rejected'))
);

CREATE INDEX IF NOT EXISTS matches_source_status_idx ON matches(source_user_id, status);
CREATE INDEX IF NOT EXISTS matches_target_status_idx ON matches(target_user_id, status);

PRAGMA user_version = 1;
";
