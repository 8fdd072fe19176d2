//! SQL schema for the Spade SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS game_sessions (
    session_id      TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    session_name    TEXT,
    start_time      TEXT NOT NULL,        -- server-assigned; never updated
    end_time        TEXT,
    status          TEXT NOT NULL DEFAULT 'active',
    user_score      INTEGER NOT NULL DEFAULT 0,
    llm_score       INTEGER NOT NULL DEFAULT 0,
    reward_assigned TEXT,
    CHECK (status IN ('active', 'paused', 'ended')),
    CHECK ((status = 'ended') = (end_time IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS action_library (
    library_id              TEXT PRIMARY KEY,
    created_from_session_id TEXT REFERENCES game_sessions(session_id),
    action_description      TEXT NOT NULL,
    default_user_movement   INTEGER NOT NULL,
    default_llm_movement    INTEGER NOT NULL,
    times_used              INTEGER NOT NULL DEFAULT 0,
    user_created            INTEGER NOT NULL DEFAULT 0
);

-- Advisory working set; duplicates allowed, library ids unchecked.
CREATE TABLE IF NOT EXISTS selected_actions (
    session_id TEXT NOT NULL REFERENCES game_sessions(session_id),
    library_id TEXT NOT NULL
);

-- Append-only. library_id is not a foreign key; a dangling
-- reference is stored and reported as 'Unknown'.
CREATE TABLE IF NOT EXISTS tracked_actions (
    action_id          TEXT PRIMARY KEY,
    session_id         TEXT NOT NULL REFERENCES game_sessions(session_id),
    library_id         TEXT,
    action_description TEXT,              -- NULL when library_id is set
    user_movement      INTEGER NOT NULL,
    llm_movement       INTEGER NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS game_session_logs (
    log_id        TEXT PRIMARY KEY,
    session_id    TEXT NOT NULL REFERENCES game_sessions(session_id),
    action_id     TEXT NOT NULL REFERENCES tracked_actions(action_id),
    timestamp     TEXT NOT NULL,
    optional_note TEXT
);

CREATE INDEX IF NOT EXISTS sessions_user_idx     ON game_sessions(user_id);
CREATE INDEX IF NOT EXISTS library_origin_idx    ON action_library(created_from_session_id);
CREATE INDEX IF NOT EXISTS selected_session_idx  ON selected_actions(session_id);
CREATE INDEX IF NOT EXISTS actions_session_idx   ON tracked_actions(session_id);
CREATE INDEX IF NOT EXISTS actions_library_idx   ON tracked_actions(library_id);
CREATE INDEX IF NOT EXISTS logs_session_time_idx ON game_session_logs(session_id, timestamp);

PRAGMA user_version = 1;
";
