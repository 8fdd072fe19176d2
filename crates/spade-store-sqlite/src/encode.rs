//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order equals chronological order. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use spade_core::{
  action::TrackedAction,
  library::LibraryEntry,
  log::SessionLogEntry,
  session::{GameSession, SessionStatus},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision we store.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── SessionStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: SessionStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<SessionStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown session status: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSession::from_row`].
pub const SESSION_COLUMNS: &str = "session_id, user_id, session_name, start_time, end_time, \
                                   status, user_score, llm_score, reward_assigned";

/// Raw values read directly from a `game_sessions` row.
pub struct RawSession {
  pub session_id:      String,
  pub user_id:         String,
  pub session_name:    Option<String>,
  pub start_time:      String,
  pub end_time:        Option<String>,
  pub status:          String,
  pub user_score:      i64,
  pub llm_score:       i64,
  pub reward_assigned: Option<String>,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:      row.get(0)?,
      user_id:         row.get(1)?,
      session_name:    row.get(2)?,
      start_time:      row.get(3)?,
      end_time:        row.get(4)?,
      status:          row.get(5)?,
      user_score:      row.get(6)?,
      llm_score:       row.get(7)?,
      reward_assigned: row.get(8)?,
    })
  }

  pub fn into_session(self) -> Result<GameSession> {
    Ok(GameSession {
      session_id:      decode_uuid(&self.session_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      session_name:    self.session_name,
      start_time:      decode_dt(&self.start_time)?,
      end_time:        decode_opt_dt(self.end_time)?,
      status:          decode_status(&self.status)?,
      user_score:      self.user_score,
      llm_score:       self.llm_score,
      reward_assigned: self.reward_assigned,
    })
  }
}

/// Column list matching [`RawLibraryEntry::from_row`].
pub const LIBRARY_COLUMNS: &str = "library_id, action_description, default_user_movement, \
                                   default_llm_movement, times_used, user_created, \
                                   created_from_session_id";

/// Raw values read directly from an `action_library` row.
pub struct RawLibraryEntry {
  pub library_id:              String,
  pub action_description:      String,
  pub default_user_movement:   i64,
  pub default_llm_movement:    i64,
  pub times_used:              i64,
  pub user_created:            bool,
  pub created_from_session_id: Option<String>,
}

impl RawLibraryEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      library_id:              row.get(0)?,
      action_description:      row.get(1)?,
      default_user_movement:   row.get(2)?,
      default_llm_movement:    row.get(3)?,
      times_used:              row.get(4)?,
      user_created:            row.get(5)?,
      created_from_session_id: row.get(6)?,
    })
  }

  pub fn into_entry(self) -> Result<LibraryEntry> {
    Ok(LibraryEntry {
      library_id:              decode_uuid(&self.library_id)?,
      action_description:      self.action_description,
      default_user_movement:   self.default_user_movement,
      default_llm_movement:    self.default_llm_movement,
      times_used:              self.times_used,
      user_created:            self.user_created,
      created_from_session_id: decode_opt_uuid(self.created_from_session_id)?,
    })
  }
}

/// Column list matching [`RawTrackedAction::from_row`], qualified with the
/// `t` alias so it can be joined against the library.
pub const ACTION_COLUMNS: &str = "t.action_id, t.session_id, t.library_id, \
                                  t.action_description, t.user_movement, t.llm_movement";

/// Raw values read directly from a `tracked_actions` row.
pub struct RawTrackedAction {
  pub action_id:          String,
  pub session_id:         String,
  pub library_id:         Option<String>,
  pub action_description: Option<String>,
  pub user_movement:      i64,
  pub llm_movement:       i64,
}

impl RawTrackedAction {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      action_id:          row.get(0)?,
      session_id:         row.get(1)?,
      library_id:         row.get(2)?,
      action_description: row.get(3)?,
      user_movement:      row.get(4)?,
      llm_movement:       row.get(5)?,
    })
  }

  pub fn into_action(self) -> Result<TrackedAction> {
    Ok(TrackedAction {
      action_id:          decode_uuid(&self.action_id)?,
      session_id:         decode_uuid(&self.session_id)?,
      library_id:         decode_opt_uuid(self.library_id)?,
      action_description: self.action_description,
      user_movement:      self.user_movement,
      llm_movement:       self.llm_movement,
    })
  }
}

/// Raw values read directly from a `game_session_logs` row.
pub struct RawLogEntry {
  pub log_id:        String,
  pub session_id:    String,
  pub action_id:     String,
  pub timestamp:     String,
  pub optional_note: Option<String>,
}

impl RawLogEntry {
  pub fn into_entry(self) -> Result<SessionLogEntry> {
    Ok(SessionLogEntry {
      log_id:        decode_uuid(&self.log_id)?,
      session_id:    decode_uuid(&self.session_id)?,
      action_id:     decode_uuid(&self.action_id)?,
      timestamp:     decode_dt(&self.timestamp)?,
      optional_note: self.optional_note,
    })
  }
}

/// Raw values read directly from a `users` row (password hash excluded).
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let b = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
    let c = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert!(encode_dt(b) < encode_dt(c));
  }

  #[test]
  fn timestamp_round_trips_at_stored_precision() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn unknown_status_is_a_decode_error() {
    assert!(matches!(decode_status("finished"), Err(Error::Decode(_))));
  }
}
