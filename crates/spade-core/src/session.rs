//! Game sessions and their lifecycle.
//!
//! A session starts `active`, may bounce between `active` and `paused`, and
//! ends exactly once. `ended` is terminal: every attempt to leave it is an
//! [`Error::InvalidTransition`]. `end_time` is set iff the status is `ended`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
  Active,
  Paused,
  Ended,
}

impl SessionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Paused => "paused",
      Self::Ended => "ended",
    }
  }

  /// The legal-transition table. Staying in the same state is always legal.
  pub fn can_transition_to(self, to: SessionStatus) -> bool {
    use SessionStatus::*;
    matches!(
      (self, to),
      (Active, Active)
        | (Active, Paused)
        | (Active, Ended)
        | (Paused, Paused)
        | (Paused, Active)
        | (Paused, Ended)
        | (Ended, Ended)
    )
  }
}

impl fmt::Display for SessionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SessionStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "active" => Ok(Self::Active),
      "paused" => Ok(Self::Paused),
      "ended" => Ok(Self::Ended),
      other => Err(Error::Validation(format!("unknown session status: {other:?}"))),
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One play-through between a user and an LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
  pub session_id:      Uuid,
  pub user_id:         Uuid,
  pub session_name:    Option<String>,
  /// Server-assigned at creation; never changes.
  pub start_time:      DateTime<Utc>,
  pub end_time:        Option<DateTime<Utc>>,
  pub status:          SessionStatus,
  /// Running sum of `user_movement` over the session's tracked actions.
  pub user_score:      i64,
  pub llm_score:       i64,
  pub reward_assigned: Option<String>,
}

impl GameSession {
  /// A fresh session: `active`, zero scores, no end time.
  pub fn start(user_id: Uuid, session_name: Option<String>, now: DateTime<Utc>) -> Self {
    Self {
      session_id: Uuid::new_v4(),
      user_id,
      session_name,
      start_time: now,
      end_time: None,
      status: SessionStatus::Active,
      user_score: 0,
      llm_score: 0,
      reward_assigned: None,
    }
  }

  /// Fold one tracked action's deltas into the running scores.
  ///
  /// Fails with [`Error::Validation`] if either score would overflow, leaving
  /// both scores untouched.
  pub fn add_movement(&mut self, user_movement: i64, llm_movement: i64) -> Result<()> {
    let overflow = || Error::Validation("score out of range".to_string());
    let user_score = self.user_score.checked_add(user_movement).ok_or_else(overflow)?;
    let llm_score = self.llm_score.checked_add(llm_movement).ok_or_else(overflow)?;
    self.user_score = user_score;
    self.llm_score = llm_score;
    Ok(())
  }

  /// Elapsed minutes between start and end, if the session has ended.
  pub fn duration_minutes(&self) -> Option<f64> {
    let end = self.end_time?;
    let secs = (end - self.start_time).num_milliseconds() as f64 / 1000.0;
    Some(secs / 60.0)
  }
}

/// Input to [`crate::store::ControlStore::create_session`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSession {
  pub session_name:        Option<String>,
  /// Library entries chosen as the session's working set. Kept verbatim,
  /// duplicates included.
  #[serde(default)]
  pub selected_action_ids: Vec<Uuid>,
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionUpdate {
  pub session_name: Option<String>,
  pub status:       Option<SessionStatus>,
  pub end_time:     Option<DateTime<Utc>>,
}

impl SessionUpdate {
  pub fn pause() -> Self { Self::with_status(SessionStatus::Paused) }

  pub fn resume() -> Self { Self::with_status(SessionStatus::Active) }

  /// Stamps `end_time` with the time of application. Unlike a re-stamping
  /// end, ending an already-ended session keeps its first `end_time`.
  pub fn end() -> Self { Self::with_status(SessionStatus::Ended) }

  fn with_status(status: SessionStatus) -> Self {
    Self { status: Some(status), ..Default::default() }
  }

  /// Validate and apply to `session`. On error `session` is unchanged.
  ///
  /// Moving to `ended` without an end time stamps `now`; an explicit
  /// `end_time` always wins but is only accepted when the resulting status is
  /// `ended`. No ordering check against `start_time` is made.
  pub fn apply(self, session: &mut GameSession, now: DateTime<Utc>) -> Result<()> {
    let target = self.status.unwrap_or(session.status);

    if !session.status.can_transition_to(target) {
      return Err(Error::InvalidTransition { from: session.status, to: target });
    }
    if self.end_time.is_some() && target != SessionStatus::Ended {
      return Err(Error::Validation(
        "end_time may only be set on an ended session".to_string(),
      ));
    }
    if self.end_time.is_some_and(|t| !(0..=9999).contains(&t.year())) {
      return Err(Error::Validation(
        "end_time must fall within years 0000 to 9999".to_string(),
      ));
    }

    if let Some(name) = self.session_name {
      session.session_name = Some(name);
    }
    if let Some(status) = self.status {
      session.status = status;
      if status == SessionStatus::Ended && session.end_time.is_none() {
        session.end_time = Some(now);
      }
    }
    if let Some(end) = self.end_time {
      session.end_time = Some(end);
    }

    Ok(())
  }
}
