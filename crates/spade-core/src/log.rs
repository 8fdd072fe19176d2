//! Session log: append-only narrative notes attached to tracked actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped annotation on one tracked action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLogEntry {
  pub log_id:        Uuid,
  pub session_id:    Uuid,
  /// Always an action of `session_id`.
  pub action_id:     Uuid,
  /// Server-assigned at commit time.
  pub timestamp:     DateTime<Utc>,
  pub optional_note: Option<String>,
}

/// Input to [`crate::store::ControlStore::append_log`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewLogEntry {
  pub session_id:    Uuid,
  pub action_id:     Uuid,
  #[serde(default)]
  pub optional_note: Option<String>,
}
