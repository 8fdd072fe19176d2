//! Tracked actions: the scored events of a session.
//!
//! A tracked action is written once and never updated. Its movements are a
//! snapshot taken at creation time: later edits to a library entry's defaults
//! do not reach back into history.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scored event within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAction {
  pub action_id:          Uuid,
  pub session_id:         Uuid,
  /// Set when the action was drawn from the library.
  pub library_id:         Option<Uuid>,
  /// Authoritative only when `library_id` is `None`.
  pub action_description: Option<String>,
  pub user_movement:      i64,
  pub llm_movement:       i64,
}

/// Input to [`crate::store::ControlStore::track`].
///
/// The movements are stored verbatim. Callers decide whether to copy a library
/// entry's defaults; the store never looks them up.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrackedAction {
  pub session_id:         Uuid,
  #[serde(default)]
  pub library_id:         Option<Uuid>,
  #[serde(default)]
  pub action_description: Option<String>,
  pub user_movement:      i64,
  pub llm_movement:       i64,
}

impl NewTrackedAction {
  /// Build the persisted row. A library-sourced action carries no local
  /// description.
  pub fn into_action(self) -> TrackedAction {
    let action_description = match self.library_id {
      Some(_) => None,
      None => self.action_description,
    };
    TrackedAction {
      action_id: Uuid::new_v4(),
      session_id: self.session_id,
      library_id: self.library_id,
      action_description,
      user_movement: self.user_movement,
      llm_movement: self.llm_movement,
    }
  }
}
