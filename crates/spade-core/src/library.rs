//! Action library: reusable action templates with default score deltas.
//!
//! System entries are seeded once at bootstrap (`user_created = false`).
//! User entries are created from within one of the user's sessions and remain
//! visible to that user only. An entry outlives the session that spawned it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A named action template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
  pub library_id:              Uuid,
  pub action_description:      String,
  /// Applied to the user's score when the entry is used with its defaults.
  pub default_user_movement:   i64,
  pub default_llm_movement:    i64,
  /// Equals the number of tracked actions referencing this entry.
  pub times_used:              i64,
  pub user_created:            bool,
  /// Provenance only; the session does not own the entry.
  pub created_from_session_id: Option<Uuid>,
}

/// Input to [`crate::store::ControlStore::create_library_entry`].
///
/// `times_used` and `user_created` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLibraryEntry {
  pub action_description:      String,
  pub default_user_movement:   i64,
  pub default_llm_movement:    i64,
  #[serde(default)]
  pub created_from_session_id: Option<Uuid>,
}

impl NewLibraryEntry {
  pub fn validate(&self) -> Result<()> {
    validate_description(&self.action_description)
  }
}

/// Partial edit of a user-created entry; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryEntryPatch {
  pub action_description:    Option<String>,
  pub default_user_movement: Option<i64>,
  pub default_llm_movement:  Option<i64>,
}

impl LibraryEntryPatch {
  pub fn validate(&self) -> Result<()> {
    match &self.action_description {
      Some(d) => validate_description(d),
      None => Ok(()),
    }
  }

  /// Apply the patch in place. Never touches `times_used`.
  pub fn apply(self, entry: &mut LibraryEntry) {
    if let Some(d) = self.action_description {
      entry.action_description = d;
    }
    if let Some(u) = self.default_user_movement {
      entry.default_user_movement = u;
    }
    if let Some(l) = self.default_llm_movement {
      entry.default_llm_movement = l;
    }
  }
}

/// A seed-time system entry.
#[derive(Debug, Clone, Copy)]
pub struct StarterAction {
  pub description:   &'static str,
  pub user_movement: i64,
  pub llm_movement:  i64,
}

fn validate_description(d: &str) -> Result<()> {
  if d.trim().is_empty() {
    return Err(Error::Validation(
      "action_description must not be empty".to_string(),
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry() -> LibraryEntry {
    LibraryEntry {
      library_id:              Uuid::nil(),
      action_description:      "Asked AI to critique my work".into(),
      default_user_movement:   2,
      default_llm_movement:    1,
      times_used:              7,
      user_created:            true,
      created_from_session_id: None,
    }
  }

  #[test]
  fn patch_leaves_missing_fields_and_usage_alone() {
    let mut e = entry();
    LibraryEntryPatch {
      default_llm_movement: Some(-2),
      ..Default::default()
    }
    .apply(&mut e);

    assert_eq!(e.action_description, "Asked AI to critique my work");
    assert_eq!(e.default_user_movement, 2);
    assert_eq!(e.default_llm_movement, -2);
    assert_eq!(e.times_used, 7);
  }

  #[test]
  fn blank_description_is_rejected() {
    let input = NewLibraryEntry {
      action_description:      "   ".into(),
      default_user_movement:   1,
      default_llm_movement:    1,
      created_from_session_id: None,
    };
    assert!(matches!(input.validate(), Err(Error::Validation(_))));

    let patch = LibraryEntryPatch {
      action_description: Some(String::new()),
      ..Default::default()
    };
    assert!(matches!(patch.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn origin_session_defaults_to_none() {
    let input: NewLibraryEntry = serde_json::from_str(
      r#"{"action_description":"x","default_user_movement":1,"default_llm_movement":0}"#,
    )
    .unwrap();
    assert!(input.created_from_session_id.is_none());
  }
}
