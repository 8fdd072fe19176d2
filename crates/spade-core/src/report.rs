//! Read models for exports.
//!
//! Never stored, always derived. Library descriptions are resolved at read
//! time, so a report reflects the *current* library text even though the
//! movements it shows are historical snapshots.

use serde::{Deserialize, Serialize};

use crate::{action::TrackedAction, session::GameSession};

pub const UNKNOWN_DESCRIPTION: &str = "Unknown";
pub const CUSTOM_DESCRIPTION: &str = "Custom";

/// Where a tracked action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSource {
  Library,
  Custom,
}

/// A tracked action joined with the live description of its library entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedAction {
  pub action:              TrackedAction,
  /// `None` for custom actions and for library ids that no longer resolve.
  pub library_description: Option<String>,
}

impl ReportedAction {
  pub fn source(&self) -> ActionSource {
    match self.action.library_id {
      Some(_) => ActionSource::Library,
      None => ActionSource::Custom,
    }
  }

  /// Library text for library actions, else the local text, else a
  /// placeholder.
  pub fn description(&self) -> &str {
    match self.source() {
      ActionSource::Library => self
        .library_description
        .as_deref()
        .unwrap_or(UNKNOWN_DESCRIPTION),
      ActionSource::Custom => self
        .action
        .action_description
        .as_deref()
        .unwrap_or(CUSTOM_DESCRIPTION),
    }
  }
}

/// One session with its tracked actions in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
  pub session: GameSession,
  pub actions: Vec<ReportedAction>,
}

impl SessionReport {
  pub fn action_count(&self) -> usize { self.actions.len() }
}
