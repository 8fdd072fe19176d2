//! Error types for `spade-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionStatus;

#[derive(Debug, Error)]
pub enum Error {
  /// Also returned when the session exists but belongs to someone else.
  #[error("session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("tracked action not found: {0}")]
  ActionNotFound(Uuid),

  #[error("library entry not found: {0}")]
  LibraryEntryNotFound(Uuid),

  #[error("cannot move a session from {from} to {to}")]
  InvalidTransition {
    from: SessionStatus,
    to:   SessionStatus,
  },

  #[error("validation error: {0}")]
  Validation(String),

  #[error("email already registered: {0}")]
  EmailTaken(String),
}

impl Error {
  /// Whether this error means "absent, or not yours".
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::SessionNotFound(_)
        | Self::ActionNotFound(_)
        | Self::LibraryEntryNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
