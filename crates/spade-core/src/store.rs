//! The `ControlStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `spade-store-sqlite`).
//! Higher layers (`spade-api`, `spade-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Every session-scoped method takes the requesting `user_id`. A session owned
//! by someone else is reported exactly like a missing one.

use std::future::Future;

use uuid::Uuid;

use crate::{
  action::{NewTrackedAction, TrackedAction},
  library::{LibraryEntry, LibraryEntryPatch, NewLibraryEntry, StarterAction},
  log::{NewLogEntry, SessionLogEntry},
  report::SessionReport,
  session::{GameSession, NewSession, SessionStatus, SessionUpdate},
  user::{Credentials, User},
};

// ─── Error seam ──────────────────────────────────────────────────────────────

/// Backend errors expose the domain failure they carry, if any, so callers can
/// tell "not found" and "invalid transition" apart from I/O failures.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn domain(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Spade storage backend.
///
/// Implementations must run each mutating method (ownership check included)
/// inside a single transaction.
pub trait ControlStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register an account. Fails with [`crate::Error::EmailTaken`] on a
  /// duplicate email.
  fn create_user(
    &self,
    email: String,
    password_hash: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up the stored password hash for `email`.
  fn find_credentials(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  // ── Action library ────────────────────────────────────────────────────

  /// System entries plus the user's own, most-used first.
  fn list_library(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LibraryEntry>, Self::Error>> + Send + '_;

  /// Create a user entry. If `created_from_session_id` is set it must be one
  /// of the user's sessions.
  fn create_library_entry(
    &self,
    user_id: Uuid,
    input: NewLibraryEntry,
  ) -> impl Future<Output = Result<LibraryEntry, Self::Error>> + Send + '_;

  /// Edit one of the user's own entries. System entries are not editable.
  fn update_library_entry(
    &self,
    library_id: Uuid,
    user_id: Uuid,
    patch: LibraryEntryPatch,
  ) -> impl Future<Output = Result<LibraryEntry, Self::Error>> + Send + '_;

  /// Bump `times_used`. Unknown ids are ignored.
  fn record_usage(
    &self,
    library_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert `starters` as system entries unless any system entry exists.
  /// Returns the number inserted.
  fn seed_library(
    &self,
    starters: &'static [StarterAction],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Create an `active` session and record its selected actions.
  fn create_session(
    &self,
    user_id: Uuid,
    input: NewSession,
  ) -> impl Future<Output = Result<GameSession, Self::Error>> + Send + '_;

  /// Returns `None` if missing or not owned by `user_id`.
  fn get_session(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<GameSession>, Self::Error>> + Send + '_;

  /// The user's sessions, newest first.
  fn list_sessions(
    &self,
    user_id: Uuid,
    status: Option<SessionStatus>,
  ) -> impl Future<Output = Result<Vec<GameSession>, Self::Error>> + Send + '_;

  /// Apply a partial update through [`SessionUpdate::apply`].
  fn update_session(
    &self,
    session_id: Uuid,
    user_id: Uuid,
    update: SessionUpdate,
  ) -> impl Future<Output = Result<GameSession, Self::Error>> + Send + '_;

  fn pause_session(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<GameSession, Self::Error>> + Send + '_ {
    self.update_session(session_id, user_id, SessionUpdate::pause())
  }

  fn resume_session(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<GameSession, Self::Error>> + Send + '_ {
    self.update_session(session_id, user_id, SessionUpdate::resume())
  }

  fn end_session(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<GameSession, Self::Error>> + Send + '_ {
    self.update_session(session_id, user_id, SessionUpdate::end())
  }

  /// Library ids chosen at creation, in insertion order.
  fn selected_actions(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Tracker ───────────────────────────────────────────────────────────

  /// Record an action, add its movements to the session's scores and bump
  /// the library entry's usage, all in one transaction.
  fn track(
    &self,
    user_id: Uuid,
    input: NewTrackedAction,
  ) -> impl Future<Output = Result<TrackedAction, Self::Error>> + Send + '_;

  /// Tracked actions in creation order.
  fn list_actions(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TrackedAction>, Self::Error>> + Send + '_;

  // ── Session log ───────────────────────────────────────────────────────

  /// Fails if the action does not belong to the given session.
  fn append_log(
    &self,
    user_id: Uuid,
    input: NewLogEntry,
  ) -> impl Future<Output = Result<SessionLogEntry, Self::Error>> + Send + '_;

  /// Oldest first.
  fn list_logs(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SessionLogEntry>, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn session_report(
    &self,
    session_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<SessionReport, Self::Error>> + Send + '_;

  /// One report per session, newest session first.
  fn all_reports(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SessionReport>, Self::Error>> + Send + '_;
}
