//! [`SqliteStore`]: the SQLite implementation of [`ControlStore`].

use std::path::Path;

use chrono::SubsecRound as _;
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior, params};
use uuid::Uuid;

use spade_core::{
  Error as CoreError,
  action::{NewTrackedAction, TrackedAction},
  library::{LibraryEntry, LibraryEntryPatch, NewLibraryEntry, StarterAction},
  log::{NewLogEntry, SessionLogEntry},
  report::{ReportedAction, SessionReport},
  session::{GameSession, NewSession, SessionStatus, SessionUpdate},
  store::ControlStore,
  user::{Credentials, User},
};

use crate::{
  Result,
  encode::{
    ACTION_COLUMNS, LIBRARY_COLUMNS, RawLibraryEntry, RawLogEntry, RawSession,
    RawTrackedAction, RawUser, SESSION_COLUMNS, decode_uuid, encode_dt,
    encode_status, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Spade store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside an `IMMEDIATE` transaction; commit only if it succeeds.
  ///
  /// `IMMEDIATE` takes the write lock up front, so a read-check-write sequence
  /// inside `f` cannot interleave with another writer.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = f(&tx);
        if result.is_ok() {
          tx.commit()?;
        }
        Ok(result)
      })
      .await?
  }

  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// The session row, if it exists and belongs to `user_id`.
fn owned_session(
  conn: &rusqlite::Connection,
  session_id: &str,
  user_id: &str,
) -> rusqlite::Result<Option<RawSession>> {
  conn
    .query_row(
      &format!(
        "SELECT {SESSION_COLUMNS} FROM game_sessions
         WHERE session_id = ?1 AND user_id = ?2"
      ),
      params![session_id, user_id],
      RawSession::from_row,
    )
    .optional()
}

/// Ownership gate shared by every session-scoped operation.
fn require_owned(conn: &rusqlite::Connection, session_id: Uuid, user_id: Uuid) -> Result<()> {
  let owned = conn
    .query_row(
      "SELECT 1 FROM game_sessions WHERE session_id = ?1 AND user_id = ?2",
      params![encode_uuid(session_id), encode_uuid(user_id)],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  if owned {
    Ok(())
  } else {
    Err(CoreError::SessionNotFound(session_id).into())
  }
}

fn actions_for(conn: &rusqlite::Connection, session_id: &str) -> Result<Vec<TrackedAction>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ACTION_COLUMNS} FROM tracked_actions t
     WHERE t.session_id = ?1
     ORDER BY t.rowid"
  ))?;
  let raws = stmt
    .query_map(params![session_id], RawTrackedAction::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawTrackedAction::into_action).collect()
}

/// Tracked actions joined with the *current* library description.
fn reported_actions_for(
  conn: &rusqlite::Connection,
  session_id: &str,
) -> Result<Vec<ReportedAction>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ACTION_COLUMNS}, l.action_description
     FROM tracked_actions t
     LEFT JOIN action_library l ON l.library_id = t.library_id
     WHERE t.session_id = ?1
     ORDER BY t.rowid"
  ))?;
  let raws = stmt
    .query_map(params![session_id], |row| {
      Ok((RawTrackedAction::from_row(row)?, row.get::<_, Option<String>>(6)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws
    .into_iter()
    .map(|(raw, library_description)| -> Result<ReportedAction> {
      Ok(ReportedAction { action: raw.into_action()?, library_description })
    })
    .collect()
}

fn bump_usage(conn: &rusqlite::Connection, library_id: Uuid) -> Result<()> {
  let updated = conn.execute(
    "UPDATE action_library SET times_used = times_used + 1 WHERE library_id = ?1",
    params![encode_uuid(library_id)],
  )?;
  if updated == 0 {
    tracing::warn!(%library_id, "usage recorded for unknown library entry");
  }
  Ok(())
}

// ─── ControlStore impl ───────────────────────────────────────────────────────

impl ControlStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, email: String, password_hash: String) -> Result<User> {
    let user = User { user_id: Uuid::new_v4(), email, created_at: now() };

    let id_str = encode_uuid(user.user_id);
    let at_str = encode_dt(user.created_at);
    let email  = user.email.clone();

    self
      .write(move |tx| {
        let taken = tx
          .query_row("SELECT 1 FROM users WHERE email = ?1", params![email], |_| Ok(()))
          .optional()?
          .is_some();
        if taken {
          return Err(CoreError::EmailTaken(email).into());
        }
        tx.execute(
          "INSERT INTO users (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![id_str, email, password_hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .read(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, created_at FROM users WHERE user_id = ?1",
              params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  created_at: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, email: String) -> Result<Option<Credentials>> {
    let raw: Option<(String, String)> = self
      .read(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, password_hash FROM users WHERE email = ?1",
              params![email],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(id, password_hash)| -> Result<Credentials> {
        Ok(Credentials { user_id: decode_uuid(&id)?, password_hash })
      })
      .transpose()
  }

  // ── Action library ────────────────────────────────────────────────────────

  async fn list_library(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawLibraryEntry> = self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LIBRARY_COLUMNS} FROM action_library
           WHERE user_created = 0
              OR created_from_session_id IN (
                   SELECT session_id FROM game_sessions WHERE user_id = ?1
                 )
           ORDER BY times_used DESC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(params![user_id_str], RawLibraryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLibraryEntry::into_entry).collect()
  }

  async fn create_library_entry(
    &self,
    user_id: Uuid,
    input: NewLibraryEntry,
  ) -> Result<LibraryEntry> {
    input.validate()?;

    let entry = LibraryEntry {
      library_id:              Uuid::new_v4(),
      action_description:      input.action_description,
      default_user_movement:   input.default_user_movement,
      default_llm_movement:    input.default_llm_movement,
      times_used:              0,
      user_created:            true,
      created_from_session_id: input.created_from_session_id,
    };

    let row = entry.clone();
    self
      .write(move |tx| {
        if let Some(origin) = row.created_from_session_id {
          require_owned(tx, origin, user_id)?;
        }
        tx.execute(
          "INSERT INTO action_library (
             library_id, created_from_session_id, action_description,
             default_user_movement, default_llm_movement, times_used, user_created
           ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 1)",
          params![
            encode_uuid(row.library_id),
            row.created_from_session_id.map(encode_uuid),
            row.action_description,
            row.default_user_movement,
            row.default_llm_movement,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn update_library_entry(
    &self,
    library_id: Uuid,
    user_id: Uuid,
    patch: LibraryEntryPatch,
  ) -> Result<LibraryEntry> {
    patch.validate()?;

    let library_id_str = encode_uuid(library_id);
    let user_id_str    = encode_uuid(user_id);

    self
      .write(move |tx| {
        let raw = tx
          .query_row(
            &format!(
              "SELECT {LIBRARY_COLUMNS} FROM action_library
               WHERE library_id = ?1
                 AND user_created = 1
                 AND created_from_session_id IN (
                       SELECT session_id FROM game_sessions WHERE user_id = ?2
                     )"
            ),
            params![library_id_str, user_id_str],
            RawLibraryEntry::from_row,
          )
          .optional()?
          .ok_or(CoreError::LibraryEntryNotFound(library_id))?;

        let mut entry = raw.into_entry()?;
        patch.apply(&mut entry);

        tx.execute(
          "UPDATE action_library
           SET action_description = ?1, default_user_movement = ?2, default_llm_movement = ?3
           WHERE library_id = ?4",
          params![
            entry.action_description,
            entry.default_user_movement,
            entry.default_llm_movement,
            library_id_str,
          ],
        )?;
        Ok(entry)
      })
      .await
  }

  async fn record_usage(&self, library_id: Uuid) -> Result<()> {
    self.write(move |tx| bump_usage(tx, library_id)).await
  }

  async fn seed_library(&self, starters: &'static [StarterAction]) -> Result<usize> {
    self
      .write(move |tx| {
        let existing: i64 = tx.query_row(
          "SELECT COUNT(*) FROM action_library WHERE user_created = 0",
          [],
          |r| r.get(0),
        )?;
        if existing > 0 {
          return Ok(0);
        }

        let mut stmt = tx.prepare(
          "INSERT INTO action_library (
             library_id, action_description, default_user_movement,
             default_llm_movement, times_used, user_created
           ) VALUES (?1, ?2, ?3, ?4, 0, 0)",
        )?;
        for s in starters {
          stmt.execute(params![
            encode_uuid(Uuid::new_v4()),
            s.description,
            s.user_movement,
            s.llm_movement,
          ])?;
        }
        tracing::info!(count = starters.len(), "seeded starter library");
        Ok(starters.len())
      })
      .await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, user_id: Uuid, input: NewSession) -> Result<GameSession> {
    let session = GameSession::start(user_id, input.session_name, now());
    let row     = session.clone();
    let selected = input.selected_action_ids;

    self
      .write(move |tx| {
        let session_id_str = encode_uuid(row.session_id);
        tx.execute(
          &format!(
            "INSERT INTO game_sessions ({SESSION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ),
          params![
            session_id_str,
            encode_uuid(row.user_id),
            row.session_name,
            encode_dt(row.start_time),
            row.end_time.map(encode_dt),
            encode_status(row.status),
            row.user_score,
            row.llm_score,
            row.reward_assigned,
          ],
        )?;

        let mut stmt = tx.prepare(
          "INSERT INTO selected_actions (session_id, library_id) VALUES (?1, ?2)",
        )?;
        for library_id in selected {
          stmt.execute(params![session_id_str, encode_uuid(library_id)])?;
        }
        Ok(())
      })
      .await?;

    tracing::info!(session_id = %session.session_id, %user_id, "session started");
    Ok(session)
  }

  async fn get_session(&self, session_id: Uuid, user_id: Uuid) -> Result<Option<GameSession>> {
    let session_id_str = encode_uuid(session_id);
    let user_id_str    = encode_uuid(user_id);

    let raw = self
      .read(move |conn| Ok(owned_session(conn, &session_id_str, &user_id_str)?))
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(
    &self,
    user_id: Uuid,
    status: Option<SessionStatus>,
  ) -> Result<Vec<GameSession>> {
    let user_id_str = encode_uuid(user_id);
    let status_str  = status.map(encode_status);

    let raws: Vec<RawSession> = self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SESSION_COLUMNS} FROM game_sessions
           WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
           ORDER BY start_time DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(params![user_id_str, status_str], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn update_session(
    &self,
    session_id: Uuid,
    user_id: Uuid,
    update: SessionUpdate,
  ) -> Result<GameSession> {
    let session_id_str = encode_uuid(session_id);
    let user_id_str    = encode_uuid(user_id);

    let session = self
      .write(move |tx| {
        let mut session = owned_session(tx, &session_id_str, &user_id_str)?
          .ok_or(CoreError::SessionNotFound(session_id))?
          .into_session()?;
        let before = session.status;

        let update = SessionUpdate {
          end_time: update.end_time.map(|t| t.trunc_subsecs(6)),
          ..update
        };
        update.apply(&mut session, now())?;

        tx.execute(
          "UPDATE game_sessions
           SET session_name = ?1, status = ?2, end_time = ?3
           WHERE session_id = ?4",
          params![
            session.session_name,
            encode_status(session.status),
            session.end_time.map(encode_dt),
            session_id_str,
          ],
        )?;

        if before != session.status {
          tracing::info!(%session_id, from = %before, to = %session.status, "session transition");
        }
        Ok(session)
      })
      .await?;

    Ok(session)
  }

  async fn selected_actions(&self, session_id: Uuid, user_id: Uuid) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .read(move |conn| {
        require_owned(conn, session_id, user_id)?;
        let mut stmt = conn.prepare(
          "SELECT library_id FROM selected_actions WHERE session_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(params![encode_uuid(session_id)], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(String::as_str).map(decode_uuid).collect()
  }

  // ── Tracker ───────────────────────────────────────────────────────────────

  async fn track(&self, user_id: Uuid, input: NewTrackedAction) -> Result<TrackedAction> {
    let action = input.into_action();
    let row    = action.clone();

    self
      .write(move |tx| {
        let session_id_str = encode_uuid(row.session_id);
        let mut session = owned_session(tx, &session_id_str, &encode_uuid(user_id))?
          .ok_or(CoreError::SessionNotFound(row.session_id))?
          .into_session()?;
        if session.status != SessionStatus::Active {
          tracing::debug!(session_id = %row.session_id, status = %session.status, "tracking on an inactive session");
        }

        session.add_movement(row.user_movement, row.llm_movement)?;

        tx.execute(
          "INSERT INTO tracked_actions (
             action_id, session_id, library_id, action_description,
             user_movement, llm_movement
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            encode_uuid(row.action_id),
            session_id_str,
            row.library_id.map(encode_uuid),
            row.action_description,
            row.user_movement,
            row.llm_movement,
          ],
        )?;

        tx.execute(
          "UPDATE game_sessions SET user_score = ?1, llm_score = ?2 WHERE session_id = ?3",
          params![session.user_score, session.llm_score, session_id_str],
        )?;

        if let Some(library_id) = row.library_id {
          bump_usage(tx, library_id)?;
        }

        tracing::debug!(
          action_id = %row.action_id,
          session_id = %row.session_id,
          user_movement = row.user_movement,
          llm_movement = row.llm_movement,
          "tracked action"
        );
        Ok(())
      })
      .await?;

    Ok(action)
  }

  async fn list_actions(&self, session_id: Uuid, user_id: Uuid) -> Result<Vec<TrackedAction>> {
    self
      .read(move |conn| {
        require_owned(conn, session_id, user_id)?;
        actions_for(conn, &encode_uuid(session_id))
      })
      .await
  }

  // ── Session log ───────────────────────────────────────────────────────────

  async fn append_log(&self, user_id: Uuid, input: NewLogEntry) -> Result<SessionLogEntry> {
    self
      .write(move |tx| {
        require_owned(tx, input.session_id, user_id)?;

        let in_session = tx
          .query_row(
            "SELECT 1 FROM tracked_actions WHERE action_id = ?1 AND session_id = ?2",
            params![encode_uuid(input.action_id), encode_uuid(input.session_id)],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !in_session {
          return Err(CoreError::ActionNotFound(input.action_id).into());
        }

        let entry = SessionLogEntry {
          log_id:        Uuid::new_v4(),
          session_id:    input.session_id,
          action_id:     input.action_id,
          timestamp:     now(),
          optional_note: input.optional_note,
        };
        tx.execute(
          "INSERT INTO game_session_logs (log_id, session_id, action_id, timestamp, optional_note)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            encode_uuid(entry.log_id),
            encode_uuid(entry.session_id),
            encode_uuid(entry.action_id),
            encode_dt(entry.timestamp),
            entry.optional_note,
          ],
        )?;
        Ok(entry)
      })
      .await
  }

  async fn list_logs(&self, session_id: Uuid, user_id: Uuid) -> Result<Vec<SessionLogEntry>> {
    let raws: Vec<RawLogEntry> = self
      .read(move |conn| {
        require_owned(conn, session_id, user_id)?;
        let mut stmt = conn.prepare(
          "SELECT log_id, session_id, action_id, timestamp, optional_note
           FROM game_session_logs
           WHERE session_id = ?1
           ORDER BY timestamp ASC, rowid ASC",
        )?;
        let rows = stmt
          .query_map(params![encode_uuid(session_id)], |row| {
            Ok(RawLogEntry {
              log_id:        row.get(0)?,
              session_id:    row.get(1)?,
              action_id:     row.get(2)?,
              timestamp:     row.get(3)?,
              optional_note: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLogEntry::into_entry).collect()
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn session_report(&self, session_id: Uuid, user_id: Uuid) -> Result<SessionReport> {
    let session_id_str = encode_uuid(session_id);
    let user_id_str    = encode_uuid(user_id);

    self
      .read(move |conn| {
        let session = owned_session(conn, &session_id_str, &user_id_str)?
          .ok_or(CoreError::SessionNotFound(session_id))?
          .into_session()?;
        let actions = reported_actions_for(conn, &session_id_str)?;
        Ok(SessionReport { session, actions })
      })
      .await
  }

  async fn all_reports(&self, user_id: Uuid) -> Result<Vec<SessionReport>> {
    let user_id_str = encode_uuid(user_id);

    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SESSION_COLUMNS} FROM game_sessions
           WHERE user_id = ?1
           ORDER BY start_time DESC, rowid DESC"
        ))?;
        let raws = stmt
          .query_map(params![user_id_str], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        raws
          .into_iter()
          .map(|raw| -> Result<SessionReport> {
            let actions = reported_actions_for(conn, &raw.session_id)?;
            Ok(SessionReport { session: raw.into_session()?, actions })
          })
          .collect()
      })
      .await
  }
}
