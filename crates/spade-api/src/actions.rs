//! Handlers for tracked actions and their log entries.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/track` | Body: [`NewTrackedAction`]; scores and usage move in the same transaction |
//! | `GET`  | `/session/{id}/actions` | Creation order |
//! | `POST` | `/log` | Body: [`NewLogEntry`]; the action must belong to the session |
//! | `GET`  | `/session/{id}/logs` | Oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use spade_core::{
  action::{NewTrackedAction, TrackedAction},
  log::{NewLogEntry, SessionLogEntry},
  store::ControlStore,
};
use uuid::Uuid;

use crate::{auth::CurrentUser, error::ApiError, json::ApiJson};

// ─── Tracker ─────────────────────────────────────────────────────────────────

/// `POST /track`
pub async fn track<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  ApiJson(body): ApiJson<NewTrackedAction>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ControlStore + 'static,
{
  let action = store
    .track(user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(action)))
}

/// `GET /session/{id}/actions`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<TrackedAction>>, ApiError>
where
  S: ControlStore + 'static,
{
  let actions = store
    .list_actions(session_id, user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(actions))
}

// ─── Log ─────────────────────────────────────────────────────────────────────

/// `POST /log`
pub async fn append_log<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  ApiJson(body): ApiJson<NewLogEntry>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ControlStore + 'static,
{
  let entry = store
    .append_log(user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /session/{id}/logs`
pub async fn list_logs<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<SessionLogEntry>>, ApiError>
where
  S: ControlStore + 'static,
{
  let logs = store
    .list_logs(session_id, user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(logs))
}
