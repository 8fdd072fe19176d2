//! Handlers for `/sessions` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/sessions` | Body: [`NewSession`] |
//! | `GET`   | `/sessions` | Optional `?status=active\|paused\|ended`; newest first |
//! | `GET`   | `/sessions/{id}` | 404 if missing or not the caller's |
//! | `PATCH` | `/sessions/{id}` | Body: [`SessionUpdate`]; 400 on an illegal transition |
//! | `POST`  | `/sessions/{id}/pause` | |
//! | `POST`  | `/sessions/{id}/resume` | |
//! | `POST`  | `/sessions/{id}/end` | Stamps `end_time` unless already ended |
//! | `GET`   | `/sessions/{id}/selected-actions` | Library ids in insertion order |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use spade_core::{
  Error as DomainError,
  session::{GameSession, NewSession, SessionStatus, SessionUpdate},
  store::ControlStore,
};
use uuid::Uuid;

use crate::{auth::CurrentUser, error::ApiError, json::ApiJson};

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /sessions`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  ApiJson(body): ApiJson<NewSession>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ControlStore + 'static,
{
  let session = store
    .create_session(user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Read ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<SessionStatus>,
}

/// `GET /sessions[?status=<status>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<GameSession>>, ApiError>
where
  S: ControlStore + 'static,
{
  let sessions = store
    .list_sessions(user.user_id, params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

/// `GET /sessions/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<GameSession>, ApiError>
where
  S: ControlStore + 'static,
{
  store
    .get_session(id, user.user_id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| DomainError::SessionNotFound(id).into())
}

/// `GET /sessions/{id}/selected-actions`
pub async fn selected_actions<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: ControlStore + 'static,
{
  let ids = store
    .selected_actions(id, user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ids))
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// `PATCH /sessions/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<SessionUpdate>,
) -> Result<Json<GameSession>, ApiError>
where
  S: ControlStore + 'static,
{
  let session = store
    .update_session(id, user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}

/// `POST /sessions/{id}/pause`
pub async fn pause<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<GameSession>, ApiError>
where
  S: ControlStore + 'static,
{
  let session = store
    .pause_session(id, user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}

/// `POST /sessions/{id}/resume`
pub async fn resume<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<GameSession>, ApiError>
where
  S: ControlStore + 'static,
{
  let session = store
    .resume_session(id, user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}

/// `POST /sessions/{id}/end`
pub async fn end<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<GameSession>, ApiError>
where
  S: ControlStore + 'static,
{
  let session = store
    .end_session(id, user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}
