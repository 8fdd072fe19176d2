//! Handlers for `/library` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/library` | System entries plus the caller's own, most-used first |
//! | `POST`  | `/library` | Body: [`NewLibraryEntry`]; 404 if the origin session is not the caller's |
//! | `PATCH` | `/library/{id}` | Body: [`LibraryEntryPatch`]; only the caller's own entries |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use spade_core::{
  library::{LibraryEntry, LibraryEntryPatch, NewLibraryEntry},
  store::ControlStore,
};
use uuid::Uuid;

use crate::{auth::CurrentUser, error::ApiError, json::ApiJson};

/// `GET /library`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
) -> Result<Json<Vec<LibraryEntry>>, ApiError>
where
  S: ControlStore + 'static,
{
  let entries = store
    .list_library(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `POST /library`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  ApiJson(body): ApiJson<NewLibraryEntry>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ControlStore + 'static,
{
  let entry = store
    .create_library_entry(user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `PATCH /library/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  ApiJson(patch): ApiJson<LibraryEntryPatch>,
) -> Result<Json<LibraryEntry>, ApiError>
where
  S: ControlStore + 'static,
{
  let entry = store
    .update_library_entry(id, user.user_id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entry))
}
