//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Unauthenticated. Body: `{"email":…,"password":…}`; 409 on a taken email |
//! | `GET`  | `/auth/me` | The authenticated user |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use spade_core::{Error as DomainError, store::ControlStore, user::User};

use crate::{
  auth::{CurrentUser, hash_password, normalize_email},
  error::ApiError,
  json::ApiJson,
};

// ─── Signup ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub email:    String,
  pub password: String,
}

impl SignupBody {
  fn validate(&self) -> Result<(), DomainError> {
    let email = self.email.trim();
    if email.is_empty() || !email.contains('@') {
      return Err(DomainError::Validation("a valid email is required".into()));
    }
    if self.password.is_empty() {
      return Err(DomainError::Validation("password must not be empty".into()));
    }
    Ok(())
  }
}

/// `POST /auth/signup`
pub async fn signup<S>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<SignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ControlStore + 'static,
{
  body.validate()?;
  let hash = hash_password(&body.password)?;

  let user = store
    .create_user(normalize_email(&body.email), hash)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %user.user_id, "user signed up");
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Me ──────────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
) -> Result<Json<User>, ApiError>
where
  S: ControlStore + 'static,
{
  store
    .get_user(user.user_id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or(ApiError::Unauthorized)
}
