//! CSV download endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sessions/{id}/export` | `session_<id>_export.csv` |
//! | `GET`  | `/sessions/export-all` | `spade_app_all_data_export.csv` |

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::header,
  response::IntoResponse,
};
use spade_core::store::ControlStore;
use uuid::Uuid;

use crate::{auth::CurrentUser, error::ApiError};

const ALL_SESSIONS_FILENAME: &str = "spade_app_all_data_export.csv";

fn attachment(filename: &str, body: String) -> impl IntoResponse + use<> {
  (
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename={filename}")),
    ],
    body,
  )
}

/// `GET /sessions/{id}/export`
pub async fn session<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ControlStore + 'static,
{
  let report = store
    .session_report(id, user.user_id)
    .await
    .map_err(ApiError::store)?;
  let csv = spade_report::render_session_csv(&report)?;
  Ok(attachment(&format!("session_{id}_export.csv"), csv))
}

/// `GET /sessions/export-all`
pub async fn all<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: ControlStore + 'static,
{
  let reports = store
    .all_reports(user.user_id)
    .await
    .map_err(ApiError::store)?;
  let csv = spade_report::render_all_csv(&reports)?;
  Ok(attachment(ALL_SESSIONS_FILENAME, csv))
}
