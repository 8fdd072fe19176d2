//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use spade_core::{Error as DomainError, store::StoreError};
use thiserror::Error;

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("export error: {0}")]
  Export(#[from] spade_report::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the domain failure it carries.
  ///
  /// Missing and foreign-owned records are both 404; bad transitions and
  /// validation failures are 400; a duplicate email is 409. Anything without
  /// a domain cause is an internal error.
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.domain() {
      Some(e) if e.is_not_found() => ApiError::NotFound(e.to_string()),
      Some(e @ (DomainError::InvalidTransition { .. } | DomainError::Validation(_))) => {
        ApiError::BadRequest(e.to_string())
      }
      Some(e @ DomainError::EmailTaken(_)) => ApiError::Conflict(e.to_string()),
      _ => ApiError::Store(Box::new(err)),
    }
  }
}

impl From<DomainError> for ApiError {
  fn from(err: DomainError) -> Self {
    let message = err.to_string();
    if err.is_not_found() {
      ApiError::NotFound(message)
    } else if matches!(err, DomainError::EmailTaken(_)) {
      ApiError::Conflict(message)
    } else {
      ApiError::BadRequest(message)
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Export(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"spade\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[derive(Debug, Error)]
  enum FakeStoreError {
    #[error(transparent)]
    Domain(DomainError),
    #[error("disk on fire")]
    Io,
  }

  impl StoreError for FakeStoreError {
    fn domain(&self) -> Option<&DomainError> {
      match self {
        FakeStoreError::Domain(e) => Some(e),
        FakeStoreError::Io => None,
      }
    }
  }

  fn status_of(err: FakeStoreError) -> StatusCode {
    ApiError::store(err).into_response().status()
  }

  #[test]
  fn domain_errors_map_to_client_statuses() {
    let id = Uuid::new_v4();
    assert_eq!(
      status_of(FakeStoreError::Domain(DomainError::SessionNotFound(id))),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      status_of(FakeStoreError::Domain(DomainError::LibraryEntryNotFound(id))),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      status_of(FakeStoreError::Domain(DomainError::Validation("nope".into()))),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      status_of(FakeStoreError::Domain(DomainError::EmailTaken("a@b.c".into()))),
      StatusCode::CONFLICT
    );
  }

  #[test]
  fn opaque_errors_are_internal() {
    assert_eq!(status_of(FakeStoreError::Io), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
      "Basic realm=\"spade\""
    );
  }
}
