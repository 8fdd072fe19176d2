//! `Json` extractor whose rejections render as [`ApiError`].

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Like [`axum::Json`], but a malformed or mistyped body is a JSON
/// `{"error": …}` 400 instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
