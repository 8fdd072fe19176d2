//! JSON REST API for Spade.
//!
//! Exposes an axum [`Router`] backed by any [`spade_core::store::ControlStore`].
//! Every route except signup requires HTTP Basic credentials; TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", spade_api::api_router(store.clone()))
//! ```

pub mod actions;
pub mod auth;
pub mod error;
pub mod export;
pub mod json;
pub mod library;
pub mod sessions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use spade_core::store::ControlStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ControlStore + 'static,
{
  Router::new()
    // Accounts
    .route("/auth/signup", post(users::signup::<S>))
    .route("/auth/me", get(users::me::<S>))
    // Library
    .route("/library", get(library::list::<S>).post(library::create::<S>))
    .route("/library/{id}", patch(library::update::<S>))
    // Tracker and log
    .route("/track", post(actions::track::<S>))
    .route("/session/{id}/actions", get(actions::list::<S>))
    .route("/log", post(actions::append_log::<S>))
    .route("/session/{id}/logs", get(actions::list_logs::<S>))
    // Sessions
    .route("/sessions", get(sessions::list::<S>).post(sessions::create::<S>))
    .route("/sessions/export-all", get(export::all::<S>))
    .route(
      "/sessions/{id}",
      get(sessions::get_one::<S>).patch(sessions::update::<S>),
    )
    .route("/sessions/{id}/pause", post(sessions::pause::<S>))
    .route("/sessions/{id}/resume", post(sessions::resume::<S>))
    .route("/sessions/{id}/end", post(sessions::end::<S>))
    .route("/sessions/{id}/selected-actions", get(sessions::selected_actions::<S>))
    .route("/sessions/{id}/export", get(export::session::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use serde_json::{Value, json};
  use spade_store_sqlite::{STARTER_ACTIONS, SqliteStore};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  const PASSWORD: &str = "correct horse";

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed_library(STARTER_ACTIONS).await.unwrap();
    api_router(Arc::new(store))
  }

  fn auth_header(email: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{email}:{pass}")))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
  }

  async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap()
      .to_vec()
  }

  async fn json_of(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  /// Sign up `email` and return its Basic credentials.
  async fn signup(app: &Router, email: &str) -> String {
    let resp = send(
      app,
      "POST",
      "/auth/signup",
      None,
      Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    auth_header(email, PASSWORD)
  }

  async fn new_session(app: &Router, auth: &str) -> String {
    let resp = send(app, "POST", "/sessions", Some(auth), Some(json!({}))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_of(resp).await["session_id"].as_str().unwrap().to_string()
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn requests_without_credentials_are_401() {
    let app = app().await;
    let resp = send(&app, "GET", "/sessions", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_password_is_401() {
    let app = app().await;
    signup(&app, "ada@example.com").await;
    let bad = auth_header("ada@example.com", "nope");
    let resp = send(&app, "GET", "/library", Some(&bad), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn signup_then_me() {
    let app = app().await;
    let auth = signup(&app, "Ada@Example.com").await;

    let resp = send(&app, "GET", "/auth/me", Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["email"], "ada@example.com");
  }

  #[tokio::test]
  async fn duplicate_signup_is_409() {
    let app = app().await;
    signup(&app, "ada@example.com").await;
    let resp = send(
      &app,
      "POST",
      "/auth/signup",
      None,
      Some(json!({ "email": "ADA@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn full_session_flow() {
    let app = app().await;
    let auth = signup(&app, "ada@example.com").await;

    let library = json_of(send(&app, "GET", "/library", Some(&auth), None).await).await;
    let library_id = library[0]["library_id"].as_str().unwrap().to_string();
    let times_used = library[0]["times_used"].as_i64().unwrap();

    let sid = new_session(&app, &auth).await;

    let resp = send(
      &app,
      "POST",
      "/track",
      Some(&auth),
      Some(json!({
        "session_id": sid,
        "action_description": "Drafted the outline myself",
        "user_movement": 4,
        "llm_movement": -1,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let custom_action = json_of(resp).await;

    let resp = send(
      &app,
      "POST",
      "/track",
      Some(&auth),
      Some(json!({
        "session_id": sid,
        "library_id": library_id,
        "user_movement": 2,
        "llm_movement": 1,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let session =
      json_of(send(&app, "GET", &format!("/sessions/{sid}"), Some(&auth), None).await).await;
    assert_eq!((session["user_score"].as_i64(), session["llm_score"].as_i64()), (Some(6), Some(0)));

    let library = json_of(send(&app, "GET", "/library", Some(&auth), None).await).await;
    let bumped = library
      .as_array()
      .unwrap()
      .iter()
      .find(|e| e["library_id"] == library_id.as_str())
      .unwrap();
    assert_eq!(bumped["times_used"].as_i64(), Some(times_used + 1));

    let resp = send(
      &app,
      "POST",
      "/log",
      Some(&auth),
      Some(json!({
        "session_id": sid,
        "action_id": custom_action["action_id"],
        "optional_note": "felt in control",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let logs =
      json_of(send(&app, "GET", &format!("/session/{sid}/logs"), Some(&auth), None).await).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);

    let ended = send(&app, "POST", &format!("/sessions/{sid}/end"), Some(&auth), None).await;
    assert_eq!(ended.status(), StatusCode::OK);
    let ended = json_of(ended).await;
    assert_eq!(ended["status"], "ended");
    assert!(!ended["end_time"].is_null());

    let resp = send(&app, "GET", &format!("/sessions/{sid}/export"), Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
      resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv")
    );
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      format!("attachment; filename=session_{sid}_export.csv").as_str()
    );
    let csv = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(csv.contains("Final User Score,6\r\n"));
    assert!(csv.contains("Final LLM Score,0\r\n"));
    let custom_row = csv.find(",Custom (Session)\r\n").unwrap();
    let library_row = csv.find(",Library\r\n").unwrap();
    assert!(custom_row < library_row);
  }

  #[tokio::test]
  async fn illegal_transition_is_400() {
    let app = app().await;
    let auth = signup(&app, "ada@example.com").await;
    let sid = new_session(&app, &auth).await;

    send(&app, "POST", &format!("/sessions/{sid}/end"), Some(&auth), None).await;
    let resp = send(&app, "POST", &format!("/sessions/{sid}/resume"), Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_of(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn patch_renames_and_filters_by_status() {
    let app = app().await;
    let auth = signup(&app, "ada@example.com").await;
    let sid = new_session(&app, &auth).await;
    new_session(&app, &auth).await;

    let resp = send(
      &app,
      "PATCH",
      &format!("/sessions/{sid}"),
      Some(&auth),
      Some(json!({ "session_name": "Thesis", "status": "paused" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["session_name"], "Thesis");

    let paused =
      json_of(send(&app, "GET", "/sessions?status=paused", Some(&auth), None).await).await;
    let paused = paused.as_array().unwrap();
    assert_eq!(paused.len(), 1);
    assert_eq!(paused[0]["session_id"], sid.as_str());
  }

  #[tokio::test]
  async fn selected_actions_round_trip_through_creation() {
    let app = app().await;
    let auth = signup(&app, "ada@example.com").await;
    let a = Uuid::new_v4();

    let resp = send(
      &app,
      "POST",
      "/sessions",
      Some(&auth),
      Some(json!({ "session_name": "Picks", "selected_action_ids": [a, a] })),
    )
    .await;
    let sid = json_of(resp).await["session_id"].as_str().unwrap().to_string();

    let selected = json_of(
      send(&app, "GET", &format!("/sessions/{sid}/selected-actions"), Some(&auth), None).await,
    )
    .await;
    assert_eq!(selected, json!([a, a]));
  }

  // ── Isolation ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn other_users_sessions_are_404() {
    let app = app().await;
    let ada = signup(&app, "ada@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let sid = new_session(&app, &ada).await;

    for (method, uri) in [
      ("GET", format!("/sessions/{sid}")),
      ("POST", format!("/sessions/{sid}/pause")),
      ("GET", format!("/session/{sid}/actions")),
      ("GET", format!("/session/{sid}/logs")),
      ("GET", format!("/sessions/{sid}/export")),
    ] {
      let resp = send(&app, method, &uri, Some(&bob), None).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");
    }

    let resp = send(
      &app,
      "POST",
      "/track",
      Some(&bob),
      Some(json!({ "session_id": sid, "user_movement": 1, "llm_movement": 1 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let listed = json_of(send(&app, "GET", "/sessions", Some(&bob), None).await).await;
    assert!(listed.as_array().unwrap().is_empty());
  }

  // ── Validation ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn malformed_body_is_json_400() {
    let app = app().await;
    let auth = signup(&app, "ada@example.com").await;
    let sid = new_session(&app, &auth).await;

    // Movements are required.
    let resp = send(&app, "POST", "/track", Some(&auth), Some(json!({ "session_id": sid }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_of(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn library_entry_lifecycle() {
    let app = app().await;
    let auth = signup(&app, "ada@example.com").await;
    let sid = new_session(&app, &auth).await;

    let resp = send(
      &app,
      "POST",
      "/library",
      Some(&auth),
      Some(json!({
        "action_description": "Explained it back in my own words",
        "default_user_movement": 2,
        "default_llm_movement": 0,
        "created_from_session_id": sid,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let entry = json_of(resp).await;
    assert_eq!(entry["user_created"], true);
    let id = entry["library_id"].as_str().unwrap().to_string();

    let resp = send(
      &app,
      "PATCH",
      &format!("/library/{id}"),
      Some(&auth),
      Some(json!({ "default_llm_movement": 1 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["default_llm_movement"], 1);

    let bob = signup(&app, "bob@example.com").await;
    let resp = send(
      &app,
      "PATCH",
      &format!("/library/{id}"),
      Some(&bob),
      Some(json!({ "default_llm_movement": 5 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn export_all_is_an_attachment() {
    let app = app().await;
    let auth = signup(&app, "ada@example.com").await;
    new_session(&app, &auth).await;

    let resp = send(&app, "GET", "/sessions/export-all", Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      "attachment; filename=spade_app_all_data_export.csv"
    );
    let csv = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(csv.starts_with("All Sessions Summary\r\n"));
    assert!(csv.contains("Detailed Action Log\r\n"));
  }
}
