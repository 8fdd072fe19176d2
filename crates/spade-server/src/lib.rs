//! HTTP server wiring for Spade.
//!
//! Assembles the top-level [`Router`] (health probe plus the JSON API under
//! `/api`) and the runtime [`ServerConfig`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use spade_core::store::ControlStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SPADE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Insert the starter action library on startup if it is missing.
  pub seed_library: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".to_string(),
      port:         8000,
      store_path:   PathBuf::from("spade.db"),
      seed_library: true,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `SPADE_*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SPADE"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> Json<Value> { Json(json!({ "status": "healthy" })) }

/// Build the complete application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ControlStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", spade_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
