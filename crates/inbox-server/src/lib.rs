//! HTTP server wiring for the contact inbox.
//!
//! Loads [`ServerConfig`], and builds the top-level axum [`Router`]: the
//! submissions API from `inbox-api`, a health probe, and request tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use inbox_api::{ApiState, OperatorSecret};
use inbox_core::store::SubmissionStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `INBOX_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  pub admin_secret: String,
}

impl ServerConfig {
  /// Read `path` (optional) and the environment, falling back to defaults
  /// for everything except the admin secret.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 3000)?
      .set_default("store_path", "data/submissions.json")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("INBOX").try_parsing(true))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig (is INBOX_ADMIN_SECRET set?)")
  }

  /// The configured secret, rejecting an empty one.
  pub fn operator_secret(&self) -> anyhow::Result<OperatorSecret> {
    OperatorSecret::new(self.admin_secret.clone())
      .context("admin_secret must not be empty")
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

/// `GET /health`
async fn health() -> Json<Value> {
  Json(json!({
    "status": "ok",
    "service": env!("CARGO_PKG_NAME"),
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>, secret: OperatorSecret) -> Router
where
  S: SubmissionStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .merge(inbox_api::api_router(ApiState::new(store, secret)))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use inbox_store_json::JsonFileStore;
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  use super::*;

  async fn app(dir: &TempDir) -> Router {
    let store = JsonFileStore::open(dir.path().join("submissions.json"))
      .await
      .unwrap();
    router(Arc::new(store), OperatorSecret::new("hunter2").unwrap())
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn health_is_public() {
    let dir = TempDir::new().unwrap();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app(&dir).await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "inbox-server");
  }

  #[tokio::test]
  async fn api_is_mounted() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let create = Request::builder()
      .method("POST")
      .uri("/submissions")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(
        r#"{"name":"Ada","email":"ada@example.com","message":"hi","category":"freelance"}"#,
      ))
      .unwrap();
    let resp = app.clone().oneshot(create).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let list = Request::builder()
      .uri("/submissions")
      .header("x-admin-secret", "hunter2")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(list).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["priority"], 2);
  }

  #[test]
  fn load_reads_file_and_applies_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "admin_secret = \"from-file\"\nport = 8081\n").unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 8081);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_path, PathBuf::from("data/submissions.json"));
    assert!(cfg.operator_secret().unwrap().matches("from-file"));
    assert_eq!(cfg.address(), "127.0.0.1:8081");
  }

  #[test]
  fn empty_secret_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "admin_secret = \"\"\n").unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert!(cfg.operator_secret().is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let home = std::env::var("HOME").unwrap_or_default();
    if home.is_empty() {
      return;
    }
    assert_eq!(
      expand_tilde(Path::new("~/inbox/submissions.json")),
      PathBuf::from(home).join("inbox/submissions.json")
    );
    assert_eq!(
      expand_tilde(Path::new("/var/lib/inbox.json")),
      PathBuf::from("/var/lib/inbox.json")
    );
  }
}
