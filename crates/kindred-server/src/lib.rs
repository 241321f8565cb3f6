//! HTTP server wiring for Kindred: configuration, the write gate, and the
//! top-level router around [`kindred_api::api_router`].

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use kindred_core::{Registry, config::RegistryConfig, store::EntityStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, write_gate};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `KINDRED_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub registry:   RegistryConfig,
  /// Credentials required for writes. Writes are open when absent.
  #[serde(default)]
  pub auth:       Option<AuthConfig>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("kindred.db") }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded into the router.
pub struct AppState<S> {
  pub registry: Arc<Registry<S>>,
  pub auth:     Option<Arc<AuthConfig>>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router: the JSON API under `/api`, behind the write
/// gate and HTTP tracing.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: EntityStore + 'static,
{
  Router::new()
    .nest("/api", kindred_api::api_router(state.registry))
    .layer(middleware::from_fn_with_state(state.auth, write_gate))
    .layer(TraceLayer::new_for_http())
}
