//! HTTP server assembly for Plaza.
//!
//! Holds the runtime configuration and mounts the JSON API under `/api`.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use plaza_api::{FeedLimits, api_router};
use plaza_core::{network::Network, store::SocialStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PLAZA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_database_path")]
  pub database_path:     PathBuf,
  #[serde(default = "default_page_size")]
  pub default_page_size: usize,
  #[serde(default = "default_max_page_size")]
  pub max_page_size:     usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_database_path() -> PathBuf { PathBuf::from("plaza.db") }
fn default_page_size() -> usize { 20 }
fn default_max_page_size() -> usize { 100 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              default_host(),
      port:              default_port(),
      database_path:     default_database_path(),
      default_page_size: default_page_size(),
      max_page_size:     default_max_page_size(),
    }
  }
}

impl ServerConfig {
  pub fn feed_limits(&self) -> FeedLimits {
    FeedLimits {
      default_page_size: self.default_page_size,
      max_page_size:     self.max_page_size,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router: the API under `/api`, with request tracing.
pub fn app<S>(network: Arc<Network<S>>, config: &ServerConfig) -> Router
where
  S: SocialStore + 'static,
{
  Router::new()
    .nest("/api", api_router(network, config.feed_limits()))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
