//! JSON REST API for Plaza.
//!
//! Exposes an axum [`Router`] backed by a [`Network`] over any
//! [`plaza_core::store::SocialStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", plaza_api::api_router(network.clone(), FeedLimits::default()))
//! ```

pub mod error;
pub mod feed;
pub mod graph;
pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use plaza_core::{network::Network, store::SocialStore};
pub use error::ApiError;

// ─── Feed limits ──────────────────────────────────────────────────────────────

/// Page-size bounds for `GET /feed`.
#[derive(Debug, Clone, Copy)]
pub struct FeedLimits {
  /// Used when the request names no `limit`.
  pub default_page_size: usize,
  /// Requests above this are clamped down to it.
  pub max_page_size:     usize,
}

impl Default for FeedLimits {
  fn default() -> Self { Self { default_page_size: 20, max_page_size: 100 } }
}

impl FeedLimits {
  /// Resolve a requested page size to `1..=max_page_size`.
  pub fn clamp(&self, requested: Option<usize>) -> usize {
    let max = self.max_page_size.max(1);
    requested.unwrap_or(self.default_page_size).clamp(1, max)
  }
}

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub network: Arc<Network<S>>,
  pub feed:    FeedLimits,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { network: Arc::clone(&self.network), feed: self.feed }
  }
}

impl<S: SocialStore + 'static> ApiState<S> {
  pub fn store(&self) -> &Arc<S> { self.network.store() }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `network`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(network: Arc<Network<S>>, feed: FeedLimits) -> Router<()>
where
  S: SocialStore + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>).patch(users::update::<S>))
    .route("/users/{id}/activate", post(users::activate::<S>))
    .route("/users/{id}/deactivate", post(users::deactivate::<S>))
    .route("/users/{id}/posts", get(users::posts::<S>))
    // Graph
    .route("/users/{id}/followers", get(graph::followers::<S>))
    .route("/users/{id}/following", get(graph::following::<S>))
    .route("/follow", post(graph::follow::<S>))
    .route("/unfollow", post(graph::unfollow::<S>))
    // Feed
    .route("/feed/{user_id}", get(feed::handler::<S>))
    // Posts and comments
    .route("/posts", post(posts::create::<S>))
    .route("/posts/{id}", get(posts::get_one::<S>))
    .route("/posts/{id}/comments", get(posts::comments::<S>))
    .route("/comments", post(posts::create_comment::<S>))
    .route("/comments/{id}", get(posts::get_comment::<S>))
    .with_state(ApiState { network, feed })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
